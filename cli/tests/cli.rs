use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use dss_tabular::tabular::xlsx::{write_workbook, SheetGrid};
use dss_tabular::Cell;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

fn parse_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json output")
}

fn header(keys: &[&str], types: &[&str]) -> Vec<Vec<Cell>> {
    vec![
        keys.iter().map(|key| Cell::from(*key)).collect(),
        types.iter().map(|hint| Cell::from(*hint)).collect(),
        vec![Cell::from("notes")],
    ]
}

#[test]
fn import_csv_to_stdout() {
    let dir = TempDir::new().expect("tempdir");
    let points = dir.path().join("points.csv");
    write_file(&points, "meta.uuid,appearance.pos[0],appearance.pos[1]\np1,1,2.5\n,,\n");

    let output = cargo_bin_cmd!("dss")
        .arg("--points")
        .arg(&points)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc = parse_json(&output);
    assert_eq!(doc["points"], json!([{"meta": {"uuid": "p1"}, "appearance": {"pos": [1, 2.5]}}]));
    assert_eq!(doc["lines"], json!([]));
    assert_eq!(doc["document_meta"]["document_title"], json!("Untitled"));
    assert_eq!(doc["document_meta"]["document_uuid"].as_str().map(str::len), Some(36));
}

#[test]
fn import_csv_with_meta_override_and_indent() {
    let dir = TempDir::new().expect("tempdir");
    let lines = dir.path().join("lines.csv");
    let meta = dir.path().join("meta.json");
    write_file(&lines, "meta.uuid,end_a.ref\nl1,p1\n");
    write_file(&meta, r#"{"document_title": "Demo", "document_uuid": "PUT_UUID_HERE"}"#);

    let output = cargo_bin_cmd!("dss")
        .arg("--lines")
        .arg(&lines)
        .arg("--meta-json")
        .arg(&meta)
        .args(["--indent", "0"])
        .assert()
        .success()
        .stdout(contains("\"document_title\":\"Demo\""))
        .get_output()
        .stdout
        .clone();

    let doc = parse_json(&output);
    let meta = doc["document_meta"].as_object().expect("meta");
    assert_eq!(meta.len(), 2);
    assert_ne!(meta["document_uuid"], json!("PUT_UUID_HERE"));
    assert_eq!(doc["lines"][0]["end_a"]["ref"], json!("p1"));
}

#[test]
fn import_writes_file_and_reports_status() {
    let dir = TempDir::new().expect("tempdir");
    let points = dir.path().join("points.csv");
    let output = dir.path().join("doc.json");
    write_file(&points, "meta.uuid\np1\n");

    cargo_bin_cmd!("dss")
        .current_dir(dir.path())
        .args(["--points", "points.csv", "-o", "doc.json"])
        .assert()
        .success()
        .stdout("✔ Imported points.csv → doc.json (points=1 lines=0)\n");

    let doc = parse_json(&fs::read(&output).expect("read output"));
    assert_eq!(doc["points"][0]["meta"]["uuid"], json!("p1"));
}

#[test]
fn export_csv_from_json() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("doc.json");
    let template = dir.path().join("points_template.csv");
    write_file(
        &input,
        r#"{"points": [{"meta": {"uuid": "p1"}, "appearance": {"pos": [0, 1.5]}, "extra": {"tags_json": ["a"]}}]}"#,
    );
    write_file(&template, "meta.uuid,appearance.pos[1],extra.tags_json\n");

    cargo_bin_cmd!("dss")
        .arg(&input)
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout("meta.uuid,appearance.pos[1],extra.tags_json\np1,1.5,\"[\"\"a\"\"]\"\n");
}

#[test]
fn export_csv_overflow_leaves_no_output() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("doc.json");
    let template = dir.path().join("lines.csv");
    let output = dir.path().join("out.csv");
    write_file(&input, r#"{"lines": [{"meta": {"uuid": "a"}}, {"meta": {"uuid": "b"}}]}"#);
    write_file(&template, "meta.uuid\n");

    cargo_bin_cmd!("dss")
        .arg(&input)
        .arg("--template")
        .arg(&template)
        .args(["--max-rows", "2"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("exceeded max_rows=2").and(contains("row 3")));

    assert!(!output.exists());
}

#[test]
fn workbook_export_then_import() {
    let dir = TempDir::new().expect("tempdir");
    let template = dir.path().join("template.xlsx");
    write_workbook(
        &template,
        &[
            SheetGrid::new(
                "points",
                header(&["meta.uuid", "appearance.pos[0]", "visible"], &["string", "number", "boolean"]),
            ),
            SheetGrid::new("lines", header(&["meta.uuid", "end_a.ref"], &["string", "string"])),
        ],
    )
    .expect("template");

    let input = dir.path().join("doc.json");
    let workbook = dir.path().join("doc.xlsx");
    let doc = json!({
        "document_meta": {"document_title": "Demo", "document_uuid": "d-1"},
        "points": [{"meta": {"uuid": "p1"}, "appearance": {"pos": [2.5]}, "visible": false}],
        "lines": [{"meta": {"uuid": "l1"}, "end_a": {"ref": "p1"}}]
    });
    write_file(&input, &doc.to_string());

    cargo_bin_cmd!("dss")
        .arg(&input)
        .arg("--template")
        .arg(&template)
        .arg("-o")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(contains("✔ Exported"));

    let output = cargo_bin_cmd!("dss")
        .arg(&workbook)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_json(&output), doc);
}

#[test]
fn workbook_export_requires_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("doc.json");
    write_file(&input, "{}");

    cargo_bin_cmd!("dss")
        .arg(&input)
        .args(["--template", "template.xlsx"])
        .assert()
        .failure()
        .stderr(contains("--output is required"));
}

#[test]
fn check_reports_violations() {
    let dir = TempDir::new().expect("tempdir");
    let schema = dir.path().join("schema.json");
    let valid = dir.path().join("valid.json");
    let invalid = dir.path().join("invalid.json");
    write_file(
        &schema,
        r#"{"type": "object", "properties": {"points": {"type": "array"}}, "required": ["points"]}"#,
    );
    write_file(&valid, r#"{"points": []}"#);
    write_file(&invalid, r#"{"points": 3}"#);

    cargo_bin_cmd!("dss")
        .arg(&valid)
        .arg("--check")
        .arg("--schema")
        .arg(&schema)
        .assert()
        .success()
        .stdout(contains("✔ Valid"));

    cargo_bin_cmd!("dss")
        .arg(&invalid)
        .arg("--check")
        .arg("--schema")
        .arg(&schema)
        .assert()
        .failure()
        .stderr(contains("validation failed: 1 violation(s)").and(contains("/points:")));
}

#[test]
fn import_fails_validation_without_writing() {
    let dir = TempDir::new().expect("tempdir");
    let points = dir.path().join("points.csv");
    let schema = dir.path().join("schema.json");
    let output = dir.path().join("doc.json");
    write_file(&points, "meta.uuid,size\np1,big\n");
    write_file(
        &schema,
        r#"{"type": "object", "properties": {"points": {"items": {"properties": {"size": {"type": "number"}}}}}}"#,
    );

    cargo_bin_cmd!("dss")
        .arg("--points")
        .arg(&points)
        .arg("--schema")
        .arg(&schema)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("/points/0/size"));
    assert!(!output.exists());

    cargo_bin_cmd!("dss")
        .arg("--points")
        .arg(&points)
        .arg("--schema")
        .arg(&schema)
        .arg("--no-validate")
        .assert()
        .success()
        .stdout(contains("\"size\": \"big\""));
}

#[test]
fn check_requires_schema() {
    cargo_bin_cmd!("dss")
        .arg("doc.json")
        .arg("--check")
        .assert()
        .failure()
        .stderr(contains("--check requires --schema"));
}

#[test]
fn unknown_input_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("notes.txt");
    write_file(&input, "hello");

    cargo_bin_cmd!("dss")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("unable to auto-detect mode"));
}

#[test]
fn export_csv_reads_json_from_stdin() {
    let dir = TempDir::new().expect("tempdir");
    let template = dir.path().join("points.csv");
    write_file(&template, "meta.uuid,size\n");

    cargo_bin_cmd!("dss")
        .arg("--template")
        .arg(&template)
        .write_stdin(r#"{"points": [{"meta": {"uuid": "p1"}, "size": 3}]}"#)
        .assert()
        .success()
        .stdout("meta.uuid,size\np1,3\n");
}
