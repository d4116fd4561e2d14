use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use dss_tabular::constants::{DEFAULT_INDENT, DEFAULT_MAX_ROWS, LINES_SHEET, POINTS_SHEET};
use dss_tabular::{
    export_csv, export_workbook, import_csv, import_workbook, to_writer_pretty, validate,
    Document, ExportOptions, ImportOptions, SheetLayout, SystemStamp, Validation, Violation,
};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

const MAX_REPORTED_VIOLATIONS: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "dss", version, about = "3DSS JSON <-> CSV/XLSX converter")]
struct Args {
    /// Input file: .xlsx to import, .json to export or check. Omit or use '-' to read JSON from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Points CSV to import.
    #[arg(long, value_name = "file")]
    points: Option<String>,

    /// Lines CSV to import.
    #[arg(long, value_name = "file")]
    lines: Option<String>,

    /// Template to export into: a .xlsx workbook or a .csv header row.
    #[arg(long, value_name = "file")]
    template: Option<String>,

    /// Sheet to export with a CSV template (default: from the template file name).
    #[arg(long, value_enum, value_name = "name")]
    sheet: Option<SheetArg>,

    /// JSON Schema for validation and the default schema_uri.
    #[arg(long, value_name = "file")]
    schema: Option<String>,

    /// JSON object used as document_meta instead of the sheet or the defaults.
    #[arg(long = "meta-json", value_name = "file")]
    meta_json: Option<String>,

    /// Skip schema validation even when --schema is given.
    #[arg(long = "no-validate")]
    no_validate: bool,

    /// Only validate the JSON input against --schema.
    #[arg(long)]
    check: bool,

    /// Last sheet row a record may occupy on export.
    #[arg(long = "max-rows", value_name = "number", default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// JSON indentation size; 0 writes compact JSON.
    #[arg(long, value_name = "number", default_value_t = DEFAULT_INDENT)]
    indent: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SheetArg {
    Points,
    Lines,
}

impl SheetArg {
    fn name(self) -> &'static str {
        match self {
            SheetArg::Points => POINTS_SHEET,
            SheetArg::Lines => LINES_SHEET,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    ImportWorkbook,
    ImportCsv,
    ExportWorkbook,
    ExportCsv,
    Check,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

impl InputSource {
    fn from_arg(input: Option<&str>) -> Self {
        match input {
            None | Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(path.to_string()),
        }
    }

    fn label(&self) -> String {
        match self {
            InputSource::Stdin => "stdin".to_string(),
            InputSource::File(path) => display_path(path),
        }
    }
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        if let Some(err) = err.downcast_ref::<dss_tabular::Error>() {
            if let Some(location) = &err.location {
                eprintln!("  at sheet '{}', row {}", location.sheet, location.row);
            }
            report_violations(&err.violations);
        }
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let input = InputSource::from_arg(args.input.as_deref());

    match resolve_mode(&args, &input)? {
        Mode::ImportWorkbook => run_import(&args, &input, Mode::ImportWorkbook),
        Mode::ImportCsv => run_import(&args, &input, Mode::ImportCsv),
        Mode::ExportWorkbook => run_export_workbook(&args, &input),
        Mode::ExportCsv => run_export_csv(&args, &input),
        Mode::Check => run_check(&args, &input),
    }
}

fn resolve_mode(args: &Args, input: &InputSource) -> Result<Mode, Box<dyn Error>> {
    if args.check {
        if args.schema.is_none() {
            return Err("--check requires --schema".into());
        }
        return Ok(Mode::Check);
    }

    if args.points.is_some() || args.lines.is_some() {
        if let InputSource::File(path) = input {
            return Err(format!("unexpected input '{path}' with --points/--lines").into());
        }
        return Ok(Mode::ImportCsv);
    }

    let input_ext = match input {
        InputSource::Stdin => Some("json".to_string()),
        InputSource::File(path) => extension(path),
    };
    match input_ext.as_deref() {
        Some("xlsx" | "xlsm") => Ok(Mode::ImportWorkbook),
        Some("json") => {
            let Some(template) = args.template.as_deref() else {
                return Err("--template is required to export JSON".into());
            };
            match extension(template).as_deref() {
                Some("xlsx" | "xlsm") => Ok(Mode::ExportWorkbook),
                Some("csv") => Ok(Mode::ExportCsv),
                _ => Err(format!("unsupported template '{template}'; use .xlsx or .csv").into()),
            }
        }
        _ => Err("unable to auto-detect mode; pass a .xlsx or .json input, or --points/--lines".into()),
    }
}

fn run_import(args: &Args, input: &InputSource, mode: Mode) -> Result<(), Box<dyn Error>> {
    let schema = read_schema(args)?;
    let options = ImportOptions::new()
        .with_meta_override(read_meta_override(args)?)
        .with_schema(schema.clone());

    let (document, source_label) = match (mode, input) {
        (Mode::ImportWorkbook, InputSource::File(path)) => (
            import_workbook(Path::new(path), &options, &SystemStamp)?,
            display_path(path),
        ),
        _ => {
            let points = args.points.as_deref().map(Path::new);
            let lines = args.lines.as_deref().map(Path::new);
            let label = [args.points.as_deref(), args.lines.as_deref()]
                .into_iter()
                .flatten()
                .map(display_path)
                .collect::<Vec<_>>()
                .join(" + ");
            (import_csv(points, lines, &options, &SystemStamp)?, label)
        }
    };

    if let Some(schema) = schema.as_ref().filter(|_| !args.no_validate) {
        check_document(&document.to_value(), schema)?;
    }

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    with_output_writer(output_target.path(), |writer| {
        to_writer_pretty(&mut *writer, &document, args.indent)?;
        writer.write_all(b"\n")?;
        Ok(())
    })?;
    if let OutputTarget::File(path) = &output_target {
        report_status("Imported", &source_label, path, &document);
    }
    Ok(())
}

fn run_export_workbook(args: &Args, input: &InputSource) -> Result<(), Box<dyn Error>> {
    let OutputTarget::File(output) = OutputTarget::from_arg(args.output.as_deref()) else {
        return Err("--output is required for workbook export".into());
    };
    let document = read_document(args, input)?;
    let template = args.template.as_deref().ok_or("--template is required")?;
    let options = ExportOptions::new().with_max_rows(args.max_rows);

    export_workbook(&document, Path::new(template), Path::new(&output), &options)?;
    report_status("Exported", &input.label(), &output, &document);
    Ok(())
}

fn run_export_csv(args: &Args, input: &InputSource) -> Result<(), Box<dyn Error>> {
    let document = read_document(args, input)?;
    let template = args.template.as_deref().ok_or("--template is required")?;
    let sheet = match args.sheet {
        Some(sheet) => sheet.name(),
        None => sheet_from_file_name(template)?,
    };
    let options = ExportOptions::new()
        .with_layout(SheetLayout::csv())
        .with_max_rows(args.max_rows);

    // Render fully before touching the output so an overflow leaves no file behind.
    let mut rendered = Vec::new();
    export_csv(&document, sheet, fs::File::open(template)?, &mut rendered, &options)?;

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    write_output(output_target.path(), &rendered)?;
    if let OutputTarget::File(path) = &output_target {
        report_status("Exported", &input.label(), path, &document);
    }
    Ok(())
}

fn run_check(args: &Args, input: &InputSource) -> Result<(), Box<dyn Error>> {
    let value: Value = serde_json::from_str(&read_input(input)?)?;
    let schema = read_schema(args)?.ok_or("--check requires --schema")?;
    check_document(&value, &schema)?;
    println!("✔ Valid {}", input.label());
    Ok(())
}

fn check_document(document: &Value, schema: &Value) -> Result<(), Box<dyn Error>> {
    if validate(document, schema)? == Validation::Skipped {
        eprintln!("⚠ Schema validation is not available in this build; skipped");
    }
    Ok(())
}

fn read_document(args: &Args, input: &InputSource) -> Result<Document, Box<dyn Error>> {
    let document = match input {
        InputSource::Stdin => Document::from_reader(io::stdin().lock())?,
        InputSource::File(path) => {
            Document::from_reader(io::BufReader::new(fs::File::open(path)?))?
        }
    };
    if let Some(schema) = read_schema(args)?.filter(|_| !args.no_validate) {
        check_document(&document.to_value(), &schema)?;
    }
    Ok(document)
}

fn read_input(input: &InputSource) -> Result<String, Box<dyn Error>> {
    match input {
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        InputSource::File(path) => Ok(fs::read_to_string(path)?),
    }
}

fn read_schema(args: &Args) -> Result<Option<Value>, Box<dyn Error>> {
    let Some(path) = args.schema.as_deref() else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).map_err(|err| format!("read schema {path}: {err}"))?;
    Ok(Some(serde_json::from_str(&text)?))
}

fn read_meta_override(args: &Args) -> Result<Option<Map<String, Value>>, Box<dyn Error>> {
    let Some(path) = args.meta_json.as_deref() else {
        return Ok(None);
    };
    match serde_json::from_str(&fs::read_to_string(path)?)? {
        Value::Object(meta) => Ok(Some(meta)),
        _ => Err(format!("{path}: document_meta must be a JSON object").into()),
    }
}

fn sheet_from_file_name(template: &str) -> Result<&'static str, Box<dyn Error>> {
    let stem = Path::new(template)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if stem.contains(POINTS_SHEET) {
        Ok(POINTS_SHEET)
    } else if stem.contains(LINES_SHEET) {
        Ok(LINES_SHEET)
    } else {
        Err("unable to tell the sheet from the template name; use --sheet".into())
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn report_violations(violations: &[Violation]) {
    for violation in violations.iter().take(MAX_REPORTED_VIOLATIONS) {
        eprintln!("  {violation}");
    }
    if violations.len() > MAX_REPORTED_VIOLATIONS {
        eprintln!("  ... and {} more", violations.len() - MAX_REPORTED_VIOLATIONS);
    }
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    with_output_writer(path, |writer| {
        writer.write_all(data)?;
        Ok(())
    })
}

fn report_status(verb: &str, input_label: &str, output_path: &str, document: &Document) {
    println!(
        "✔ {verb} {input_label} → {} (points={} lines={})",
        display_path(output_path),
        document.points.len(),
        document.lines.len()
    );
}

fn display_path(path: &str) -> String {
    let path = Path::new(path);
    let Ok(cwd) = std::env::current_dir() else {
        return path.to_string_lossy().into_owned();
    };
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let rel = diff_paths(&abs, &cwd).unwrap_or(abs);
    rel.to_string_lossy().into_owned()
}

fn diff_paths(path: &Path, base: &Path) -> Option<PathBuf> {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base.components().collect();

    if path_components.first()? != base_components.first()? {
        return None;
    }

    let mut common = 0;
    while common < path_components.len()
        && common < base_components.len()
        && path_components[common] == base_components[common]
    {
        common += 1;
    }

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &path_components[common..] {
        result.push(component.as_os_str());
    }

    Some(result)
}
