use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::cell::{iso_date, iso_datetime, Cell};
use crate::coerce::display_cell;
use crate::constants::{
    is_placeholder_uuid, DEFAULT_AUTHOR, DEFAULT_SCHEMA_URI, DEFAULT_TITLE, DEFAULT_VERSION,
};
use crate::options::ImportOptions;
use crate::path::Path;
use crate::record::{assemble_records, is_truthy};
use crate::stamp::Stamp;
use crate::tabular::Table;
use crate::Result;

/// A 3DSS document: metadata plus the point and line records.
///
/// Missing or `null` members read as empty, so a partial document can still be
/// exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_meta: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<Value>,
}

impl Document {
    pub fn from_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "document_meta".to_string(),
            Value::Object(self.document_meta.clone()),
        );
        root.insert("points".to_string(), Value::Array(self.points.clone()));
        root.insert("lines".to_string(), Value::Array(self.lines.clone()));
        Value::Object(root)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Compose a document from the point and line sheets.
///
/// Metadata comes from `options.meta_override`, else from `sheet_meta` (a
/// `document_meta` sheet), else it is synthesized.
pub fn assemble_document(
    points: &Table,
    lines: &Table,
    sheet_meta: Option<Map<String, Value>>,
    options: &ImportOptions,
    stamp: &dyn Stamp,
) -> Document {
    let points = assemble_records(points, stamp);
    let lines = assemble_records(lines, stamp);
    let document_meta = resolve_meta(
        options.meta_override.clone(),
        sheet_meta,
        options.schema.as_ref(),
        stamp,
    );
    tracing::info!(points = points.len(), lines = lines.len(), "assembled document");
    Document {
        document_meta,
        points,
        lines,
    }
}

pub fn resolve_meta(
    override_meta: Option<Map<String, Value>>,
    sheet_meta: Option<Map<String, Value>>,
    schema: Option<&Value>,
    stamp: &dyn Stamp,
) -> Map<String, Value> {
    match override_meta.or(sheet_meta) {
        Some(mut meta) => {
            backfill_document_uuid(&mut meta, stamp);
            meta
        }
        None => default_document_meta(schema, stamp),
    }
}

pub fn default_document_meta(schema: Option<&Value>, stamp: &dyn Stamp) -> Map<String, Value> {
    let mut meta = Map::new();
    meta.insert("document_title".to_string(), DEFAULT_TITLE.into());
    meta.insert("document_uuid".to_string(), stamp.uuid().into());
    meta.insert("schema_uri".to_string(), schema_uri(schema).into());
    meta.insert("author".to_string(), DEFAULT_AUTHOR.into());
    meta.insert("version".to_string(), DEFAULT_VERSION.into());
    meta.insert("updated_at".to_string(), stamp.timestamp().into());
    meta
}

/// `$id` (without a trailing `#`), joined with `$anchor` when present.
pub fn schema_uri(schema: Option<&Value>) -> String {
    let id = schema
        .and_then(|schema| schema.get("$id"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if id.is_empty() {
        return DEFAULT_SCHEMA_URI.to_string();
    }
    let base = id.strip_suffix('#').unwrap_or(id);
    match schema
        .and_then(|schema| schema.get("$anchor"))
        .and_then(Value::as_str)
    {
        Some(anchor) if !anchor.is_empty() => format!("{base}#{anchor}"),
        _ => base.to_string(),
    }
}

/// Replace a missing, empty or template-placeholder `document_uuid`.
pub fn backfill_document_uuid(meta: &mut Map<String, Value>, stamp: &dyn Stamp) {
    let unfilled = match meta.get("document_uuid") {
        Some(Value::String(text)) => text.is_empty() || is_placeholder_uuid(text),
        Some(value) => !is_truthy(value),
        None => true,
    };
    if unfilled {
        meta.insert("document_uuid".to_string(), stamp.uuid().into());
    }
}

/// Read a `document_meta` key/value grid. Row 1 is a header; blank keys and
/// blank values are skipped. Returns `None` when nothing usable is left.
pub fn meta_from_grid(grid: &[Vec<Cell>]) -> Option<Map<String, Value>> {
    let mut meta = Map::new();
    for row in grid.iter().skip(1) {
        let Some(key) = row.first().and_then(Cell::as_key) else {
            continue;
        };
        if let Some(value) = row.get(1).and_then(meta_value) {
            meta.insert(key, value);
        }
    }
    (!meta.is_empty()).then_some(meta)
}

pub fn meta_to_grid(meta: &Map<String, Value>) -> Vec<Vec<Cell>> {
    let mut keys: Vec<&String> = meta.keys().collect();
    keys.sort();
    let value_path = Path::parse("value");
    let mut grid = vec![vec![Cell::from("key"), Cell::from("value")]];
    for key in keys {
        grid.push(vec![
            Cell::Text(key.clone()),
            display_cell(meta.get(key.as_str()), &value_path),
        ]);
    }
    grid
}

// Text that parses as JSON becomes that value; anything else stays text.
fn meta_value(cell: &Cell) -> Option<Value> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Int(value) => Value::from(*value),
        Cell::Float(value) => crate::num::float_value(*value)?,
        Cell::Bool(value) => Value::Bool(*value),
        Cell::DateTime(value) => Value::String(iso_datetime(value)),
        Cell::Date(value) => Value::String(iso_date(value)),
        Cell::Json(value) => value.clone(),
        Cell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
        }
    };
    (!value.is_null()).then_some(value)
}
