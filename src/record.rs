use serde_json::{Map, Value};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::canonical::trim_object;
use crate::cell::Cell;
use crate::coerce::coerce;
use crate::path::set_path;
use crate::stamp::Stamp;
use crate::tabular::{Column, Table};

#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 256;

/// Build one record from a row, or `None` when every cell is blank.
///
/// The finished record is trimmed and always carries `meta.uuid` unless `meta`
/// holds something other than a map.
pub fn assemble_record(columns: &[Column], row: &[Cell], stamp: &dyn Stamp) -> Option<Value> {
    let mut record = Map::new();
    let mut any_value = false;
    for column in columns {
        let Some(raw) = row.get(column.index) else {
            continue;
        };
        let Some(value) = coerce(raw, &column.path, column.declared) else {
            continue;
        };
        any_value = true;
        set_path(&mut record, &column.path, value);
    }
    if !any_value {
        return None;
    }

    let mut record = trim_object(record);
    ensure_uuid(&mut record, stamp);
    Some(Value::Object(record))
}

pub fn assemble_records(table: &Table, stamp: &dyn Stamp) -> Vec<Value> {
    let assembled = assemble_rows(table, stamp);
    let discarded = assembled.iter().filter(|record| record.is_none()).count();
    let records: Vec<Value> = assembled.into_iter().flatten().collect();
    tracing::debug!(
        sheet = %table.name,
        columns = table.columns.len(),
        records = records.len(),
        discarded,
        "assembled sheet"
    );
    records
}

#[cfg(feature = "parallel")]
fn assemble_rows(table: &Table, stamp: &dyn Stamp) -> Vec<Option<Value>> {
    if table.rows.len() >= PARALLEL_THRESHOLD {
        return table
            .rows
            .par_iter()
            .map(|row| assemble_record(&table.columns, row, stamp))
            .collect();
    }
    table
        .rows
        .iter()
        .map(|row| assemble_record(&table.columns, row, stamp))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn assemble_rows(table: &Table, stamp: &dyn Stamp) -> Vec<Option<Value>> {
    table
        .rows
        .iter()
        .map(|row| assemble_record(&table.columns, row, stamp))
        .collect()
}

fn ensure_uuid(record: &mut Map<String, Value>, stamp: &dyn Stamp) {
    match record.get_mut("meta") {
        Some(Value::Object(meta)) => {
            if !meta.get("uuid").is_some_and(is_truthy) {
                meta.insert("uuid".to_string(), Value::String(stamp.uuid()));
            }
        }
        Some(other) => {
            tracing::warn!(meta = %other, "record meta is not an object; uuid not assigned");
        }
        None => {
            let mut meta = Map::new();
            meta.insert("uuid".to_string(), Value::String(stamp.uuid()));
            record.insert("meta".to_string(), Value::Object(meta));
        }
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
