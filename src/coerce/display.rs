use serde_json::Value;

use crate::cell::Cell;
use crate::path::Path;

/// Render a document value as a cell for the column at `path`.
///
/// `_json` columns and any object/array get compact JSON text so they read back
/// unchanged; other scalars keep their kind. Missing values and `null` give an
/// empty cell.
pub fn display_cell(value: Option<&Value>, path: &Path) -> Cell {
    let value = match value {
        None | Some(Value::Null) => return Cell::Empty,
        Some(value) => value,
    };
    if path.is_json() {
        return Cell::Text(value.to_string());
    }
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(flag) => Cell::Bool(*flag),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Cell::Int(int)
            } else if number.is_u64() {
                // Past i64 range; text keeps every digit.
                Cell::Text(number.to_string())
            } else {
                number
                    .as_f64()
                    .map_or_else(|| Cell::Text(number.to_string()), Cell::Float)
            }
        }
        Value::String(text) => Cell::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
    }
}
