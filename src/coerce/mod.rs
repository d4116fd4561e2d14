//! Raw cell → JSON value coercion, and the reverse rendering used on export.

pub mod display;

use std::fmt;

use serde_json::Value;

use crate::cell::{iso_date, iso_datetime, Cell};
use crate::num::{
    float_value, is_decimal_literal, is_float_literal, is_integer_literal, truncate_to_i64,
};
use crate::path::Path;

pub use display::display_cell;

/// Per-column type hint taken from a workbook's type row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclaredType {
    String,
    Integer,
    Number,
    Boolean,
    Json,
    #[default]
    Any,
}

impl DeclaredType {
    /// Reads the first whitespace-delimited token, case-insensitively, so a hint
    /// such as `number (default=0)` declares `number`. Blank or unknown hints
    /// declare `any`.
    pub fn from_hint(hint: &str) -> Self {
        let Some(token) = hint.split_whitespace().next() else {
            return DeclaredType::Any;
        };
        match token.to_ascii_lowercase().as_str() {
            "string" => DeclaredType::String,
            "integer" => DeclaredType::Integer,
            "number" => DeclaredType::Number,
            "boolean" => DeclaredType::Boolean,
            "json" => DeclaredType::Json,
            _ => DeclaredType::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclaredType::String => "string",
            DeclaredType::Integer => "integer",
            DeclaredType::Number => "number",
            DeclaredType::Boolean => "boolean",
            DeclaredType::Json => "json",
            DeclaredType::Any => "any",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn a raw cell into the value written at `path`, or `None` when the cell
/// contributes nothing to the record.
///
/// `declared` is `None` for free-form text sources (CSV), where numbers and
/// booleans are recognised from the text itself.
pub fn coerce(raw: &Cell, path: &Path, declared: Option<DeclaredType>) -> Option<Value> {
    if raw.is_blank() {
        return None;
    }
    match raw {
        Cell::DateTime(value) => return Some(Value::String(iso_datetime(value))),
        Cell::Date(value) => return Some(Value::String(iso_date(value))),
        _ => {}
    }

    let declared = if path.is_json() {
        Some(DeclaredType::Json)
    } else {
        declared
    };
    match declared {
        Some(DeclaredType::Json) => coerce_json(raw).filter(|value| !value.is_null()),
        Some(DeclaredType::Boolean) => coerce_boolean(raw),
        Some(DeclaredType::Integer) => coerce_integer(raw),
        Some(DeclaredType::Number) => coerce_number(raw),
        Some(DeclaredType::String | DeclaredType::Any) => coerce_plain(raw),
        None => coerce_free_form(raw),
    }
}

fn coerce_json(raw: &Cell) -> Option<Value> {
    match raw {
        Cell::Json(value) => Some(value.clone()),
        Cell::Text(text) => {
            let trimmed = text.trim();
            match serde_json::from_str(trimmed) {
                Ok(value) => Some(value),
                Err(_) => Some(Value::String(trimmed.to_string())),
            }
        }
        other => coerce_plain(other),
    }
}

fn coerce_boolean(raw: &Cell) -> Option<Value> {
    let flag = match raw {
        Cell::Bool(value) => *value,
        Cell::Int(1) => true,
        Cell::Int(0) => false,
        Cell::Json(Value::Bool(value)) => *value,
        Cell::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "on" => true,
            "false" | "0" | "no" | "n" | "off" => false,
            _ => return None,
        },
        _ => return None,
    };
    Some(Value::Bool(flag))
}

fn coerce_integer(raw: &Cell) -> Option<Value> {
    let value = match raw {
        Cell::Int(value) => *value,
        Cell::Float(value) => truncate_to_i64(*value)?,
        Cell::Text(text) => truncate_to_i64(text.trim().parse::<f64>().ok()?)?,
        Cell::Json(Value::Number(number)) => match number.as_i64() {
            Some(value) => value,
            None => truncate_to_i64(number.as_f64()?)?,
        },
        _ => return None,
    };
    Some(Value::from(value))
}

fn coerce_number(raw: &Cell) -> Option<Value> {
    let value = match raw {
        Cell::Int(value) => *value as f64,
        Cell::Float(value) => *value,
        Cell::Text(text) => {
            let trimmed = text.trim();
            if !is_decimal_literal(trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Cell::Json(Value::Number(number)) => number.as_f64()?,
        _ => return None,
    };
    float_value(value)
}

fn coerce_free_form(raw: &Cell) -> Option<Value> {
    let Cell::Text(text) = raw else {
        return coerce_plain(raw);
    };
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    if is_integer_literal(trimmed) {
        // Out-of-range integers fall through to the float reading.
        if let Ok(value) = trimmed.trim_start_matches('+').parse::<i64>() {
            return Some(Value::from(value));
        }
    }
    if is_float_literal(trimmed) {
        if let Some(value) = trimmed.parse::<f64>().ok().and_then(float_value) {
            return Some(value);
        }
    }
    Some(Value::String(trimmed.to_string()))
}

fn coerce_plain(raw: &Cell) -> Option<Value> {
    match raw {
        Cell::Empty => None,
        Cell::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
        }
        Cell::Int(value) => Some(Value::from(*value)),
        Cell::Float(value) => float_value(*value),
        Cell::Bool(value) => Some(Value::Bool(*value)),
        Cell::DateTime(value) => Some(Value::String(iso_datetime(value))),
        Cell::Date(value) => Some(Value::String(iso_date(value))),
        Cell::Json(Value::Null) => None,
        Cell::Json(value) => Some(value.clone()),
    }
}
