use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::num::{format_f64, format_i64};

/// A raw spreadsheet or CSV cell, tagged by how the source delivered it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    /// An already structured value, e.g. handed over by a programmatic source.
    Json(Value),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering for CSV output and for header/type rows.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Int(value) => format_i64(*value),
            Cell::Float(value) => format_f64(*value),
            Cell::Bool(value) => value.to_string(),
            Cell::DateTime(value) => iso_datetime(value),
            Cell::Date(value) => iso_date(value),
            Cell::Json(value) => value.to_string(),
        }
    }

    pub fn as_key(&self) -> Option<String> {
        let text = self.to_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

pub(crate) fn iso_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

pub(crate) fn iso_date(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_is_blank() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::from("  \t").is_blank());
        assert!(!Cell::from(" x ").is_blank());
        assert!(!Cell::Int(0).is_blank());
    }

    #[rstest]
    #[case(Cell::Int(5), "5")]
    #[case(Cell::Float(1.5), "1.5")]
    #[case(Cell::Bool(false), "false")]
    #[case(Cell::Json(json!([1, 2])), "[1,2]")]
    #[case(Cell::Empty, "")]
    fn test_to_text(#[case] cell: Cell, #[case] expected: &str) {
        assert_eq!(cell.to_text(), expected);
    }

    #[rstest]
    fn test_iso_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).expect("date");
        let whole = date.and_hms_opt(7, 8, 9).expect("time");
        assert_eq!(iso_datetime(&whole), "2024-05-06T07:08:09");
        let fractional = date.and_hms_milli_opt(7, 8, 9, 250).expect("time");
        assert_eq!(iso_datetime(&fractional), "2024-05-06T07:08:09.250");
        assert_eq!(iso_date(&date), "2024-05-06");
    }

    #[rstest]
    fn test_as_key() {
        assert_eq!(Cell::from(" meta.uuid ").as_key().as_deref(), Some("meta.uuid"));
        assert_eq!(Cell::from("  ").as_key(), None);
        assert_eq!(Cell::Empty.as_key(), None);
    }
}
