use thiserror::Error as ThisError;

use crate::validate::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Csv,
    Workbook,
    Json,
    Layout,
    Capacity,
    Schema,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Import,
    Export,
    Validate,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub sheet: String,
    // 1-based
    pub row: usize,
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub stage: ErrorStage,
    pub message: String,
    pub location: Option<Location>,
    pub violations: Vec<Violation>,
}

impl Error {
    fn new(kind: ErrorKind, stage: ErrorStage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            location: None,
            violations: Vec::new(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, ErrorStage::Unknown, message)
    }

    pub fn csv(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Csv, ErrorStage::Unknown, message)
    }

    pub fn workbook(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Workbook, ErrorStage::Unknown, message)
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Json, ErrorStage::Unknown, message)
    }

    pub fn layout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Layout, ErrorStage::Unknown, message)
    }

    pub fn capacity(sheet: &str, row: usize, max_rows: usize) -> Self {
        let mut err = Self::new(
            ErrorKind::Capacity,
            ErrorStage::Export,
            format!("too many rows in sheet '{sheet}'; exceeded max_rows={max_rows}"),
        );
        err.location = Some(Location {
            sheet: sheet.to_string(),
            row,
        });
        err
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, ErrorStage::Validate, message)
    }

    pub fn validation(violations: Vec<Violation>) -> Self {
        let mut err = Self::new(
            ErrorKind::Validation,
            ErrorStage::Validate,
            format!("validation failed: {} violation(s)", violations.len()),
        );
        err.violations = violations;
        err
    }

    pub fn with_stage(mut self, stage: ErrorStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_location(mut self, sheet: &str, row: usize) -> Self {
        self.location = Some(Location {
            sheet: sheet.to_string(),
            row,
        });
        self
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::csv(format!("csv: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::json(format!("json: {err}"))
    }
}

#[cfg(feature = "xlsx")]
impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::workbook(format!("read workbook: {err}"))
    }
}

#[cfg(feature = "xlsx")]
impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::workbook(format!("write workbook: {err}"))
    }
}
