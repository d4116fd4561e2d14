//! Conversion between authoring spreadsheets (CSV or XLSX rows keyed by
//! dotted paths) and 3DSS JSON documents.
//!
//! ```
//! use dss_tabular::{assemble_record, Column, Cell, SystemStamp};
//!
//! let columns = [Column::new(0, "meta.uuid"), Column::new(1, "appearance.pos[1]")];
//! let record = assemble_record(&columns, &[Cell::from("p1"), Cell::Int(3)], &SystemStamp)
//!     .expect("non-empty row");
//! assert_eq!(record["appearance"]["pos"], serde_json::json!([null, 3]));
//! ```

pub mod canonical;
pub mod cell;
pub mod coerce;
pub mod constants;
pub mod convert;
pub mod document;
pub mod error;
pub mod export;
pub mod num;
pub mod options;
pub mod path;
pub mod record;
pub mod stamp;
pub mod tabular;
pub mod validate;

use std::io::Write;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub use crate::canonical::{trim, trim_object};
pub use crate::cell::Cell;
pub use crate::coerce::{coerce, display_cell, DeclaredType};
pub use crate::convert::{export_csv, import_csv};
#[cfg(feature = "xlsx")]
pub use crate::convert::{export_workbook, import_workbook};
pub use crate::document::{assemble_document, Document};
pub use crate::error::{Error, ErrorKind, ErrorStage, Location};
pub use crate::export::export_table;
pub use crate::options::{ExportOptions, ImportOptions, SheetLayout};
pub use crate::path::{get_path, set_path, Path, Step};
pub use crate::record::{assemble_record, assemble_records};
pub use crate::stamp::{Stamp, SystemStamp};
pub use crate::tabular::{Column, Table};
pub use crate::validate::{validate, validate_with, SchemaValidator, Validation, Violation};

pub type Result<T> = std::result::Result<T, Error>;

/// Pretty-print `value` as UTF-8 JSON with `indent` spaces per level; `0`
/// writes compact JSON.
pub fn to_writer_pretty<T: Serialize, W: Write>(writer: W, value: &T, indent: usize) -> Result<()> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

pub fn to_string_pretty<T: Serialize>(value: &T, indent: usize) -> Result<String> {
    let mut out = Vec::new();
    to_writer_pretty(&mut out, value, indent)?;
    String::from_utf8(out).map_err(|err| Error::json(err.to_string()))
}
