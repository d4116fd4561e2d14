//! File-level conversions that wire the tabular sources and sinks to the
//! record/document assemblers.

use std::io::{Read, Write};
use std::path::Path;

use crate::constants::{LINES_SHEET, POINTS_SHEET};
use crate::document::{assemble_document, Document};
use crate::export::export_table;
use crate::options::{ExportOptions, ImportOptions, SheetLayout};
use crate::stamp::Stamp;
use crate::tabular::{csv, Table};
use crate::{Error, ErrorStage, Result};

/// Build a document from a points CSV and a lines CSV. Either may be omitted
/// or missing on disk, which contributes no records. Unless `options` names a
/// layout, CSV has no type row and cells are read free-form.
pub fn import_csv(
    points: Option<&Path>,
    lines: Option<&Path>,
    options: &ImportOptions,
    stamp: &dyn Stamp,
) -> Result<Document> {
    let layout = options.layout.unwrap_or_else(SheetLayout::csv);
    let points = read_csv_sheet(points, POINTS_SHEET, &layout)?;
    let lines = read_csv_sheet(lines, LINES_SHEET, &layout)?;
    Ok(assemble_document(&points, &lines, None, options, stamp))
}

fn read_csv_sheet(path: Option<&Path>, name: &str, layout: &SheetLayout) -> Result<Table> {
    match path {
        Some(path) => csv::read_table_file(path, name, layout)
            .map_err(|err| err.with_stage(ErrorStage::Import)),
        None => Ok(Table::new(name, Vec::new(), Vec::new())),
    }
}

/// Export one sheet of `document` as CSV, using the header row of the CSV
/// `template` as the column layout.
pub fn export_csv<R: Read, W: Write>(
    document: &Document,
    sheet: &str,
    template: R,
    output: W,
    options: &ExportOptions,
) -> Result<()> {
    let records = match sheet {
        POINTS_SHEET => &document.points,
        LINES_SHEET => &document.lines,
        other => {
            return Err(Error::layout(format!(
                "unknown sheet '{other}'; expected '{POINTS_SHEET}' or '{LINES_SHEET}'"
            ))
            .with_stage(ErrorStage::Export))
        }
    };
    let template = csv::read_table(template, sheet, &options.layout)?;
    if template.columns.is_empty() {
        return Err(Error::layout(format!("template for '{sheet}' has no column keys"))
            .with_stage(ErrorStage::Export));
    }
    let table = export_table(records, &template, options)?;
    csv::write_table(output, &table)?;
    tracing::info!(sheet, records = records.len(), "wrote csv");
    Ok(())
}

#[cfg(feature = "xlsx")]
pub use self::workbook::{export_workbook, import_workbook};

#[cfg(feature = "xlsx")]
mod workbook {
    use serde_json::{Map, Value};

    use super::*;
    use crate::cell::Cell;
    use crate::constants::META_SHEET;
    use crate::document::{meta_from_grid, meta_to_grid};
    use crate::tabular::xlsx::{write_workbook, SheetGrid, WorkbookReader};

    /// Build a document from the `points`, `lines` and optional `document_meta`
    /// sheets of a workbook. A missing element sheet contributes no records.
    pub fn import_workbook(
        path: &Path,
        options: &ImportOptions,
        stamp: &dyn Stamp,
    ) -> Result<Document> {
        let layout = options.layout.unwrap_or_else(SheetLayout::workbook);
        let (points, lines, sheet_meta) =
            read_sources(path, &layout).map_err(|err| err.with_stage(ErrorStage::Import))?;
        Ok(assemble_document(&points, &lines, sheet_meta, options, stamp))
    }

    fn read_sources(
        path: &Path,
        layout: &SheetLayout,
    ) -> Result<(Table, Table, Option<Map<String, Value>>)> {
        let mut reader = WorkbookReader::open(path)?;
        let points = read_sheet(&mut reader, POINTS_SHEET, layout)?;
        let lines = read_sheet(&mut reader, LINES_SHEET, layout)?;
        let sheet_meta = reader
            .grid(META_SHEET)?
            .and_then(|grid| meta_from_grid(&grid));
        Ok((points, lines, sheet_meta))
    }

    fn read_sheet(reader: &mut WorkbookReader, name: &str, layout: &SheetLayout) -> Result<Table> {
        let grid = reader.grid(name)?.unwrap_or_else(|| {
            tracing::debug!(sheet = name, "sheet not found; no records");
            Vec::new()
        });
        Ok(Table::from_grid(name, grid, layout))
    }

    /// Write `document` into a copy of `template`.
    ///
    /// The template's `points` and `lines` sheets supply the header rows and the
    /// column layout; records fill the data region below them. The
    /// `document_meta` sheet is rewritten from the document; other template
    /// sheets are copied by value. Nothing is written if any sheet overflows.
    pub fn export_workbook(
        document: &Document,
        template: &Path,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<()> {
        let mut reader = WorkbookReader::open(template)?;
        let mut sheets = Vec::new();
        let mut wrote_meta = false;

        for name in reader.sheet_names() {
            let grid = reader.grid(&name)?.unwrap_or_default();
            let sheet = match name.as_str() {
                POINTS_SHEET => element_sheet(&document.points, &name, grid, options)?,
                LINES_SHEET => element_sheet(&document.lines, &name, grid, options)?,
                META_SHEET => {
                    wrote_meta = true;
                    SheetGrid::new(META_SHEET, meta_to_grid(&document.document_meta))
                }
                _ => SheetGrid::new(name.clone(), grid),
            };
            sheets.push(sheet);
        }

        for required in [POINTS_SHEET, LINES_SHEET] {
            if !sheets.iter().any(|sheet| sheet.name == required) {
                return Err(Error::layout(format!("template missing sheet: {required}"))
                    .with_stage(ErrorStage::Export));
            }
        }
        if !wrote_meta {
            sheets.push(SheetGrid::new(
                META_SHEET,
                meta_to_grid(&document.document_meta),
            ));
        }

        write_workbook(output, &sheets)?;
        tracing::info!(
            output = %output.display(),
            points = document.points.len(),
            lines = document.lines.len(),
            "wrote workbook"
        );
        Ok(())
    }

    fn element_sheet(
        records: &[Value],
        name: &str,
        grid: Vec<Vec<Cell>>,
        options: &ExportOptions,
    ) -> Result<SheetGrid> {
        let header_rows = options.layout.data_start_row.saturating_sub(1);
        let mut rows: Vec<Vec<Cell>> = grid.iter().take(header_rows).cloned().collect();
        rows.resize(header_rows, Vec::new());

        let template = Table::from_grid(name, grid, &options.layout);
        let exported = export_table(records, &template, options)?;
        rows.extend(exported.rows);
        Ok(SheetGrid::new(name, rows))
    }
}
