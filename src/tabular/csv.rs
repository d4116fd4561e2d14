use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::cell::Cell;
use crate::options::SheetLayout;
use crate::{Error, Result};

use super::Table;

const BOM: char = '\u{feff}';

/// Read every CSV record as a row of text cells. Rows may differ in length.
pub fn read_grid<R: Read>(reader: R) -> ::csv::Result<Vec<Vec<Cell>>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Empty
                } else {
                    Cell::from(field)
                }
            })
            .collect();
        grid.push(row);
    }
    strip_bom(&mut grid);
    Ok(grid)
}

pub fn read_table<R: Read>(reader: R, name: &str, layout: &SheetLayout) -> Result<Table> {
    let grid = read_grid(reader).map_err(|err| located(err, name))?;
    Ok(Table::from_grid(name, grid, layout))
}

fn located(err: ::csv::Error, sheet: &str) -> Error {
    let line = err.position().map(|position| position.line());
    let err = Error::from(err);
    match line.and_then(|line| usize::try_from(line).ok()) {
        Some(row) => err.with_location(sheet, row),
        None => err,
    }
}

/// Like [`read_table`] on a file; a file that does not exist reads as an empty
/// sheet.
pub fn read_table_file(path: &Path, name: &str, layout: &SheetLayout) -> Result<Table> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), sheet = name, "csv file not found; sheet is empty");
        return Ok(Table::new(name, Vec::new(), Vec::new()));
    }
    read_table(File::open(path)?, name, layout)
}

/// Write the header row (keys at their column positions) then the data rows.
pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    let width = table
        .columns
        .iter()
        .map(|column| column.index + 1)
        .max()
        .unwrap_or(0);
    let mut header = vec![String::new(); width];
    for column in &table.columns {
        header[column.index] = column.path.to_string();
    }
    writer.write_record(&header)?;

    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_text))?;
    }
    writer.flush()?;
    Ok(())
}

fn strip_bom(grid: &mut [Vec<Cell>]) {
    let Some(Cell::Text(first)) = grid.first_mut().and_then(|row| row.first_mut()) else {
        return;
    };
    if let Some(stripped) = first.strip_prefix(BOM) {
        *first = stripped.to_string();
    }
}
