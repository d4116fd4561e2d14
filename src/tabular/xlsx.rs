use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::Worksheet;

use crate::cell::Cell;
use crate::{Error, Result};

/// An open workbook, read sheet by sheet into cell grids.
pub struct WorkbookReader {
    sheets: Sheets<BufReader<File>>,
}

impl WorkbookReader {
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path)
            .map_err(|err| Error::workbook(format!("open {}: {err}", path.display())))?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.sheet_names().iter().any(|sheet| sheet == name)
    }

    /// The sheet as a grid anchored at A1, or `None` when there is no such sheet.
    pub fn grid(&mut self, name: &str) -> Result<Option<Vec<Vec<Cell>>>> {
        if !self.has_sheet(name) {
            return Ok(None);
        }
        let range = self.sheets.worksheet_range(name)?;
        let Some((last_row, last_col)) = range.end() else {
            return Ok(Some(Vec::new()));
        };
        let grid = (0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| range.get_value((row, col)).map_or(Cell::Empty, data_cell))
                    .collect()
            })
            .collect();
        Ok(Some(grid))
    }
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Int(value) => Cell::Int(*value),
        // Workbooks store whole numbers as floats.
        Data::Float(value) if is_whole(*value) => Cell::Int(*value as i64),
        Data::Float(value) => Cell::Float(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::DateTime(value) => match value.as_datetime() {
            Some(stamp) => Cell::DateTime(stamp),
            None => Cell::Float(value.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}

fn is_whole(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64
}

/// A named grid to be written from cell A1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

pub fn write_workbook(path: &Path, sheets: &[SheetGrid]) -> Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx)
                .map_err(|_| Error::workbook(format!("sheet '{}' has too many rows", sheet.name)))?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx).map_err(|_| {
                    Error::workbook(format!("sheet '{}' has too many columns", sheet.name))
                })?;
                write_cell(worksheet, row_num, col_num, cell)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Text(text) => {
            worksheet.write_string(row, col, text.as_str())?;
        }
        Cell::Int(value) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        Cell::Float(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        Cell::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        other => {
            worksheet.write_string(row, col, other.to_text())?;
        }
    }
    Ok(())
}
