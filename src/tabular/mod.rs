//! Tabular side of the conversion: column descriptors, sheets, and the CSV and
//! workbook sources/sinks that move them in and out of files.

pub mod csv;
#[cfg(feature = "xlsx")]
pub mod xlsx;

use crate::cell::Cell;
use crate::coerce::DeclaredType;
use crate::options::SheetLayout;
use crate::path::Path;

/// One addressable column: its position in a row, its path, and the declared
/// type when the source carries type hints.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub index: usize,
    pub path: Path,
    pub declared: Option<DeclaredType>,
}

impl Column {
    pub fn new(index: usize, path: &str) -> Self {
        Self {
            index,
            path: Path::parse(path),
            declared: None,
        }
    }

    pub fn with_declared(mut self, declared: Option<DeclaredType>) -> Self {
        self.declared = declared;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Split a raw cell grid per `layout`. Columns with a blank key are skipped.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>, layout: &SheetLayout) -> Self {
        let columns = columns_from_grid(&grid, layout);
        let rows = grid
            .into_iter()
            .skip(layout.data_start_row.saturating_sub(1))
            .collect();
        Self::new(name, columns, rows)
    }

    pub fn keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.path.to_string())
            .collect()
    }
}

pub fn columns_from_grid(grid: &[Vec<Cell>], layout: &SheetLayout) -> Vec<Column> {
    let Some(header) = row_at(grid, layout.header_row) else {
        return Vec::new();
    };
    let hints = layout.type_row.map(|row| row_at(grid, row).unwrap_or(&[]));

    header
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let key = cell.as_key()?;
            let declared = hints.map(|hints| {
                let hint = hints.get(index).map(Cell::to_text).unwrap_or_default();
                DeclaredType::from_hint(&hint)
            });
            Some(Column::new(index, &key).with_declared(declared))
        })
        .collect()
}

fn row_at(grid: &[Vec<Cell>], row: usize) -> Option<&[Cell]> {
    let index = row.checked_sub(1)?;
    grid.get(index).map(Vec::as_slice)
}
