use serde_json::Value;

use crate::cell::Cell;
use crate::coerce::display_cell;
use crate::options::ExportOptions;
use crate::path::get_path;
use crate::tabular::{Column, Table};
use crate::{Error, Result};

/// Lay `records` out under the columns of `template`, one row per record.
///
/// Each cell is read by path and rendered with [`display_cell`]; paths a record
/// lacks give empty cells. Fails without producing anything when the records do
/// not fit below `options.max_rows`.
pub fn export_table(records: &[Value], template: &Table, options: &ExportOptions) -> Result<Table> {
    let capacity = options.capacity();
    if records.len() > capacity {
        let first_overflow_row = options.layout.data_start_row + capacity;
        return Err(Error::capacity(
            &template.name,
            first_overflow_row,
            options.max_rows,
        ));
    }

    let width = row_width(&template.columns);
    let rows = records
        .iter()
        .map(|record| export_row(record, &template.columns, width))
        .collect();
    tracing::debug!(sheet = %template.name, records = records.len(), "exported sheet");
    Ok(Table::new(
        template.name.clone(),
        template.columns.clone(),
        rows,
    ))
}

pub fn export_row(record: &Value, columns: &[Column], width: usize) -> Vec<Cell> {
    let mut row = vec![Cell::Empty; width];
    for column in columns {
        if let Some(slot) = row.get_mut(column.index) {
            *slot = display_cell(get_path(record, &column.path), &column.path);
        }
    }
    row
}

fn row_width(columns: &[Column]) -> usize {
    columns
        .iter()
        .map(|column| column.index + 1)
        .max()
        .unwrap_or(0)
}
