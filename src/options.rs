use serde_json::{Map, Value};

use crate::constants::DEFAULT_MAX_ROWS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    // 1-based rows
    pub header_row: usize,
    pub type_row: Option<usize>,
    pub data_start_row: usize,
}

impl SheetLayout {
    // keys, type hints, free-form notes, then data
    pub fn workbook() -> Self {
        Self {
            header_row: 1,
            type_row: Some(2),
            data_start_row: 4,
        }
    }

    pub fn csv() -> Self {
        Self {
            header_row: 1,
            type_row: None,
            data_start_row: 2,
        }
    }

    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = row;
        self
    }

    pub fn with_type_row(mut self, row: Option<usize>) -> Self {
        self.type_row = row;
        self
    }

    pub fn with_data_start_row(mut self, row: usize) -> Self {
        self.data_start_row = row;
        self
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::workbook()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// `None` reads each source with its own preset: [`SheetLayout::workbook`]
    /// for workbooks and [`SheetLayout::csv`] for CSV files.
    pub layout: Option<SheetLayout>,
    /// Replaces both the `document_meta` sheet and the synthesized defaults.
    pub meta_override: Option<Map<String, Value>>,
    pub schema: Option<Value>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_meta_override(mut self, meta: Option<Map<String, Value>>) -> Self {
        self.meta_override = meta;
        self
    }

    pub fn with_schema(mut self, schema: Option<Value>) -> Self {
        self.schema = schema;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub layout: SheetLayout,
    /// Last sheet row (1-based) a record may occupy.
    pub max_rows: usize,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn capacity(&self) -> usize {
        self.max_rows.saturating_add(1).saturating_sub(self.layout.data_start_row)
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            layout: SheetLayout::workbook(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}
