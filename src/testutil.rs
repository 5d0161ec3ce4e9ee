// src/testutil.rs
use crate::utils::error::WorkbookError;
use crate::workbook::{Grid, RawCell, SheetSource};

/// Builds a grid from string literals; "" becomes an empty cell.
pub fn grid(name: &str, rows: &[&[&str]]) -> Grid {
    Grid::new(
        name,
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.is_empty() { RawCell::Empty } else { RawCell::Text(v.to_string()) })
                    .collect()
            })
            .collect(),
    )
}

/// In-memory stand-in for a workbook file.
#[derive(Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Grid>,
}

impl MemoryWorkbook {
    pub fn add_sheet(&mut self, name: &str, rows: &[&[&str]]) -> &mut Self {
        self.sheets.push(grid(name, rows));
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|g| g.name().to_string()).collect()
    }

    fn load_sheet(&mut self, name: &str) -> Result<Grid, WorkbookError> {
        self.sheets
            .iter()
            .find(|g| g.name() == name)
            .cloned()
            .ok_or_else(|| WorkbookError::SheetNotFound(name.to_string()))
    }
}
