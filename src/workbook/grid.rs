// src/workbook/grid.rs
use super::cell::{normalize, Cell, RawCell};

/// A normalized row. Column 0 is sheet column A.
pub type Row = Vec<Cell>;

/// One sheet as a read-only rectangle of raw cells.
///
/// Row and column indices are absolute sheet coordinates: row 0 is the first
/// sheet row and column 0 is column A, regardless of where the used range of
/// the sheet starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    name: String,
    rows: Vec<Vec<RawCell>>,
}

impl Grid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Normalizes every cell. Each extraction pass works on its own copy.
    pub fn normalized_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| row.iter().map(normalize).collect())
            .collect()
    }
}

/// True when no cell of the row carries a value.
pub fn is_blank(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_empty)
}

/// The first non-empty cell of the row, if any.
pub fn first_value(row: &[Cell]) -> Option<&Cell> {
    row.iter().find(|c| !c.is_empty())
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Cell at `col`, treating cells past the end of a short row as empty.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY_CELL)
}
