// src/extractors/register.rs
use super::pivot::{ExtractedTable, TableValue};
use super::Outcome;
use crate::workbook::grid::is_blank;
use crate::workbook::Grid;

/// Reads a plain register sheet: every non-empty row, cells as text (dates
/// as `YYYY-MM-DD`), the first row being the header. Rows are padded to the
/// widest row so the table stays rectangular.
pub fn extract_register(grid: &Grid) -> Outcome<ExtractedTable> {
    let rows: Vec<Vec<String>> = grid
        .normalized_rows()
        .into_iter()
        .filter(|row| !is_blank(row))
        .map(|row| row.iter().map(|c| c.text()).collect())
        .collect();

    let width = rows
        .iter()
        .map(|row| row.iter().rposition(|t| !t.is_empty()).map_or(0, |i| i + 1))
        .max()
        .unwrap_or(0);

    let mut rows = rows.into_iter().map(|mut row| {
        row.resize(width, String::new());
        row
    });

    let Some(header) = rows.next() else {
        tracing::debug!("Register '{}' is empty", grid.name());
        return Outcome::NoData;
    };
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    let mut table = ExtractedTable::with_header(grid.name(), &header);
    for row in rows {
        table.push_row(row.into_iter().map(TableValue::Text).collect());
    }

    tracing::debug!("Register '{}': {} rows, {} columns", grid.name(), table.data_rows().len(), width);
    if table.data_rows().is_empty() {
        return Outcome::NoData;
    }
    Outcome::Data(table)
}
