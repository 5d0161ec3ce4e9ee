// src/utils/grid_debug.rs
use regex::Regex;

use crate::utils::error::AppError;
use crate::workbook::grid::is_blank;
use crate::workbook::{Cell, Grid};

/// Renders the non-empty rows of a sheet as text, one line per row, tagging
/// every row whose joined cell text matches one of the `(pattern, tag)` pairs.
pub fn render_sheet_dump(grid: &Grid, patterns: &[(&str, &str)]) -> Result<String, AppError> {
    let compiled = patterns
        .iter()
        .map(|(pattern, tag)| {
            Regex::new(pattern)
                .map(|re| (re, *tag))
                .map_err(|e| AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut dump = format!("Sheet: {} ({} rows)\n", grid.name(), grid.row_count());
    for (index, row) in grid.normalized_rows().iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(col, c)| format!("{}={}", column_name(col), describe(c)))
            .collect();
        let joined = row.iter().map(Cell::text).collect::<Vec<_>>().join(" ");
        let tags: Vec<&str> = compiled.iter().filter(|(re, _)| re.is_match(&joined)).map(|(_, tag)| *tag).collect();

        if tags.is_empty() {
            dump.push_str(&format!("Row {}: [{}]\n", index, cells.join(", ")));
        } else {
            dump.push_str(&format!("Row {} <{}>: [{}]\n", index, tags.join(","), cells.join(", ")));
        }
    }
    Ok(dump)
}

fn describe(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => format!("{:?}", s),
        Cell::Number(_) => format!("#{}", cell.text()),
        Cell::Date(_) => format!("@{}", cell.text()),
        Cell::Empty => String::new(),
    }
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}
