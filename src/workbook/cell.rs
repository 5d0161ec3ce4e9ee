// src/workbook/cell.rs
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use crate::utils::numeric::{format_number, parse_number};

/// A cell value as handed over by the sheet accessor, before any cleanup.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

/// Converts a raw cell into its canonical form. Never fails.
pub fn normalize(raw: &RawCell) -> Cell {
    match raw {
        RawCell::Empty => Cell::Empty,
        RawCell::Text(s) => text_cell(s),
        RawCell::Number(n) => Cell::Number(*n),
        RawCell::Bool(b) => Cell::Text(b.to_string()),
        RawCell::DateTime(dt) => Cell::Date(dt.date()),
    }
}

fn text_cell(s: &str) -> Cell {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(trimmed.to_string())
    }
}

impl Cell {
    /// Re-applies normalization to an already normalized value.
    #[cfg(test)]
    pub fn normalized(self) -> Cell {
        match self {
            Cell::Text(s) => text_cell(&s),
            other => other,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell as display text; dates as `YYYY-MM-DD`, empty as "".
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Locale-tolerant numeric view of the cell. Text such as "12,5" is
    /// parsed on demand; dates and unparseable text yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s),
            Cell::Empty | Cell::Date(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
