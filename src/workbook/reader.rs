// src/workbook/reader.rs
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{Grid, RawCell, SheetSource};
use crate::utils::error::WorkbookError;

/// A workbook file on disk, read through calamine (.xlsx, .xlsm, .xls, .ods).
pub struct XlsxWorkbook {
    sheets: Sheets<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        tracing::info!("Opening workbook: {}", path.display());
        let sheets = open_workbook_auto(path)?;
        Ok(Self { sheets })
    }
}

impl SheetSource for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn load_sheet(&mut self, name: &str) -> Result<Grid, WorkbookError> {
        if !self.sheets.sheet_names().iter().any(|s| s == name) {
            return Err(WorkbookError::SheetNotFound(name.to_string()));
        }
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| WorkbookError::Read { sheet: name.to_string(), message: e.to_string() })?;
        let grid = range_to_grid(name, &range);
        tracing::debug!("Loaded sheet '{}' ({} rows)", name, grid.row_count());
        Ok(grid)
    }
}

/// Converts a calamine range into a grid anchored at A1.
///
/// calamine ranges start at the first used cell, so leading empty rows and
/// columns are put back to keep indices equal to sheet coordinates.
pub fn range_to_grid(name: &str, range: &Range<Data>) -> Grid {
    let (first_row, first_col) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Grid::new(name, Vec::new()),
    };

    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); first_row];
    for source_row in range.rows() {
        let mut row = vec![RawCell::Empty; first_col];
        row.extend(source_row.iter().map(raw_cell));
        rows.push(row);
    }
    Grid::new(name, rows)
}

/// Maps one calamine value onto the accessor's cell model.
pub fn raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => RawCell::DateTime(value),
            // Out-of-range serials degrade to their numeric text
            None => RawCell::Text(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(RawCell::DateTime).unwrap_or_else(|| RawCell::Text(s.clone())),
        Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => {
            tracing::trace!("Treating error cell {:?} as empty", e);
            RawCell::Empty
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}
