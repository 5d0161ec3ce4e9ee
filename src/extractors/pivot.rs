// src/extractors/pivot.rs

// --- Imports ---
use serde::Serialize;

use super::classifier::{locate_header, BlankRowMode, HeaderMatch};
use super::context::{ContextTracker, KeyPolicy};
use super::Outcome;
use crate::utils::error::ExtractError;
use crate::workbook::grid::{cell_at, is_blank};
use crate::workbook::{Cell, Grid};

// --- Data Structures ---

/// Validity check applied to a row's value column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRule {
    /// Any number.
    Numeric,
    /// A number strictly between `min` and `max`.
    Range { min: f64, max: f64 },
}

impl ValueRule {
    pub fn accepts(&self, value: f64) -> bool {
        match *self {
            ValueRule::Numeric => true,
            ValueRule::Range { min, max } => min < value && value < max,
        }
    }
}

/// A header-anchored table: found by its header names, read until the
/// first blank row.
#[derive(Debug, Clone)]
pub struct PivotTableSpec {
    pub name: &'static str,
    /// Header names, left to right. The first one is the subject column.
    pub headers: &'static [&'static str],
    /// Index into `headers` of the column that must hold a number.
    pub value_index: usize,
    pub rule: ValueRule,
    pub key_policy: KeyPolicy,
    pub blank_rows: BlankRowMode,
}

/// One output cell, left as parsed for the renderer to format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableValue {
    Text(String),
    Number(f64),
}

impl From<&Cell> for TableValue {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Number(n) => TableValue::Number(*n),
            other => TableValue::Text(other.text()),
        }
    }
}

/// Row 0 holds the column names; every other row has the same width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTable {
    pub name: String,
    pub rows: Vec<Vec<TableValue>>,
}

impl ExtractedTable {
    pub fn with_header(name: impl Into<String>, headers: &[&str]) -> Self {
        let header = headers.iter().map(|h| TableValue::Text(h.to_string())).collect();
        Self { name: name.into(), rows: vec![header] }
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn header(&self) -> &[TableValue] {
        &self.rows[0]
    }

    pub fn data_rows(&self) -> &[Vec<TableValue>] {
        &self.rows[1..]
    }

    pub fn push_row(&mut self, row: Vec<TableValue>) {
        debug_assert_eq!(row.len(), self.width(), "row arity must match the header");
        self.rows.push(row);
    }
}

// --- Extractor ---
pub struct PivotExtractor {
    spec: PivotTableSpec,
    location_token: String,
}

impl PivotExtractor {
    pub fn new(spec: PivotTableSpec, location_token: impl Into<String>) -> Self {
        Self { spec, location_token: location_token.into() }
    }

    /// SEEK_HEADER -> COLLECTING -> DONE. A sheet without the header row is a
    /// structural failure; a header with no qualifying rows is `NoData`.
    pub fn extract(&self, grid: &Grid) -> Result<Outcome<ExtractedTable>, ExtractError> {
        let spec = &self.spec;
        let rows = grid.normalized_rows();

        let header = locate_header(&rows, spec.headers).ok_or_else(|| ExtractError::HeaderNotFound {
            table: spec.name.to_string(),
            headers: spec.headers.iter().map(|h| h.to_string()).collect(),
        })?;
        tracing::debug!("Table '{}': header at row {}, columns {:?}", spec.name, header.row, header.columns);

        let HeaderMatch { row: header_row, columns } = header;
        let subject_col = columns[0];
        let value_col = columns[spec.value_index];
        let window_start = columns.iter().copied().min().unwrap_or(subject_col);
        let window_end = columns.iter().copied().max().unwrap_or(subject_col) + 1;

        let mut tracker = ContextTracker::new(self.location_token.clone());
        let mut table = ExtractedTable::with_header(spec.name, spec.headers);

        for (index, row) in rows.iter().enumerate().skip(header_row + 1) {
            let window = &row[window_start.min(row.len())..window_end.min(row.len())];

            if is_blank(window) {
                match spec.blank_rows {
                    BlankRowMode::Terminate => {
                        tracing::debug!("Table '{}': blank row {} ends the table", spec.name, index);
                        break;
                    }
                    BlankRowMode::Skip => continue,
                }
            }

            // Markers live in the subject column only; a count of 1200 is not a year.
            if tracker.observe(std::slice::from_ref(cell_at(row, subject_col))).is_some() {
                continue;
            }

            let subject = cell_at(row, subject_col).text();
            if subject.is_empty() || tracker.is_marker_token(&subject) {
                tracing::trace!("Table '{}': row {} has no subject", spec.name, index);
                continue;
            }
            if self.repeats_header(row, &columns) {
                tracing::trace!("Table '{}': row {} repeats the header", spec.name, index);
                continue;
            }

            let Some(value) = cell_at(row, value_col).as_number().filter(|v| spec.rule.accepts(*v)) else {
                tracing::trace!("Table '{}': row {} value '{}' rejected", spec.name, index, cell_at(row, value_col));
                continue;
            };

            let mut out = vec![TableValue::Text(tracker.composite_key(&subject, spec.key_policy))];
            for (position, col) in columns.iter().enumerate().skip(1) {
                if position == spec.value_index {
                    out.push(TableValue::Number(value));
                } else {
                    out.push(TableValue::from(cell_at(row, *col)));
                }
            }
            table.push_row(out);
        }

        tracing::debug!("Table '{}': {} data rows", spec.name, table.data_rows().len());
        if table.data_rows().is_empty() {
            return Ok(Outcome::NoData);
        }
        Ok(Outcome::Data(table))
    }

    fn repeats_header(&self, row: &[Cell], columns: &[usize]) -> bool {
        self.spec
            .headers
            .iter()
            .zip(columns)
            .all(|(name, col)| cell_at(row, *col).text().to_lowercase() == name.to_lowercase())
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::grid;

    const STUDENT_HEADERS: &[&str] = &["Predmeti", "Prosečan broj studenata"];

    fn student_spec() -> PivotTableSpec {
        PivotTableSpec {
            name: "Prosečan broj studenata",
            headers: STUDENT_HEADERS,
            value_index: 1,
            rule: ValueRule::Range { min: 0.0, max: 1000.0 },
            key_policy: KeyPolicy::OmitMissing,
            blank_rows: BlankRowMode::Terminate,
        }
    }

    fn keys(table: &ExtractedTable) -> Vec<String> {
        table
            .data_rows()
            .iter()
            .map(|r| match &r[0] {
                TableValue::Text(s) => s.clone(),
                TableValue::Number(n) => n.to_string(),
            })
            .collect()
    }

    fn extract(spec: PivotTableSpec, rows: &[&[&str]]) -> Result<Outcome<ExtractedTable>, ExtractError> {
        PivotExtractor::new(spec, "Niš").extract(&grid("Analiza nastave", rows))
    }

    #[test]
    fn test_rows_after_blank_row_are_excluded() {
        let out = extract(
            student_spec(),
            &[
                &["Analiza nastave"],
                &[],
                &["", "Profesor"],
                &[],
                &[],
                &["", "Predmeti", "Prosečan broj studenata"],
                &["", "Matematika", "30"],
                &["", "Fizika", "25"],
                &["", "Hemija", "12"],
                &[],
                &["", "Biologija", "40"],
                &["", "Geografija", "41"],
            ],
        )
        .unwrap();
        let table = out.into_data().expect("table has rows");
        assert_eq!(table.data_rows().len(), 3);
        assert_eq!(keys(&table), vec!["Matematika", "Fizika", "Hemija"]);
        assert_eq!(
            table.header(),
            &[TableValue::Text("Predmeti".into()), TableValue::Text("Prosečan broj studenata".into())]
        );
    }

    #[test]
    fn test_student_count_range_filter() {
        let out = extract(
            student_spec(),
            &[
                &["Predmeti", "Prosečan broj studenata"],
                &["Veliki kurs", "1500"],
                &["Mali kurs", "45"],
                &["Decimalni", "12,5"],
                &["Nula", "0"],
                &["Tekst", "mnogo"],
            ],
        )
        .unwrap();
        let table = out.into_data().unwrap();
        assert_eq!(keys(&table), vec!["Mali kurs", "Decimalni"]);
        assert_eq!(table.data_rows()[1][1], TableValue::Number(12.5));
        assert_eq!(table.data_rows()[0][1], TableValue::Number(45.0));
    }

    #[test]
    fn test_context_markers_qualify_subjects() {
        let out = extract(
            student_spec(),
            &[
                &["", "Predmeti", "Prosečan broj studenata"],
                &["", "Niš"],
                &["", "2024"],
                &["", "jan"],
                &["", "Matematika", "30"],
                &["", "feb"],
                &["", "Fizika", "20"],
            ],
        )
        .unwrap();
        let table = out.into_data().unwrap();
        assert_eq!(keys(&table), vec!["Niš - 2024 - jan - Matematika", "Niš - 2024 - feb - Fizika"]);
    }

    #[test]
    fn test_placeholder_policy() {
        let mut spec = student_spec();
        spec.key_policy = KeyPolicy::Placeholder;
        let out = extract(spec, &[&["Predmeti", "Prosečan broj studenata"], &["2023"], &["Fizika", "20"]]).unwrap();
        assert_eq!(keys(&out.into_data().unwrap()), vec![" - 2023 -  - Fizika"]);
    }

    #[test]
    fn test_missing_header_is_structural_error() {
        let err = extract(student_spec(), &[&["Predmeti", "Broj"], &["Fizika", "20"]]).unwrap_err();
        match err {
            ExtractError::HeaderNotFound { table, headers } => {
                assert_eq!(table, "Prosečan broj studenata");
                assert_eq!(headers, vec!["Predmeti", "Prosečan broj studenata"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_header_without_rows_is_no_data() {
        let out = extract(student_spec(), &[&["Predmeti", "Prosečan broj studenata"], &["Fizika", "n/a"]]).unwrap();
        assert_eq!(out, Outcome::NoData);
    }

    #[test]
    fn test_side_by_side_tables_and_repeated_header() {
        let rows: &[&[&str]] = &[
            &["", "Predmeti", "predavanja", "(blank)", "Grand Total", "", "Predmeti", "Prosečan broj studenata"],
            &["", "Niš", "", "", "", "", "2024", ""],
            &["", "Fizika", "10", "", "10", "", "Hemija", "22"],
            &["", "Predmeti", "predavanja", "(blank)", "Grand Total", "", "", ""],
            &["", "Hemija", "4,5", "", "4,5", "", "", ""],
            &[],
        ];
        let left = extract(hours_spec(), rows).unwrap().into_data().unwrap();
        assert_eq!(keys(&left), vec!["Niš - Fizika", "Niš - Hemija"], "year marker of the right table is not seen");
        assert_eq!(
            left.data_rows()[1],
            vec![
                TableValue::Text("Niš - Hemija".into()),
                TableValue::Text("4,5".into()),
                TableValue::Text(String::new()),
                TableValue::Number(4.5),
            ]
        );

        // the right table ends where its own columns go blank
        let right = extract(student_spec(), rows).unwrap().into_data().unwrap();
        assert_eq!(keys(&right), vec!["2024 - Hemija"]);
    }

    fn hours_spec() -> PivotTableSpec {
        PivotTableSpec {
            name: "Broj časova nastave",
            headers: &["Predmeti", "predavanja", "(blank)", "Grand Total"],
            value_index: 3,
            rule: ValueRule::Numeric,
            key_policy: KeyPolicy::OmitMissing,
            blank_rows: BlankRowMode::Terminate,
        }
    }

    #[test]
    fn test_four_digit_hour_counts_are_not_years() {
        let out = extract(
            hours_spec(),
            &[
                &["Predmeti", "predavanja", "(blank)", "Grand Total"],
                &["2023"],
                &["Fizika", "1200", "", "1200"],
                &["Hemija", "10", "", "10"],
            ],
        )
        .unwrap();
        let table = out.into_data().unwrap();
        assert_eq!(keys(&table), vec!["2023 - Fizika", "2023 - Hemija"]);
        assert_eq!(table.data_rows()[0][1], TableValue::Text("1200".into()));
        assert_eq!(table.data_rows()[0][3], TableValue::Number(1200.0));
    }

    #[test]
    fn test_reversed_header_columns() {
        let out = extract(student_spec(), &[&["Prosečan broj studenata", "Predmeti"], &["30", "Fizika"], &[]]).unwrap();
        let table = out.into_data().unwrap();
        assert_eq!(table.data_rows(), &[vec![TableValue::Text("Fizika".into()), TableValue::Number(30.0)]]);
    }

    #[test]
    fn test_value_rule() {
        assert!(ValueRule::Numeric.accepts(-5.0));
        let range = ValueRule::Range { min: 0.0, max: 1000.0 };
        assert!(range.accepts(999.9));
        assert!(!range.accepts(1000.0));
        assert!(!range.accepts(0.0));
    }
}
