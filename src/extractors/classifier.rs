// src/extractors/classifier.rs
use crate::workbook::grid::{first_value, is_blank};
use crate::workbook::{Cell, Row};

/// What to do with a fully empty row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankRowMode {
    /// The table ends at the first blank row.
    Terminate,
    /// Blank rows are skipped; the active section stays active.
    Skip,
}

/// How a single row was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Blank,
    /// Opens the named section (canonical spelling from the label list).
    SectionStart(&'static str),
    Data,
}

/// Matches rows against a fixed list of section labels.
///
/// One label may be marked repeatable: it is also a legitimate data value,
/// so only its last occurrence in the sheet opens a section.
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    labels: &'static [&'static str],
    repeatable: Option<&'static str>,
    last_repeatable_row: Option<usize>,
}

impl SectionClassifier {
    /// Builds a classifier for `rows`, pre-scanning for the last occurrence
    /// of the repeatable label.
    pub fn new(labels: &'static [&'static str], repeatable: Option<&'static str>, rows: &[Row]) -> Self {
        let last_repeatable_row = repeatable.and_then(|label| {
            rows.iter()
                .rposition(|row| leading_text(row).is_some_and(|t| t == label.to_lowercase()))
        });
        if let (Some(label), Some(index)) = (repeatable, last_repeatable_row) {
            tracing::debug!("Repeatable label '{}' opens its section at row {}", label, index);
        }
        Self { labels, repeatable, last_repeatable_row }
    }

    pub fn classify(&self, index: usize, row: &[Cell]) -> RowClass {
        if is_blank(row) {
            return RowClass::Blank;
        }
        let Some(text) = leading_text(row) else {
            return RowClass::Data;
        };
        let Some(label) = self.labels.iter().copied().find(|l| l.to_lowercase() == text) else {
            return RowClass::Data;
        };
        if Some(label) == self.repeatable && Some(index) != self.last_repeatable_row {
            tracing::trace!("Row {}: earlier '{}' kept as data", index, label);
            return RowClass::Data;
        }
        RowClass::SectionStart(label)
    }
}

/// Lower-cased text of the first non-empty cell.
fn leading_text(row: &[Cell]) -> Option<String> {
    first_value(row).map(|c| c.text().trim().to_lowercase())
}

// --- Header Signature ---

/// A header row found by its column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub row: usize,
    /// Column of each signature name, in signature order.
    pub columns: Vec<usize>,
}

/// Finds the first row that contains every name in `names`
/// (trimmed, case-insensitive).
pub fn locate_header(rows: &[Row], names: &[&str]) -> Option<HeaderMatch> {
    rows.iter()
        .enumerate()
        .find_map(|(index, row)| bind_columns(row, names).map(|columns| HeaderMatch { row: index, columns }))
}

/// Binds each name to a column.
///
/// Names are expected left to right and bound right to left, so tables
/// placed side by side on the same row each get their own columns: the last
/// name takes its first occurrence, every other name its nearest occurrence
/// left of the next name. A row holding every name in some other order
/// falls back to the first occurrence of each name.
fn bind_columns(row: &[Cell], names: &[&str]) -> Option<Vec<usize>> {
    let texts: Vec<String> = row.iter().map(|c| c.text().trim().to_lowercase()).collect();
    bind_in_order(&texts, names).or_else(|| {
        names
            .iter()
            .map(|name| {
                let wanted = name.to_lowercase();
                texts.iter().position(|t| *t == wanted)
            })
            .collect()
    })
}

fn bind_in_order(texts: &[String], names: &[&str]) -> Option<Vec<usize>> {
    let (last, rest) = names.split_last()?;

    let mut bound = texts.iter().position(|t| *t == last.to_lowercase())?;
    let mut columns = vec![bound];
    for name in rest.iter().rev() {
        let wanted = name.to_lowercase();
        bound = texts[..bound].iter().rposition(|t| *t == wanted)?;
        columns.push(bound);
    }
    columns.reverse();
    Some(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::grid;

    const LABELS: &[&str] = &["Kvalitet nastavnog procesa", "Rad sa Studentima", "Ostalo"];

    #[test]
    fn test_labels_match_case_insensitively() {
        let rows = grid("s", &[&["", "  RAD SA STUDENTIMA "], &["", "Nešto"], &[]]).normalized_rows();
        let classifier = SectionClassifier::new(LABELS, None, &rows);
        assert_eq!(classifier.classify(0, &rows[0]), RowClass::SectionStart("Rad sa Studentima"));
        assert_eq!(classifier.classify(1, &rows[1]), RowClass::Data);
        assert_eq!(classifier.classify(2, &rows[2]), RowClass::Blank);
    }

    #[test]
    fn test_unknown_label_is_data() {
        let rows = grid("s", &[&["Nepoznata sekcija"]]).normalized_rows();
        let classifier = SectionClassifier::new(LABELS, None, &rows);
        assert_eq!(classifier.classify(0, &rows[0]), RowClass::Data);
    }

    #[test]
    fn test_only_last_repeatable_label_opens_section() {
        let rows = grid("s", &[&["Ostalo"], &["x"], &["", "ostalo"], &["y"]]).normalized_rows();
        let classifier = SectionClassifier::new(LABELS, Some("Ostalo"), &rows);
        assert_eq!(classifier.classify(0, &rows[0]), RowClass::Data);
        assert_eq!(classifier.classify(2, &rows[2]), RowClass::SectionStart("Ostalo"));
    }

    #[test]
    fn test_locate_header_first_match_wins() {
        let rows = grid(
            "s",
            &[
                &["Analiza"],
                &["", "Predmeti", "Prosečan broj studenata"],
                &["", "Predmeti", "Prosečan broj studenata"],
            ],
        )
        .normalized_rows();
        let found = locate_header(&rows, &["Predmeti", "Prosečan broj studenata"]).unwrap();
        assert_eq!(found, HeaderMatch { row: 1, columns: vec![1, 2] });
    }

    #[test]
    fn test_locate_header_requires_every_name() {
        let rows = grid("s", &[&["Predmeti", "Grand Total"]]).normalized_rows();
        assert_eq!(locate_header(&rows, &["Predmeti", "Prosečan broj studenata"]), None);
    }

    #[test]
    fn test_side_by_side_tables_bind_their_own_columns() {
        let rows = grid(
            "s",
            &[&["", "Predmeti", "predavanja", "(blank)", "Grand Total", "", "", "", "", "Predmeti", "Prosečan broj studenata"]],
        )
        .normalized_rows();
        let left = locate_header(&rows, &["Predmeti", "predavanja", "(blank)", "Grand Total"]).unwrap();
        assert_eq!(left.columns, vec![1, 2, 3, 4]);
        let right = locate_header(&rows, &["Predmeti", "Prosečan broj studenata"]).unwrap();
        assert_eq!(right.columns, vec![9, 10]);
    }

    #[test]
    fn test_header_names_in_any_order() {
        let rows = grid("s", &[&["x"], &["Prosečan broj studenata", "", "Predmeti"]]).normalized_rows();
        let found = locate_header(&rows, &["Predmeti", "Prosečan broj studenata"]).unwrap();
        assert_eq!(found, HeaderMatch { row: 1, columns: vec![2, 0] });
    }
}
