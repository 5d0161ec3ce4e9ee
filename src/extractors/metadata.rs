// src/extractors/metadata.rs
use crate::utils::error::ExtractError;
use crate::workbook::grid::cell_at;
use crate::workbook::{Grid, Row};

pub const FIRST_NAME_LABEL: &str = "Ime";
pub const LAST_NAME_LABEL: &str = "Prezime";

/// Labels sit in column B, their values in column C.
const LABEL_COLUMN: usize = 1;
const VALUE_COLUMN: usize = 2;

/// Builds the "<Ime> <Prezime>" display name from the metadata sheet.
/// Both labels are required; the first row carrying a label wins.
pub fn display_name(grid: &Grid) -> Result<String, ExtractError> {
    let rows = grid.normalized_rows();
    let first = labeled_value(grid.name(), &rows, FIRST_NAME_LABEL)?;
    let last = labeled_value(grid.name(), &rows, LAST_NAME_LABEL)?;
    let name = format!("{} {}", first, last);
    tracing::debug!("Display name from '{}': {}", grid.name(), name);
    Ok(name)
}

fn labeled_value(sheet: &str, rows: &[Row], label: &str) -> Result<String, ExtractError> {
    let row = rows
        .iter()
        .find(|row| cell_at(row, LABEL_COLUMN).text() == label)
        .ok_or_else(|| ExtractError::MissingMetadataLabel { sheet: sheet.to_string(), label: label.to_string() })?;

    let value = cell_at(row, VALUE_COLUMN).text();
    if value.is_empty() {
        return Err(ExtractError::MissingMetadataValue { sheet: sheet.to_string(), label: label.to_string() });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::grid;

    #[test]
    fn test_display_name() {
        let sheet = grid(
            "Osnovni podaci",
            &[
                &["", "Osnovni podaci"],
                &["", "Ime", " Nataša "],
                &["", "Prezime", "Bogdanović"],
                &["", "Ime", "Drugo ime"],
            ],
        );
        assert_eq!(display_name(&sheet).unwrap(), "Nataša Bogdanović");
    }

    #[test]
    fn test_missing_label_fails() {
        let sheet = grid("Osnovni podaci", &[&["", "Ime", "Nataša"], &["", "Zvanje", "Profesor"]]);
        match display_name(&sheet).unwrap_err() {
            ExtractError::MissingMetadataLabel { sheet, label } => {
                assert_eq!(sheet, "Osnovni podaci");
                assert_eq!(label, "Prezime");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_label_in_wrong_column_does_not_count() {
        let sheet = grid("Osnovni podaci", &[&["Ime", "Nataša"], &["Prezime", "Bogdanović"]]);
        assert!(matches!(display_name(&sheet), Err(ExtractError::MissingMetadataLabel { .. })));
    }

    #[test]
    fn test_blank_value_fails() {
        let sheet = grid("Osnovni podaci", &[&["", "Ime", "Nataša"], &["", "Prezime", "   "]]);
        assert!(matches!(display_name(&sheet), Err(ExtractError::MissingMetadataValue { .. })));
    }
}
