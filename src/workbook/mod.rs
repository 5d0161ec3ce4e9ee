// src/workbook/mod.rs
pub mod cell;
pub mod grid;
pub mod reader;

pub use cell::{Cell, RawCell};
pub use grid::{Grid, Row};
pub use reader::XlsxWorkbook;

use crate::utils::error::{ExtractError, WorkbookError};

// --- Sheet Names ---
pub const METADATA_SHEET: &str = "Osnovni podaci";
pub const TEACHING_ANALYSIS_SHEET: &str = "Analiza nastave";
pub const ATTENDANCE_SHEET: &str = "Evidencija drzanja nastave";
pub const DROPDOWN_SHEET: &str = "PadajucaLista";

/// Sheets that never hold a monthly report.
pub const EXCLUDED_SHEETS: [&str; 4] = [TEACHING_ANALYSIS_SHEET, ATTENDANCE_SHEET, METADATA_SHEET, DROPDOWN_SHEET];

/// Anything that can hand out sheets of a workbook by exact name.
pub trait SheetSource {
    /// All sheet names, in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    fn load_sheet(&mut self, name: &str) -> Result<Grid, WorkbookError>;
}

/// Sheet names a user may pick a monthly report from.
pub fn selectable_sheets(source: &dyn SheetSource) -> Vec<String> {
    source
        .sheet_names()
        .into_iter()
        .filter(|name| !EXCLUDED_SHEETS.contains(&name.as_str()))
        .collect()
}

/// Resolves the monthly report sheet to process. A requested name that is
/// not selectable falls back to the first selectable sheet.
pub fn resolve_report_sheet(source: &dyn SheetSource, requested: Option<&str>) -> Result<String, ExtractError> {
    pick_sheet(selectable_sheets(source), requested, "a monthly report sheet")
}

/// Resolves the sheet of a workload roster workbook: the requested sheet
/// when it exists, otherwise the first sheet.
pub fn resolve_roster_sheet(source: &dyn SheetSource, requested: Option<&str>) -> Result<String, ExtractError> {
    pick_sheet(source.sheet_names(), requested, "in the workbook")
}

fn pick_sheet(available: Vec<String>, requested: Option<&str>, kind: &str) -> Result<String, ExtractError> {
    let first = available.first().ok_or(ExtractError::NoDataSheets)?;

    match requested {
        Some(name) if available.iter().any(|s| s == name) => Ok(name.to_string()),
        Some(name) => {
            tracing::warn!("Sheet '{}' is not {}, using '{}' instead", name, kind, first);
            Ok(first.clone())
        }
        None => Ok(first.clone()),
    }
}
