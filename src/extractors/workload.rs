// src/extractors/workload.rs
use super::classifier::locate_header;
use super::{ExtractedTable, Outcome, TableValue};
use crate::utils::error::ExtractError;
use crate::workbook::grid::{cell_at, is_blank};
use crate::workbook::Grid;

pub const WORKLOAD_TABLE: &str = "Opterećenje";

/// Column holding the lecturer's name; rows are grouped by it.
pub const LECTURER_COLUMN: &str = "Ime Predavača";

/// Columns of the workload roster, in output order.
pub const WORKLOAD_COLUMNS: &[&str] = &[
    LECTURER_COLUMN,
    "Naziv Predmeta",
    "Pozicija",
    "Tip Predavanja",
    "Nedeljni Broj Časova",
    "Broj Grupa",
    "Tip studija",
    "Odsek",
    "Ukupno casova",
];

/// The workload rows of one lecturer.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadGroup {
    pub lecturer: String,
    pub table: ExtractedTable,
}

/// Splits a flat workload roster into one table per lecturer, in order of
/// first appearance. Rows without a lecturer name are skipped. With
/// `lecturer` set only that exact name is kept.
pub fn extract_workload(grid: &Grid, lecturer: Option<&str>) -> Result<Outcome<Vec<WorkloadGroup>>, ExtractError> {
    let rows = grid.normalized_rows();
    let header = locate_header(&rows, WORKLOAD_COLUMNS).ok_or_else(|| ExtractError::HeaderNotFound {
        table: WORKLOAD_TABLE.to_string(),
        headers: WORKLOAD_COLUMNS.iter().map(|h| h.to_string()).collect(),
    })?;
    tracing::debug!("Workload roster '{}': header at row {}", grid.name(), header.row);

    let name_col = header.columns[0];
    let mut groups: Vec<WorkloadGroup> = Vec::new();

    for (index, row) in rows.iter().enumerate().skip(header.row + 1) {
        if is_blank(row) {
            continue;
        }
        let name = cell_at(row, name_col).text();
        if name.is_empty() {
            tracing::trace!("Workload row {} has no lecturer", index);
            continue;
        }
        if lecturer.is_some_and(|wanted| wanted != name) {
            continue;
        }

        let values: Vec<TableValue> = header.columns.iter().map(|col| TableValue::from(cell_at(row, *col))).collect();
        match groups.iter_mut().find(|g| g.lecturer == name) {
            Some(group) => group.table.push_row(values),
            None => {
                let mut table = ExtractedTable::with_header(WORKLOAD_TABLE, WORKLOAD_COLUMNS);
                table.push_row(values);
                groups.push(WorkloadGroup { lecturer: name, table });
            }
        }
    }

    tracing::debug!("Workload roster '{}': {} lecturers", grid.name(), groups.len());
    if groups.is_empty() {
        if let Some(wanted) = lecturer {
            tracing::warn!("No workload rows for lecturer '{}'", wanted);
        }
        return Ok(Outcome::NoData);
    }
    Ok(Outcome::Data(groups))
}
