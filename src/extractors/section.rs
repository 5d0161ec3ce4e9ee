// src/extractors/section.rs

// --- Imports ---
use serde::Serialize;

use super::classifier::{BlankRowMode, RowClass, SectionClassifier};
use crate::workbook::grid::cell_at;
use crate::workbook::Grid;

/// Width of every section row.
pub const SECTION_ROW_WIDTH: usize = 4;

pub type SectionRow = [String; SECTION_ROW_WIDTH];

// --- Layout ---

/// Rows at the top of a sheet that belong to a fixed section before any
/// label has been seen.
#[derive(Debug, Clone, Copy)]
pub struct LeadingRows {
    pub section: &'static str,
    pub count: usize,
}

/// Everything a section-bucketed pass needs to know about one sheet layout.
#[derive(Debug, Clone)]
pub struct SectionLayout {
    /// Section labels, in output order.
    pub labels: &'static [&'static str],
    pub repeatable: Option<&'static str>,
    pub leading: Option<LeadingRows>,
    pub blank_rows: BlankRowMode,
    /// Sheet columns copied into a section row (B..E by default).
    pub data_columns: [usize; SECTION_ROW_WIDTH],
    /// Position within a section row that must be filled for the row to be reported.
    pub required_column: usize,
    /// Sections whose rows are reported even with an empty required column.
    pub keep_all_rows: &'static [&'static str],
    /// Form instructions removed from cell text.
    pub strip_phrases: &'static [&'static str],
}

impl SectionLayout {
    pub const DEFAULT_DATA_COLUMNS: [usize; SECTION_ROW_WIDTH] = [1, 2, 3, 4];

    fn section_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.leading.map(|l| l.section).into_iter().chain(self.labels.iter().copied())
    }
}

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub rows: Vec<SectionRow>,
}

/// Section name to rows, in layout order. Every layout section is present,
/// possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedSections {
    pub sheet: String,
    pub sections: Vec<Section>,
}

impl ExtractedSections {
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Rows of a section; empty for unknown names.
    #[cfg(test)]
    pub fn rows(&self, name: &str) -> &[SectionRow] {
        self.get(name).map(|s| s.rows.as_slice()).unwrap_or(&[])
    }

    pub fn total_rows(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    fn push(&mut self, section: &str, row: SectionRow) {
        if let Some(bucket) = self.sections.iter_mut().find(|s| s.name == section) {
            bucket.rows.push(row);
        }
    }
}

// --- Extractor ---

/// Routes data rows into the bucket of the most recent section label.
pub struct SectionExtractor {
    layout: SectionLayout,
}

impl SectionExtractor {
    pub fn new(layout: SectionLayout) -> Self {
        Self { layout }
    }

    pub fn extract(&self, grid: &Grid) -> ExtractedSections {
        let layout = &self.layout;
        tracing::debug!("Section pass over '{}' ({} rows)", grid.name(), grid.row_count());

        let rows = grid.normalized_rows();
        let classifier = SectionClassifier::new(layout.labels, layout.repeatable, &rows);
        let mut output = ExtractedSections {
            sheet: grid.name().to_string(),
            sections: layout
                .section_names()
                .map(|name| Section { name: name.to_string(), rows: Vec::new() })
                .collect(),
        };

        let mut leading_left = layout.leading.map(|l| l.count).unwrap_or(0);
        let mut active: Option<&'static str> = None;

        for (index, row) in rows.iter().enumerate() {
            let class = classifier.classify(index, row);
            if class == RowClass::Blank {
                match layout.blank_rows {
                    BlankRowMode::Terminate => {
                        tracing::debug!("Blank row {} ends the pass", index);
                        break;
                    }
                    BlankRowMode::Skip => continue,
                }
            }

            let tuple = || -> SectionRow {
                layout.data_columns.map(|col| clean_text(&cell_at(row, col).text(), layout.strip_phrases))
            };

            if leading_left > 0 {
                if let Some(leading) = layout.leading {
                    output.push(leading.section, tuple());
                    leading_left -= 1;
                    continue;
                }
            }

            match class {
                RowClass::SectionStart(label) => {
                    tracing::trace!("Row {}: section '{}'", index, label);
                    active = Some(label);
                }
                RowClass::Data => match active {
                    Some(section) => output.push(section, tuple()),
                    None => tracing::trace!("Row {}: no active section, dropped", index),
                },
                RowClass::Blank => {}
            }
        }

        tracing::debug!("Section pass over '{}' collected {} rows", grid.name(), output.total_rows());
        output
    }

    /// Consumption-time view: drops rows whose required column is empty,
    /// except in sections that keep every row.
    pub fn filled(&self, extracted: &ExtractedSections) -> ExtractedSections {
        let required = self.layout.required_column;
        ExtractedSections {
            sheet: extracted.sheet.clone(),
            sections: extracted
                .sections
                .iter()
                .map(|section| Section {
                    name: section.name.clone(),
                    rows: if self.layout.keep_all_rows.contains(&section.name.as_str()) {
                        section.rows.clone()
                    } else {
                        section.rows.iter().filter(|r| !r[required].is_empty()).cloned().collect()
                    },
                })
                .collect(),
        }
    }
}

fn clean_text(text: &str, strip_phrases: &[&str]) -> String {
    let mut cleaned = text.to_string();
    for phrase in strip_phrases {
        if cleaned.contains(phrase) {
            cleaned = cleaned.replace(phrase, "");
        }
    }
    cleaned.trim().to_string()
}
