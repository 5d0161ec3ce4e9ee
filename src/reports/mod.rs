// src/reports/mod.rs
//! The lecturer reports, each a fixed configuration of the extraction
//! engine over one or two sheets of the workbook.

use serde::Serialize;
use std::fmt;

use crate::config::Settings;
use crate::extractors::metadata::display_name;
use crate::extractors::register::extract_register;
use crate::extractors::workload::extract_workload;
use crate::extractors::{
    BlankRowMode, ExtractedSections, ExtractedTable, LeadingRows, Outcome, PivotExtractor, PivotTableSpec,
    SectionExtractor, SectionLayout, ValueRule,
};
use crate::utils::error::ExtractError;
use crate::workbook::{self, Grid, SheetSource};

// --- Layouts ---
pub const TEACHING_HOURS_TABLE: &str = "Broj časova nastave";
pub const TEACHING_HOURS_HEADERS: &[&str] = &["Predmeti", "predavanja", "(blank)", "Grand Total"];

pub const STUDENT_COUNT_TABLE: &str = "Prosečan broj studenata";
pub const STUDENT_COUNT_HEADERS: &[&str] = &["Predmeti", "Prosečan broj studenata"];
const STUDENT_COUNT_LIMIT: f64 = 1000.0;

pub const MONTHLY_SECTIONS: &[&str] = &[
    "Kvalitet nastavnog procesa",
    "Rad sa Studentima",
    "Podizanje kvaliteta ustanove",
    "Jačanje kapaciteta i imidža ustanove",
    "Ostalo",
];
pub const REPEATABLE_SECTION: &str = "Ostalo";

pub const BASIC_DATA_SECTION: &str = "Osnovni podaci";
pub const BASIC_DATA_SECTIONS: &[&str] = &[
    "Ukupan broj predmeta na kojima je nastavnik angažovan",
    "Ukupno opterećenje",
    "Predmeti na kojima je saradnik angažovan",
    "Članstvo u komisijama (timovima)",
    "Ostala zaduženja",
];
const BASIC_DATA_LEADING_ROWS: usize = 3;

/// Instruction text left in the form cells by the template.
pub const FORM_INSTRUCTIONS: &[&str] = &["Kratak opis (max 30 reči)"];

pub fn teaching_hours_table(settings: &Settings) -> PivotTableSpec {
    PivotTableSpec {
        name: TEACHING_HOURS_TABLE,
        headers: TEACHING_HOURS_HEADERS,
        value_index: 3,
        rule: ValueRule::Numeric,
        key_policy: settings.key_policy,
        blank_rows: BlankRowMode::Terminate,
    }
}

pub fn student_count_table(settings: &Settings) -> PivotTableSpec {
    PivotTableSpec {
        name: STUDENT_COUNT_TABLE,
        headers: STUDENT_COUNT_HEADERS,
        value_index: 1,
        rule: ValueRule::Range { min: 0.0, max: STUDENT_COUNT_LIMIT },
        key_policy: settings.key_policy,
        blank_rows: BlankRowMode::Terminate,
    }
}

pub fn monthly_report_layout() -> SectionLayout {
    SectionLayout {
        labels: MONTHLY_SECTIONS,
        repeatable: Some(REPEATABLE_SECTION),
        leading: None,
        blank_rows: BlankRowMode::Skip,
        data_columns: SectionLayout::DEFAULT_DATA_COLUMNS,
        required_column: 1,
        keep_all_rows: &["Rad sa Studentima", "Ostalo"],
        strip_phrases: FORM_INSTRUCTIONS,
    }
}

pub fn basic_data_layout() -> SectionLayout {
    SectionLayout {
        labels: BASIC_DATA_SECTIONS,
        repeatable: None,
        leading: Some(LeadingRows { section: BASIC_DATA_SECTION, count: BASIC_DATA_LEADING_ROWS }),
        blank_rows: BlankRowMode::Skip,
        data_columns: SectionLayout::DEFAULT_DATA_COLUMNS,
        required_column: 1,
        keep_all_rows: &[BASIC_DATA_SECTION],
        strip_phrases: FORM_INSTRUCTIONS,
    }
}

// --- Data Structures ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum ReportKind {
    /// Analiza nastave: teaching hours and average attendance per subject.
    #[value(name = "an")]
    #[serde(rename = "an")]
    AnalizaNastave,
    /// Evidencija držanja nastave: the teaching register.
    #[value(name = "edn")]
    #[serde(rename = "edn")]
    EvidencijaNastave,
    /// Izveštaj o radu: one monthly report sheet.
    #[value(name = "izvestaj")]
    #[serde(rename = "izvestaj")]
    Izvestaj,
    /// Osnovni podaci: the lecturer's basic data.
    #[value(name = "op")]
    #[serde(rename = "op")]
    OsnovniPodaci,
    /// Opterećenje: per-lecturer rows of a flat workload roster workbook.
    #[value(name = "opterecenje")]
    #[serde(rename = "opterecenje")]
    Opterecenje,
}

impl ReportKind {
    /// Reports read from a lecturer's own workbook. The workload roster is a
    /// different workbook and is only extracted on request.
    pub const ALL: [ReportKind; 4] =
        [ReportKind::AnalizaNastave, ReportKind::EvidencijaNastave, ReportKind::Izvestaj, ReportKind::OsnovniPodaci];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::AnalizaNastave => "an",
            ReportKind::EvidencijaNastave => "edn",
            ReportKind::Izvestaj => "izvestaj",
            ReportKind::OsnovniPodaci => "op",
            ReportKind::Opterecenje => "opterecenje",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::AnalizaNastave => "Analiza nastave",
            ReportKind::EvidencijaNastave => "Evidencija držanja nastave",
            ReportKind::Izvestaj => "Izveštaj o radu",
            ReportKind::OsnovniPodaci => "Osnovni podaci",
            ReportKind::Opterecenje => "Opterećenje",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportContent {
    Tables { tables: Vec<ExtractedTable> },
    Sections(ExtractedSections),
}

impl ReportContent {
    /// Number of data rows across all tables or sections.
    pub fn row_count(&self) -> usize {
        match self {
            ReportContent::Tables { tables } => tables.iter().map(|t| t.data_rows().len()).sum(),
            ReportContent::Sections(sections) => sections.total_rows(),
        }
    }
}

/// Everything the report renderer needs for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub display_name: String,
    pub sheet: String,
    pub content: ReportContent,
}

// --- Jobs ---

/// The sheets one report needs, loaded up front so the extraction itself
/// can run anywhere.
#[derive(Debug, Clone)]
pub struct ReportJob {
    pub kind: ReportKind,
    /// Absent for the workload roster, which names its lecturers per row.
    metadata: Option<Grid>,
    data: Grid,
    lecturer: Option<String>,
}

/// Loads the sheets for `kind`. `selected_sheet` only matters for the
/// monthly report and the workload roster.
pub fn prepare_job(
    kind: ReportKind,
    source: &mut dyn SheetSource,
    selected_sheet: Option<&str>,
) -> Result<ReportJob, ExtractError> {
    let metadata = match kind {
        ReportKind::Opterecenje => None,
        _ => Some(source.load_sheet(workbook::METADATA_SHEET)?),
    };
    let data = match kind {
        ReportKind::AnalizaNastave => source.load_sheet(workbook::TEACHING_ANALYSIS_SHEET)?,
        ReportKind::EvidencijaNastave => source.load_sheet(workbook::ATTENDANCE_SHEET)?,
        ReportKind::Izvestaj => {
            let sheet = workbook::resolve_report_sheet(source, selected_sheet)?;
            source.load_sheet(&sheet)?
        }
        ReportKind::OsnovniPodaci => source.load_sheet(workbook::METADATA_SHEET)?,
        ReportKind::Opterecenje => {
            let sheet = workbook::resolve_roster_sheet(source, selected_sheet)?;
            source.load_sheet(&sheet)?
        }
    };
    tracing::debug!("Prepared {} job over sheet '{}'", kind.slug(), data.name());
    Ok(ReportJob { kind, metadata, data, lecturer: None })
}

impl ReportJob {
    /// Restricts the workload roster to one lecturer.
    pub fn with_lecturer(mut self, lecturer: Option<String>) -> Self {
        self.lecturer = lecturer;
        self
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Grid> + '_ {
        self.metadata.iter().chain(std::iter::once(&self.data))
    }

    /// Runs the extraction. Structural problems are errors; a report whose
    /// structure is intact but holds no rows is `NoData`. Every report kind
    /// yields one report except the workload roster, which yields one per
    /// lecturer.
    pub fn run(&self, settings: &Settings) -> Result<Outcome<Vec<Report>>, ExtractError> {
        tracing::info!("Extracting {} from sheet '{}'", self.kind, self.data.name());
        let Some(metadata) = &self.metadata else {
            return self.run_workload();
        };
        let display_name = display_name(metadata)?;

        let content = match self.kind {
            ReportKind::AnalizaNastave => {
                let mut tables = Vec::new();
                for spec in [teaching_hours_table(settings), student_count_table(settings)] {
                    let name = spec.name;
                    match PivotExtractor::new(spec, settings.location_token.clone()).extract(&self.data)? {
                        Outcome::Data(table) => tables.push(table),
                        Outcome::NoData => tracing::warn!("Table '{}' has no qualifying rows", name),
                    }
                }
                ReportContent::Tables { tables }
            }
            ReportKind::EvidencijaNastave => ReportContent::Tables {
                tables: extract_register(&self.data).into_data().into_iter().collect(),
            },
            ReportKind::Izvestaj => ReportContent::Sections(extract_sections(monthly_report_layout(), &self.data)),
            ReportKind::OsnovniPodaci => ReportContent::Sections(extract_sections(basic_data_layout(), &self.data)),
            ReportKind::Opterecenje => return self.run_workload(),
        };

        if content.row_count() == 0 {
            tracing::warn!("{} for {} produced no rows", self.kind, display_name);
            return Ok(Outcome::NoData);
        }
        Ok(Outcome::Data(vec![Report { kind: self.kind, display_name, sheet: self.data.name().to_string(), content }]))
    }

    fn run_workload(&self) -> Result<Outcome<Vec<Report>>, ExtractError> {
        let groups = extract_workload(&self.data, self.lecturer.as_deref())?;
        Ok(groups.map(|groups| {
            groups
                .into_iter()
                .map(|group| Report {
                    kind: self.kind,
                    display_name: group.lecturer,
                    sheet: self.data.name().to_string(),
                    content: ReportContent::Tables { tables: vec![group.table] },
                })
                .collect()
        }))
    }
}

fn extract_sections(layout: SectionLayout, grid: &Grid) -> ExtractedSections {
    let extractor = SectionExtractor::new(layout);
    let extracted = extractor.extract(grid);
    extractor.filled(&extracted)
}
