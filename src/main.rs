// src/main.rs
mod config;
mod extractors;
mod reports;
mod storage;
mod utils;
mod workbook;

#[cfg(test)]
mod testutil;

use clap::Parser;
use config::Settings;
use extractors::{KeyPolicy, Outcome};
use reports::{prepare_job, Report, ReportJob, ReportKind};
use storage::StorageManager;
use utils::error::ExtractError;
use utils::AppError;
use workbook::XlsxWorkbook;

/// Patterns tagged in `--debug` sheet dumps
const DEBUG_PATTERNS: [(&str, &str); 6] = [
    (r"(?i)\bPredmeti\b.*\b(Grand Total|Prosečan broj studenata)\b", "header"),
    (r"(?i)^\s*(Kvalitet nastavnog procesa|Rad sa Studentima|Podizanje kvaliteta ustanove|Jačanje kapaciteta i imidža ustanove|Ostalo)\s*$", "section"),
    (r"^\s*\d{4}\s*$", "year"),
    (r"(?i)^\s*(jan|feb|mar|apr|maj|jun|jul|avg|sep|okt|nov|dec)\s*$", "month"),
    (r"^\s*(Ime|Prezime)\b", "metadata"),
    (r"\bIme Predavača\b.*\bUkupno casova\b", "roster"),
];

/// Command Line Interface for the lecturer report sheet extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workbook to read (.xlsx, .xls)
    #[arg(short, long)]
    input: String,

    /// Reports to extract (default: an, edn, izvestaj, op)
    #[arg(short, long, value_enum)]
    report: Vec<ReportKind>,

    /// Sheet for the "izvestaj" report or the workload roster (default: first one)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Only extract this lecturer from the workload roster ("opterecenje")
    #[arg(short, long)]
    lecturer: Option<String>,

    /// Only list the monthly report sheets of the workbook
    #[arg(long)]
    list_sheets: bool,

    /// Output directory for extracted content
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save a structure dump of every sheet read
    #[arg(short, long)]
    debug: bool,

    /// Place name that marks location rows (env: SHEET_LOCATION_TOKEN)
    #[arg(long)]
    location_token: Option<String>,

    /// Composite key policy: omit-missing or placeholder (env: SHEET_KEY_POLICY)
    #[arg(long)]
    key_policy: Option<KeyPolicy>,
}

impl Args {
    /// Requested reports without duplicates, in request order.
    fn report_kinds(&self) -> Vec<ReportKind> {
        if self.report.is_empty() {
            return ReportKind::ALL.to_vec();
        }
        let mut kinds = Vec::new();
        for kind in &self.report {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    let settings = Settings::resolve(args.location_token.clone(), args.key_policy)?;

    // 3. Open the workbook
    let mut workbook = XlsxWorkbook::open(&args.input)?;

    if args.list_sheets {
        let sheets = workbook::selectable_sheets(&workbook);
        if sheets.is_empty() {
            return Err(ExtractError::NoDataSheets.into());
        }
        for sheet in sheets {
            println!("{}", sheet);
        }
        return Ok(());
    }

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 5. Load the sheets of every requested report
    let mut jobs = Vec::new();
    let mut failure_count = 0;
    for kind in args.report_kinds() {
        match prepare_job(kind, &mut workbook, args.sheet.as_deref()) {
            Ok(job) => jobs.push(job.with_lecturer(args.lecturer.clone())),
            Err(e) => {
                tracing::error!("Cannot prepare {}: {}", kind, e);
                failure_count += 1;
            }
        }
    }

    if args.debug {
        save_debug_dumps(&storage, &jobs);
    }

    // 6. Extract, one blocking task per report
    let results = run_jobs(jobs, &settings).await?;

    // 7. Save what was produced
    let mut success_count = 0;
    for (kind, result) in results {
        match result {
            Ok(Outcome::Data(reports)) => {
                success_count += 1;
                for report in reports {
                    tracing::info!("Extracted {} for {} ({} rows)", kind, report.display_name, report.content.row_count());

                    match storage.save_report(&report) {
                        Ok(path) => tracing::info!("Saved report to: {}", path.display()),
                        Err(e) => tracing::error!("Failed to save report: {}", e),
                    }
                    match storage.save_report_metadata(&report) {
                        Ok(path) => tracing::info!("Saved report metadata to: {}", path.display()),
                        Err(e) => tracing::error!("Failed to save report metadata: {}", e),
                    }
                }
            }
            Ok(Outcome::NoData) => {
                tracing::warn!("{}: no data rows found", kind);
                failure_count += 1;
            }
            Err(e) => {
                tracing::error!("Failed to extract {}: {}", kind, e);
                failure_count += 1;
            }
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!("Failed to extract any of {} requested reports", failure_count)));
    }

    Ok(())
}

/// Runs every job on the blocking pool. Jobs own their sheets and share
/// nothing, so they run side by side.
async fn run_jobs(
    jobs: Vec<ReportJob>,
    settings: &Settings,
) -> Result<Vec<(ReportKind, Result<Outcome<Vec<Report>>, ExtractError>)>, AppError> {
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let settings = settings.clone();
            tokio::task::spawn_blocking(move || (job.kind, job.run(&settings)))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await?);
    }
    Ok(results)
}

fn save_debug_dumps(storage: &StorageManager, jobs: &[ReportJob]) {
    let mut dumped: Vec<&str> = Vec::new();
    for grid in jobs.iter().flat_map(|job| job.sheets()) {
        if dumped.contains(&grid.name()) {
            continue;
        }
        dumped.push(grid.name());

        let dump = match utils::grid_debug::render_sheet_dump(grid, &DEBUG_PATTERNS) {
            Ok(dump) => dump,
            Err(e) => {
                tracing::warn!("Failed to render debug dump for '{}': {}", grid.name(), e);
                continue;
            }
        };
        let filename = format!("{}.txt", grid.name().replace(' ', "_"));
        match storage.save_debug_text(&filename, &dump) {
            Ok(path) => tracing::info!("Saved sheet structure dump: {}", path.display()),
            Err(e) => tracing::warn!("Failed to save debug dump: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemoryWorkbook;

    fn workbook() -> MemoryWorkbook {
        let mut wb = MemoryWorkbook::default();
        wb.add_sheet("Osnovni podaci", &[&["", "Ime", "Marko"], &["", "Prezime", "Marković"]])
            .add_sheet(
                "Analiza nastave",
                &[&["", "Predmeti", "Prosečan broj studenata"], &["", "2024"], &["", "Fizika", "20"]],
            )
            .add_sheet("Evidencija drzanja nastave", &[&["Datum"]]);
        wb
    }

    #[test]
    fn test_run_jobs_keeps_request_order() {
        let mut wb = workbook();
        let jobs = vec![
            prepare_job(ReportKind::EvidencijaNastave, &mut wb, None).unwrap(),
            prepare_job(ReportKind::OsnovniPodaci, &mut wb, None).unwrap(),
            prepare_job(ReportKind::AnalizaNastave, &mut wb, None).unwrap(),
        ];

        let results = tokio_test::block_on(run_jobs(jobs, &Settings::default())).unwrap();
        let kinds: Vec<ReportKind> = results.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ReportKind::EvidencijaNastave, ReportKind::OsnovniPodaci, ReportKind::AnalizaNastave]);

        assert!(matches!(results[0].1, Ok(Outcome::NoData)), "register with only a header has no data");
        assert!(matches!(results[1].1, Ok(Outcome::Data(_))));
        // the hour-count table header is missing from this sheet
        assert!(matches!(results[2].1, Err(ExtractError::HeaderNotFound { .. })));
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from([
            "sheet_extractor", "--input", "izvestaj.xlsx", "-r", "an", "-r", "izvestaj", "-r", "an",
            "--key-policy", "placeholder",
        ])
        .unwrap();
        assert_eq!(args.report_kinds(), vec![ReportKind::AnalizaNastave, ReportKind::Izvestaj]);
        assert_eq!(args.key_policy, Some(KeyPolicy::Placeholder));
        assert_eq!(args.output_dir, "./output");

        let args = Args::try_parse_from(["sheet_extractor", "-i", "a.xlsx"]).unwrap();
        assert_eq!(args.report_kinds(), ReportKind::ALL.to_vec());
        assert!(!args.report_kinds().contains(&ReportKind::Opterecenje));

        let args = Args::try_parse_from(["sheet_extractor", "-i", "o.xlsx", "-r", "opterecenje", "-l", "Ana Jović"]).unwrap();
        assert_eq!(args.report_kinds(), vec![ReportKind::Opterecenje]);
        assert_eq!(args.lecturer.as_deref(), Some("Ana Jović"));
        assert!(Args::try_parse_from(["sheet_extractor", "-i", "a.xlsx", "-r", "pdf"]).is_err());
    }

    #[test]
    fn test_debug_dumps_written_once_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let mut wb = workbook();
        let jobs = vec![
            prepare_job(ReportKind::OsnovniPodaci, &mut wb, None).unwrap(),
            prepare_job(ReportKind::AnalizaNastave, &mut wb, None).unwrap(),
        ];
        save_debug_dumps(&storage, &jobs);

        let mut files: Vec<String> = std::fs::read_dir(dir.path().join("debug"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["Analiza_nastave.txt", "Osnovni_podaci.txt"]);
    }
}
