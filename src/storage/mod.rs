// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::reports::{Report, ReportContent};
use crate::utils::error::StorageError;
use std::io::Write;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for everything extracted for one person: /base_dir/Ime_Prezime/
    fn person_dir(&self, display_name: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(display_name.replace(' ', "_"));
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the extracted report as pretty JSON
    pub fn save_report(&self, report: &Report) -> Result<PathBuf, StorageError> {
        let file_path = self.person_dir(&report.display_name)?
            .join(format!("{}.json", report.kind.slug()));

        let content = serde_json::to_string_pretty(report)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut file = fs::File::create(&file_path)
            .map_err(StorageError::IoError)?;
        file.write_all(content.as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved report to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the report in JSON format
    pub fn save_report_metadata(&self, report: &Report) -> Result<PathBuf, StorageError> {
        let file_path = self.person_dir(&report.display_name)?
            .join(format!("{}_meta.json", report.kind.slug()));

        let parts: Vec<serde_json::Value> = match &report.content {
            ReportContent::Tables { tables } => tables
                .iter()
                .map(|t| serde_json::json!({ "name": t.name, "columns": t.header(), "rows": t.data_rows().len() }))
                .collect(),
            ReportContent::Sections(sections) => sections
                .sections
                .iter()
                .map(|s| serde_json::json!({ "name": s.name, "rows": s.rows.len() }))
                .collect(),
        };

        let metadata = serde_json::json!({
            "display_name": report.display_name,
            "report": report.kind.slug(),
            "title": report.kind.title(),
            "sheet": report.sheet,
            "parts": parts,
            "total_rows": report.content.row_count(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }

    /// Writes a free-form text file under /base_dir/debug/
    pub fn save_debug_text(&self, filename: &str, content: &str) -> Result<PathBuf, StorageError> {
        let debug_dir = self.base_dir.join("debug");
        fs::create_dir_all(&debug_dir)
            .map_err(StorageError::IoError)?;
        let file_path = debug_dir.join(filename);
        fs::write(&file_path, content)
            .map_err(StorageError::IoError)?;
        Ok(file_path)
    }
}
