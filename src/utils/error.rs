// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Could not open workbook: {0}")]
    Open(#[from] calamine::Error), // Automatically convert calamine errors

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Failed to read sheet '{sheet}': {message}")]
    Read { sheet: String, message: String },
}

/// Structural failures. Rows that merely fail a validity check never end up here.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Required label \"{label}\" not found in \"{sheet}\" sheet")]
    MissingMetadataLabel { sheet: String, label: String },

    #[error("Label \"{label}\" in \"{sheet}\" sheet has no value")]
    MissingMetadataValue { sheet: String, label: String },

    #[error("Could not find header row for table \"{table}\" (expected: {})", .headers.join(", "))]
    HeaderNotFound { table: String, headers: Vec<String> },

    #[error("No monthly report sheets found in the workbook")]
    NoDataSheets,

    #[error("Sheet access failed: {0}")]
    Workbook(#[from] WorkbookError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Workbook access failed: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
