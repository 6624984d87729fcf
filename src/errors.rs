//! Unified application error type.
//! Every layer (db, core, export, cli) returns AppError so that the binary
//! has a single place where failures are reported.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid ISO week (expected YYYYWww): {0}")]
    InvalidWeek(String),

    #[error("Invalid profile status: {0}")]
    InvalidStatus(String),

    #[error("Invalid document type: {0}")]
    InvalidDocumentType(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid time entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
