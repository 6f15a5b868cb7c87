//! # Optodb - Optical Measurement Metadata Store
//!
//! SQLite-backed relational store for optical-measurement metadata:
//! devices under test, measurement sessions, experimental conditions,
//! raw-data references, and derived spectral-analysis results.
//!
//! Optodb provides:
//! - Idempotent schema creation with cascade-delete semantics
//! - Typed insert/query/delete operations with upsert-on-conflict keys
//! - Lineage tracking between analysis runs and measurement data
//! - Idempotent folder-based ingestion of measurement files
//! - Workbook export, one sheet per table

pub mod config;
pub mod export;
pub mod ingest;
pub mod model;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use model::{Quantity, SessionFullInfo};
pub use storage::{Database, DbStats, Entity};

/// Result type alias for Optodb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Optodb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field was missing or empty; rejected before or by the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A write referenced a nonexistent parent key.
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// A filename or file content did not match the expected convention.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The store could not be opened or integrity enforcement could not be enabled.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other SQLite-level failure.
    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("Export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    /// Constraint failures are classified into the crate taxonomy:
    /// foreign-key violations and NOT NULL violations get their own
    /// variants, everything else passes through as a storage error.
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(cause, message) = &err {
            let detail = message.clone().unwrap_or_else(|| cause.to_string());
            match cause.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return Error::ReferentialIntegrity(detail);
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL => {
                    return Error::Validation(detail);
                }
                _ => {}
            }
        }
        Error::Storage(err)
    }
}
