//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// One variant per failure class of the import pipeline. `MappingIncomplete`
/// and `NothingToImport` block step advancement and are surfaced inline;
/// the rest are transient notices. No failure ever leaves the store in a
/// partially committed state.
#[derive(Error, Debug)]
pub enum Error {
    /// The uploaded file could not be parsed into a table, or parsed to zero rows
    #[error("Could not read statement: {0}")]
    FileParse(String),

    /// The extraction service answered with a gateway timeout
    #[error(
        "The document took too long to process. Try a smaller file, or upload a CSV export instead."
    )]
    RemoteTimeout,

    /// The extraction service failed for any non-timeout reason
    #[error("Statement extraction failed: {0}")]
    RemoteExtraction(String),

    /// A required column is unmapped; blocks leaving the mapping step
    #[error("Required columns not mapped: {0}")]
    MappingIncomplete(String),

    /// Every row was filtered out of the commit set
    #[error("Nothing to import: no valid rows selected")]
    NothingToImport,

    /// The batch write failed; nothing was persisted and the commit is safe to retry
    #[error("Import failed, no records were written: {0}")]
    Commit(String),

    /// Reading from the transaction store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Reading or writing local settings failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was invoked in the wrong import step
    #[error("Invalid operation for the current step: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(msg: impl Into<String>) -> Self {
        Self::FileParse(msg.into())
    }

    /// Create a remote extraction error
    pub fn remote_extraction(msg: impl Into<String>) -> Self {
        Self::RemoteExtraction(msg.into())
    }

    /// Create a mapping incomplete error from the list of unmapped slots
    pub fn mapping_incomplete(missing: &[&str]) -> Self {
        Self::MappingIncomplete(missing.join(", "))
    }

    /// Create a commit error
    pub fn commit(msg: impl Into<String>) -> Self {
        Self::Commit(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
