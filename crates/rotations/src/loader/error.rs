//! Error types and load result structures for the schedule loader.

use std::path::PathBuf;

use oncall_core::OncallError;

/// Errors that can occur while loading schedule and policy documents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Domain error surfaced while resolving the document (e.g. unknown timezone).
    #[error(transparent)]
    Domain(#[from] OncallError),

    /// Structurally valid YAML that can't be used (e.g. duplicate rotation IDs).
    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Document was successfully loaded.
    Loaded { id: String },
    /// File was skipped (dotfile, non-YAML, etc.).
    Skipped { reason: String },
    /// Parse or resolution error occurred.
    Failed { error: String },
}
