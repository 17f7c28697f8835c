//! Unified error type for the counting pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CcountError>;

/// All fatal errors a run can end with.
#[derive(Error, Debug)]
pub enum CcountError {
    /// Supplied path has no `.git` entry
    #[error("Not a git repository: {path} (expected a .git directory)")]
    InvalidRepository { path: String },

    /// A git subprocess could not be spawned or exited non-zero
    #[error("`{command}` failed: {message}")]
    VcsInvocation { command: String, message: String },

    /// `git log` output did not match the expected line format
    #[error("Unexpected git log line '{line}': {reason}")]
    HistoryParse { line: String, reason: String },

    /// Checkout or the counting tool failed for one commit
    #[error("Counting failed at {commit}: {message}")]
    Counting { commit: String, message: String },

    /// Bytes read through a codec were not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A sample limit that cannot keep both endpoints
    #[error("Invalid sample limit {0}: use 0 for no limit or at least 2")]
    InvalidSampleLimit(usize),

    /// I/O error (cache directory, temp clone, output file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a persisted collection was not used. Always recovered by re-measuring.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheRejection {
    #[error("no persisted collection")]
    Missing,

    #[error("cannot read persisted collection: {0}")]
    Unreadable(String),

    #[error("malformed persisted collection: {0}")]
    Malformed(String),

    #[error("schema version mismatch: file has {found}, expected {expected}")]
    SchemaMismatch { found: String, expected: String },
}
