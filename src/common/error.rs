//! Error types for the grading harness
//!
//! Per-URL fetch problems are downgraded to failed test cases by the runner;
//! only usage, configuration, and subject-spawn errors are fatal.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the grading harness
#[derive(Error, Debug)]
pub enum Error {
    // === Invocation Errors ===
    #[error("{0}")]
    Usage(String),

    // === Subject Process Errors ===
    #[error("Failed to launch subject binary '{path}': {source}")]
    SubjectSpawn {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to signal subject process {pid}: {reason}")]
    SubjectSignal { pid: u32, reason: String },

    // === Fetch Errors ===
    #[error("Fetch failed for '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Extended Suite Errors ===
    #[error("Extended test suite failed to run: {0}")]
    ExtendedSuite(String),
}

impl Error {
    /// Create a fetch error for a given URL
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a subject spawn error
    pub fn subject_spawn(path: &std::path::Path, source: io::Error) -> Self {
        Self::SubjectSpawn {
            path: path.display().to_string(),
            source,
        }
    }

    /// Create a subject signal error
    pub fn subject_signal(pid: u32, reason: impl ToString) -> Self {
        Self::SubjectSignal {
            pid,
            reason: reason.to_string(),
        }
    }
}
