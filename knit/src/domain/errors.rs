//! Structured error types for knit
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnitError {
    /// A single line of a kernel table could not be understood. Readers
    /// recover from this by dropping the line.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source was readable but its layout is not what the kernel produces.
    #[error("Cannot parse {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write report")]
    Output(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl KnitError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        KnitError::Io { path: path.into(), source }
    }

    /// True for errors caused by bad user input rather than the host.
    pub fn is_config(&self) -> bool {
        matches!(self, KnitError::Config(_))
    }
}
