use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovtreeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tracefile could not be read. This aborts the run.
    #[error("Failed to read tracefile {}: {source}", .path.display())]
    TraceFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No source files found in the given tracefiles")]
    NoSourceFiles,
}

pub type Result<T> = std::result::Result<T, CovtreeError>;
