//! Error types for the pipeline.

use thiserror::Error;

/// Pipeline-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable clock backend on this platform
    #[error("Clock unavailable: {0}")]
    ClockUnavailable(String),

    /// A log record with implausible framing
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
