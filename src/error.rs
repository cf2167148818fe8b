//! Error types for wtmplast

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wtmplast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wtmplast
#[derive(Error, Debug)]
pub enum Error {
    /// The accounting file does not exist
    #[error("{}: no such file", .path.display())]
    NotFound {
        /// Path that failed to open
        path: PathBuf,
    },

    /// The accounting file exists but cannot be read
    #[error("{}: permission denied", .path.display())]
    PermissionDenied {
        /// Path that failed to open
        path: PathBuf,
    },

    /// A seek or read failed mid-scan
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested record index outside `[0, count)`
    #[error("record index {index} out of range for {count} records")]
    OutOfRange {
        /// Index that was requested
        index: usize,
        /// Number of records in the file
        count: usize,
    },

    /// File length is not a whole number of records
    #[error("file length {len} is not a multiple of the {record_size}-byte record size")]
    MalformedFile {
        /// Observed file length in bytes
        len: u64,
        /// Fixed on-disk record size
        record_size: usize,
    },

    /// Operation on a store whose descriptor was already released
    #[error("record store is closed")]
    StoreClosed,

    /// Page size of zero records
    #[error("page size must be at least 1 record")]
    InvalidPageSize,

    /// Buffer shorter than one on-disk record
    #[error("record truncated: {len} bytes of {record_size}")]
    TruncatedRecord {
        /// Bytes actually available
        len: usize,
        /// Fixed on-disk record size
        record_size: usize,
    },

    /// Serialization errors for machine-readable output
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
