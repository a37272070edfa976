//! Error types for Monarch container access.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the container reader and writer.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened or created.
    #[error("Failed to open Monarch file: {path}")]
    OpenFailed {
        /// Path to the file that could not be opened.
        path: PathBuf,
        /// The I/O failure reported by the operating system.
        #[source]
        source: io::Error,
    },

    /// The header could not be read or is malformed.
    #[error("Failed to read Monarch header: {reason}")]
    HeaderRead {
        /// Description of the header problem.
        reason: String,
    },

    /// The header could not be written.
    #[error("Failed to write Monarch header: {reason}")]
    HeaderWrite {
        /// Description of the header problem.
        reason: String,
    },

    /// A record ended before its declared size.
    #[error("Truncated record: expected {expected} bytes, got {found}")]
    TruncatedRecord {
        /// Bytes a full record occupies.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },

    /// A record buffer could not be allocated.
    #[error("Cannot allocate {bytes} byte record buffer")]
    Allocation {
        /// Requested size.
        bytes: usize,
    },

    /// Operation performed in the wrong state (e.g. reading a record before the header).
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the state error.
        message: &'static str,
    },

    /// The handle has already been closed.
    #[error("File has been closed")]
    FileClosed,
}

impl Error {
    /// Create a HeaderRead error with the given reason.
    pub fn header_read(reason: impl Into<String>) -> Self {
        Self::HeaderRead { reason: reason.into() }
    }

    /// Create a HeaderWrite error with the given reason.
    pub fn header_write(reason: impl Into<String>) -> Self {
        Self::HeaderWrite { reason: reason.into() }
    }

    /// Create an InvalidState error.
    pub const fn invalid_state(message: &'static str) -> Self {
        Self::InvalidState { message }
    }
}
