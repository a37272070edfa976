//! Error types for session operations.
//!
//! This module provides the [`Error`] enum covering every way a session
//! operation can fail, the flat [`ErrorKind`] taxonomy a dispatcher reports
//! to its caller, and a convenient [`Result`] type alias.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::mode::AccessMode;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during session operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A file is already open; close it first.
    #[error("A file is already open for {mode}")]
    AlreadyOpen {
        /// Mode of the session that is open.
        mode: AccessMode,
    },

    /// The operation needs a file open in a particular mode.
    #[error("No file is open for {wanted}")]
    NoFileOpen {
        /// Mode the operation requires.
        wanted: AccessMode,
    },

    /// The file could not be opened, or its header could not be read or
    /// failed validation.
    #[error("Failed to open Monarch file: {path}")]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying container error.
        #[source]
        source: monarch_format::Error,
    },

    /// The header of a new file could not be prepared or persisted.
    #[error("Failed to write header to {path}")]
    HeaderWrite {
        /// Path that was being created.
        path: PathBuf,
        /// Underlying container error.
        #[source]
        source: monarch_format::Error,
    },

    /// The write payload doesn't have the record geometry.
    #[error("Data must be uint8 shaped [1, {expected_cols}], got [{rows}, {cols}] with {len} bytes")]
    ShapeMismatch {
        /// Required column count (the record size).
        expected_cols: u64,
        /// Rows supplied.
        rows: usize,
        /// Columns supplied.
        cols: usize,
        /// Bytes supplied.
        len: usize,
    },

    /// The record could not be written.
    #[error("Failed to write record to disk")]
    Write(#[source] monarch_format::Error),

    /// The next record could not be read (other than a clean end of file).
    #[error("Failed to read record")]
    Read(#[source] monarch_format::Error),

    /// A record buffer could not be allocated.
    #[error("Could not allocate {bytes} bytes for record data")]
    Allocation {
        /// Requested size.
        bytes: usize,
    },
}

impl Error {
    /// The taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyOpen { .. } => ErrorKind::AlreadyOpen,
            Error::NoFileOpen { .. } => ErrorKind::NoFileOpen,
            Error::Open { .. } => ErrorKind::OpenError,
            Error::HeaderWrite { .. } => ErrorKind::HeaderWriteError,
            Error::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Error::Write(_) => ErrorKind::WriteError,
            Error::Read(_) => ErrorKind::ReadError,
            Error::Allocation { .. } => ErrorKind::AllocationError,
        }
    }

    /// Whether this error came out of `open`.
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OpenError | ErrorKind::HeaderWriteError
        )
    }

    pub(crate) fn open(path: impl Into<PathBuf>, source: monarch_format::Error) -> Self {
        Self::Open { path: path.into(), source }
    }

    /// A failed record read; buffers that couldn't be allocated keep their
    /// own kind.
    pub(crate) fn read(source: monarch_format::Error) -> Self {
        match source {
            monarch_format::Error::Allocation { bytes } => Self::Allocation { bytes },
            other => Self::Read(other),
        }
    }

    pub(crate) fn header_write(path: impl Into<PathBuf>, source: monarch_format::Error) -> Self {
        Self::HeaderWrite { path: path.into(), source }
    }
}

/// Flat classification of session failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `open` while a file is open.
    AlreadyOpen,
    /// Read or write operation without a matching open file.
    NoFileOpen,
    /// The underlying open failed, or the header couldn't be read or was
    /// invalid.
    OpenError,
    /// The header of a new file could not be persisted.
    HeaderWriteError,
    /// The header of an existing file could not be read.
    ///
    /// Kept for dispatchers that speak the full status vocabulary; `open`
    /// reports an unreadable header as [`OpenError`](Self::OpenError) with
    /// the header failure as its source.
    HeaderReadError,
    /// Write payload of the wrong type or dimensions.
    ShapeMismatch,
    /// The underlying record write failed.
    WriteError,
    /// The underlying record read failed mid-file.
    ReadError,
    /// A buffer could not be produced.
    AllocationError,
}

impl ErrorKind {
    /// The short string a dispatcher hands back to its caller.
    pub const fn sentinel(self) -> &'static str {
        match self {
            ErrorKind::AlreadyOpen => "already_open",
            ErrorKind::NoFileOpen => "no_open_file",
            ErrorKind::OpenError => "open_error",
            ErrorKind::HeaderWriteError => "header_write_error",
            ErrorKind::HeaderReadError => "header_read_error",
            ErrorKind::ShapeMismatch => "data_type_error",
            ErrorKind::WriteError => "file_write_error",
            ErrorKind::ReadError => "read_error",
            ErrorKind::AllocationError => "allocation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sentinel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoFileOpen { wanted: AccessMode::Write };
        assert_eq!(err.to_string(), "No file is open for writing");

        let err = Error::ShapeMismatch { expected_cols: 4194304, rows: 1, cols: 100, len: 100 };
        assert!(err.to_string().contains("[1, 4194304]"));
        assert!(err.to_string().contains("[1, 100]"));
    }

    #[test]
    fn test_kind_sentinels() {
        let err = Error::NoFileOpen { wanted: AccessMode::Read };
        assert_eq!(err.kind(), ErrorKind::NoFileOpen);
        assert_eq!(err.kind().sentinel(), "no_open_file");

        let err = Error::Write(monarch_format::Error::FileClosed);
        assert_eq!(err.kind().to_string(), "file_write_error");
        assert!(!err.is_open_failure());
    }

    #[test]
    fn test_open_failures_keep_source() {
        use std::error::Error as _;

        let err = Error::open("a.mon", monarch_format::Error::header_read("bad magic"));
        assert_eq!(err.kind(), ErrorKind::OpenError);
        assert!(err.is_open_failure());
        let source = err.source().expect("source");
        assert!(source.to_string().contains("bad magic"));
    }

    #[test]
    fn test_read_failures_keep_allocation_kind() {
        let err = Error::read(monarch_format::Error::Allocation { bytes: 64 });
        assert_eq!(err.kind(), ErrorKind::AllocationError);

        let err = Error::read(monarch_format::Error::TruncatedRecord { expected: 8, found: 3 });
        assert_eq!(err.kind(), ErrorKind::ReadError);
    }
}
