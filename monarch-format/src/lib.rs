//! # monarch-format
//!
//! Reader and writer for the Monarch binary time-series container used by
//! Project 8 digitizer acquisitions.
//!
//! A Monarch file holds one header describing the acquisition (rate,
//! channel count, record size) followed by fixed-size records. Each record
//! carries an acquisition id, a record id, a clock tick, and
//! `channels × record_size` sample bytes stored interleaved.
//!
//! This crate only provides the low-level access sequence. For a session
//! object that enforces a single open file and converts between channel
//! layouts, use the `monarch-rs` crate instead.
//!
//! ## Usage
//!
//! ```no_run
//! use monarch_format::{open_for_reading, open_for_writing, AcquisitionMode};
//!
//! let mut writer = open_for_writing("out.mon")?;
//! writer.header_mut()?.set_record_size(16);
//! writer.header_mut()?.set_acq_mode(AcquisitionMode::TwoChannel);
//! writer.write_header()?;
//! writer.write_record()?;
//! writer.close()?;
//!
//! let mut reader = open_for_reading("out.mon")?;
//! reader.read_header()?;
//! assert!(reader.read_record()?);
//! assert!(!reader.read_record()?);
//! # Ok::<(), monarch_format::Error>(())
//! ```
//!
//! ## Thread Safety
//!
//! Readers and writers own their file handle and are `Send`, but they are
//! not meant to be shared; wrap them in a lock if more than one thread needs
//! access.

#![deny(missing_docs)]

mod error;
mod header;
mod reader;
mod record;
mod writer;

use std::path::Path;

pub use error::{Error, Result};
pub use header::{AcquisitionMode, MonarchHeader, MAGIC, VERSION};
pub use reader::MonarchReader;
pub use record::{MonarchRecord, RECORD_PREFIX_LEN};
pub use writer::{MonarchWriter, RecordSink};

/// Open an existing Monarch file for reading.
///
/// Shorthand for [`MonarchReader::open`].
pub fn open_for_reading(path: impl AsRef<Path>) -> Result<MonarchReader> {
    MonarchReader::open(path)
}

/// Create a Monarch file for writing, truncating any existing file.
///
/// Shorthand for [`MonarchWriter::create`].
pub fn open_for_writing(path: impl AsRef<Path>) -> Result<MonarchWriter> {
    MonarchWriter::create(path)
}
