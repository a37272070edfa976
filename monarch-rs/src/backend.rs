//! The container operations a session consumes.
//!
//! [`FileBackend`] forwards to `monarch-format`. The traits exist so a
//! session can run against another implementation, e.g. one that fails on
//! demand in tests.

use std::path::Path;

use monarch_format::{MonarchHeader, MonarchReader, MonarchRecord, MonarchWriter, Result};

/// A container file opened for reading.
pub trait ReadHandle {
    /// Read the header. Called once, right after opening.
    fn read_header(&mut self) -> Result<MonarchHeader>;

    /// Advance to the next record; `Ok(false)` at end of file.
    fn read_record(&mut self) -> Result<bool>;

    /// First channel of the current record.
    fn record_one(&self) -> &MonarchRecord;

    /// Second channel of the current record, if the file has one.
    fn record_two(&self) -> Option<&MonarchRecord>;

    /// Release the file.
    fn close(&mut self) -> Result<()>;
}

/// A container file opened for writing.
pub trait WriteHandle {
    /// The header to fill in before [`write_header`](Self::write_header).
    fn header_mut(&mut self) -> Result<&mut MonarchHeader>;

    /// Persist the header.
    fn write_header(&mut self) -> Result<()>;

    /// The interleaved record to fill before [`write_record`](Self::write_record).
    fn record_interleaved_mut(&mut self) -> Result<&mut MonarchRecord>;

    /// Append the interleaved record.
    fn write_record(&mut self) -> Result<()>;

    /// Flush and release the file.
    fn close(&mut self) -> Result<()>;
}

/// Opens container files.
pub trait MonarchBackend {
    /// Handle type for reading.
    type Reader: ReadHandle;
    /// Handle type for writing.
    type Writer: WriteHandle;

    /// Open an existing file.
    fn open_for_reading(&self, path: &Path) -> Result<Self::Reader>;

    /// Create a new file.
    fn open_for_writing(&self, path: &Path) -> Result<Self::Writer>;
}

/// Backend over files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl MonarchBackend for FileBackend {
    type Reader = MonarchReader;
    type Writer = MonarchWriter;

    fn open_for_reading(&self, path: &Path) -> Result<MonarchReader> {
        monarch_format::open_for_reading(path)
    }

    fn open_for_writing(&self, path: &Path) -> Result<MonarchWriter> {
        monarch_format::open_for_writing(path)
    }
}

impl ReadHandle for MonarchReader {
    fn read_header(&mut self) -> Result<MonarchHeader> {
        MonarchReader::read_header(self).cloned()
    }

    fn read_record(&mut self) -> Result<bool> {
        MonarchReader::read_record(self)
    }

    fn record_one(&self) -> &MonarchRecord {
        MonarchReader::record_one(self)
    }

    fn record_two(&self) -> Option<&MonarchRecord> {
        MonarchReader::record_two(self)
    }

    fn close(&mut self) -> Result<()> {
        MonarchReader::close(self)
    }
}

impl WriteHandle for MonarchWriter {
    fn header_mut(&mut self) -> Result<&mut MonarchHeader> {
        MonarchWriter::header_mut(self)
    }

    fn write_header(&mut self) -> Result<()> {
        MonarchWriter::write_header(self)
    }

    fn record_interleaved_mut(&mut self) -> Result<&mut MonarchRecord> {
        MonarchWriter::record_interleaved_mut(self)
    }

    fn write_record(&mut self) -> Result<()> {
        MonarchWriter::write_record(self)
    }

    fn close(&mut self) -> Result<()> {
        MonarchWriter::close(self)
    }
}
