//! Writing Monarch files.
//!
//! The write sequence is: create the file, fill in the header through
//! [`header_mut`](MonarchWriter::header_mut), persist it with
//! [`write_header`](MonarchWriter::write_header), then repeatedly fill the
//! interleaved record and call [`write_record`](MonarchWriter::write_record).
//!
//! # Example
//!
//! ```no_run
//! use monarch_format::{AcquisitionMode, MonarchWriter};
//!
//! let mut writer = MonarchWriter::create("out.mon")?;
//! {
//!     let header = writer.header_mut()?;
//!     header.set_filename("out.mon");
//!     header.set_acq_mode(AcquisitionMode::OneChannel);
//!     header.set_record_size(1024);
//! }
//! writer.write_header()?;
//!
//! let record = writer.record_interleaved_mut()?;
//! record.data.fill(0x80);
//! writer.write_record()?;
//! writer.close()?;
//! # Ok::<(), monarch_format::Error>(())
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::header::MonarchHeader;
use crate::record::{MonarchRecord, RECORD_PREFIX_LEN};

/// Storage a [`MonarchWriter`] appends to.
pub trait RecordSink: Write + Seek {
    /// Cut the storage back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Push written bytes to durable storage.
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl RecordSink for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// A Monarch file opened for writing.
///
/// Every record is flushed as it is written. If a record write fails, the
/// partial record is cut off again so the file ends on a record boundary;
/// if that isn't possible the writer closes itself.
///
/// Dropping the writer flushes and closes the file on a best-effort basis;
/// call [`close`](Self::close) to observe flush errors.
#[derive(Debug)]
pub struct MonarchWriter<S: RecordSink = File> {
    /// Path to the file (for error messages).
    path: PathBuf,

    /// Buffered sink. `None` once closed.
    file: Option<BufWriter<S>>,

    /// Header being prepared, then the persisted header.
    header: MonarchHeader,

    /// Whether the header is on disk.
    header_written: bool,

    /// Interleaved record, sized when the header is written.
    record: MonarchRecord,

    /// Count of records written.
    records_written: u64,

    /// Length of the file up to the end of the last complete record.
    committed: u64,
}

impl MonarchWriter<File> {
    /// Create (or truncate) a Monarch file for writing.
    ///
    /// # Errors
    ///
    /// [`Error::OpenFailed`] if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| Error::OpenFailed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened Monarch file for writing");
        Ok(Self::with_sink(path, file))
    }
}

impl<S: RecordSink> MonarchWriter<S> {
    /// A writer over an empty `sink`; `path` names it in messages.
    pub fn with_sink(path: impl Into<PathBuf>, sink: S) -> Self {
        MonarchWriter {
            path: path.into(),
            file: Some(BufWriter::new(sink)),
            header: MonarchHeader::new(),
            header_written: false,
            record: MonarchRecord::default(),
            records_written: 0,
            committed: 0,
        }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The header as prepared so far.
    pub fn header(&self) -> &MonarchHeader {
        &self.header
    }

    /// Mutable access to the header before it is written.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] once the header has been written.
    pub fn header_mut(&mut self) -> Result<&mut MonarchHeader> {
        if self.header_written {
            return Err(Error::invalid_state("Header has already been written"));
        }
        Ok(&mut self.header)
    }

    /// Persist the header and size the interleaved record.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if already written
    /// - [`Error::HeaderWrite`] if the record size is zero or too large, or
    ///   the bytes could not be written
    pub fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Err(Error::invalid_state("Header has already been written"));
        }
        if self.header.record_size() == 0 {
            return Err(Error::header_write("record size must be positive"));
        }
        let total = self
            .header
            .interleaved_len()
            .ok_or_else(|| Error::header_write("record size does not fit in memory"))?;

        let mut encoded = Vec::new();
        self.header.encode(&mut encoded)?;
        let file = self.file.as_mut().ok_or(Error::FileClosed)?;
        file.write_all(&encoded)
            .and_then(|()| file.flush())
            .map_err(|e| Error::header_write(e.to_string()))?;
        self.committed = encoded.len() as u64;

        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| Error::header_write(format!("cannot allocate {} byte record", total)))?;
        data.resize(total, 0);
        self.record = MonarchRecord {
            data,
            ..MonarchRecord::default()
        };
        self.header_written = true;
        Ok(())
    }

    /// The interleaved record to fill before [`write_record`](Self::write_record).
    ///
    /// Channel `c` of sample `i` lives at `data[channels * i + c]`.
    pub fn record_interleaved_mut(&mut self) -> Result<&mut MonarchRecord> {
        if !self.header_written {
            return Err(Error::invalid_state("Header must be written before records"));
        }
        Ok(&mut self.record)
    }

    /// Append the interleaved record to the file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the record could not be written in full. The file
    /// is left ending at the previous record, so the writer can carry on.
    pub fn write_record(&mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::invalid_state("Header must be written before records"));
        }
        let prefix = self.record.encode_prefix();
        let file = self.file.as_mut().ok_or(Error::FileClosed)?;
        let written = file
            .write_all(&prefix)
            .and_then(|()| file.write_all(&self.record.data))
            .and_then(|()| file.flush());

        if let Err(e) = written {
            self.discard_partial_record();
            return Err(Error::Io(e));
        }
        self.committed += (RECORD_PREFIX_LEN + self.record.data.len()) as u64;
        self.records_written += 1;
        Ok(())
    }

    /// Drop buffered bytes and cut the file back to `committed`.
    fn discard_partial_record(&mut self) {
        let Some(file) = self.file.take() else {
            return;
        };
        let (mut sink, _unwritten) = file.into_parts();
        let rewound = sink
            .truncate(self.committed)
            .and_then(|()| sink.seek(SeekFrom::Start(self.committed)));

        match rewound {
            Ok(_) => self.file = Some(BufWriter::new(sink)),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "could not remove partial record; writer closed"
            ),
        }
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush and close the file. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let mut sink = file.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        sink.sync()?;
        debug!(path = %self.path.display(), records = self.records_written, "closed Monarch writer");
        Ok(())
    }

    /// Whether the writer still holds its file.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl<S: RecordSink> Drop for MonarchWriter<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to close Monarch writer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_in_missing_dir() {
        let err = MonarchWriter::create("/nonexistent/dir/out.mon").unwrap_err();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }

    #[test]
    fn test_zero_record_size_rejected() {
        let dir = TempDir::new().unwrap();
        let mut writer = MonarchWriter::create(dir.path().join("zero.mon")).unwrap();

        let err = writer.write_header().unwrap_err();
        assert!(matches!(err, Error::HeaderWrite { .. }));
        assert!(writer.record_interleaved_mut().is_err());
    }

    #[test]
    fn test_header_frozen_after_write() {
        let dir = TempDir::new().unwrap();
        let mut writer = MonarchWriter::create(dir.path().join("frozen.mon")).unwrap();
        writer.header_mut().unwrap().set_record_size(8);
        writer.write_header().unwrap();

        assert!(writer.header_mut().is_err());
        assert!(writer.write_header().is_err());
        assert_eq!(writer.record_interleaved_mut().unwrap().data.len(), 16);
    }

    #[test]
    fn test_close_twice() {
        let dir = TempDir::new().unwrap();
        let mut writer = MonarchWriter::create(dir.path().join("twice.mon")).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(!writer.is_open());
        assert!(matches!(writer.write_record(), Err(Error::InvalidState { .. })));
    }

    /// A file that fails once, after accepting `budget` more bytes.
    #[derive(Debug)]
    struct ShortFile {
        file: File,
        budget: Option<usize>,
    }

    impl Write for ShortFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match self.budget {
                Some(0) => {
                    self.budget = None;
                    Err(io::Error::new(io::ErrorKind::Other, "no space left"))
                }
                Some(left) => {
                    let n = self.file.write(&buf[..buf.len().min(left)])?;
                    self.budget = Some(left - n);
                    Ok(n)
                }
                None => self.file.write(buf),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl Seek for ShortFile {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.file.seek(pos)
        }
    }

    impl RecordSink for ShortFile {
        fn truncate(&mut self, len: u64) -> io::Result<()> {
            self.file.set_len(len)
        }
    }

    fn fill(writer: &mut MonarchWriter<ShortFile>, record_id: u64, byte: u8) -> Result<()> {
        let record = writer.record_interleaved_mut()?;
        record.record_id = record_id;
        record.data.fill(byte);
        writer.write_record()
    }

    #[test]
    fn test_failed_record_leaves_file_aligned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("torn.mon");
        let sink = ShortFile {
            file: File::create(&path).unwrap(),
            budget: None,
        };
        let mut writer = MonarchWriter::with_sink(&path, sink);
        writer.header_mut().unwrap().set_record_size(8);
        writer.write_header().unwrap();

        fill(&mut writer, 0, 1).unwrap();

        // Part of the prefix and none of the data reach the file.
        writer.file.as_mut().unwrap().get_mut().budget = Some(10);
        assert!(matches!(fill(&mut writer, 1, 2), Err(Error::Io(_))));
        assert_eq!(writer.records_written(), 1);
        assert!(writer.is_open());

        fill(&mut writer, 1, 3).unwrap();
        writer.close().unwrap();

        let mut reader = crate::open_for_reading(&path).unwrap();
        reader.read_header().unwrap();
        assert!(reader.read_record().unwrap());
        assert_eq!(reader.record_one().record_id, 0);
        assert_eq!(reader.record_one().data, vec![1u8; 8]);
        assert!(reader.read_record().unwrap());
        assert_eq!(reader.record_one().record_id, 1);
        assert_eq!(reader.record_two().unwrap().data, vec![3u8; 8]);
        assert!(!reader.read_record().unwrap());
    }
}
