//! Reading Monarch files.
//!
//! [`MonarchReader`] follows the container's access sequence: open the file,
//! read the header once, then call [`read_record`](MonarchReader::read_record)
//! until it returns `false`. After each successful read the per-channel
//! buffers are available through [`record_one`](MonarchReader::record_one)
//! and [`record_two`](MonarchReader::record_two).
//!
//! # Example
//!
//! ```no_run
//! use monarch_format::MonarchReader;
//!
//! let mut reader = MonarchReader::open("run.mon")?;
//! let record_size = reader.read_header()?.record_size();
//! while reader.read_record()? {
//!     let first = reader.record_one();
//!     println!("record {} ({} bytes)", first.record_id, record_size);
//! }
//! reader.close()?;
//! # Ok::<(), monarch_format::Error>(())
//! ```

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::header::MonarchHeader;
use crate::record::{MonarchRecord, RECORD_PREFIX_LEN};

/// A Monarch file opened for reading.
///
/// The file is closed when the reader is dropped; call
/// [`close`](Self::close) to observe close errors.
#[derive(Debug)]
pub struct MonarchReader {
    /// Path to the file (for error messages).
    path: PathBuf,

    /// Buffered file handle. `None` once closed.
    file: Option<BufReader<File>>,

    /// Header, present after `read_header` succeeds.
    header: Option<MonarchHeader>,

    /// Scratch buffer for the interleaved sample block.
    interleaved: Vec<u8>,

    /// Channel buffers, one per recorded channel.
    channels: Vec<MonarchRecord>,

    /// Count of records read so far.
    records_read: u64,
}

impl MonarchReader {
    /// Open a Monarch file for reading.
    ///
    /// # Errors
    ///
    /// [`Error::OpenFailed`] if the file doesn't exist or isn't readable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::OpenFailed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened Monarch file for reading");

        Ok(MonarchReader {
            path,
            file: Some(BufReader::new(file)),
            header: None,
            interleaved: Vec::new(),
            channels: Vec::new(),
            records_read: 0,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the header.
    ///
    /// Record buffers are sized later, by the first
    /// [`read_record`](Self::read_record) that finds a whole record in the
    /// file, so a header can't make the reader allocate more than the file
    /// holds.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the header was already read
    /// - [`Error::HeaderRead`] if the header is malformed or its record
    ///   geometry overflows the address space
    pub fn read_header(&mut self) -> Result<&MonarchHeader> {
        if self.header.is_some() {
            return Err(Error::invalid_state("Header has already been read"));
        }
        let file = self.file.as_mut().ok_or(Error::FileClosed)?;
        let header = MonarchHeader::decode(file)?;

        let total = header
            .interleaved_len()
            .ok_or_else(|| Error::header_read("record size does not fit in memory"))?;
        RECORD_PREFIX_LEN
            .checked_add(total)
            .ok_or_else(|| Error::header_read("record size does not fit in memory"))?;

        Ok(self.header.insert(header))
    }

    /// The header, if it has been read.
    pub fn header(&self) -> Option<&MonarchHeader> {
        self.header.as_ref()
    }

    /// Read the next record into the channel buffers.
    ///
    /// Returns `Ok(false)` at a clean end of file (no bytes left at a record
    /// boundary).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if the header hasn't been read
    /// - [`Error::TruncatedRecord`] if the file ends inside a record
    /// - [`Error::Io`] on read failure
    pub fn read_record(&mut self) -> Result<bool> {
        let Some(header) = self.header.as_ref() else {
            return Err(Error::invalid_state("Header must be read before records"));
        };
        let channel_count = header.acq_mode().channel_count();
        let total = header.interleaved_len().unwrap_or(usize::MAX);
        let expected = RECORD_PREFIX_LEN.saturating_add(total);
        let file = self.file.as_mut().ok_or(Error::FileClosed)?;

        let remaining = remaining_len(file)?;
        if remaining == 0 {
            return Ok(false);
        }
        if remaining < expected as u64 {
            return Err(Error::TruncatedRecord {
                expected,
                found: remaining as usize,
            });
        }

        if self.interleaved.len() != total {
            self.interleaved = try_zeroed(total)?;
            self.channels = (0..channel_count)
                .map(|_| {
                    try_zeroed(total / channel_count).map(|data| MonarchRecord {
                        data,
                        ..MonarchRecord::default()
                    })
                })
                .collect::<Result<_>>()?;
        }

        let mut prefix = [0u8; RECORD_PREFIX_LEN];
        let got = read_full(file, &mut prefix)?;
        if got == 0 {
            return Ok(false);
        }
        if got < RECORD_PREFIX_LEN {
            return Err(Error::TruncatedRecord { expected, found: got });
        }

        let got_data = read_full(file, &mut self.interleaved)?;
        if got_data < self.interleaved.len() {
            return Err(Error::TruncatedRecord {
                expected,
                found: RECORD_PREFIX_LEN + got_data,
            });
        }

        let stride = self.channels.len();
        for (channel_idx, channel) in self.channels.iter_mut().enumerate() {
            channel.set_prefix(&prefix);
            for (sample, byte) in channel.data.iter_mut().enumerate() {
                *byte = self.interleaved[stride * sample + channel_idx];
            }
        }

        self.records_read += 1;
        Ok(true)
    }

    /// First channel of the current record.
    ///
    /// Empty until a record has been read.
    pub fn record_one(&self) -> &MonarchRecord {
        static EMPTY: MonarchRecord = MonarchRecord {
            acquisition_id: 0,
            record_id: 0,
            tick: 0,
            data: Vec::new(),
        };
        self.channels.first().unwrap_or(&EMPTY)
    }

    /// Second channel of the current record, for two-channel files.
    pub fn record_two(&self) -> Option<&MonarchRecord> {
        self.channels.get(1)
    }

    /// Number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Close the file. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), records = self.records_read, "closed Monarch reader");
        }
        Ok(())
    }

    /// Whether the reader still holds its file.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for MonarchReader {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to close Monarch reader");
        }
    }
}

/// Fill `buf` as far as the input allows, returning the byte count.
fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}

/// Bytes between the read position and the current end of the file.
fn remaining_len(file: &mut BufReader<File>) -> Result<u64> {
    let position = file.stream_position()?;
    let len = file.get_ref().metadata()?.len();
    Ok(len.saturating_sub(position))
}

fn try_zeroed(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent() {
        let result = MonarchReader::open("/nonexistent/path/to/file.mon");

        match result.unwrap_err() {
            Error::OpenFailed { path, .. } => {
                assert!(path.to_str().unwrap().contains("nonexistent"));
            }
            other => panic!("Expected OpenFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_read_full_stops_at_eof() {
        let mut input: &[u8] = &[1, 2, 3];
        let mut buf = [0u8; 8];
        assert_eq!(read_full(&mut input, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_oversized_buffer_is_allocation_error() {
        match try_zeroed(usize::MAX) {
            Err(Error::Allocation { bytes }) => assert_eq!(bytes, usize::MAX),
            other => panic!("Expected Allocation, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_record_size_needs_backing_bytes() {
        use crate::header::AcquisitionMode;
        use std::io::Write;

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("huge.mon");
        let mut header = MonarchHeader::new();
        header.set_acq_mode(AcquisitionMode::TwoChannel);
        header.set_record_size(1 << 28);
        let mut bytes = Vec::new();
        header.encode(&mut bytes).unwrap();
        std::fs::write(&path, &bytes).unwrap();

        // Header only: a clean end of file, nothing allocated.
        let mut reader = MonarchReader::open(&path).unwrap();
        assert_eq!(reader.read_header().unwrap().record_size(), 1 << 28);
        assert!(!reader.read_record().unwrap());
        assert_eq!(reader.interleaved.capacity(), 0);
        assert!(reader.channels.is_empty());

        // A few stray bytes after the header are a truncated record, still
        // without allocating the declared geometry.
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0u8; 100]).unwrap();
        drop(file);

        let mut reader = MonarchReader::open(&path).unwrap();
        reader.read_header().unwrap();
        match reader.read_record() {
            Err(Error::TruncatedRecord { expected, found }) => {
                assert_eq!(expected, RECORD_PREFIX_LEN + (2 << 28));
                assert_eq!(found, 100);
            }
            other => panic!("Expected TruncatedRecord, got {:?}", other),
        }
        assert_eq!(reader.interleaved.capacity(), 0);
    }
}
