//! The session state machine.
//!
//! # States
//!
//! ```text
//!            open(path, Read)                open(path, Write)
//! OpenForRead <────────────── Closed ──────────────> OpenForWrite
//!   │  ▲  next / header        ▲  ▲        write       │  ▲
//!   └──┘                       │  │                    └──┘
//!   └──────── close ───────────┘  └────── close ────────┘
//! ```
//!
//! Only one handle exists at a time: the state owns it, and leaving an open
//! state drops it.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backend::{MonarchBackend, ReadHandle, WriteHandle};
use crate::config::WriteConfig;
use crate::error::{Error, Result};
use crate::header::HeaderDescriptor;
use crate::mode::AccessMode;
use crate::record::{Payload, Record, RecordBuffer};

/// Result of a successful `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// The next record.
    Record(Record),
    /// No records remain.
    EndOfStream,
}

/// What `close` found and did.
#[derive(Debug)]
pub enum CloseOutcome {
    /// Nothing was open.
    AlreadyClosed,
    /// The handle was closed cleanly.
    Closed(AccessMode),
    /// The underlying close failed; the session is closed regardless.
    Forced(AccessMode, monarch_format::Error),
}

impl CloseOutcome {
    /// Whether the underlying close of an open handle failed.
    pub fn failed(&self) -> bool {
        matches!(self, CloseOutcome::Forced(..))
    }
}

/// Session state over backend `B`.
pub enum SessionState<B: MonarchBackend> {
    /// No file open.
    Closed,

    /// A file open for reading.
    OpenForRead {
        /// The open handle.
        handle: B::Reader,
        /// Header read at open time.
        header: HeaderDescriptor,
        /// Path that was opened.
        path: PathBuf,
    },

    /// A file open for writing.
    OpenForWrite {
        /// The open handle.
        handle: B::Writer,
        /// Header persisted at open time.
        header: HeaderDescriptor,
        /// Path that was created.
        path: PathBuf,
        /// Records written so far; the next record's id.
        records_written: u64,
    },
}

impl<B: MonarchBackend> Default for SessionState<B> {
    fn default() -> Self {
        SessionState::Closed
    }
}

impl<B: MonarchBackend> std::fmt::Debug for SessionState<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Closed => f.write_str("Closed"),
            SessionState::OpenForRead { path, header, .. } => f
                .debug_struct("OpenForRead")
                .field("path", path)
                .field("header", header)
                .finish_non_exhaustive(),
            SessionState::OpenForWrite {
                path,
                header,
                records_written,
                ..
            } => f
                .debug_struct("OpenForWrite")
                .field("path", path)
                .field("header", header)
                .field("records_written", records_written)
                .finish_non_exhaustive(),
        }
    }
}

impl<B: MonarchBackend> SessionState<B> {
    /// Mode of the open file, if any.
    pub fn mode(&self) -> Option<AccessMode> {
        match self {
            SessionState::Closed => None,
            SessionState::OpenForRead { .. } => Some(AccessMode::Read),
            SessionState::OpenForWrite { .. } => Some(AccessMode::Write),
        }
    }

    /// Whether any file is open.
    pub fn is_open(&self) -> bool {
        self.mode().is_some()
    }

    /// Path of the open file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SessionState::Closed => None,
            SessionState::OpenForRead { path, .. } | SessionState::OpenForWrite { path, .. } => {
                Some(path)
            }
        }
    }

    /// Open `path` in `mode`.
    ///
    /// On failure the state stays `Closed` and any handle acquired along the
    /// way has been released.
    pub fn open(
        &mut self,
        backend: &B,
        config: &WriteConfig,
        path: &Path,
        mode: AccessMode,
    ) -> Result<()> {
        if let Some(open_mode) = self.mode() {
            return Err(Error::AlreadyOpen { mode: open_mode });
        }

        *self = match mode {
            AccessMode::Read => Self::open_read(backend, path)?,
            AccessMode::Write => Self::open_write(backend, config, path)?,
        };
        info!(path = %path.display(), mode = %mode, "opened Monarch session");
        Ok(())
    }

    fn open_read(backend: &B, path: &Path) -> Result<Self> {
        let mut handle = backend
            .open_for_reading(path)
            .map_err(|e| Error::open(path, e))?;

        let header = match handle.read_header() {
            Ok(raw) => HeaderDescriptor::from(&raw),
            Err(e) => {
                release(path, handle.close());
                return Err(Error::open(path, e));
            }
        };
        if let Err(reason) = header.validate() {
            release(path, handle.close());
            return Err(Error::open(path, monarch_format::Error::header_read(reason)));
        }

        debug!(?header, "read header");
        Ok(SessionState::OpenForRead {
            handle,
            header,
            path: path.to_path_buf(),
        })
    }

    fn open_write(backend: &B, config: &WriteConfig, path: &Path) -> Result<Self> {
        let mut handle = backend
            .open_for_writing(path)
            .map_err(|e| Error::open(path, e))?;

        let header = HeaderDescriptor::for_write(path.to_string_lossy(), config);
        let prepared = config
            .validate()
            .and_then(|()| header.validate())
            .map_err(|reason| monarch_format::Error::header_write(reason))
            .and_then(|()| {
                header.apply_to(handle.header_mut()?);
                handle.write_header()
            });
        if let Err(e) = prepared {
            release(path, handle.close());
            return Err(Error::header_write(path, e));
        }

        debug!(?header, "wrote header");
        Ok(SessionState::OpenForWrite {
            handle,
            header,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    /// Close whatever is open and return to `Closed`.
    ///
    /// Never fails: a failed underlying close is logged and reported in the
    /// outcome, and the state is `Closed` afterwards either way.
    pub fn close(&mut self) -> CloseOutcome {
        let (mode, path, result) = match std::mem::take(self) {
            SessionState::Closed => return CloseOutcome::AlreadyClosed,
            SessionState::OpenForRead {
                mut handle, path, ..
            } => (AccessMode::Read, path, handle.close()),
            SessionState::OpenForWrite {
                mut handle, path, ..
            } => (AccessMode::Write, path, handle.close()),
        };

        match result {
            Ok(()) => {
                info!(path = %path.display(), "closed Monarch session");
                CloseOutcome::Closed(mode)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "close failed; session marked closed anyway");
                CloseOutcome::Forced(mode, e)
            }
        }
    }

    /// Header of the file open for reading.
    pub fn header(&self) -> Result<&HeaderDescriptor> {
        match self {
            SessionState::OpenForRead { header, .. } => Ok(header),
            _ => Err(Error::NoFileOpen {
                wanted: AccessMode::Read,
            }),
        }
    }

    /// Read the next record.
    pub fn next(&mut self) -> Result<NextOutcome> {
        let SessionState::OpenForRead { handle, header, .. } = self else {
            return Err(Error::NoFileOpen {
                wanted: AccessMode::Read,
            });
        };

        if !handle.read_record().map_err(Error::read)? {
            debug!("end of stream");
            return Ok(NextOutcome::EndOfStream);
        }
        let geometry = RecordBuffer::for_header(header);
        let record = geometry.collect(handle.record_one(), handle.record_two())?;
        Ok(NextOutcome::Record(record))
    }

    /// Append one record built from a single-channel payload.
    ///
    /// The record is stamped with `record_id` = records written so far,
    /// `acquisition_id` 0 and `timestamp` = `record_id * record_size`.
    pub fn write(&mut self, payload: Payload<'_>) -> Result<()> {
        let SessionState::OpenForWrite {
            handle,
            header,
            records_written,
            ..
        } = self
        else {
            return Err(Error::NoFileOpen {
                wanted: AccessMode::Write,
            });
        };

        let geometry = RecordBuffer::for_header(header);
        geometry.check_payload(&payload)?;

        let record = handle.record_interleaved_mut().map_err(Error::Write)?;
        geometry.interleave(payload.data(), record)?;
        record.acquisition_id = 0;
        record.record_id = *records_written;
        record.tick = records_written.saturating_mul(header.record_size);

        handle.write_record().map_err(Error::Write)?;
        *records_written += 1;
        Ok(())
    }
}

/// Log the close of a handle abandoned after a failed open step.
fn release(path: &Path, closed: monarch_format::Result<()>) {
    if let Err(e) = closed {
        warn!(path = %path.display(), error = %e, "failed to release handle after open error");
    }
}
