//! The session facade a dispatcher calls.
//!
//! [`FileSession`] wraps one [`SessionState`] in a mutex so that every
//! operation sees and leaves a consistent state, whichever thread calls it.
//!
//! # Example
//!
//! ```no_run
//! use monarch_rs::{AccessMode, FileSession, NextOutcome, Payload};
//!
//! let session = FileSession::new();
//! session.open("a.mon", AccessMode::Write)?;
//! session.write(Payload::row(&vec![0xAB; 4194304]))?;
//! session.close();
//!
//! session.open("a.mon", AccessMode::Read)?;
//! println!("{:?}", session.header()?);
//! while let NextOutcome::Record(record) = session.next()? {
//!     println!("record {}", record.record_id);
//! }
//! session.close();
//! # Ok::<(), monarch_rs::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::backend::{FileBackend, MonarchBackend};
use crate::config::WriteConfig;
use crate::error::Result;
use crate::header::HeaderDescriptor;
use crate::mode::AccessMode;
use crate::record::Payload;
use crate::state::{CloseOutcome, NextOutcome, SessionState};

/// At most one open Monarch file, shared behind a lock.
///
/// # Thread Safety
///
/// All operations lock the session for their full duration, so calls from
/// different threads are serialized. `FileSession<FileBackend>` is `Sync`
/// and can live in a static (see [`FileSession::global`]).
pub struct FileSession<B: MonarchBackend = FileBackend> {
    backend: B,
    config: WriteConfig,
    state: Mutex<SessionState<B>>,
}

impl FileSession<FileBackend> {
    /// A closed session over files on disk, with default write settings.
    pub fn new() -> Self {
        Self::with_backend(FileBackend)
    }

    /// The process-wide session.
    ///
    /// Created closed on first use.
    pub fn global() -> &'static FileSession<FileBackend> {
        static GLOBAL: OnceLock<FileSession<FileBackend>> = OnceLock::new();
        GLOBAL.get_or_init(FileSession::new)
    }
}

impl Default for FileSession<FileBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: MonarchBackend> FileSession<B> {
    /// A closed session over `backend`, with default write settings.
    pub fn with_backend(backend: B) -> Self {
        Self::with_config(backend, WriteConfig::default())
    }

    /// A closed session over `backend` that stamps new files with `config`.
    pub fn with_config(backend: B, config: WriteConfig) -> Self {
        FileSession {
            backend,
            config,
            state: Mutex::new(SessionState::Closed),
        }
    }

    /// Settings used for files opened for writing.
    pub fn config(&self) -> &WriteConfig {
        &self.config
    }

    /// Replace the write settings. Takes effect at the next write-open.
    pub fn set_config(&mut self, config: WriteConfig) {
        self.config = config;
    }

    /// Open `path` for reading or writing.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyOpen`](crate::Error::AlreadyOpen) if a file is open
    /// - [`Error::Open`](crate::Error::Open) if the file can't be opened, or
    ///   its header can't be read or is invalid
    /// - [`Error::HeaderWrite`](crate::Error::HeaderWrite) if the header of a
    ///   new file can't be written
    pub fn open(&self, path: impl AsRef<Path>, mode: AccessMode) -> Result<()> {
        self.lock()
            .open(&self.backend, &self.config, path.as_ref(), mode)
    }

    /// Close the open file, if any. Never fails.
    pub fn close(&self) {
        self.close_reporting();
    }

    /// Close the open file and report what happened.
    ///
    /// The session is closed afterwards even if the underlying close failed.
    pub fn close_reporting(&self) -> CloseOutcome {
        self.lock().close()
    }

    /// Whether any file is open.
    pub fn status(&self) -> bool {
        self.lock().is_open()
    }

    /// Mode of the open file, if any.
    pub fn mode(&self) -> Option<AccessMode> {
        self.lock().mode()
    }

    /// Path of the open file, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path().map(Path::to_path_buf)
    }

    /// Read the next record of the file open for reading.
    ///
    /// # Errors
    ///
    /// - [`Error::NoFileOpen`](crate::Error::NoFileOpen) unless open for reading
    /// - [`Error::Read`](crate::Error::Read) if the file is damaged
    /// - [`Error::Allocation`](crate::Error::Allocation) if the record can't be buffered
    pub fn next(&self) -> Result<NextOutcome> {
        self.lock().next()
    }

    /// Header of the file open for reading.
    ///
    /// # Errors
    ///
    /// [`Error::NoFileOpen`](crate::Error::NoFileOpen) unless open for reading.
    pub fn header(&self) -> Result<HeaderDescriptor> {
        self.lock().header().cloned()
    }

    /// Append one record to the file open for writing.
    ///
    /// `payload` must be a single channel shaped `[1, record_size]`.
    ///
    /// # Errors
    ///
    /// - [`Error::NoFileOpen`](crate::Error::NoFileOpen) unless open for writing
    /// - [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) for any other shape
    /// - [`Error::Write`](crate::Error::Write) if the record can't be written
    pub fn write(&self, payload: Payload<'_>) -> Result<()> {
        self.lock().write(payload)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<B>> {
        // The state is a plain enum with no half-applied updates, so a
        // panic in another caller leaves it usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: MonarchBackend> std::fmt::Debug for FileSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSession")
            .field("config", &self.config)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}
