//! # monarch-rs
//!
//! A single-session interface to Monarch files: at most one file is open at
//! a time, either for reading or for writing.
//!
//! Monarch files hold digitizer records of one or two channels. This crate
//! sits between a command dispatcher (a scripting host, a CLI) and the
//! container itself, and guarantees:
//!
//! - only one handle is open, and a second `open` is refused
//! - every read or write on a closed (or wrong-mode) session is a reported
//!   [`ErrorKind::NoFileOpen`], never a panic
//! - record geometry is fixed by the header; writes of any other shape are
//!   rejected
//!
//! ## Quick Start
//!
//! ```no_run
//! use monarch_rs::{AccessMode, FileSession, NextOutcome, Payload, Result};
//!
//! fn main() -> Result<()> {
//!     let session = FileSession::new();
//!
//!     // New files get the default geometry: two channels, 4194304 bytes
//!     // per channel, 250 MHz.
//!     session.open("a.mon", AccessMode::Write)?;
//!     session.write(Payload::row(&vec![0xAB; 4194304]))?;
//!     session.close();
//!
//!     session.open("a.mon", AccessMode::Read)?;
//!     let header = session.header()?;
//!     println!("{} at {} MHz", header.acquisition_mode, header.acquisition_rate);
//!
//!     loop {
//!         match session.next()? {
//!             NextOutcome::Record(record) => {
//!                 println!("record {}: {} bytes", record.record_id, record.data()?.len());
//!             }
//!             NextOutcome::EndOfStream => break,
//!         }
//!     }
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Writing a single channel
//!
//! [`FileSession::write`] takes one logical channel. For two-channel files
//! that byte stream is written into both channels, so both read back equal
//! to the payload.
//!
//! ## Feature Flags
//!
//! - `ndarray`: [`Record::to_array`] and `Payload::from_array`

#![deny(missing_docs)]

// Modules
mod backend;
mod config;
mod error;
mod header;
mod mode;
mod record;
mod session;
mod state;

#[cfg(feature = "ndarray")]
mod array;

// Public exports
pub use backend::{FileBackend, MonarchBackend, ReadHandle, WriteHandle};
pub use config::{WriteConfig, DEFAULT_ACQUISITION_RATE, DEFAULT_RECORD_SIZE};
pub use error::{Error, ErrorKind, Result};
pub use header::{HeaderDescriptor, HEADER_FIELDS};
pub use mode::{AccessMode, Action};
pub use record::{Payload, Record, RecordBuffer, RECORD_FIELDS};
pub use session::FileSession;
pub use state::{CloseOutcome, NextOutcome, SessionState};

// The container types appear in the backend traits and close outcomes.
pub use monarch_format::{AcquisitionMode, MonarchHeader, MonarchRecord};
pub use monarch_format::Error as ContainerError;

// Conditional re-exports
#[cfg(feature = "ndarray")]
pub use ndarray;
