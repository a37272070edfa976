//! Record geometry and channel (de-)interleaving.
//!
//! # Channel layout
//!
//! The container stores the samples of all channels interleaved:
//! `ch0[0], ch1[0], ch0[1], ch1[1], ...`. Callers see channels separately
//! (a [`Record`] holds one buffer per channel) or concatenated in channel
//! order ([`Record::data`]).
//!
//! # Writing a single logical channel
//!
//! A write supplies one channel of `record_size` bytes. Every channel slot of
//! the interleaved record receives that same byte, so a two-channel file
//! written this way reads back with both channels equal to the payload.

use monarch_format::MonarchRecord;

use crate::error::{Error, Result};
use crate::header::HeaderDescriptor;

/// Field names used when surfacing a record to a dispatcher.
pub const RECORD_FIELDS: [&str; 4] = ["acquisition_id", "record_id", "timestamp", "data"];

/// A write payload: a `rows × cols` matrix of bytes in row-major order.
///
/// Only `[1, record_size]` payloads are accepted by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    rows: usize,
    cols: usize,
    data: &'a [u8],
}

impl<'a> Payload<'a> {
    /// A payload with an explicit shape.
    ///
    /// The shape is not checked against `data.len()` here; the session
    /// rejects inconsistent payloads.
    pub fn new(rows: usize, cols: usize, data: &'a [u8]) -> Self {
        Payload { rows, cols, data }
    }

    /// A single-row payload, `[1, data.len()]`.
    pub fn row(data: &'a [u8]) -> Self {
        Payload::new(1, data.len(), data)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The raw bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// One record read from (or written to) a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Acquisition this record belongs to.
    pub acquisition_id: u64,
    /// Position of the record within the file.
    pub record_id: u64,
    /// Digitizer clock tick of the first sample.
    pub timestamp: u64,
    /// One buffer per channel, each `record_size` bytes long.
    channels: Vec<Vec<u8>>,
}

impl Record {
    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Bytes per channel.
    pub fn record_size(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples of channel `index`.
    pub fn channel(&self, index: usize) -> Option<&[u8]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channel buffers in channel order.
    pub fn channels(&self) -> &[Vec<u8>] {
        &self.channels
    }

    /// Concatenation of all channels in channel order.
    ///
    /// The result is `channel_count() * record_size()` bytes long; channel 1
    /// starts at byte offset `record_size()`.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the buffer can't be allocated.
    pub fn data(&self) -> Result<Vec<u8>> {
        let total = self.channel_count() * self.record_size();
        let mut data = try_buffer(total)?;
        for channel in &self.channels {
            data.extend_from_slice(channel);
        }
        Ok(data)
    }
}

/// Converts between a session's record geometry and container records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordBuffer {
    record_size: usize,
    channels: usize,
}

impl RecordBuffer {
    /// Geometry of `header`.
    ///
    /// The header must have passed [`HeaderDescriptor::validate`].
    pub fn for_header(header: &HeaderDescriptor) -> Self {
        RecordBuffer {
            record_size: usize::try_from(header.record_size).unwrap_or(usize::MAX),
            channels: header.channel_count(),
        }
    }

    /// Bytes per channel.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Channels per record.
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Check that `payload` is a single channel of one record.
    pub fn check_payload(&self, payload: &Payload<'_>) -> Result<()> {
        let fits = payload.rows == 1
            && payload.cols == self.record_size
            && payload.data.len() == self.record_size;
        if fits {
            Ok(())
        } else {
            Err(Error::ShapeMismatch {
                expected_cols: self.record_size as u64,
                rows: payload.rows,
                cols: payload.cols,
                len: payload.data.len(),
            })
        }
    }

    /// Spread one logical channel over every channel slot of `out`.
    ///
    /// `out[channels * i + c] = samples[i]` for each channel `c`.
    pub fn interleave(&self, samples: &[u8], out: &mut MonarchRecord) -> Result<()> {
        let expected = self.record_size * self.channels;
        if samples.len() != self.record_size || out.data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected_cols: self.record_size as u64,
                rows: 1,
                cols: samples.len(),
                len: samples.len(),
            });
        }
        for (slot, &sample) in out.data.chunks_exact_mut(self.channels).zip(samples) {
            slot.fill(sample);
        }
        Ok(())
    }

    /// Assemble a [`Record`] from the container's per-channel records.
    ///
    /// Channel 0 comes from `one`, channel 1 (two-channel geometry only)
    /// from `two`. Each channel copies exactly `record_size` bytes.
    pub fn collect(&self, one: &MonarchRecord, two: Option<&MonarchRecord>) -> Result<Record> {
        let sources: Vec<&MonarchRecord> = match (self.channels, two) {
            (1, _) => vec![one],
            (2, Some(two)) => vec![one, two],
            (_, _) => {
                return Err(Error::Read(monarch_format::Error::invalid_state(
                    "second channel missing from a two-channel record",
                )))
            }
        };

        let mut channels = Vec::with_capacity(sources.len());
        for source in sources {
            let bytes = source.data.get(..self.record_size).ok_or_else(|| {
                Error::Read(monarch_format::Error::TruncatedRecord {
                    expected: self.record_size,
                    found: source.data.len(),
                })
            })?;
            let mut channel = try_buffer(self.record_size)?;
            channel.extend_from_slice(bytes);
            channels.push(channel);
        }

        Ok(Record {
            acquisition_id: one.acquisition_id,
            record_id: one.record_id,
            timestamp: one.tick,
            channels,
        })
    }
}

fn try_buffer(bytes: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|_| Error::Allocation { bytes })?;
    Ok(buf)
}
