//! The Monarch file header and its on-disk encoding.
//!
//! A file starts with a fixed preamble followed by the header fields:
//!
//! ```text
//! magic        4 bytes   "MNRC"
//! version      u16
//! filename     u32 length + UTF-8 bytes
//! acq_rate     f64       (MHz)
//! acq_mode     u8        1 = one channel, 2 = two channels
//! record_size  u64       bytes per channel per record
//! acq_time     u64
//! ```
//!
//! All integers and floats are little-endian.

use std::fmt;
use std::io::{Read, Write};

use crate::error::{Error, Result};

/// Magic bytes at the start of every Monarch file.
pub const MAGIC: [u8; 4] = *b"MNRC";

/// Container version written by this crate.
pub const VERSION: u16 = 1;

/// Longest filename accepted when decoding a header.
const MAX_FILENAME_LEN: u32 = 64 * 1024;

/// Number of channels recorded simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AcquisitionMode {
    /// A single digitizer channel.
    OneChannel,
    /// Two digitizer channels sampled together.
    #[default]
    TwoChannel,
}

impl AcquisitionMode {
    /// Number of channels stored per record.
    pub const fn channel_count(self) -> usize {
        match self {
            AcquisitionMode::OneChannel => 1,
            AcquisitionMode::TwoChannel => 2,
        }
    }

    /// The name used when surfacing the mode to callers.
    pub const fn as_str(self) -> &'static str {
        match self {
            AcquisitionMode::OneChannel => "OneChannel",
            AcquisitionMode::TwoChannel => "TwoChannel",
        }
    }

    fn to_byte(self) -> u8 {
        self.channel_count() as u8
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(AcquisitionMode::OneChannel),
            2 => Some(AcquisitionMode::TwoChannel),
            _ => None,
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquisition metadata stored at the start of a Monarch file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonarchHeader {
    filename: String,
    acq_rate: f64,
    acq_mode: AcquisitionMode,
    record_size: u64,
    acq_time: u64,
}

impl MonarchHeader {
    /// Create an empty header (two channels, zero record size).
    pub fn new() -> Self {
        Self::default()
    }

    /// Filename recorded by the acquisition.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Digitization rate in MHz.
    pub fn acq_rate(&self) -> f64 {
        self.acq_rate
    }

    /// Acquisition mode (channel count).
    pub fn acq_mode(&self) -> AcquisitionMode {
        self.acq_mode
    }

    /// Bytes per channel per record.
    pub fn record_size(&self) -> u64 {
        self.record_size
    }

    /// Acquisition time.
    pub fn acq_time(&self) -> u64 {
        self.acq_time
    }

    /// Set the filename.
    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Set the digitization rate in MHz.
    pub fn set_acq_rate(&mut self, rate: f64) {
        self.acq_rate = rate;
    }

    /// Set the acquisition mode.
    pub fn set_acq_mode(&mut self, mode: AcquisitionMode) {
        self.acq_mode = mode;
    }

    /// Set the record size in bytes per channel.
    pub fn set_record_size(&mut self, size: u64) {
        self.record_size = size;
    }

    /// Set the acquisition time.
    pub fn set_acq_time(&mut self, time: u64) {
        self.acq_time = time;
    }

    /// Bytes of sample data in one interleaved record (all channels).
    pub fn interleaved_len(&self) -> Option<usize> {
        usize::try_from(self.record_size)
            .ok()?
            .checked_mul(self.acq_mode.channel_count())
    }

    /// Encode the preamble and header fields.
    pub(crate) fn encode<W: Write>(&self, out: &mut W) -> Result<()> {
        let name = self.filename.as_bytes();
        let name_len = u32::try_from(name.len())
            .ok()
            .filter(|len| *len <= MAX_FILENAME_LEN)
            .ok_or_else(|| Error::header_write("filename too long"))?;

        out.write_all(&MAGIC)?;
        out.write_all(&VERSION.to_le_bytes())?;
        out.write_all(&name_len.to_le_bytes())?;
        out.write_all(name)?;
        out.write_all(&self.acq_rate.to_le_bytes())?;
        out.write_all(&[self.acq_mode.to_byte()])?;
        out.write_all(&self.record_size.to_le_bytes())?;
        out.write_all(&self.acq_time.to_le_bytes())?;
        Ok(())
    }

    /// Decode the preamble and header fields.
    pub(crate) fn decode<R: Read>(input: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_exact(input, &mut magic)?;
        if magic != MAGIC {
            return Err(Error::header_read(format!(
                "bad magic: expected {:?}, found {:?}",
                MAGIC, magic
            )));
        }

        let version = u16::from_le_bytes(read_array(input)?);
        if version != VERSION {
            return Err(Error::header_read(format!(
                "unsupported container version {}",
                version
            )));
        }

        let name_len = u32::from_le_bytes(read_array(input)?);
        if name_len > MAX_FILENAME_LEN {
            return Err(Error::header_read(format!(
                "filename length {} exceeds limit",
                name_len
            )));
        }
        let mut name = vec![0u8; name_len as usize];
        read_exact(input, &mut name)?;
        let filename = String::from_utf8(name)
            .map_err(|_| Error::header_read("filename is not valid UTF-8"))?;

        let acq_rate = f64::from_le_bytes(read_array(input)?);
        let [mode_byte]: [u8; 1] = read_array(input)?;
        let acq_mode = AcquisitionMode::from_byte(mode_byte).ok_or_else(|| {
            Error::header_read(format!("unknown acquisition mode {}", mode_byte))
        })?;
        let record_size = u64::from_le_bytes(read_array(input)?);
        let acq_time = u64::from_le_bytes(read_array(input)?);

        Ok(MonarchHeader {
            filename,
            acq_rate,
            acq_mode,
            record_size,
            acq_time,
        })
    }
}

fn read_exact<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
    input.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::header_read("file ends inside the header")
        } else {
            Error::Io(e)
        }
    })
}

fn read_array<R: Read, const N: usize>(input: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_exact(input, &mut buf)?;
    Ok(buf)
}
