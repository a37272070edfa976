//! Record buffers exposed by the reader and writer.

/// Bytes preceding the sample data of every stored record
/// (acquisition id, record id, tick).
pub const RECORD_PREFIX_LEN: usize = 24;

/// One record: identifiers plus a fixed-size sample buffer.
///
/// On the reader side there is one `MonarchRecord` per channel. On the
/// writer side a single interleaved record holds every channel, sample by
/// sample (`ch0[0], ch1[0], ch0[1], ch1[1], ...`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonarchRecord {
    /// Acquisition this record belongs to.
    pub acquisition_id: u64,
    /// Position of the record within the acquisition.
    pub record_id: u64,
    /// Digitizer clock tick of the first sample.
    pub tick: u64,
    /// Sample bytes.
    pub data: Vec<u8>,
}

impl MonarchRecord {
    /// Create a zero-filled record holding `len` sample bytes.
    pub fn with_len(len: usize) -> Self {
        MonarchRecord {
            data: vec![0; len],
            ..Self::default()
        }
    }

    pub(crate) fn encode_prefix(&self) -> [u8; RECORD_PREFIX_LEN] {
        let mut prefix = [0u8; RECORD_PREFIX_LEN];
        prefix[0..8].copy_from_slice(&self.acquisition_id.to_le_bytes());
        prefix[8..16].copy_from_slice(&self.record_id.to_le_bytes());
        prefix[16..24].copy_from_slice(&self.tick.to_le_bytes());
        prefix
    }

    pub(crate) fn set_prefix(&mut self, prefix: &[u8; RECORD_PREFIX_LEN]) {
        let word = |at: usize| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&prefix[at..at + 8]);
            u64::from_le_bytes(bytes)
        };
        self.acquisition_id = word(0);
        self.record_id = word(8);
        self.tick = word(16);
    }
}
