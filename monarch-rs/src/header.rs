//! Acquisition metadata as seen by session callers.

use monarch_format::{AcquisitionMode, MonarchHeader};

use crate::config::WriteConfig;

/// Field names used when surfacing a header to a dispatcher.
pub const HEADER_FIELDS: [&str; 5] = [
    "filename",
    "acquisition_rate",
    "acquisition_mode",
    "record_size",
    "acquisition_time",
];

/// Acquisition metadata of the open file.
///
/// Produced from the write configuration when a file is opened for
/// writing, and read from the file when it is opened for reading.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderDescriptor {
    /// Filename recorded in the header.
    pub filename: String,
    /// Digitization rate in MHz.
    pub acquisition_rate: f64,
    /// Number of channels per record.
    pub acquisition_mode: AcquisitionMode,
    /// Bytes per channel per record. Always positive.
    pub record_size: u64,
    /// Acquisition time.
    pub acquisition_time: u64,
}

impl HeaderDescriptor {
    /// Header for a new file written with `config`.
    pub fn for_write(filename: impl Into<String>, config: &WriteConfig) -> Self {
        HeaderDescriptor {
            filename: filename.into(),
            acquisition_rate: config.acquisition_rate,
            acquisition_mode: config.acquisition_mode,
            record_size: config.record_size,
            acquisition_time: config.acquisition_time,
        }
    }

    /// Number of channels per record.
    pub fn channel_count(&self) -> usize {
        self.acquisition_mode.channel_count()
    }

    /// Check the record geometry is usable.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.record_size == 0 {
            return Err("record size must be positive".to_string());
        }
        if usize::try_from(self.record_size).is_err() {
            return Err(format!("record size {} does not fit in memory", self.record_size));
        }
        Ok(())
    }

    /// Copy these values onto a container header.
    pub(crate) fn apply_to(&self, header: &mut MonarchHeader) {
        header.set_filename(self.filename.as_str());
        header.set_acq_rate(self.acquisition_rate);
        header.set_acq_mode(self.acquisition_mode);
        header.set_acq_time(self.acquisition_time);
        header.set_record_size(self.record_size);
    }

    /// The header as `(field, value)` pairs, in [`HEADER_FIELDS`] order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let values = [
            self.filename.clone(),
            self.acquisition_rate.to_string(),
            self.acquisition_mode.to_string(),
            self.record_size.to_string(),
            self.acquisition_time.to_string(),
        ];
        HEADER_FIELDS.into_iter().zip(values).collect()
    }
}

impl From<&MonarchHeader> for HeaderDescriptor {
    fn from(header: &MonarchHeader) -> Self {
        HeaderDescriptor {
            filename: header.filename().to_string(),
            acquisition_rate: header.acq_rate(),
            acquisition_mode: header.acq_mode(),
            record_size: header.record_size(),
            acquisition_time: header.acq_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_write_header() {
        let header = HeaderDescriptor::for_write("a.mon", &WriteConfig::default());
        assert_eq!(header.filename, "a.mon");
        assert_eq!(header.record_size, 4194304);
        assert_eq!(header.acquisition_mode, AcquisitionMode::TwoChannel);
        assert_eq!(header.acquisition_rate, 250.0);
        assert_eq!(header.acquisition_time, 0);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_zero_record_size_invalid() {
        let config = WriteConfig::new().record_size(0);
        let header = HeaderDescriptor::for_write("a.mon", &config);
        assert!(header.validate().unwrap_err().contains("positive"));
    }

    #[test]
    fn test_container_header_conversion() {
        let descriptor = HeaderDescriptor::for_write(
            "b.mon",
            &WriteConfig::new().one_channel().record_size(64).acquisition_time(9),
        );
        let mut container = MonarchHeader::new();
        descriptor.apply_to(&mut container);

        assert_eq!(HeaderDescriptor::from(&container), descriptor);
    }

    #[test]
    fn test_fields_order() {
        let header = HeaderDescriptor::for_write("a.mon", &WriteConfig::default());
        let fields = header.fields();
        assert_eq!(fields[0], ("filename", "a.mon".to_string()));
        assert_eq!(fields[1], ("acquisition_rate", "250".to_string()));
        assert_eq!(fields[2], ("acquisition_mode", "TwoChannel".to_string()));
        assert_eq!(fields[3], ("record_size", "4194304".to_string()));
        assert_eq!(fields[4], ("acquisition_time", "0".to_string()));
    }
}
