//! Record geometry used when a file is opened for writing.

use monarch_format::AcquisitionMode;

/// Default bytes per channel per record.
pub const DEFAULT_RECORD_SIZE: u64 = 4_194_304;

/// Default digitization rate in MHz.
pub const DEFAULT_ACQUISITION_RATE: f64 = 250.0;

/// Header values stamped on every file opened for writing.
///
/// The defaults are 4194304-byte records, two channels, 250 MHz and
/// acquisition time zero.
///
/// # Example
///
/// ```
/// use monarch_rs::WriteConfig;
///
/// let config = WriteConfig::new()
///     .record_size(1024)
///     .one_channel()
///     .acquisition_rate(100.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WriteConfig {
    /// Bytes per channel per record.
    pub record_size: u64,

    /// Channel count of new files.
    pub acquisition_mode: AcquisitionMode,

    /// Digitization rate in MHz.
    pub acquisition_rate: f64,

    /// Acquisition time written to the header.
    pub acquisition_time: u64,
}

impl Default for WriteConfig {
    fn default() -> Self {
        WriteConfig {
            record_size: DEFAULT_RECORD_SIZE,
            acquisition_mode: AcquisitionMode::TwoChannel,
            acquisition_rate: DEFAULT_ACQUISITION_RATE,
            acquisition_time: 0,
        }
    }
}

impl WriteConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record size in bytes per channel.
    pub fn record_size(mut self, size: u64) -> Self {
        self.record_size = size;
        self
    }

    /// Set the acquisition mode.
    pub fn acquisition_mode(mut self, mode: AcquisitionMode) -> Self {
        self.acquisition_mode = mode;
        self
    }

    /// Record a single channel.
    pub fn one_channel(self) -> Self {
        self.acquisition_mode(AcquisitionMode::OneChannel)
    }

    /// Set the digitization rate in MHz.
    pub fn acquisition_rate(mut self, rate: f64) -> Self {
        self.acquisition_rate = rate;
        self
    }

    /// Set the acquisition time.
    pub fn acquisition_time(mut self, time: u64) -> Self {
        self.acquisition_time = time;
        self
    }

    /// Check the configuration describes a writable file.
    pub fn validate(&self) -> Result<(), String> {
        if self.record_size == 0 {
            return Err("record size must be positive".to_string());
        }
        if !(self.acquisition_rate.is_finite() && self.acquisition_rate > 0.0) {
            return Err(format!(
                "acquisition rate must be a positive number, got {}",
                self.acquisition_rate
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WriteConfig::default();
        assert_eq!(config.record_size, 4194304);
        assert_eq!(config.acquisition_mode, AcquisitionMode::TwoChannel);
        assert_eq!(config.acquisition_rate, 250.0);
        assert_eq!(config.acquisition_time, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_rates() {
        assert!(WriteConfig::new().acquisition_rate(0.0).validate().is_err());
        assert!(WriteConfig::new().acquisition_rate(f64::NAN).validate().is_err());
        assert!(WriteConfig::new().record_size(0).validate().is_err());
    }
}
