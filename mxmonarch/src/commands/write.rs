//! Write records filled with a constant byte.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use monarch_rs::{AccessMode, CloseOutcome, FileBackend, FileSession, Payload, WriteConfig};

use crate::output;

/// Run the write command.
pub fn run(file: &Path, fill: u8, records: u64, config: WriteConfig, quiet: bool) -> Result<()> {
    let record_size = usize::try_from(config.record_size)
        .with_context(|| format!("Record size {} is too large", config.record_size))?;
    let samples = vec![fill; record_size];

    let session = FileSession::with_config(FileBackend, config);
    session
        .open(file, AccessMode::Write)
        .with_context(|| format!("Failed to create Monarch file: {}", file.display()))?;

    for index in 0..records {
        if let Err(e) = session.write(Payload::row(&samples)) {
            session.close();
            return Err(e).with_context(|| format!("Failed to write record {}", index));
        }
        debug!(record = index, "wrote record");
    }

    closed(session.close_reporting(), file)?;

    output::print_success(
        &format!(
            "wrote {} records of {} bytes per channel to {}",
            output::format_number(records),
            output::format_number(record_size as u64),
            file.display()
        ),
        quiet,
    );
    Ok(())
}

/// A write only succeeds if the file was also closed cleanly.
fn closed(outcome: CloseOutcome, file: &Path) -> Result<()> {
    match outcome {
        CloseOutcome::Forced(_, e) => Err(anyhow::Error::new(e))
            .with_context(|| format!("Failed to close Monarch file: {}", file.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monarch_rs::ContainerError;

    #[test]
    fn test_forced_close_is_an_error() {
        let outcome = CloseOutcome::Forced(AccessMode::Write, ContainerError::FileClosed);
        let err = closed(outcome, Path::new("a.mon")).unwrap_err();
        assert!(err.to_string().contains("Failed to close Monarch file: a.mon"));
        assert!(err.chain().any(|cause| cause.to_string().contains("closed")));
    }

    #[test]
    fn test_clean_close_is_ok() {
        assert!(closed(CloseOutcome::Closed(AccessMode::Write), Path::new("a.mon")).is_ok());
    }
}
