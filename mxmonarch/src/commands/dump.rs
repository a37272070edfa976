//! Print one line per record of a Monarch file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use monarch_rs::{AccessMode, FileSession, NextOutcome};

use crate::output;

/// Run the dump command.
pub fn run(file: &Path, limit: Option<usize>, preview: usize) -> Result<()> {
    let session = FileSession::new();
    session
        .open(file, AccessMode::Read)
        .with_context(|| format!("Failed to open Monarch file: {}", file.display()))?;

    let mut count = 0;
    while limit.map_or(true, |limit| count < limit) {
        let record = match session.next() {
            Ok(NextOutcome::Record(record)) => record,
            Ok(NextOutcome::EndOfStream) => break,
            Err(e) => {
                session.close();
                return Err(e).with_context(|| format!("Failed after {} records", count));
            }
        };

        println!("{}", output::record_line(&record));
        for (index, channel) in record.channels().iter().enumerate() {
            println!(
                "  {} {}",
                format!("ch{}", index).dimmed(),
                output::hex_preview(channel, preview)
            );
        }
        count += 1;
    }
    session.close();

    println!("{} records", count);
    Ok(())
}
