//! Print the header of a Monarch file.

use std::path::Path;

use anyhow::{Context, Result};

use monarch_rs::{AccessMode, FileSession};

use crate::output;

/// Run the info command.
pub fn run(file: &Path) -> Result<()> {
    let session = FileSession::new();
    session
        .open(file, AccessMode::Read)
        .with_context(|| format!("Failed to open Monarch file: {}", file.display()))?;

    let header = session.header()?;
    session.close();

    output::print_header(&format!("Header of '{}'", file.display()));
    for (field, value) in header.fields() {
        output::print_kv(field, &value, 2);
    }

    let record_bytes = header.record_size * header.channel_count() as u64;
    output::print_kv(
        "bytes per record",
        &format!(
            "{} ({})",
            output::format_number(record_bytes),
            output::format_size(record_bytes)
        ),
        2,
    );
    Ok(())
}
