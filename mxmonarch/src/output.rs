//! Terminal output formatting utilities.

use colored::Colorize;

use monarch_rs::{HeaderDescriptor, Record};

/// Print an error message to stderr.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{}: {}", "error".red().bold(), err);

    // Print cause chain
    for cause in err.chain().skip(1) {
        eprintln!("  {}: {}", "caused by".red(), cause);
    }
}

/// Print a success message.
pub fn print_success(msg: &str, quiet: bool) {
    if !quiet {
        println!("{}: {}", "success".green().bold(), msg);
    }
}

/// Print a header line.
pub fn print_header(title: &str) {
    println!("{}", title.bold().underline());
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str, indent: usize) {
    let padding = " ".repeat(indent);
    println!("{}{}: {}", padding, key.dimmed(), value);
}

/// Header fields on one line, `field=value` separated by spaces.
pub fn header_line(header: &HeaderDescriptor) -> String {
    header
        .fields()
        .into_iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A record's metadata and size on one line.
pub fn record_line(record: &Record) -> String {
    format!(
        "acquisition_id={} record_id={} timestamp={} data={} bytes",
        record.acquisition_id,
        record.record_id,
        record.timestamp,
        record.channel_count() * record.record_size()
    )
}

/// The first `n` bytes of a channel as hex, with `..` when there are more.
pub fn hex_preview(bytes: &[u8], n: usize) -> String {
    let shown: Vec<String> = bytes.iter().take(n).map(|b| format!("{:02x}", b)).collect();
    let mut preview = shown.join(" ");
    if bytes.len() > n {
        preview.push_str(" ..");
    }
    preview
}

/// Format a number with thousands separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }

    result
}

/// Format file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(4194304), "4,194,304");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(8388608), "8.00 MB");
    }

    #[test]
    fn test_hex_preview() {
        assert_eq!(hex_preview(&[0xab, 0x01], 4), "ab 01");
        assert_eq!(hex_preview(&[0xab; 10], 3), "ab ab ab ..");
        assert_eq!(hex_preview(&[], 3), "");
    }
}
