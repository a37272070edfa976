//! Command-line argument definitions using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use monarch_rs::{WriteConfig, DEFAULT_ACQUISITION_RATE, DEFAULT_RECORD_SIZE};

/// Drive a single Monarch file session from the command line.
///
/// mxmonarch opens at most one Monarch file at a time, for reading or for
/// writing, and reports every outcome with the same short status words a
/// scripting host would see (`ok`, `eof`, `no_open_file`, ...).
#[derive(Parser, Debug)]
#[command(name = "mxmonarch")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run session commands, one per line, from FILE or stdin
    ///
    /// Lines are `open <path> <r|w>`, `close`, `hndl_stat`, `next_event`,
    /// `get_header`, `write fill <byte>` or `write file <path>`. Blank
    /// lines and lines starting with `#` are skipped.
    Script {
        /// Script file (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        script: Option<PathBuf>,

        #[command(flatten)]
        geometry: GeometryArgs,
    },

    /// Print the header of a Monarch file
    Info {
        /// Monarch file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print one line per record of a Monarch file
    Dump {
        /// Monarch file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop after N records
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,

        /// Leading bytes of each channel to show
        #[arg(long, value_name = "N", default_value = "8")]
        preview: usize,
    },

    /// Write records filled with a constant byte
    Write {
        /// Monarch file to create
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Byte value for every sample (decimal or 0x-prefixed hex)
        #[arg(long, value_name = "BYTE", value_parser = parse_byte)]
        fill: u8,

        /// Number of records to write
        #[arg(long, value_name = "N", default_value = "1")]
        records: u64,

        /// Force overwrite of an existing file
        #[arg(long)]
        force: bool,

        /// Suppress the success message
        #[arg(short, long)]
        quiet: bool,

        #[command(flatten)]
        geometry: GeometryArgs,
    },
}

/// Header values for files opened for writing.
#[derive(clap::Args, Debug, Clone)]
pub struct GeometryArgs {
    /// Bytes per channel per record
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_RECORD_SIZE)]
    pub record_size: u64,

    /// Write single-channel files
    #[arg(long)]
    pub one_channel: bool,

    /// Acquisition rate in MHz
    #[arg(long, value_name = "MHZ", default_value_t = DEFAULT_ACQUISITION_RATE)]
    pub rate: f64,
}

impl GeometryArgs {
    /// The write configuration these flags describe.
    pub fn to_config(&self) -> WriteConfig {
        let config = WriteConfig::new()
            .record_size(self.record_size)
            .acquisition_rate(self.rate);
        if self.one_channel {
            config.one_channel()
        } else {
            config
        }
    }
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Script { geometry, .. } => geometry.to_config().validate(),
            Command::Write {
                file,
                force,
                quiet,
                geometry,
                ..
            } => {
                if *quiet && self.verbose {
                    return Err("Cannot use both --quiet and --verbose".to_string());
                }
                if file.exists() && !force {
                    return Err(format!(
                        "Output file already exists: {} (use --force to overwrite)",
                        file.display()
                    ));
                }
                geometry.to_config().validate()
            }
            Command::Info { file } | Command::Dump { file, .. } => {
                if !file.exists() {
                    return Err(format!("Input file not found: {}", file.display()));
                }
                Ok(())
            }
        }
    }
}

/// Parse a byte given as decimal (`171`) or hex (`0xAB`).
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|_| format!("expected a byte (0-255 or 0x00-0xFF), got '{}'", s))
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # Write one default-sized two-channel record of 0xAB
    mxmonarch write a.mon --fill 0xAB

    # Write ten small single-channel records
    mxmonarch write small.mon --fill 7 --records 10 --record-size 1024 --one-channel

    # Show the header, then every record
    mxmonarch info a.mon
    mxmonarch dump a.mon --limit 5

    # Run session commands from stdin
    printf 'open a.mon r\nget_header\nnext_event\nnext_event\nclose\n' | mxmonarch script
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("0"), Ok(0));
        assert_eq!(parse_byte("255"), Ok(255));
        assert_eq!(parse_byte("0xAB"), Ok(0xAB));
        assert_eq!(parse_byte("0Xff"), Ok(0xFF));
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("ab").is_err());
    }

    #[test]
    fn test_geometry_to_config() {
        let geometry = GeometryArgs {
            record_size: 64,
            one_channel: true,
            rate: 100.0,
        };
        let config = geometry.to_config();
        assert_eq!(config.record_size, 64);
        assert_eq!(config.acquisition_mode.channel_count(), 1);
        assert_eq!(config.acquisition_rate, 100.0);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
