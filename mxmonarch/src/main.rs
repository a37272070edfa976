//! mxmonarch - Drive a single Monarch file session from the command line.
//!
//! The `script` subcommand speaks the session command vocabulary line by
//! line; `info`, `dump` and `write` are shortcuts for common sessions.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};

fn main() {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    // Run the appropriate command
    if let Err(e) = run(args) {
        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `warn`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main dispatch function.
fn run(args: Args) -> Result<()> {
    args.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    match &args.command {
        Command::Script { script, geometry } => {
            commands::script::run(script.as_deref(), geometry.to_config())
        }
        Command::Info { file } => commands::info::run(file),
        Command::Dump {
            file,
            limit,
            preview,
        } => commands::dump::run(file, *limit, *preview),
        Command::Write {
            file,
            fill,
            records,
            quiet,
            geometry,
            ..
        } => commands::write::run(file, *fill, *records, geometry.to_config(), *quiet),
    }
}
