//! Run session commands from a script.
//!
//! Each non-blank line is one command of the session vocabulary. The result
//! of every command is printed on its own line: `ok`, `eof`, `true`/`false`
//! for `hndl_stat`, the header or record for `get_header`/`next_event`, or
//! the status word of the error (`no_open_file`, `data_type_error`, ...).
//! A failing command does not stop the script; a line that isn't a command
//! does.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use monarch_rs::{
    AccessMode, Action, Error, FileBackend, FileSession, NextOutcome, Payload, WriteConfig,
};

use crate::output;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Open { path: PathBuf, mode: AccessMode },
    Close,
    Status,
    Next,
    Header,
    /// `write fill <byte>`: one record of `record_size` copies of the byte.
    WriteFill(u8),
    /// `write file <path>`: the file's bytes as a single-channel payload.
    WriteFile(PathBuf),
}

impl Step {
    /// Parse a line; `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str) -> Result<Option<Step>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let action: Action = words.next().unwrap_or_default().parse()?;
        let operands: Vec<&str> = words.collect();

        let step = match (action, operands.as_slice()) {
            (Action::Open, [path, mode]) => Step::Open {
                path: PathBuf::from(path),
                mode: mode.parse()?,
            },
            (Action::Open, _) => return Err("usage: open <path> <r|w>".to_string()),
            (Action::Close, []) => Step::Close,
            (Action::Status, []) => Step::Status,
            (Action::Next, []) => Step::Next,
            (Action::Header, []) => Step::Header,
            (Action::Write, ["fill", byte]) => Step::WriteFill(crate::cli::parse_byte(byte)?),
            (Action::Write, ["file", path]) => Step::WriteFile(PathBuf::from(path)),
            (Action::Write, _) => {
                return Err("usage: write fill <byte> | write file <path>".to_string())
            }
            (action, _) => return Err(format!("'{}' takes no arguments", action)),
        };
        Ok(Some(step))
    }
}

/// Executes steps against one session.
pub struct Interpreter {
    session: FileSession,
}

impl Interpreter {
    pub fn new(config: WriteConfig) -> Self {
        Interpreter {
            session: FileSession::with_config(FileBackend, config),
        }
    }

    /// Run one step and return its result line.
    pub fn execute(&self, step: &Step) -> Result<String> {
        let result = match step {
            Step::Open { path, mode } => self.session.open(path, *mode).map(|()| ok()),
            Step::Close => {
                self.session.close();
                Ok(ok())
            }
            Step::Status => Ok(self.session.status().to_string()),
            Step::Next => self.session.next().map(|outcome| match outcome {
                NextOutcome::Record(record) => output::record_line(&record),
                NextOutcome::EndOfStream => "eof".to_string(),
            }),
            Step::Header => self.session.header().map(|h| output::header_line(&h)),
            Step::WriteFill(byte) => {
                let record_size = self.session.config().record_size;
                let len = usize::try_from(record_size)
                    .with_context(|| format!("Record size {} is too large", record_size))?;
                let samples = vec![*byte; len];
                self.session.write(Payload::row(&samples)).map(|()| ok())
            }
            Step::WriteFile(path) => {
                let samples = std::fs::read(path)
                    .with_context(|| format!("Failed to read payload: {}", path.display()))?;
                self.session.write(Payload::row(&samples)).map(|()| ok())
            }
        };
        Ok(result.unwrap_or_else(|e| status_word(&e)))
    }

    /// Close whatever the script left open.
    pub fn finish(&self) {
        self.session.close();
    }
}

fn ok() -> String {
    "ok".to_string()
}

fn status_word(err: &Error) -> String {
    debug!(error = %err, "command failed");
    err.kind().sentinel().to_string()
}

/// Run the script command.
pub fn run(script: Option<&Path>, config: WriteConfig) -> Result<()> {
    let text = match script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            text
        }
    };

    let interpreter = Interpreter::new(config);
    let outcome = execute_lines(&interpreter, &text);
    interpreter.finish();
    outcome
}

fn execute_lines(interpreter: &Interpreter, text: &str) -> Result<()> {
    for (number, line) in text.lines().enumerate() {
        let step = match Step::parse(line) {
            Ok(Some(step)) => step,
            Ok(None) => continue,
            Err(e) => return Err(anyhow!("line {}: {}", number + 1, e)),
        };
        let result = interpreter
            .execute(&step)
            .with_context(|| format!("line {}", number + 1))?;
        println!("{}", result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_steps(interpreter: &Interpreter, lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| Step::parse(line).unwrap())
            .map(|step| interpreter.execute(&step).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_steps() {
        assert_eq!(Step::parse("  # comment").unwrap(), None);
        assert_eq!(Step::parse("").unwrap(), None);
        assert_eq!(Step::parse("hndl_stat").unwrap(), Some(Step::Status));
        assert_eq!(
            Step::parse("open a.mon r").unwrap(),
            Some(Step::Open {
                path: PathBuf::from("a.mon"),
                mode: AccessMode::Read
            })
        );
        assert_eq!(Step::parse("write fill 0xAB").unwrap(), Some(Step::WriteFill(0xAB)));
        assert_eq!(
            Step::parse("write file p.bin").unwrap(),
            Some(Step::WriteFile(PathBuf::from("p.bin")))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Step::parse("open a.mon").is_err());
        assert!(Step::parse("open a.mon rw").is_err());
        assert!(Step::parse("close now").is_err());
        assert!(Step::parse("write").is_err());
        assert!(Step::parse("rewind").is_err());
    }

    #[test]
    fn test_round_trip_statuses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.mon");
        let interpreter = Interpreter::new(WriteConfig::new().record_size(4));

        let lines = vec![
            "hndl_stat".to_string(),
            "next_event".to_string(),
            format!("open {} w", path.display()),
            format!("open {} w", path.display()),
            "hndl_stat".to_string(),
            "get_header".to_string(),
            "write fill 7".to_string(),
            "write fill 8".to_string(),
            "close".to_string(),
            format!("open {} r", path.display()),
            "next_event".to_string(),
            "next_event".to_string(),
            "next_event".to_string(),
            "close".to_string(),
            "close".to_string(),
        ];
        let results = run_steps(&interpreter, &lines);

        assert_eq!(results[0], "false");
        assert_eq!(results[1], "no_open_file");
        assert_eq!(results[2], "ok");
        assert_eq!(results[3], "already_open");
        assert_eq!(results[4], "true");
        assert_eq!(results[5], "no_open_file");
        assert_eq!(results[6], "ok");
        assert_eq!(results[7], "ok");
        assert_eq!(results[8], "ok");
        assert_eq!(results[9], "ok");
        assert_eq!(
            results[10],
            "acquisition_id=0 record_id=0 timestamp=0 data=8 bytes"
        );
        assert_eq!(
            results[11],
            "acquisition_id=0 record_id=1 timestamp=4 data=8 bytes"
        );
        assert_eq!(results[12], "eof");
        assert_eq!(results[13], "ok");
        assert_eq!(results[14], "ok");
    }

    #[test]
    fn test_wrong_payload_shape() {
        let dir = TempDir::new().unwrap();
        let payload = dir.path().join("short.bin");
        std::fs::write(&payload, [1u8, 2, 3]).unwrap();
        let interpreter = Interpreter::new(WriteConfig::new().record_size(4));

        let lines = vec![
            format!("open {} w", dir.path().join("w.mon").display()),
            format!("write file {}", payload.display()),
        ];
        let results = run_steps(&interpreter, &lines);
        assert_eq!(results, vec!["ok", "data_type_error"]);
        interpreter.finish();
    }
}
