//! Integration tests for the mxmonarch CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the mxmonarch command.
fn mxmonarch() -> Command {
    Command::cargo_bin("mxmonarch").unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    mxmonarch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Monarch"))
        .stdout(predicate::str::contains("script"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version() {
    mxmonarch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mxmonarch"));
}

#[test]
fn test_missing_subcommand() {
    mxmonarch().assert().failure();
}

#[test]
fn test_quiet_and_verbose_conflict() {
    let temp = TempDir::new().unwrap();

    mxmonarch()
        .arg("write")
        .arg(temp.path().join("loud.mon"))
        .args(["--fill", "0", "-q", "-v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--quiet and --verbose"));
    assert!(!temp.path().join("loud.mon").exists());
}

#[test]
fn test_quiet_is_write_only() {
    mxmonarch()
        .args(["info", "-q", "whatever.mon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_quiet_write_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("quiet.mon");

    mxmonarch()
        .arg("write")
        .arg(&file)
        .args(["--fill", "1", "--record-size", "4", "--quiet"])
        .assert()
        .success()
        .stdout("");
    assert!(file.exists());
}

// ============================================================================
// Write / Info / Dump
// ============================================================================

#[test]
fn test_write_then_info_and_dump() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("small.mon");

    mxmonarch()
        .arg("write")
        .arg(&file)
        .args(["--fill", "0xAB", "--records", "3", "--record-size", "16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 3 records"));

    mxmonarch()
        .arg("info")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("TwoChannel"))
        .stdout(predicate::str::contains("record_size"))
        .stdout(predicate::str::contains("16"));

    mxmonarch()
        .arg("dump")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("record_id=2 timestamp=32 data=32 bytes"))
        .stdout(predicate::str::contains("ab ab ab ab"))
        .stdout(predicate::str::contains("3 records"));
}

#[test]
fn test_dump_limit() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("limit.mon");

    mxmonarch()
        .arg("write")
        .arg(&file)
        .args(["--fill", "1", "--records", "5", "--record-size", "4", "--one-channel"])
        .assert()
        .success();

    mxmonarch()
        .arg("dump")
        .arg(&file)
        .args(["--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record_id=1"))
        .stdout(predicate::str::contains("record_id=2").not())
        .stdout(predicate::str::contains("2 records"));
}

#[test]
fn test_write_refuses_existing_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("exists.mon");
    fs::write(&file, "taken").unwrap();

    mxmonarch()
        .arg("write")
        .arg(&file)
        .args(["--fill", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_write_rejects_zero_record_size() {
    let temp = TempDir::new().unwrap();

    mxmonarch()
        .arg("write")
        .arg(temp.path().join("zero.mon"))
        .args(["--fill", "0", "--record-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("record size must be positive"));
}

#[test]
fn test_info_missing_file() {
    mxmonarch()
        .args(["info", "/nonexistent/file.mon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_info_not_a_monarch_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("text.mon");
    fs::write(&file, "plain text, not a recording").unwrap();

    mxmonarch()
        .arg("info")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open Monarch file"));
}

// ============================================================================
// Script Mode
// ============================================================================

#[test]
fn test_script_from_stdin() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("script.mon");
    let script = format!(
        "# write one record, then read it back\n\
         write fill 1\n\
         open {path} w\n\
         write fill 0xAB\n\
         close\n\
         open {path} r\n\
         get_header\n\
         next_event\n\
         next_event\n\
         close\n\
         hndl_stat\n",
        path = file.display()
    );

    mxmonarch()
        .args(["script", "--record-size", "8"])
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("no_open_file\nok\nok\nok\nok\n"))
        .stdout(predicate::str::contains("acquisition_mode=TwoChannel record_size=8"))
        .stdout(predicate::str::contains("record_id=0 timestamp=0 data=16 bytes"))
        .stdout(predicate::str::ends_with("eof\nok\nfalse\n"));
}

#[test]
fn test_script_shape_mismatch() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("commands.txt");
    let payload = temp.path().join("payload.bin");
    fs::write(&payload, [0u8; 100]).unwrap();
    fs::write(
        &script,
        format!(
            "open {} w\nwrite file {}\nhndl_stat\n",
            temp.path().join("shape.mon").display(),
            payload.display()
        ),
    )
    .unwrap();

    mxmonarch()
        .arg("script")
        .arg(&script)
        .assert()
        .success()
        .stdout("ok\ndata_type_error\ntrue\n");
}

#[test]
fn test_script_unknown_command() {
    mxmonarch()
        .arg("script")
        .write_stdin("hndl_stat\nrewind\n")
        .assert()
        .failure()
        .stdout("false\n")
        .stderr(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("unknown command 'rewind'"));
}
