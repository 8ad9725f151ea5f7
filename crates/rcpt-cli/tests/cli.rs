//! End-to-end CLI tests that need no network access.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("rcpt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn extract_heuristic_only_emits_json_envelope() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "SuperMart\nBananas 2.50\nTOTAL 12.00").unwrap();

    Command::cargo_bin("rcpt")
        .unwrap()
        .args(["extract", "--heuristic-only"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"storeName\":\"SuperMart\""))
        .stdout(predicate::str::contains("\"fallback\":true"));
}

#[test]
fn extract_heuristic_only_text_format_reads_stdin() {
    Command::cargo_bin("rcpt")
        .unwrap()
        .args(["extract", "--heuristic-only", "--format", "text", "-"])
        .write_stdin("SuperMart\nBananas 2.50\nTOTAL 12.00")
        .assert()
        .success()
        .stdout(predicate::str::contains("Store: SuperMart"))
        .stdout(predicate::str::contains("Total:    12.00"));
}

#[test]
fn extract_rejects_empty_input() {
    Command::cargo_bin("rcpt")
        .unwrap()
        .args(["extract", "--heuristic-only", "-"])
        .write_stdin("   \n  ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input text is empty"));
}

#[test]
fn config_show_prints_defaults() {
    Command::cargo_bin("rcpt")
        .unwrap()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-1.5-flash-latest"));
}

#[test]
fn scan_requires_an_existing_input_file() {
    Command::cargo_bin("rcpt")
        .unwrap()
        .args(["scan", "/definitely/not/a/file.jpg"])
        .env("GOOGLE_API_KEY", "test-key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
