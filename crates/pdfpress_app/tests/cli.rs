use std::fs::File;
use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

// Unreachable on purpose: selection must be rejected before any request.
const DEAD_SERVER: &str = "http://127.0.0.1:1";

fn pdfpress() -> Command {
    Command::cargo_bin("pdfpress").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn prints_help() {
    let mut cmd = pdfpress();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("compress"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn prints_version() {
    let mut cmd = pdfpress();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn compress_requires_an_input() {
    let mut cmd = pdfpress();
    cmd.arg("compress");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("INPUT"));
}

#[test]
fn batch_requires_inputs() {
    let mut cmd = pdfpress();
    cmd.arg("batch");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("INPUTS"));
}

#[test]
fn missing_input_file_is_an_error() {
    let mut cmd = pdfpress();
    cmd.args(["--server", DEAD_SERVER, "compress", "/no/such/file.pdf"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn rejects_non_pdf_selection() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "notes.txt", b"plain text");

    let mut cmd = pdfpress();
    cmd.args(["--server", DEAD_SERVER, "compress"]).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not PDF files: notes.txt"));
}

#[test]
fn rejects_oversized_single_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("huge.pdf");
    // Sparse file: the size check reads metadata, not content.
    let file = File::create(&path).unwrap();
    file.set_len(200 * 1024 * 1024 + 1).unwrap();

    let mut cmd = pdfpress();
    cmd.args(["--server", DEAD_SERVER, "compress"]).arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("files larger than 200 MB: huge.pdf"));
}

#[test]
fn rejects_batches_over_fifty_files() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..51)
        .map(|i| write_file(&dir, &format!("doc{i}.pdf"), b"%PDF-1.4"))
        .collect();

    let mut cmd = pdfpress();
    cmd.args(["--server", DEAD_SERVER, "batch"]).args(&inputs);
    cmd.assert().failure().stderr(predicate::str::contains(
        "at most 50 files can be selected at once (got 51)",
    ));
}

#[test]
fn dpi_outside_range_is_rejected() {
    let mut cmd = pdfpress();
    cmd.args(["compress", "a.pdf", "--dpi", "99"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("dpi must be between 100 and 200"));
}

#[test]
fn quality_outside_range_is_rejected() {
    let mut cmd = pdfpress();
    cmd.args(["compress", "a.pdf", "--quality", "59"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("quality must be between 60 and 95"));
}

#[test]
fn auto_conflicts_with_manual_settings() {
    let mut cmd = pdfpress();
    cmd.args(["compress", "a.pdf", "--auto", "--dpi", "150"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
