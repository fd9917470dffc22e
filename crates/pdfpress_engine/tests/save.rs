use std::fs;

use pdfpress_engine::{ensure_download_dir, OutputSaver, SaveError};
use tempfile::TempDir;

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("compressed");
    assert!(!new_dir.exists());
    ensure_download_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn finished_download_lands_at_final_name() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    let mut pending = saver.begin("out.pdf").unwrap();
    pending.write_chunk(b"%PDF ").unwrap();
    pending.write_chunk(b"data").unwrap();
    let path = pending.finish().unwrap();

    assert_eq!(path, temp.path().join("out.pdf"));
    assert_eq!(fs::read(&path).unwrap(), b"%PDF data");
}

#[test]
fn finished_download_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    let mut first = saver.begin("out.pdf").unwrap();
    first.write_chunk(b"old").unwrap();
    let path = first.finish().unwrap();

    let mut second = saver.begin("out.pdf").unwrap();
    second.write_chunk(b"new").unwrap();
    assert_eq!(second.finish().unwrap(), path);
    assert_eq!(fs::read(&path).unwrap(), b"new");
}

#[test]
fn retargeted_download_lands_at_the_new_name() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    let mut pending = saver.begin("compressed_1723000000_abcd1234_report.pdf").unwrap();
    pending.retarget("report.pdf").unwrap();
    pending.write_chunk(b"%PDF data").unwrap();
    let path = pending.finish().unwrap();

    assert_eq!(path, temp.path().join("report.pdf"));
    assert!(!temp
        .path()
        .join("compressed_1723000000_abcd1234_report.pdf")
        .exists());
}

#[test]
fn retarget_rejects_traversal_names_and_keeps_the_old_target() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    let mut pending = saver.begin("out.pdf").unwrap();
    for bad in ["../evil.pdf", "a/b.pdf", "..", ""] {
        match pending.retarget(bad) {
            Err(SaveError::UnsafeFilename(name)) => assert_eq!(name, bad),
            other => panic!("expected unsafe filename for {bad:?}, got {other:?}"),
        }
    }
    pending.write_chunk(b"%PDF").unwrap();
    assert_eq!(pending.finish().unwrap(), temp.path().join("out.pdf"));
}

#[test]
fn dropped_download_leaves_no_partial_file() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    let mut pending = saver.begin("out.pdf").unwrap();
    pending.write_chunk(b"half").unwrap();
    drop(pending);

    assert!(!temp.path().join("out.pdf").exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn rejects_traversal_filenames() {
    let temp = TempDir::new().unwrap();
    let saver = OutputSaver::new(temp.path().to_path_buf());

    for bad in ["../evil.pdf", "a/b.pdf", "..", "/etc/passwd", ""] {
        match saver.begin(bad) {
            Err(SaveError::UnsafeFilename(name)) => assert_eq!(name, bad),
            other => panic!("expected unsafe filename for {bad:?}, got {other:?}"),
        }
    }
}

#[test]
fn begin_fails_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let saver = OutputSaver::new(blocker.clone());
    let result = saver.begin("out.pdf");
    assert!(matches!(result, Err(SaveError::DownloadDir(_))));
    assert!(!blocker.with_file_name("out.pdf").exists());
}
