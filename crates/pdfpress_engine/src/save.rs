use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("download directory missing or not writable: {0}")]
    DownloadDir(String),
    #[error("unsafe output filename: {0}")]
    UnsafeFilename(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_download_dir(dir: &Path) -> Result<(), SaveError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| SaveError::DownloadDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(SaveError::DownloadDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| SaveError::DownloadDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| SaveError::DownloadDir(e.to_string()))?;
    Ok(())
}

/// Writes downloaded outputs into a fixed directory, one temp file per
/// download, renamed into place on completion.
#[derive(Debug, Clone)]
pub struct OutputSaver {
    dir: PathBuf,
}

impl OutputSaver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn begin(&self, filename: &str) -> Result<PendingDownload, SaveError> {
        let safe = safe_filename(filename)?;
        ensure_download_dir(&self.dir)?;
        let target = self.dir.join(safe);
        let tmp = NamedTempFile::new_in(&self.dir)?;
        Ok(PendingDownload { target, tmp })
    }
}

/// An in-flight download. Bytes land in a temp file next to the target and
/// only reach the final name after a clean finish; a dropped download leaves
/// no partial output behind.
#[derive(Debug)]
pub struct PendingDownload {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingDownload {
    /// Swaps the final name for one the backend advertised after the fact.
    /// The replacement passes the same single-component guard and stays in
    /// the same directory; on rejection the original target is kept.
    pub fn retarget(&mut self, filename: &str) -> Result<(), SaveError> {
        let safe = safe_filename(filename)?;
        self.target.set_file_name(safe);
        Ok(())
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), SaveError> {
        self.tmp.write_all(chunk)?;
        Ok(())
    }

    pub fn finish(self) -> Result<PathBuf, SaveError> {
        let PendingDownload { target, mut tmp } = self;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present to keep determinism.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| SaveError::Io(e.error))?;
        Ok(target)
    }
}

/// The backend controls output filenames, so anything that is not a single
/// plain path component is refused before it can escape the download dir.
fn safe_filename(filename: &str) -> Result<&str, SaveError> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(filename),
        _ => Err(SaveError::UnsafeFilename(filename.to_string())),
    }
}
