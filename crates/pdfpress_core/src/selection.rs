use std::fmt;
use std::path::PathBuf;

const MB: u64 = 1024 * 1024;

/// A file the user picked for compression, described by what the picker knows
/// before any byte is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as shown to the user and sent to the backend.
    pub name: String,
    /// Size on disk in bytes.
    pub size_bytes: u64,
    /// Where to read the bytes from at upload time.
    pub path: PathBuf,
}

/// Which flavour of upload a session runs. Both post to the same `/upload`
/// route; the two differ in limits, defaults and the multipart field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadKind {
    /// One file per request, sent as field `file`.
    #[default]
    Single,
    /// Up to fifty files per request, sent as field `files`.
    Batch,
}

impl UploadKind {
    pub fn limits(self) -> SelectionLimits {
        match self {
            UploadKind::Single => SelectionLimits {
                max_files: 1,
                max_file_bytes: 200 * MB,
            },
            UploadKind::Batch => SelectionLimits {
                max_files: 50,
                max_file_bytes: 600 * MB,
            },
        }
    }
}

/// Per-kind caps applied before anything is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    pub max_files: usize,
    pub max_file_bytes: u64,
}

/// Why a selection was rejected. Each variant carries every offending file,
/// not just the first one found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    NothingSelected,
    TooManyFiles { max: usize, actual: usize },
    NotPdf { names: Vec<String> },
    TooLarge { names: Vec<String>, max_bytes: u64 },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NothingSelected => write!(f, "no files selected"),
            SelectionError::TooManyFiles { max, actual } => write!(
                f,
                "at most {max} files can be selected at once (got {actual})"
            ),
            SelectionError::NotPdf { names } => {
                write!(f, "not PDF files: {}", names.join(", "))
            }
            SelectionError::TooLarge { names, max_bytes } => write!(
                f,
                "files larger than {} MB: {}",
                max_bytes / MB,
                names.join(", ")
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Checks a selection against the limits for its upload kind.
///
/// Checks run in a fixed order: file count, then extension, then size. The
/// first failing check wins, and within a check all offenders are collected so
/// the user sees the full list at once.
pub fn validate_selection(
    files: &[SelectedFile],
    limits: &SelectionLimits,
) -> Result<(), SelectionError> {
    if files.is_empty() {
        return Err(SelectionError::NothingSelected);
    }
    if files.len() > limits.max_files {
        return Err(SelectionError::TooManyFiles {
            max: limits.max_files,
            actual: files.len(),
        });
    }

    let non_pdf: Vec<String> = files
        .iter()
        .filter(|file| !file.name.to_lowercase().ends_with(".pdf"))
        .map(|file| file.name.clone())
        .collect();
    if !non_pdf.is_empty() {
        return Err(SelectionError::NotPdf { names: non_pdf });
    }

    let oversized: Vec<String> = files
        .iter()
        .filter(|file| file.size_bytes > limits.max_file_bytes)
        .map(|file| file.name.clone())
        .collect();
    if !oversized.is_empty() {
        return Err(SelectionError::TooLarge {
            names: oversized,
            max_bytes: limits.max_file_bytes,
        });
    }

    Ok(())
}
