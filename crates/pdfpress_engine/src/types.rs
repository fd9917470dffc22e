use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::save::SaveError;

/// Wire status strings from the backend. Anything unrecognised maps to
/// `Other`, so a new backend phase (the current one emits "starting" before
/// "processing") degrades to "still waiting" instead of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Other,
}

/// Per-job payload from `/progress/{job_id}`, also nested in batch reports.
/// Everything except `status` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobReport {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub original_size: Option<f64>,
    #[serde(default)]
    pub compressed_size: Option<f64>,
    #[serde(default)]
    pub compression_ratio: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload from `/batch_progress/{batch_id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchReport {
    pub total_files: usize,
    #[serde(default)]
    pub completed: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub files: HashMap<String, JobReport>,
}

/// Body of a successful upload response. The upload route answers with
/// either shape depending on the variant, so decoding tries the batch form
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UploadReceipt {
    Batch {
        batch_id: String,
        job_ids: Vec<String>,
    },
    Job {
        job_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
}

/// Error body the backend attaches to 4xx/5xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// What the poller asks for each round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    Job { job_id: String },
    Batch { batch_id: String },
}

/// One successful poll round.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressSnapshot {
    Job(JobReport),
    Batch(BatchReport),
}

/// Events the client thread pushes back to the caller.
#[derive(Debug)]
pub enum ClientEvent {
    UploadFinished {
        result: Result<UploadReceipt, ApiError>,
    },
    ProgressReported {
        snapshot: ProgressSnapshot,
    },
    PollFailed {
        error: ApiError,
    },
    OutputSaved {
        filename: String,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid server url: {0}")]
    InvalidBaseUrl(String),
    /// The backend answered with an error status. The message is the backend's
    /// own `error` field when it sent one.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Save(#[from] SaveError),
}
