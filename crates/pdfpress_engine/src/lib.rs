//! Pdfpress engine: backend API client, progress poller and download persistence.
mod api;
mod client;
mod save;
mod types;

pub use api::{ApiSettings, CompressionApi, HttpCompressionApi, UploadFile, UploadKind, UploadParams};
pub use client::{check_health, ClientHandle};
pub use save::{ensure_download_dir, OutputSaver, PendingDownload, SaveError};
pub use types::{
    ApiError, BatchReport, ClientEvent, HealthReport, JobReport, JobStatus, PollTarget,
    ProgressSnapshot, UploadReceipt,
};
