use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::save::OutputSaver;
use crate::types::{ApiError, BatchReport, ErrorBody, HealthReport, JobReport, UploadReceipt};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// No overall request deadline by default: compressing a large document
    /// keeps the upload response open for minutes.
    pub request_timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Single,
    Batch,
}

impl UploadKind {
    fn field_name(self) -> &'static str {
        match self {
            UploadKind::Single => "file",
            UploadKind::Batch => "files",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadParams {
    pub dpi: u16,
    pub quality: u8,
}

#[async_trait::async_trait]
pub trait CompressionApi: Send + Sync {
    async fn upload(
        &self,
        kind: UploadKind,
        files: &[UploadFile],
        params: UploadParams,
    ) -> Result<UploadReceipt, ApiError>;

    async fn job_progress(&self, job_id: &str) -> Result<JobReport, ApiError>;

    async fn batch_progress(&self, batch_id: &str) -> Result<BatchReport, ApiError>;

    async fn download(&self, filename: &str, saver: &OutputSaver) -> Result<PathBuf, ApiError>;

    async fn health(&self) -> Result<HealthReport, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpCompressionApi {
    settings: ApiSettings,
}

impl HttpCompressionApi {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))
    }

    /// Joins path segments onto the base url, percent-encoding each segment.
    /// Backend filenames can carry spaces and non-ASCII characters.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.settings.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidBaseUrl(self.settings.base_url.clone()))?;
            parts.pop_if_empty();
            for segment in segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl CompressionApi for HttpCompressionApi {
    async fn upload(
        &self,
        kind: UploadKind,
        files: &[UploadFile],
        params: UploadParams,
    ) -> Result<UploadReceipt, ApiError> {
        let client = self.build_client()?;
        // Single and batch post to the same route; only the field name differs.
        let url = self.endpoint(&["upload"])?;

        let mut form = reqwest::multipart::Form::new()
            .text("dpi", params.dpi.to_string())
            .text("quality", params.quality.to_string());
        for file in files {
            form = form.part(kind.field_name(), file_part(file).await?);
        }

        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(backend_error(response, "file upload failed").await);
        }
        response
            .json::<UploadReceipt>()
            .await
            .map_err(map_reqwest_error)
    }

    async fn job_progress(&self, job_id: &str) -> Result<JobReport, ApiError> {
        let client = self.build_client()?;
        let url = self.endpoint(&["progress", job_id])?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: "progress check failed".to_string(),
            });
        }
        response.json::<JobReport>().await.map_err(map_reqwest_error)
    }

    async fn batch_progress(&self, batch_id: &str) -> Result<BatchReport, ApiError> {
        let client = self.build_client()?;
        let url = self.endpoint(&["batch_progress", batch_id])?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: "progress check failed".to_string(),
            });
        }
        response
            .json::<BatchReport>()
            .await
            .map_err(map_reqwest_error)
    }

    async fn download(&self, filename: &str, saver: &OutputSaver) -> Result<PathBuf, ApiError> {
        // Unsafe filenames are refused before any request goes out.
        let mut pending = saver.begin(filename)?;

        let client = self.build_client()?;
        let url = self.endpoint(&["download", filename])?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(backend_error(response, "download failed").await);
        }
        // The backend advertises the user-facing name via Content-Disposition;
        // the storage name from the URL is only the fallback.
        if let Some(name) = attachment_filename(response.headers()) {
            pending.retarget(&name)?;
        }

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk: Bytes = chunk.map_err(map_reqwest_error)?;
            pending.write_chunk(&chunk)?;
        }
        Ok(pending.finish()?)
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        let client = self.build_client()?;
        let url = self.endpoint(&["health"])?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(backend_error(response, "health check failed").await);
        }
        response
            .json::<HealthReport>()
            .await
            .map_err(map_reqwest_error)
    }
}

/// Streams the file from disk instead of buffering it; uploads run up to the
/// 600 MB batch cap.
async fn file_part(file: &UploadFile) -> Result<reqwest::multipart::Part, ApiError> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let len = handle.metadata().await?.len();
    let stream = FramedRead::new(handle, BytesCodec::new());
    reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), len)
        .file_name(file.name.clone())
        .mime_str("application/pdf")
        .map_err(|err| ApiError::Network(err.to_string()))
}

/// Filename advertised in a `Content-Disposition: attachment` header, if any.
/// The extended `filename*=` form is left alone; this backend sends the plain
/// parameter.
fn attachment_filename(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let value = headers
        .get(reqwest::header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    value
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("filename="))
        .map(|name| name.trim_matches('"'))
        .find(|name| !name.is_empty())
        .map(str::to_owned)
}

/// Prefers the backend's own `error` field, falling back to a generic message
/// when the body is not the expected JSON.
async fn backend_error(response: reqwest::Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => fallback.to_string(),
    };
    ApiError::Backend { status, message }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
