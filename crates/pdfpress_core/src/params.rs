use std::ops::RangeInclusive;

use crate::UploadKind;

/// Accepted manual DPI values. Outside this range the backend rejects the
/// upload, so the client refuses them up front.
pub const DPI_RANGE: RangeInclusive<u16> = 100..=200;
/// Accepted manual JPEG quality values.
pub const QUALITY_RANGE: RangeInclusive<u8> = 60..=95;

/// Image downsampling settings sent with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionParams {
    pub dpi: u16,
    pub quality: u8,
}

impl CompressionParams {
    /// Default sliders per variant: 100 dpi / 75 for single uploads,
    /// 150 dpi / 85 for batches.
    pub fn defaults_for(kind: UploadKind) -> Self {
        match kind {
            UploadKind::Single => CompressionParams {
                dpi: 100,
                quality: 75,
            },
            UploadKind::Batch => CompressionParams {
                dpi: 150,
                quality: 85,
            },
        }
    }
}

/// Whether the user picked settings or left the choice to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    /// Backend picks settings per document. Encoded on the wire as 0/0.
    Auto,
    Manual(CompressionParams),
}

impl ParamMode {
    /// The parameters actually sent. Auto mode uses the 0/0 sentinel the
    /// backend recognises.
    pub fn effective(self) -> CompressionParams {
        match self {
            ParamMode::Auto => CompressionParams { dpi: 0, quality: 0 },
            ParamMode::Manual(params) => params,
        }
    }
}
