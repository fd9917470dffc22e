use crate::{CompressionParams, PollTarget, SelectedFile, UploadKind};

/// Work the runtime shell must carry out after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartUpload {
        kind: UploadKind,
        files: Vec<SelectedFile>,
        params: CompressionParams,
    },
    StartPolling {
        target: PollTarget,
    },
    StopPolling,
}
