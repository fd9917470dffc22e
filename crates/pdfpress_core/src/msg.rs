use crate::{ParamMode, ProgressReport, SelectedFile, UploadReceipt};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User picked files and compression settings.
    FilesChosen {
        files: Vec<SelectedFile>,
        mode: ParamMode,
    },
    /// Upload finished and the backend issued ids.
    UploadAccepted { receipt: UploadReceipt },
    /// Upload request failed.
    UploadFailed { message: String },
    /// One poll round came back.
    ProgressReported { report: ProgressReport },
    /// A poll round failed.
    PollFailed { message: String },
    /// User asked to start over.
    ResetRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
