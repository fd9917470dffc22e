//! Pdfpress core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod params;
mod selection;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use params::{CompressionParams, ParamMode, DPI_RANGE, QUALITY_RANGE};
pub use selection::{
    validate_selection, SelectedFile, SelectionError, SelectionLimits, UploadKind,
};
pub use state::{
    BatchCounts, JobId, JobStats, JobStatus, JobUpdate, Phase, PollTarget, ProgressReport, Session,
    UploadReceipt,
};
pub use update::update;
pub use view_model::{FileRowView, Panel, ResultOutcome, ResultRowView, SessionView};
