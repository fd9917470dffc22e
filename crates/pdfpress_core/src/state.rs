use crate::view_model::{self, SessionView};
use crate::UploadKind;

pub type JobId = String;

/// Lifecycle of one compression session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for a selection.
    #[default]
    Idle,
    /// Upload request in flight.
    Uploading,
    /// Upload accepted, progress polling running.
    Polling,
    /// Every job reached a terminal status.
    Done,
    /// Session-level failure (rejected selection, upload or poll error,
    /// or the single job itself failed).
    Error,
}

/// Backend-reported status of one job. Terminal statuses are final: a job
/// never leaves `Completed` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Ordering used to reject stale updates: pending < processing < terminal.
    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Error => 2,
        }
    }
}

/// Size outcome of a completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStats {
    pub original_mb: f64,
    pub compressed_mb: f64,
    pub ratio_percent: f64,
    /// Name to pass to the download endpoint.
    pub output_file: String,
}

/// One poll's worth of news about a job. Optional fields only overwrite what
/// they carry.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub progress: f64,
    pub filename: Option<String>,
    pub stats: Option<JobStats>,
    pub error: Option<String>,
}

/// Batch-level tallies as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchCounts {
    pub total_files: usize,
    pub completed: usize,
    pub failed: usize,
}

/// What a successful upload hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReceipt {
    Job {
        job_id: JobId,
    },
    /// `job_ids` are in selection order and bind jobs to rows.
    Batch {
        batch_id: String,
        job_ids: Vec<JobId>,
    },
}

/// Where the poller should ask for progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    Job { job_id: JobId },
    Batch { batch_id: String },
}

/// One poll response, already shaped per upload kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressReport {
    Job(JobUpdate),
    Batch {
        counts: BatchCounts,
        jobs: Vec<(JobId, JobUpdate)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JobRow {
    pub(crate) job_id: Option<JobId>,
    pub(crate) filename: String,
    pub(crate) status: JobStatus,
    pub(crate) percent: u8,
    pub(crate) stats: Option<JobStats>,
    pub(crate) error: Option<String>,
}

impl JobRow {
    fn new(filename: String) -> Self {
        JobRow {
            job_id: None,
            filename,
            status: JobStatus::Pending,
            percent: 0,
            stats: None,
            error: None,
        }
    }

    fn apply(&mut self, update: &JobUpdate) {
        if self.status.is_terminal() {
            return;
        }
        if update.status.rank() < self.status.rank() {
            return;
        }
        self.status = update.status;
        self.percent = clamp_percent(update.progress);
        if update.status == JobStatus::Completed {
            self.percent = 100;
        }
        if let Some(name) = &update.filename {
            self.filename = name.clone();
        }
        if let Some(stats) = &update.stats {
            self.stats = Some(stats.clone());
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
    }
}

/// All client-side session state. Fields are private; messages are the only
/// way in and [`Session::view`] the only way out.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    phase: Phase,
    kind: UploadKind,
    rows: Vec<JobRow>,
    counts: Option<BatchCounts>,
    error: Option<String>,
}

impl Session {
    pub fn new(kind: UploadKind) -> Self {
        Session {
            kind,
            ..Session::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn view(&self) -> SessionView {
        view_model::build_view(
            self.phase,
            &self.rows,
            self.counts.as_ref(),
            self.error.as_deref(),
        )
    }

    pub(crate) fn begin_upload(&mut self, filenames: Vec<String>) {
        self.rows = filenames.into_iter().map(JobRow::new).collect();
        self.counts = None;
        self.error = None;
        self.phase = Phase::Uploading;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = Phase::Error;
        self.error = Some(message);
    }

    /// Binds backend job ids to rows and enters `Polling`. Batch ids arrive in
    /// selection order, so a positional zip is the binding.
    pub(crate) fn begin_polling(&mut self, receipt: &UploadReceipt) -> PollTarget {
        let target = match receipt {
            UploadReceipt::Job { job_id } => {
                if let Some(row) = self.rows.first_mut() {
                    row.job_id = Some(job_id.clone());
                }
                PollTarget::Job {
                    job_id: job_id.clone(),
                }
            }
            UploadReceipt::Batch { batch_id, job_ids } => {
                for (row, job_id) in self.rows.iter_mut().zip(job_ids) {
                    row.job_id = Some(job_id.clone());
                }
                self.counts = Some(BatchCounts {
                    total_files: self.rows.len(),
                    completed: 0,
                    failed: 0,
                });
                PollTarget::Batch {
                    batch_id: batch_id.clone(),
                }
            }
        };
        self.phase = Phase::Polling;
        target
    }

    pub(crate) fn apply_report(&mut self, report: &ProgressReport) {
        match report {
            ProgressReport::Job(update) => {
                if let Some(row) = self.rows.first_mut() {
                    row.apply(update);
                }
            }
            ProgressReport::Batch { counts, jobs } => {
                self.counts = Some(*counts);
                for (job_id, update) in jobs {
                    if let Some(row) = self
                        .rows
                        .iter_mut()
                        .find(|row| row.job_id.as_ref() == Some(job_id))
                    {
                        row.apply(update);
                    }
                }
            }
        }
    }

    /// Whether polling has nothing left to wait for. Batch sessions trust the
    /// backend tallies; a single session looks at its one row.
    pub(crate) fn all_terminal(&self) -> bool {
        match self.kind {
            UploadKind::Single => self
                .rows
                .first()
                .is_some_and(|row| row.status.is_terminal()),
            UploadKind::Batch => self
                .counts
                .is_some_and(|counts| counts.completed + counts.failed >= counts.total_files),
        }
    }

    /// Settles the session once every job is terminal. A failed single job is
    /// a session error; a batch with failures still finishes as `Done` and
    /// shows per-row outcomes.
    pub(crate) fn complete(&mut self) {
        if self.kind == UploadKind::Single {
            if let Some(row) = self.rows.first() {
                if row.status == JobStatus::Error {
                    let message = row
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_owned());
                    self.fail(message);
                    return;
                }
            }
        }
        self.phase = Phase::Done;
    }

    pub(crate) fn reset(&mut self) {
        *self = Session::new(self.kind);
    }
}

fn clamp_percent(progress: f64) -> u8 {
    progress.round().clamp(0.0, 100.0) as u8
}
