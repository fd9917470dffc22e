use crate::state::JobRow;
use crate::{BatchCounts, JobStatus, Phase};

/// Which panel the renderer should show. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Picker,
    Progress,
    Results,
    Error,
}

impl Panel {
    fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Panel::Picker,
            Phase::Uploading | Phase::Polling => Panel::Progress,
            Phase::Done => Panel::Results,
            Phase::Error => Panel::Error,
        }
    }
}

/// Render-ready snapshot of a session. Everything is preformatted so the
/// renderer never touches raw numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub panel: Panel,
    pub phase: Phase,
    pub files: Vec<FileRowView>,
    /// Batch sessions only: "3 / 5 files done".
    pub batch_line: Option<String>,
    pub results: Vec<ResultRowView>,
    pub summary: Option<BatchCounts>,
    pub error: Option<String>,
}

impl SessionView {
    /// Names of every compressed output ready to download.
    pub fn output_files(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|row| match &row.outcome {
                ResultOutcome::Success { output_file, .. } => Some(output_file.clone()),
                ResultOutcome::Failure { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub filename: String,
    pub status_label: &'static str,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub filename: String,
    pub outcome: ResultOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome {
    Success {
        /// "5.00 MB → 2.10 MB"
        size_line: String,
        /// "58.0% smaller"
        ratio_line: String,
        output_file: String,
    },
    Failure {
        message: String,
    },
}

pub(crate) fn build_view(
    phase: Phase,
    rows: &[JobRow],
    counts: Option<&BatchCounts>,
    error: Option<&str>,
) -> SessionView {
    let files = rows
        .iter()
        .map(|row| FileRowView {
            filename: row.filename.clone(),
            status_label: status_label(row.status),
            percent: row.percent,
        })
        .collect();

    let batch_line = counts.map(|counts| {
        format!(
            "{} / {} files done",
            counts.completed + counts.failed,
            counts.total_files
        )
    });

    let results = if phase == Phase::Done {
        rows.iter().map(result_row).collect()
    } else {
        Vec::new()
    };

    SessionView {
        panel: Panel::for_phase(phase),
        phase,
        files,
        batch_line,
        results,
        summary: counts.copied().filter(|_| phase == Phase::Done),
        error: error.map(ToOwned::to_owned),
    }
}

fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "waiting",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "✓ done",
        JobStatus::Error => "✗ failed",
    }
}

fn result_row(row: &JobRow) -> ResultRowView {
    let outcome = match (&row.stats, row.status) {
        (Some(stats), JobStatus::Completed) => ResultOutcome::Success {
            size_line: size_line(stats.original_mb, stats.compressed_mb),
            ratio_line: ratio_line(stats.ratio_percent),
            output_file: stats.output_file.clone(),
        },
        _ => ResultOutcome::Failure {
            message: row
                .error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_owned()),
        },
    };
    ResultRowView {
        filename: row.filename.clone(),
        outcome,
    }
}

fn size_line(original_mb: f64, compressed_mb: f64) -> String {
    format!("{original_mb:.2} MB → {compressed_mb:.2} MB")
}

fn ratio_line(ratio_percent: f64) -> String {
    format!("{ratio_percent:.1}% smaller")
}
