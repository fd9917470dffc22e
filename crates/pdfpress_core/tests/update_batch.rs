use std::path::PathBuf;

use pdfpress_core::{
    update, BatchCounts, CompressionParams, Effect, JobStats, JobStatus, JobUpdate, Msg, Panel,
    ParamMode, Phase, PollTarget, ProgressReport, ResultOutcome, Session, UploadKind,
    UploadReceipt,
};

const MB: u64 = 1024 * 1024;

fn pdf(name: &str) -> pdfpress_core::SelectedFile {
    pdfpress_core::SelectedFile {
        name: name.to_string(),
        size_bytes: 2 * MB,
        path: PathBuf::from(name),
    }
}

/// A polling batch session with three rows bound to j1/j2/j3.
fn polling_batch() -> Session {
    let session = Session::new(UploadKind::Batch);
    let (session, _effects) = update(
        session,
        Msg::FilesChosen {
            files: vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
            mode: ParamMode::Manual(CompressionParams::defaults_for(UploadKind::Batch)),
        },
    );
    let (session, _effects) = update(
        session,
        Msg::UploadAccepted {
            receipt: UploadReceipt::Batch {
                batch_id: "batch-1".to_string(),
                job_ids: vec!["j1".to_string(), "j2".to_string(), "j3".to_string()],
            },
        },
    );
    session
}

fn batch_report(counts: BatchCounts, jobs: Vec<(&str, JobUpdate)>) -> Msg {
    Msg::ProgressReported {
        report: ProgressReport::Batch {
            counts,
            jobs: jobs
                .into_iter()
                .map(|(id, job)| (id.to_string(), job))
                .collect(),
        },
    }
}

fn processing(progress: f64) -> JobUpdate {
    JobUpdate {
        status: JobStatus::Processing,
        progress,
        filename: None,
        stats: None,
        error: None,
    }
}

fn pending() -> JobUpdate {
    JobUpdate {
        status: JobStatus::Pending,
        progress: 0.0,
        filename: None,
        stats: None,
        error: None,
    }
}

fn completed(output: &str) -> JobUpdate {
    JobUpdate {
        status: JobStatus::Completed,
        progress: 100.0,
        filename: None,
        stats: Some(JobStats {
            original_mb: 2.0,
            compressed_mb: 1.0,
            ratio_percent: 50.0,
            output_file: output.to_string(),
        }),
        error: None,
    }
}

fn failed(message: &str) -> JobUpdate {
    JobUpdate {
        status: JobStatus::Error,
        progress: 0.0,
        filename: None,
        stats: None,
        error: Some(message.to_string()),
    }
}

#[test]
fn batch_receipt_binds_rows_in_selection_order() {
    let session = Session::new(UploadKind::Batch);
    let (session, _effects) = update(
        session,
        Msg::FilesChosen {
            files: vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")],
            mode: ParamMode::Auto,
        },
    );
    let (session, effects) = update(
        session,
        Msg::UploadAccepted {
            receipt: UploadReceipt::Batch {
                batch_id: "batch-1".to_string(),
                job_ids: vec!["j1".to_string(), "j2".to_string(), "j3".to_string()],
            },
        },
    );

    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            target: PollTarget::Batch {
                batch_id: "batch-1".to_string(),
            },
        }]
    );

    // An update addressed to j2 lands on the second row only.
    let (session, _effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 0,
                failed: 0,
            },
            vec![("j2", processing(30.0))],
        ),
    );
    let view = session.view();
    assert_eq!(view.files[0].status_label, "waiting");
    assert_eq!(view.files[1].status_label, "processing");
    assert_eq!(view.files[1].percent, 30);
    assert_eq!(view.files[2].status_label, "waiting");
}

#[test]
fn batch_line_counts_terminal_jobs() {
    let session = polling_batch();
    let (session, effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 1,
                failed: 1,
            },
            vec![
                ("j1", completed("a_compressed.pdf")),
                ("j2", failed("encrypted file")),
                ("j3", processing(10.0)),
            ],
        ),
    );

    assert!(effects.is_empty());
    assert_eq!(session.phase(), Phase::Polling);
    assert_eq!(
        session.view().batch_line.as_deref(),
        Some("2 / 3 files done")
    );
}

#[test]
fn batch_with_failures_still_finishes() {
    let session = polling_batch();
    let (session, effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 2,
                failed: 1,
            },
            vec![
                ("j1", completed("a_compressed.pdf")),
                ("j2", failed("encrypted file")),
                ("j3", completed("c_compressed.pdf")),
            ],
        ),
    );
    let view = session.view();

    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(session.phase(), Phase::Done);
    assert_eq!(view.panel, Panel::Results);
    assert_eq!(
        view.summary,
        Some(BatchCounts {
            total_files: 3,
            completed: 2,
            failed: 1,
        })
    );
    assert_eq!(view.results.len(), 3);
    assert_eq!(
        view.results[1].outcome,
        ResultOutcome::Failure {
            message: "encrypted file".to_string(),
        }
    );
    assert_eq!(
        view.output_files(),
        vec![
            "a_compressed.pdf".to_string(),
            "c_compressed.pdf".to_string()
        ]
    );
}

#[test]
fn terminal_rows_ignore_later_updates() {
    let session = polling_batch();
    let (session, _effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 1,
                failed: 0,
            },
            vec![("j1", completed("a_compressed.pdf"))],
        ),
    );

    // A stale poll response must not pull a finished job back to processing.
    let (session, _effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 1,
                failed: 0,
            },
            vec![("j1", processing(10.0))],
        ),
    );
    let view = session.view();
    assert_eq!(view.files[0].status_label, "✓ done");
    assert_eq!(view.files[0].percent, 100);
}

#[test]
fn status_never_regresses_to_pending() {
    let in_flight = BatchCounts {
        total_files: 3,
        completed: 0,
        failed: 0,
    };
    let session = polling_batch();
    let (session, _effects) = update(
        session,
        batch_report(in_flight, vec![("j1", processing(40.0))]),
    );
    let (session, _effects) = update(session, batch_report(in_flight, vec![("j1", pending())]));

    assert_eq!(session.phase(), Phase::Polling);
    assert_eq!(session.view().files[0].status_label, "processing");
}

#[test]
fn unknown_job_ids_are_ignored() {
    let session = polling_batch();
    let before = session.view();

    let (session, _effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 0,
                failed: 0,
            },
            vec![("no-such-job", processing(50.0))],
        ),
    );

    assert_eq!(session.view().files, before.files);
}

#[test]
fn reset_clears_batch_state() {
    let session = polling_batch();
    let (session, _effects) = update(
        session,
        batch_report(
            BatchCounts {
                total_files: 3,
                completed: 2,
                failed: 1,
            },
            vec![
                ("j1", completed("a_compressed.pdf")),
                ("j2", failed("encrypted file")),
                ("j3", completed("c_compressed.pdf")),
            ],
        ),
    );
    assert_eq!(session.phase(), Phase::Done);

    let (session, effects) = update(session, Msg::ResetRequested);
    let view = session.view();

    assert!(effects.is_empty());
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.kind(), UploadKind::Batch);
    assert!(view.files.is_empty());
    assert!(view.batch_line.is_none());
    assert!(view.results.is_empty());
    assert!(view.summary.is_none());
}
