use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use client_logging::{client_info, client_warn};
use pdfpress_core::{
    update, BatchCounts, Effect, JobStats, JobStatus, JobUpdate, Msg, ParamMode, Phase, PollTarget,
    ProgressReport, SelectedFile, Session, UploadKind, UploadReceipt,
};
use pdfpress_engine::{
    check_health, ApiSettings, BatchReport, ClientEvent, ClientHandle, JobReport,
    JobStatus as WireStatus, OutputSaver, PollTarget as WireTarget, ProgressSnapshot, UploadFile,
    UploadKind as WireKind, UploadParams, UploadReceipt as WireReceipt,
};

use crate::render::ProgressRenderer;

/// How long the controller sleeps between checks for client events.
const EVENT_WAIT: Duration = Duration::from_millis(50);
/// Upper bound on waiting for one download to finish.
const DOWNLOAD_WAIT: Duration = Duration::from_secs(300);

pub struct RunConfig {
    pub server: String,
    pub kind: UploadKind,
    pub inputs: Vec<PathBuf>,
    pub mode: ParamMode,
    pub output_dir: PathBuf,
    pub no_download: bool,
}

/// What a finished run amounts to. A non-clean summary turns into a nonzero
/// exit code.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub failed_jobs: usize,
    pub failed_downloads: usize,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed_jobs == 0 && self.failed_downloads == 0
    }
}

/// Drives one compression session from selection to downloaded results.
///
/// The session state machine stays pure; this loop feeds it client events,
/// executes the effects it asks for and renders every new view.
pub fn run(config: RunConfig) -> Result<RunSummary> {
    let RunConfig {
        server,
        kind,
        inputs,
        mode,
        output_dir,
        no_download,
    } = config;

    let files = stat_inputs(&inputs)?;
    let settings = ApiSettings {
        base_url: server,
        ..ApiSettings::default()
    };
    let saver = OutputSaver::new(output_dir);
    let client = ClientHandle::new(settings, saver.clone());
    let mut renderer = ProgressRenderer::new();

    let mut session = Session::new(kind);
    session = dispatch(session, Msg::FilesChosen { files, mode }, &client, &mut renderer);

    while !matches!(session.phase(), Phase::Done | Phase::Error) {
        let Some(event) = client.recv_timeout(EVENT_WAIT) else {
            continue;
        };
        session = dispatch(session, map_event(event), &client, &mut renderer);
    }

    let view = session.view();
    if session.phase() == Phase::Error {
        renderer.clear();
        bail!(view.error.unwrap_or_else(|| "Unknown error".to_owned()));
    }

    renderer.print_results(&view);
    let failed_jobs = view.summary.map_or(0, |counts| counts.failed);

    let failed_downloads = if no_download {
        0
    } else {
        download_outputs(&client, &renderer, &saver, view.output_files())?
    };

    Ok(RunSummary {
        failed_jobs,
        failed_downloads,
    })
}

/// One-shot backend probe for `pdfpress health`.
pub fn health(server: String) -> Result<RunSummary> {
    let settings = ApiSettings {
        base_url: server,
        request_timeout: Some(Duration::from_secs(10)),
        ..ApiSettings::default()
    };
    let report = check_health(&settings)?;
    println!("Server is {} (checked {})", report.status, report.timestamp);
    Ok(RunSummary::default())
}

fn dispatch(
    session: Session,
    msg: Msg,
    client: &ClientHandle,
    renderer: &mut ProgressRenderer,
) -> Session {
    let (next, effects) = update(session, msg);
    run_effects(effects, client);
    renderer.render(&next.view());
    next
}

fn run_effects(effects: Vec<Effect>, client: &ClientHandle) {
    for effect in effects {
        match effect {
            Effect::StartUpload {
                kind,
                files,
                params,
            } => {
                client_info!("Uploading {} file(s)", files.len());
                let uploads = files
                    .into_iter()
                    .map(|file| UploadFile {
                        name: file.name,
                        path: file.path,
                    })
                    .collect();
                client.upload(
                    map_kind(kind),
                    uploads,
                    UploadParams {
                        dpi: params.dpi,
                        quality: params.quality,
                    },
                );
            }
            Effect::StartPolling { target } => client.start_polling(map_target(target)),
            Effect::StopPolling => client.stop_polling(),
        }
    }
}

/// Reads size and display name for each input before anything is validated.
fn stat_inputs(inputs: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    inputs
        .iter()
        .map(|path| {
            let metadata = fs::metadata(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("not a usable file name: {}", path.display()))?;
            Ok(SelectedFile {
                name,
                size_bytes: metadata.len(),
                path: path.clone(),
            })
        })
        .collect()
}

/// Fetches every compressed output and reports each landing. Returns the
/// number of failed downloads.
fn download_outputs(
    client: &ClientHandle,
    renderer: &ProgressRenderer,
    saver: &OutputSaver,
    outputs: Vec<String>,
) -> Result<usize> {
    if outputs.is_empty() {
        return Ok(0);
    }
    for filename in &outputs {
        client.save_output(filename.clone());
    }
    let mut remaining = outputs.len();
    let mut failed = 0;
    while remaining > 0 {
        match client.recv_timeout(DOWNLOAD_WAIT) {
            Some(ClientEvent::OutputSaved { filename, result }) => {
                remaining -= 1;
                match result {
                    Ok(path) => renderer.note_saved(&path),
                    Err(error) => {
                        failed += 1;
                        client_warn!("Download of {} failed: {}", filename, error);
                        renderer.note_save_failed(&filename, &error.to_string());
                    }
                }
            }
            // Late poll events can still be queued behind the downloads.
            Some(_) => {}
            None => bail!("timed out waiting for downloads"),
        }
    }
    let saved = outputs.len() - failed;
    if saved > 0 {
        renderer.note_download_dir(saved, saver.dir());
    }
    Ok(failed)
}

fn map_kind(kind: UploadKind) -> WireKind {
    match kind {
        UploadKind::Single => WireKind::Single,
        UploadKind::Batch => WireKind::Batch,
    }
}

fn map_target(target: PollTarget) -> WireTarget {
    match target {
        PollTarget::Job { job_id } => WireTarget::Job { job_id },
        PollTarget::Batch { batch_id } => WireTarget::Batch { batch_id },
    }
}

fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::UploadFinished { result } => match result {
            Ok(receipt) => Msg::UploadAccepted {
                receipt: map_receipt(receipt),
            },
            Err(error) => Msg::UploadFailed {
                message: error.to_string(),
            },
        },
        ClientEvent::ProgressReported { snapshot } => Msg::ProgressReported {
            report: map_snapshot(snapshot),
        },
        ClientEvent::PollFailed { error } => Msg::PollFailed {
            message: error.to_string(),
        },
        // Downloads run after the session settles, so this is always stale.
        ClientEvent::OutputSaved { .. } => Msg::NoOp,
    }
}

fn map_receipt(receipt: WireReceipt) -> UploadReceipt {
    match receipt {
        WireReceipt::Job { job_id } => UploadReceipt::Job { job_id },
        WireReceipt::Batch { batch_id, job_ids } => UploadReceipt::Batch { batch_id, job_ids },
    }
}

fn map_snapshot(snapshot: ProgressSnapshot) -> ProgressReport {
    match snapshot {
        ProgressSnapshot::Job(report) => ProgressReport::Job(map_report(report)),
        ProgressSnapshot::Batch(batch) => map_batch(batch),
    }
}

fn map_batch(batch: BatchReport) -> ProgressReport {
    ProgressReport::Batch {
        counts: BatchCounts {
            total_files: batch.total_files,
            completed: batch.completed,
            failed: batch.failed,
        },
        jobs: batch
            .files
            .into_iter()
            .map(|(job_id, report)| (job_id, map_report(report)))
            .collect(),
    }
}

fn map_report(report: JobReport) -> JobUpdate {
    let JobReport {
        status,
        progress,
        filename,
        output_file,
        original_size,
        compressed_size,
        compression_ratio,
        error,
        message: _,
    } = report;
    // Result figures only count once the backend sent the full set.
    let stats = match (output_file, original_size, compressed_size, compression_ratio) {
        (Some(output_file), Some(original_mb), Some(compressed_mb), Some(ratio_percent)) => {
            Some(JobStats {
                original_mb,
                compressed_mb,
                ratio_percent,
                output_file,
            })
        }
        _ => None,
    };
    JobUpdate {
        status: map_status(status),
        progress,
        filename,
        stats,
        error,
    }
}

fn map_status(status: WireStatus) -> JobStatus {
    match status {
        WireStatus::Pending => JobStatus::Pending,
        WireStatus::Processing => JobStatus::Processing,
        WireStatus::Completed => JobStatus::Completed,
        WireStatus::Error => JobStatus::Error,
        // Unknown backend phases read as "not started yet".
        WireStatus::Other => JobStatus::Pending,
    }
}
