use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{
    ApiSettings, CompressionApi, HttpCompressionApi, UploadFile, UploadKind, UploadParams,
};
use crate::save::OutputSaver;
use crate::types::{ApiError, ClientEvent, HealthReport, PollTarget, ProgressSnapshot};

enum ClientCommand {
    Upload {
        kind: UploadKind,
        files: Vec<UploadFile>,
        params: UploadParams,
    },
    StartPolling {
        target: PollTarget,
    },
    StopPolling,
    SaveOutput {
        filename: String,
    },
}

/// Owns the client thread and its tokio runtime. Commands go in over a
/// channel, [`ClientEvent`]s come back the same way, so callers stay free of
/// async plumbing.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(settings: ApiSettings, saver: OutputSaver) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let poll_interval = settings.poll_interval;
        let api = Arc::new(HttpCompressionApi::new(settings));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // At most one poll loop is live; starting a new one cancels the old.
            let mut poll_guard: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::Upload {
                        kind,
                        files,
                        params,
                    } => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            client_debug!("Uploading {} file(s)", files.len());
                            let result = api.upload(kind, &files, params).await;
                            let _ = event_tx.send(ClientEvent::UploadFinished { result });
                        });
                    }
                    ClientCommand::StartPolling { target } => {
                        if let Some(token) = poll_guard.take() {
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        poll_guard = Some(token.clone());
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            poll_until_cancelled(
                                api.as_ref(),
                                &target,
                                poll_interval,
                                token,
                                &event_tx,
                            )
                            .await;
                        });
                    }
                    ClientCommand::StopPolling => {
                        if let Some(token) = poll_guard.take() {
                            token.cancel();
                        }
                    }
                    ClientCommand::SaveOutput { filename } => {
                        let api = api.clone();
                        let saver = saver.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = api.download(&filename, &saver).await;
                            let _ = event_tx.send(ClientEvent::OutputSaved { filename, result });
                        });
                    }
                }
            }
            // Handle dropped: stop a live poll before the runtime goes away.
            if let Some(token) = poll_guard.take() {
                token.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn upload(&self, kind: UploadKind, files: Vec<UploadFile>, params: UploadParams) {
        let _ = self.cmd_tx.send(ClientCommand::Upload {
            kind,
            files,
            params,
        });
    }

    pub fn start_polling(&self, target: PollTarget) {
        let _ = self.cmd_tx.send(ClientCommand::StartPolling { target });
    }

    pub fn stop_polling(&self) {
        let _ = self.cmd_tx.send(ClientCommand::StopPolling);
    }

    pub fn save_output(&self, filename: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::SaveOutput {
            filename: filename.into(),
        });
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Asks for progress once per tick until cancelled. The first tick fires
/// immediately so a fresh upload shows progress without the interval delay.
/// A failed round reports the error and ends the loop.
async fn poll_until_cancelled(
    api: &dyn CompressionApi,
    target: &PollTarget,
    poll_interval: Duration,
    token: CancellationToken,
    event_tx: &mpsc::Sender<ClientEvent>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let outcome = match target {
            PollTarget::Job { job_id } => api.job_progress(job_id).await.map(ProgressSnapshot::Job),
            PollTarget::Batch { batch_id } => api
                .batch_progress(batch_id)
                .await
                .map(ProgressSnapshot::Batch),
        };
        if token.is_cancelled() {
            break;
        }
        match outcome {
            Ok(snapshot) => {
                let _ = event_tx.send(ClientEvent::ProgressReported { snapshot });
            }
            Err(error) => {
                client_warn!("Progress poll failed: {}", error);
                let _ = event_tx.send(ClientEvent::PollFailed { error });
                break;
            }
        }
    }
}

/// Blocking health probe for one-shot use outside the client thread.
pub fn check_health(settings: &ApiSettings) -> Result<HealthReport, ApiError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let api = HttpCompressionApi::new(settings.clone());
    runtime.block_on(api.health())
}
