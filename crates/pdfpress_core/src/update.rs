use crate::{validate_selection, Effect, Msg, Phase, Session};

/// Pure update function: applies a message to the session and returns any
/// effects. Messages that do not fit the current phase are dropped, so stale
/// engine events after a reset or failure cannot corrupt the session.
pub fn update(mut session: Session, msg: Msg) -> (Session, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesChosen { files, mode } => {
            if session.phase() != Phase::Idle {
                return (session, Vec::new());
            }
            let limits = session.kind().limits();
            match validate_selection(&files, &limits) {
                Err(error) => {
                    session.fail(error.to_string());
                    Vec::new()
                }
                Ok(()) => {
                    let filenames = files.iter().map(|file| file.name.clone()).collect();
                    session.begin_upload(filenames);
                    vec![Effect::StartUpload {
                        kind: session.kind(),
                        files,
                        params: mode.effective(),
                    }]
                }
            }
        }
        Msg::UploadAccepted { receipt } => {
            if session.phase() != Phase::Uploading {
                return (session, Vec::new());
            }
            let target = session.begin_polling(&receipt);
            vec![Effect::StartPolling { target }]
        }
        Msg::UploadFailed { message } => {
            if session.phase() != Phase::Uploading {
                return (session, Vec::new());
            }
            session.fail(message);
            Vec::new()
        }
        Msg::ProgressReported { report } => {
            if session.phase() != Phase::Polling {
                return (session, Vec::new());
            }
            session.apply_report(&report);
            if session.all_terminal() {
                session.complete();
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::PollFailed { message } => {
            if session.phase() != Phase::Polling {
                return (session, Vec::new());
            }
            session.fail(message);
            vec![Effect::StopPolling]
        }
        Msg::ResetRequested => {
            let was_polling = session.phase() == Phase::Polling;
            session.reset();
            if was_polling {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (session, effects)
}
