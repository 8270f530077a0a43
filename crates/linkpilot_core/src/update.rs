use crate::scheduler::{DispatchPorts, Phase, SchedulerError};
use crate::{build_export, AppState, Effect, ExportError, Msg, Page, StreamPhase};

const NOTICE_NO_LINKS: &str = "No links provided";
const NOTICE_NOTHING_TO_OPEN: &str = "No links to open!";
const NOTICE_SUBMISSION_PENDING: &str = "A submission is already in progress";

/// Collects scheduler side effects as `Effect`s for the effect runner.
struct EffectPorts<'a> {
    effects: &'a mut Vec<Effect>,
}

impl DispatchPorts for EffectPorts<'_> {
    fn open_external(&mut self, uri: &str) {
        self.effects.push(Effect::OpenExternal {
            uri: uri.to_string(),
        });
    }

    fn arm_countdown(&mut self, generation: u64) {
        self.effects.push(Effect::ArmCountdown { generation });
    }

    fn cancel_countdown(&mut self, generation: u64) {
        self.effects.push(Effect::CancelCountdown { generation });
    }
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();

    match msg {
        Msg::InputChanged(text) => state.set_input(text),
        Msg::LinksSubmitted => {
            let links = parse_links(state.input());
            if links.is_empty() {
                state.set_notice(NOTICE_NO_LINKS);
            } else if state.session().stream() == StreamPhase::Submitting {
                state.set_notice(NOTICE_SUBMISSION_PENDING);
            } else {
                abandon_session(&mut state, &mut effects);
                state.begin_submission();
                effects.push(Effect::SubmitJob { links });
            }
        }
        Msg::JobAccepted { job } => {
            if state.accept_job(job.clone()) {
                effects.push(Effect::Subscribe { job });
            }
        }
        Msg::SubmissionFailed { message } => {
            if state.session().stream() == StreamPhase::Submitting {
                state.submission_failed(message);
            }
        }
        Msg::ProgressReceived { job, update } => state.apply_progress(&job, update),
        Msg::JobCompleted { job, store } => state.apply_completed(&job, store),
        Msg::StreamFailed { job, message } => state.apply_stream_failure(&job, message),
        Msg::DelayChanged(seconds) => state.set_delay(seconds),
        Msg::AutoOpenStartClicked => {
            let items = state.dispatchable_uris();
            let delay = state.delay_seconds();
            let mut ports = EffectPorts {
                effects: &mut effects,
            };
            match state.scheduler_mut().start(items, delay, &mut ports) {
                Ok(()) => {
                    state.navigate(Page::AutoOpen);
                }
                Err(SchedulerError::NoItems) => state.set_notice(NOTICE_NOTHING_TO_OPEN),
                // Controls for forbidden transitions are hidden by the view.
                Err(SchedulerError::InvalidTransition { .. }) => {}
            }
        }
        Msg::PauseClicked => {
            let mut ports = EffectPorts {
                effects: &mut effects,
            };
            let _ = state.scheduler_mut().toggle_pause(&mut ports);
        }
        Msg::StopClicked => {
            let mut ports = EffectPorts {
                effects: &mut effects,
            };
            let _ = state.scheduler_mut().stop(&mut ports);
        }
        Msg::CountdownTick { generation } => {
            if state.session().scheduler().armed_generation() == Some(generation) {
                let mut ports = EffectPorts {
                    effects: &mut effects,
                };
                state.scheduler_mut().on_tick(generation, &mut ports);
            }
        }
        Msg::OpenSingleClicked { index } => {
            let uri = state
                .session()
                .results()
                .and_then(|store| store.successful().get(index))
                .map(|item| item.download_uri.clone());
            if let Some(uri) = uri {
                effects.push(Effect::OpenExternal { uri });
            }
        }
        Msg::ExportClicked { epoch_millis } => {
            let artifact = match state.session().results() {
                Some(store) => build_export(store, state.export_prefix(), epoch_millis),
                None => Err(ExportError::NothingToExport),
            };
            match artifact {
                Ok(artifact) => effects.push(Effect::WriteExport { artifact }),
                Err(err) => state.set_notice(err.to_string()),
            }
        }
        Msg::ExportWritten { path } => state.set_notice(format!("Saved {path}")),
        Msg::ExportFailed { message } => state.set_notice(message),
        Msg::Navigate(page) => {
            state.navigate(page);
        }
        Msg::NewSessionClicked => {
            abandon_session(&mut state, &mut effects);
            state.reset_session();
        }
        Msg::NoOp => {}
    }

    (state, effects)
}

/// Stops the scheduler and closes a still-open progress channel before the
/// session is replaced.
fn abandon_session(state: &mut AppState, effects: &mut Vec<Effect>) {
    if state.session().scheduler().phase() != Phase::Idle {
        let mut ports = EffectPorts {
            effects: &mut *effects,
        };
        let _ = state.scheduler_mut().stop(&mut ports);
    }
    if state.session().stream() == StreamPhase::Streaming {
        if let Some(job) = state.session().job().cloned() {
            effects.push(Effect::CloseSubscription { job });
        }
    }
}

fn parse_links(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
