use std::sync::mpsc;
use std::thread;

use linkpilot_core::{Effect, Msg};
use linkpilot_engine::{ArtifactWriter, EngineEvent, EngineHandle, ExternalOpener};
use pilot_logging::{pilot_debug, pilot_info, pilot_warn};

use super::app::LoopEvent;

/// Executes effects from `update` against the engine, the opener and the
/// export directory.
pub struct EffectRunner {
    engine: EngineHandle,
    opener: Box<dyn ExternalOpener>,
    writer: ArtifactWriter,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        opener: Box<dyn ExternalOpener>,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            engine,
            opener,
            writer,
        }
    }

    /// Runs `effects` in order and returns the messages produced by the ones
    /// that complete synchronously.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitJob { links } => {
                    pilot_info!("SubmitJob links={}", links.len());
                    self.engine.submit(links);
                }
                Effect::Subscribe { job } => {
                    pilot_info!("Subscribe job={}", job);
                    self.engine.subscribe(job);
                }
                Effect::CloseSubscription { job } => {
                    pilot_info!("CloseSubscription job={}", job);
                    self.engine.close_subscription(job);
                }
                Effect::OpenExternal { uri } => {
                    pilot_info!("OpenExternal uri={}", uri);
                    if let Err(err) = self.opener.open(&uri) {
                        pilot_warn!("Failed to open {}: {}", uri, err);
                    }
                }
                Effect::ArmCountdown { generation } => {
                    self.engine.arm_countdown(generation);
                }
                Effect::CancelCountdown { generation } => {
                    self.engine.cancel_countdown(generation);
                }
                Effect::WriteExport { artifact } => match self.writer.write(&artifact) {
                    Ok(path) => follow_ups.push(Msg::ExportWritten {
                        path: path.display().to_string(),
                    }),
                    Err(err) => {
                        pilot_warn!("Export of {} failed: {}", artifact.filename, err);
                        follow_ups.push(Msg::ExportFailed {
                            message: format!("Failed to save {}: {err}", artifact.filename),
                        });
                    }
                },
            }
        }
        follow_ups
    }
}

/// Forwards engine events into the app loop until either side hangs up.
pub fn spawn_event_pump(events: mpsc::Receiver<EngineEvent>, loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            let Some(msg) = map_event(event) else {
                continue;
            };
            if loop_tx.send(LoopEvent::Msg(msg)).is_err() {
                break;
            }
        }
        pilot_debug!("Engine event pump finished");
    });
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::JobAccepted { job } => Msg::JobAccepted { job },
        EngineEvent::SubmissionFailed { error } => Msg::SubmissionFailed {
            message: error.to_string(),
        },
        EngineEvent::Progress { job, update } => Msg::ProgressReceived { job, update },
        EngineEvent::Completed { job, store } => Msg::JobCompleted { job, store },
        EngineEvent::StreamFailed { job, message } => Msg::StreamFailed { job, message },
        EngineEvent::StreamClosed { job } => {
            pilot_debug!("Stream closed job={}", job);
            return None;
        }
        EngineEvent::CountdownTick { generation } => Msg::CountdownTick { generation },
    };
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkpilot_core::JobHandle;
    use linkpilot_engine::ClientError;
    use pretty_assertions::assert_eq;

    #[test]
    fn submission_errors_become_notices() {
        assert_eq!(
            map_event(EngineEvent::SubmissionFailed {
                error: ClientError::Rejected("No links provided".to_string())
            }),
            Some(Msg::SubmissionFailed {
                message: "No links provided".to_string()
            })
        );
    }

    #[test]
    fn stream_closed_has_no_message() {
        assert_eq!(
            map_event(EngineEvent::StreamClosed {
                job: JobHandle::new("job")
            }),
            None
        );
    }

    #[test]
    fn ticks_keep_their_generation() {
        assert_eq!(
            map_event(EngineEvent::CountdownTick { generation: 9 }),
            Some(Msg::CountdownTick { generation: 9 })
        );
    }
}
