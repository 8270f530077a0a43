use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use linkpilot_core::{JobHandle, ProgressUpdate, ResultStore};
use pilot_logging::{pilot_debug, pilot_info, pilot_warn};
use tokio::runtime::Runtime;

use crate::client::{ClientSettings, JobBackend, ReqwestJobClient};
use crate::subscription::{subscribe, ProgressObserver, SubscriptionHandle};
use crate::ticker::CountdownTicker;
use crate::{EngineError, EngineEvent};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub tick_period: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            tick_period: Duration::from_secs(1),
        }
    }
}

enum EngineCommand {
    Submit { links: Vec<String> },
    Subscribe { job: JobHandle },
    CloseSubscription { job: JobHandle },
    ArmCountdown { generation: u64 },
    CancelCountdown { generation: u64 },
}

/// Command side of the engine thread. Events come back on the receiver
/// returned by the constructor.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let backend: Arc<dyn JobBackend> = Arc::new(ReqwestJobClient::new(settings.client)?);
        Self::with_backend(backend, settings.tick_period)
    }

    pub fn with_backend(
        backend: Arc<dyn JobBackend>,
        tick_period: Duration,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("linkpilot-io")
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("linkpilot-engine".to_string())
            .spawn(move || run_engine(runtime, backend, tick_period, cmd_rx, event_tx))
            .map_err(EngineError::Thread)?;

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn submit(&self, links: Vec<String>) {
        self.send(EngineCommand::Submit { links });
    }

    pub fn subscribe(&self, job: JobHandle) {
        self.send(EngineCommand::Subscribe { job });
    }

    pub fn close_subscription(&self, job: JobHandle) {
        self.send(EngineCommand::CloseSubscription { job });
    }

    pub fn arm_countdown(&self, generation: u64) {
        self.send(EngineCommand::ArmCountdown { generation });
    }

    pub fn cancel_countdown(&self, generation: u64) {
        self.send(EngineCommand::CancelCountdown { generation });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            pilot_warn!("Engine thread is gone; command dropped");
        }
    }
}

fn run_engine(
    runtime: Runtime,
    backend: Arc<dyn JobBackend>,
    tick_period: Duration,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut subscriptions: HashMap<JobHandle, SubscriptionHandle> = HashMap::new();
    let mut ticker = CountdownTicker::new(runtime.handle().clone(), tick_period);

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Submit { links } => {
                let backend = backend.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = match backend.submit(&links).await {
                        Ok(job) => {
                            pilot_info!("Job accepted job={}", job);
                            EngineEvent::JobAccepted { job }
                        }
                        Err(error) => {
                            pilot_warn!("Job submission failed: {}", error);
                            EngineEvent::SubmissionFailed { error }
                        }
                    };
                    let _ = event_tx.send(event);
                });
            }
            EngineCommand::Subscribe { job } => {
                subscriptions.retain(|_, handle| !handle.is_closed());
                let observer = Arc::new(ChannelObserver {
                    tx: event_tx.clone(),
                });
                let handle = subscribe(runtime.handle(), backend.clone(), job.clone(), observer);
                if let Some(previous) = subscriptions.insert(job, handle) {
                    previous.close();
                }
            }
            EngineCommand::CloseSubscription { job } => {
                if let Some(handle) = subscriptions.remove(&job) {
                    handle.close();
                }
            }
            EngineCommand::ArmCountdown { generation } => {
                let tx = event_tx.clone();
                ticker.arm(
                    generation,
                    Arc::new(move |generation| {
                        let _ = tx.send(EngineEvent::CountdownTick { generation });
                    }),
                );
            }
            EngineCommand::CancelCountdown { generation } => {
                ticker.cancel(generation);
            }
        }
    }

    pilot_debug!("Engine command channel closed; shutting down");
    drop(subscriptions);
    drop(ticker);
}

struct ChannelObserver {
    tx: mpsc::Sender<EngineEvent>,
}

impl ProgressObserver for ChannelObserver {
    fn on_update(&self, job: &JobHandle, update: ProgressUpdate) {
        let _ = self.tx.send(EngineEvent::Progress {
            job: job.clone(),
            update,
        });
    }

    fn on_completed(&self, job: &JobHandle, store: ResultStore) {
        let _ = self.tx.send(EngineEvent::Completed {
            job: job.clone(),
            store,
        });
    }

    fn on_terminal_error(&self, job: &JobHandle, message: String) {
        let _ = self.tx.send(EngineEvent::StreamFailed {
            job: job.clone(),
            message,
        });
    }

    fn on_closed(&self, job: &JobHandle) {
        let _ = self.tx.send(EngineEvent::StreamClosed { job: job.clone() });
    }
}
