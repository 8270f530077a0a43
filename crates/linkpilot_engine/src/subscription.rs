//! Progress-channel subscription.
//!
//! A subscription runs as one task on the engine runtime. It feeds the SSE
//! payloads through [`StreamConsumer`] and reports to a [`ProgressObserver`].
//! The channel is closed exactly once, whichever way the subscription ends:
//! completion, terminal error, [`SubscriptionHandle::close`], or dropping the
//! handle.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use linkpilot_core::{JobHandle, ProgressUpdate, ResultStore, StreamConsumer, StreamStep};
use pilot_logging::{pilot_debug, pilot_info, pilot_warn};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::client::JobBackend;
use crate::sse::SseDecoder;

const STREAM_ENDED: &str = "stream ended before completion";

pub trait ProgressObserver: Send + Sync {
    fn on_update(&self, job: &JobHandle, update: ProgressUpdate);

    fn on_completed(&self, job: &JobHandle, store: ResultStore);

    fn on_terminal_error(&self, job: &JobHandle, message: String);

    /// Called once when the channel closes, on every exit path.
    fn on_closed(&self, _job: &JobHandle) {}
}

struct ChannelCloser {
    job: JobHandle,
    closed: AtomicBool,
    token: CancellationToken,
    observer: Arc<dyn ProgressObserver>,
}

impl ChannelCloser {
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        pilot_info!("Progress channel closed job={}", self.job);
        self.observer.on_closed(&self.job);
        self.token.cancel();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

pub struct SubscriptionHandle {
    closer: Arc<ChannelCloser>,
}

impl SubscriptionHandle {
    pub fn job(&self) -> &JobHandle {
        &self.closer.job
    }

    /// Abandons the subscription. Safe to call any number of times.
    pub fn close(&self) {
        self.closer.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Resolves once the channel has closed for any reason.
    pub async fn closed(&self) {
        self.closer.token.cancelled().await;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.closer.close();
    }
}

/// Opens the progress channel of `job` on `runtime`. The caller must not
/// hold two live subscriptions for the same job.
pub fn subscribe(
    runtime: &Handle,
    backend: Arc<dyn JobBackend>,
    job: JobHandle,
    observer: Arc<dyn ProgressObserver>,
) -> SubscriptionHandle {
    let closer = Arc::new(ChannelCloser {
        job,
        closed: AtomicBool::new(false),
        token: CancellationToken::new(),
        observer,
    });
    runtime.spawn(run_subscription(backend, closer.clone()));
    SubscriptionHandle { closer }
}

async fn run_subscription(backend: Arc<dyn JobBackend>, closer: Arc<ChannelCloser>) {
    let mut consumer = StreamConsumer::new();
    let token = closer.token.clone();

    let opened = tokio::select! {
        _ = token.cancelled() => return,
        opened = backend.open_progress(&closer.job) => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => {
            let step = consumer.on_transport_failure(&err.to_string());
            deliver(&closer, step);
            return;
        }
    };
    pilot_debug!("Progress channel open job={}", closer.job);

    let mut decoder = SseDecoder::new();
    while !consumer.is_closed() {
        let chunk = tokio::select! {
            _ = token.cancelled() => {
                consumer.close();
                return;
            }
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for payload in decoder.push(&bytes) {
                    let step = consumer.on_payload(&payload);
                    deliver(&closer, step);
                    if consumer.is_closed() {
                        break;
                    }
                }
            }
            Some(Err(err)) => {
                let step = consumer.on_transport_failure(&err.to_string());
                deliver(&closer, step);
            }
            None => {
                let step = consumer.on_transport_failure(STREAM_ENDED);
                deliver(&closer, step);
            }
        }
    }
}

fn deliver(closer: &ChannelCloser, step: StreamStep) {
    let job = &closer.job;
    let observer = &closer.observer;
    match step {
        StreamStep::Update(update) => observer.on_update(job, update),
        StreamStep::Completed { update, store } => {
            pilot_info!(
                "Job completed job={} results={} errors={}",
                job,
                store.success_count(),
                store.error_count()
            );
            observer.on_update(job, update);
            closer.close();
            observer.on_completed(job, store);
        }
        StreamStep::Failed(message) => {
            pilot_warn!("Progress channel failed job={}: {}", job, message);
            observer.on_terminal_error(job, message);
            closer.close();
        }
        StreamStep::Ignored => {}
    }
}
