//! Classification of progress-channel payloads.
//!
//! [`StreamConsumer`] is the transport-free half of the progress subscription:
//! it turns raw event payloads into steps and refuses all input once a
//! terminal step has been produced.
use serde::Deserialize;

use crate::{ErrorItem, JobStatus, ProgressUpdate, ResultItem, ResultStore};

const DEFAULT_JOB_ERROR: &str = "job reported an error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStep {
    Update(ProgressUpdate),
    /// Terminal success. The update is delivered before the store.
    Completed {
        update: ProgressUpdate,
        store: ResultStore,
    },
    /// Terminal failure with a user-facing message.
    Failed(String),
    /// Input arrived after the consumer closed.
    Ignored,
}

impl StreamStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamStep::Completed { .. } | StreamStep::Failed(_))
    }
}

#[derive(Debug, Deserialize)]
struct ProgressPayload {
    #[serde(default)]
    processed: u32,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    status: JobStatus,
    error: Option<String>,
    current: Option<String>,
    #[serde(default)]
    results: Vec<ResultItem>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
    results_count: Option<u32>,
    errors_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamConsumer {
    closed: bool,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn on_payload(&mut self, raw: &str) -> StreamStep {
        if self.closed {
            return StreamStep::Ignored;
        }
        let step = classify(raw);
        if step.is_terminal() {
            self.closed = true;
        }
        step
    }

    /// A connection drop or HTTP failure with no parsed payload.
    pub fn on_transport_failure(&mut self, reason: &str) -> StreamStep {
        if self.closed {
            return StreamStep::Ignored;
        }
        self.closed = true;
        StreamStep::Failed(format!("progress channel failed: {reason}"))
    }

    /// Marks the consumer closed without producing a step, e.g. when the
    /// caller abandons the subscription.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

fn classify(raw: &str) -> StreamStep {
    let payload: ProgressPayload = match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(err) => return StreamStep::Failed(format!("malformed progress event: {err}")),
    };

    if let Some(error) = payload.error {
        return StreamStep::Failed(error);
    }

    let update = ProgressUpdate {
        processed: payload.processed,
        total: payload.total,
        messages: payload.messages,
        status: payload.status,
        current: payload.current.filter(|current| !current.is_empty()),
        results_count: payload.results_count,
        errors_count: payload.errors_count,
    };

    match update.status {
        JobStatus::Running => StreamStep::Update(update),
        JobStatus::Error => StreamStep::Failed(DEFAULT_JOB_ERROR.to_string()),
        JobStatus::Completed => {
            let store = ResultStore::new(payload.results, payload.errors, payload.total);
            StreamStep::Completed { update, store }
        }
    }
}
