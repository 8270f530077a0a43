use linkpilot_core::{JobHandle, ProgressUpdate, ResultStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JobAccepted {
        job: JobHandle,
    },
    SubmissionFailed {
        error: ClientError,
    },
    Progress {
        job: JobHandle,
        update: ProgressUpdate,
    },
    Completed {
        job: JobHandle,
        store: ResultStore,
    },
    StreamFailed {
        job: JobHandle,
        message: String,
    },
    StreamClosed {
        job: JobHandle,
    },
    CountdownTick {
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    /// The server answered with an `error` field.
    #[error("{0}")]
    Rejected(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] std::io::Error),
}
