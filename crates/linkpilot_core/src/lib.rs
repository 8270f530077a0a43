//! Linkpilot core: pure state machines and view-model helpers.
mod effect;
mod export;
mod job;
mod msg;
mod progress;
mod result_store;
pub mod scheduler;
mod state;
mod stream;
mod update;
mod view_model;

pub use effect::Effect;
pub use export::{build_export, ExportArtifact, ExportError, EXPORT_MIME};
pub use job::JobHandle;
pub use msg::Msg;
pub use progress::{percentage, JobStatus, LogSeverity, ProgressUpdate};
pub use result_store::{ErrorItem, ResultItem, ResultStore};
pub use scheduler::{
    AutoDispatchScheduler, DispatchPorts, Phase, SchedulerError, SchedulerView, TickOutcome,
};
pub use state::{AppState, Page, Session, StreamPhase, DEFAULT_EXPORT_PREFIX};
pub use stream::{StreamConsumer, StreamStep};
pub use update::update;
pub use view_model::{
    AppViewModel, ErrorRowView, LogLine, NavView, ProgressView, ResultRowView, ResultsSummary,
};
