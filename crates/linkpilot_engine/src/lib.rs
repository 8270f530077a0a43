//! Linkpilot engine: job client, progress subscriptions and effect execution.
mod client;
mod engine;
mod opener;
mod persist;
mod sse;
mod subscription;
mod ticker;
mod types;

pub use client::{ClientSettings, JobBackend, ProgressBytes, ReqwestJobClient};
pub use engine::{EngineHandle, EngineSettings};
pub use opener::{ExternalOpener, OpenError, SystemOpener};
pub use persist::{ensure_output_dir, ArtifactWriter, PersistError};
pub use sse::SseDecoder;
pub use subscription::{subscribe, ProgressObserver, SubscriptionHandle};
pub use ticker::{CountdownTicker, TickCallback};
pub use types::{ClientError, EngineError, EngineEvent};
