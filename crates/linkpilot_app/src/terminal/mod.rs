//! Terminal front end: config, command input, rendering and the event loop.
mod app;
mod autopilot;
pub mod cli;
mod config;
mod effects;
mod input;
mod render;

use std::path::PathBuf;

use linkpilot_engine::{EngineError, OpenError};

pub use app::run_app;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid open_command: {0}")]
    Opener(#[from] OpenError),
    #[error("failed to read links from {path}: {source}")]
    LinkFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
