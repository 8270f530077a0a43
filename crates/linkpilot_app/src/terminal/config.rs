use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linkpilot_core::DEFAULT_EXPORT_PREFIX;
use linkpilot_engine::{ClientSettings, EngineSettings, OpenError, SystemOpener};
use pilot_logging::{LevelFilter, LogDestination};
use serde::Deserialize;

use super::cli::Args;

pub const DEFAULT_CONFIG_FILE: &str = "linkpilot.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogTarget {
    /// The terminal belongs to the rendered screen, so logs go to the file.
    #[default]
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub delay_seconds: u32,
    pub export_prefix: String,
    pub output_dir: PathBuf,
    pub log_destination: LogTarget,
    pub log_level: LogLevel,
    pub log_file: PathBuf,
    /// Program (plus leading args) used to open links; platform default when unset.
    pub open_command: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: ClientSettings::default().server_url,
            delay_seconds: linkpilot_core::scheduler::DEFAULT_DELAY_SECONDS,
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            output_dir: PathBuf::from("output"),
            log_destination: LogTarget::default(),
            log_level: LogLevel::default(),
            log_file: PathBuf::from("linkpilot.log"),
            open_command: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `linkpilot.ron` when no path was given. Only the
    /// implicit default file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::parse(&text).map_err(|message| ConfigError::Parse { path, message })
    }

    fn parse(text: &str) -> Result<Self, String> {
        let mut config: Self = ron::from_str(text).map_err(|err| err.to_string())?;
        config.delay_seconds = config.delay_seconds.max(1);
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(server) = &args.server {
            self.server_url = server.clone();
        }
        if let Some(delay) = args.delay {
            self.delay_seconds = delay.max(1);
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                server_url: self.server_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            ..EngineSettings::default()
        }
    }

    pub fn opener(&self) -> Result<SystemOpener, OpenError> {
        match &self.open_command {
            Some(command) => SystemOpener::from_command_line(command),
            None => Ok(SystemOpener::platform_default()),
        }
    }
}
