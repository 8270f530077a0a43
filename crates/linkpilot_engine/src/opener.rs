use std::process::{Command, Stdio};
use std::thread;

use pilot_logging::{pilot_debug, pilot_warn};

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("no opener command configured")]
    NoCommand,
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens a URI outside the app.
pub trait ExternalOpener: Send + Sync {
    fn open(&self, uri: &str) -> Result<(), OpenError>;
}

/// Hands the URI to an external program, e.g. `xdg-open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemOpener {
    program: String,
    args: Vec<String>,
}

impl SystemOpener {
    pub fn platform_default() -> Self {
        if cfg!(target_os = "windows") {
            Self {
                program: "cmd".to_string(),
                args: vec!["/C".to_string(), "start".to_string(), String::new()],
            }
        } else if cfg!(target_os = "macos") {
            Self {
                program: "open".to_string(),
                args: Vec::new(),
            }
        } else {
            Self {
                program: "xdg-open".to_string(),
                args: Vec::new(),
            }
        }
    }

    /// Parses a whitespace-separated command line; the URI is appended as
    /// the last argument.
    pub fn from_command_line(command: &str) -> Result<Self, OpenError> {
        let mut parts = command.split_whitespace().map(ToOwned::to_owned);
        let program = parts.next().ok_or(OpenError::NoCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ExternalOpener for SystemOpener {
    fn open(&self, uri: &str) -> Result<(), OpenError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| OpenError::Launch {
                program: self.program.clone(),
                source,
            })?;
        pilot_debug!("Launched {} for {}", self.program, uri);

        // Reap the child without blocking the caller.
        let program = self.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                pilot_warn!("{} exited with {}", program, status);
            }
            Ok(_) => {}
            Err(err) => pilot_warn!("Failed to wait for {}: {}", program, err),
        });
        Ok(())
    }
}
