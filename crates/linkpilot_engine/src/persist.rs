use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use linkpilot_core::ExportArtifact;
use pilot_logging::pilot_info;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("artifact filename must be a plain file name: {0:?}")]
    InvalidFilename(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes export artifacts into one directory. Each write goes to a temp
/// file in the same directory and is renamed into place, so a reader never
/// sees a half-written list.
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, artifact: &ExportArtifact) -> Result<PathBuf, PersistError> {
        if !is_plain_filename(&artifact.filename) {
            return Err(PersistError::InvalidFilename(artifact.filename.clone()));
        }
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(&artifact.filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(artifact.contents.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;

        pilot_info!(
            "Wrote {} ({}, {} bytes)",
            target.display(),
            artifact.mime,
            artifact.contents.len()
        );
        Ok(target)
    }
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
