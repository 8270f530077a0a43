use crate::ResultStore;

pub const EXPORT_MIME: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("No successful results to download")]
    NothingToExport,
}

/// One download URI per line, named `<prefix>_<epoch_millis>.txt`.
pub fn build_export(
    store: &ResultStore,
    prefix: &str,
    epoch_millis: i64,
) -> Result<ExportArtifact, ExportError> {
    if store.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(ExportArtifact {
        filename: format!("{prefix}_{epoch_millis}.txt"),
        mime: EXPORT_MIME,
        contents: store.dispatchable_uris().join("\n"),
    })
}
