use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    #[serde(rename = "original")]
    pub original_source: String,
    #[serde(rename = "download_url")]
    pub download_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorItem {
    #[serde(rename = "original")]
    pub original_source: String,
    #[serde(rename = "error")]
    pub error_text: String,
}

/// Outcome of a completed job. Built once when the stream reports completion
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultStore {
    successful: Vec<ResultItem>,
    errors: Vec<ErrorItem>,
    total_count: u32,
}

impl ResultStore {
    pub fn new(successful: Vec<ResultItem>, errors: Vec<ErrorItem>, total_count: u32) -> Self {
        Self {
            successful,
            errors,
            total_count,
        }
    }

    pub fn successful(&self) -> &[ResultItem] {
        &self.successful
    }

    pub fn errors(&self) -> &[ErrorItem] {
        &self.errors
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.successful.is_empty()
    }

    /// Download URIs of the successful items, in arrival order. Error items
    /// are display-only and never dispatchable.
    pub fn dispatchable_uris(&self) -> Vec<String> {
        self.successful
            .iter()
            .map(|item| item.download_uri.clone())
            .collect()
    }
}
