use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The backend reports in-flight jobs as `processing`.
    #[default]
    #[serde(alias = "processing")]
    Running,
    Completed,
    Error,
}

/// One received progress event. `messages` only carries the lines that are
/// new since the previous event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressUpdate {
    pub processed: u32,
    pub total: u32,
    pub messages: Vec<String>,
    pub status: JobStatus,
    pub current: Option<String>,
    pub results_count: Option<u32>,
    pub errors_count: Option<u32>,
}

pub fn percentage(processed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(processed) / f64::from(total)) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Success,
    Error,
}

impl LogSeverity {
    pub fn classify(message: &str) -> Self {
        if message.contains('✓') {
            LogSeverity::Success
        } else if message.contains('✗') || message.contains("Error") {
            LogSeverity::Error
        } else {
            LogSeverity::Info
        }
    }
}
