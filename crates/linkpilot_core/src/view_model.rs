use crate::scheduler::SchedulerView;
use crate::{LogSeverity, Page, StreamPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavView {
    pub progress: bool,
    pub results: bool,
    pub auto_open: bool,
}

impl NavView {
    pub fn allows(&self, page: Page) -> bool {
        match page {
            Page::Input => true,
            Page::Progress => self.progress,
            Page::Results => self.results,
            Page::AutoOpen => self.auto_open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub severity: LogSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub processed: u32,
    pub total: u32,
    pub percentage: u32,
    pub text: String,
    pub current: Option<String>,
    /// Live counts reported by the server while the job runs.
    pub results_count: u32,
    pub errors_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSummary {
    pub success_count: usize,
    pub error_count: usize,
    pub total_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub number: usize,
    pub original: String,
    pub download_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRowView {
    pub number: usize,
    pub original: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub page: Page,
    pub nav: NavView,
    pub input: String,
    pub stream: StreamPhase,
    pub progress: ProgressView,
    pub log: Vec<LogLine>,
    pub summary: Option<ResultsSummary>,
    pub results: Vec<ResultRowView>,
    pub failures: Vec<ErrorRowView>,
    pub auto_open: SchedulerView,
    pub delay_seconds: u32,
    pub notice: Option<String>,
    pub dirty: bool,
}
