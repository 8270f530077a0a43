use crate::scheduler::{self, AutoDispatchScheduler, DEFAULT_DELAY_SECONDS};
use crate::view_model::{
    AppViewModel, ErrorRowView, LogLine, NavView, ProgressView, ResultRowView, ResultsSummary,
};
use crate::{percentage, JobHandle, LogSeverity, ProgressUpdate, ResultStore};

pub const DEFAULT_EXPORT_PREFIX: &str = "download_links";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Input,
    Progress,
    Results,
    AutoOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    Idle,
    Submitting,
    Streaming,
    Completed,
    Failed,
}

/// Everything that belongs to one submitted job. Starting a new session
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    job: Option<JobHandle>,
    stream: StreamPhase,
    processed: u32,
    total: u32,
    current: Option<String>,
    results_count: u32,
    errors_count: u32,
    log: Vec<LogLine>,
    results: Option<ResultStore>,
    scheduler: AutoDispatchScheduler,
}

impl Session {
    pub fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub fn stream(&self) -> StreamPhase {
        self.stream
    }

    pub fn results(&self) -> Option<&ResultStore> {
        self.results.as_ref()
    }

    pub fn scheduler(&self) -> &AutoDispatchScheduler {
        &self.scheduler
    }

    fn is_current(&self, job: &JobHandle) -> bool {
        self.job.as_ref() == Some(job)
            && matches!(self.stream, StreamPhase::Streaming)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    input: String,
    page: Page,
    nav: NavView,
    delay_seconds: u32,
    export_prefix: String,
    notice: Option<String>,
    session: Session,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input: String::new(),
            page: Page::Input,
            nav: NavView::default(),
            delay_seconds: DEFAULT_DELAY_SECONDS,
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            notice: None,
            session: Session::default(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(delay_seconds: u32, export_prefix: impl Into<String>) -> Self {
        Self {
            delay_seconds: delay_seconds.max(1),
            export_prefix: export_prefix.into(),
            ..Self::default()
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn delay_seconds(&self) -> u32 {
        self.delay_seconds
    }

    pub fn export_prefix(&self) -> &str {
        &self.export_prefix
    }

    pub fn view(&self) -> AppViewModel {
        let session = &self.session;
        let progress_pct = percentage(session.processed, session.total);
        let (summary, results, failures) = match &session.results {
            Some(store) => (
                Some(ResultsSummary {
                    success_count: store.success_count(),
                    error_count: store.error_count(),
                    total_count: store.total_count(),
                }),
                store
                    .successful()
                    .iter()
                    .enumerate()
                    .map(|(index, item)| ResultRowView {
                        number: index + 1,
                        original: item.original_source.clone(),
                        download_uri: item.download_uri.clone(),
                    })
                    .collect(),
                store
                    .errors()
                    .iter()
                    .enumerate()
                    .map(|(index, item)| ErrorRowView {
                        number: index + 1,
                        original: item.original_source.clone(),
                        error: item.error_text.clone(),
                    })
                    .collect(),
            ),
            None => (None, Vec::new(), Vec::new()),
        };

        AppViewModel {
            page: self.page,
            nav: self.nav,
            input: self.input.clone(),
            stream: session.stream,
            progress: ProgressView {
                processed: session.processed,
                total: session.total,
                percentage: progress_pct,
                text: format!(
                    "Processing {}/{} links ({}%)",
                    session.processed, session.total, progress_pct
                ),
                current: session.current.clone(),
                results_count: session.results_count,
                errors_count: session.errors_count,
            },
            log: session.log.clone(),
            summary,
            results,
            failures,
            auto_open: scheduler::render(&session.scheduler),
            delay_seconds: self.delay_seconds,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.mark_dirty();
        }
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn navigate(&mut self, page: Page) -> bool {
        if !self.nav.allows(page) || self.page == page {
            return false;
        }
        self.page = page;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_delay(&mut self, seconds: u32) {
        self.delay_seconds = seconds.max(1);
        self.session.scheduler.set_delay(self.delay_seconds);
        self.mark_dirty();
    }

    pub(crate) fn begin_submission(&mut self) {
        self.session = Session {
            stream: StreamPhase::Submitting,
            ..Session::default()
        };
        self.notice = None;
        self.nav.progress = true;
        self.page = Page::Progress;
        self.mark_dirty();
    }

    pub(crate) fn submission_failed(&mut self, message: String) {
        self.session.stream = StreamPhase::Idle;
        self.nav.progress = false;
        self.page = Page::Input;
        self.set_notice(message);
    }

    /// Returns false when no submission is pending.
    pub(crate) fn accept_job(&mut self, job: JobHandle) -> bool {
        if self.session.stream != StreamPhase::Submitting {
            return false;
        }
        self.session.job = Some(job);
        self.session.stream = StreamPhase::Streaming;
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_progress(&mut self, job: &JobHandle, update: ProgressUpdate) {
        if !self.session.is_current(job) {
            return;
        }
        let session = &mut self.session;
        session.processed = update.processed;
        session.total = update.total;
        session.current = update.current;
        if let Some(count) = update.results_count {
            session.results_count = count;
        }
        if let Some(count) = update.errors_count {
            session.errors_count = count;
        }
        session.log.extend(update.messages.into_iter().map(|text| LogLine {
            severity: LogSeverity::classify(&text),
            text,
        }));
        self.mark_dirty();
    }

    pub(crate) fn apply_completed(&mut self, job: &JobHandle, store: ResultStore) {
        if !self.session.is_current(job) {
            return;
        }
        self.session.stream = StreamPhase::Completed;
        self.session.current = None;
        self.session.results_count = store.success_count() as u32;
        self.session.errors_count = store.error_count() as u32;
        self.session.scheduler = AutoDispatchScheduler::with_items(store.dispatchable_uris());
        self.nav.results = true;
        self.nav.auto_open = !store.is_empty();
        self.session.results = Some(store);
        self.page = Page::Results;
        self.mark_dirty();
    }

    pub(crate) fn apply_stream_failure(&mut self, job: &JobHandle, message: String) {
        if !self.session.is_current(job) {
            return;
        }
        self.session.stream = StreamPhase::Failed;
        self.session.current = None;
        self.set_notice(message);
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut AutoDispatchScheduler {
        self.mark_dirty();
        &mut self.session.scheduler
    }

    pub(crate) fn dispatchable_uris(&self) -> Vec<String> {
        self.session
            .results
            .as_ref()
            .map(ResultStore::dispatchable_uris)
            .unwrap_or_default()
    }

    /// Drops the session. The caller has already closed its channel.
    pub(crate) fn reset_session(&mut self) {
        self.session = Session::default();
        self.input.clear();
        self.notice = None;
        self.nav = NavView::default();
        self.page = Page::Input;
        self.mark_dirty();
    }
}
