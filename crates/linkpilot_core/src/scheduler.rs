//! Timed auto-dispatch of result links.
//!
//! The scheduler opens its items one at a time: the first immediately on
//! `start`, each following one after a countdown of `delay_seconds` ticks.
//! All side effects go through [`DispatchPorts`], so the state machine itself
//! never touches a clock or a browser.
//!
//! Exactly one countdown may be armed at a time. Every arm gets a fresh
//! generation number and [`AutoDispatchScheduler::on_tick`] ignores ticks of
//! any other generation, so a tick that was already in flight when its timer
//! was cancelled cannot trigger a dispatch.
use std::fmt;

pub const DEFAULT_DELAY_SECONDS: u32 = 60;

const STATUS_STARTING: &str = "Starting auto-open...";
const STATUS_PAUSED: &str = "Paused";
const STATUS_RESUMED: &str = "Resumed";
const STATUS_STOPPED: &str = "Stopped";
const STATUS_FINISHED: &str = "All links opened!";

/// Side effects requested by the scheduler.
pub trait DispatchPorts {
    /// Opens `uri` outside the app (browser tab, external handler).
    fn open_external(&mut self, uri: &str);
    /// Starts a one-second ticker whose ticks carry `generation`.
    fn arm_countdown(&mut self, generation: u64);
    /// Cancels the ticker armed with `generation`.
    fn cancel_countdown(&mut self, generation: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("nothing to dispatch")]
    NoItems,
    #[error("{operation:?} is not allowed while {phase}")]
    InvalidTransition { operation: Operation, phase: Phase },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved; `remaining` seconds are left.
    Counted { remaining: u32 },
    /// The countdown reached zero and the next item was opened.
    Dispatched,
    /// Tick from a cancelled timer, or the scheduler is not running.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoDispatchScheduler {
    items: Vec<String>,
    cursor: usize,
    delay_seconds: u32,
    phase: Phase,
    remaining: u32,
    armed: Option<u64>,
    next_generation: u64,
    status: Option<String>,
    current: Option<String>,
}

impl Default for AutoDispatchScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoDispatchScheduler {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            phase: Phase::Idle,
            remaining: 0,
            armed: None,
            next_generation: 1,
            status: None,
            current: None,
        }
    }

    /// A scheduler loaded with the dispatch list of a finished job, so the
    /// view can show `0 / n` before anything starts.
    pub fn with_items(items: Vec<String>) -> Self {
        Self {
            items,
            ..Self::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn delay_seconds(&self) -> u32 {
        self.delay_seconds
    }

    pub fn remaining_countdown(&self) -> u32 {
        self.remaining
    }

    /// Generation of the armed countdown, if any.
    pub fn armed_generation(&self) -> Option<u64> {
        self.armed
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn current_link(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Starts dispatching from the current cursor. The cursor is kept across
    /// `stop`/`start`; it only resets when a new scheduler is built.
    pub fn start(
        &mut self,
        items: Vec<String>,
        delay_seconds: u32,
        ports: &mut dyn DispatchPorts,
    ) -> Result<(), SchedulerError> {
        if !matches!(self.phase, Phase::Idle | Phase::Stopped) {
            return Err(self.invalid(Operation::Start));
        }
        if items.is_empty() {
            return Err(SchedulerError::NoItems);
        }

        self.items = items;
        self.cursor = self.cursor.min(self.items.len());
        self.delay_seconds = delay_seconds.max(1);
        self.phase = Phase::Running;
        self.status = Some(STATUS_STARTING.to_string());
        self.dispatch_next(ports);
        Ok(())
    }

    pub fn pause(&mut self, ports: &mut dyn DispatchPorts) -> Result<(), SchedulerError> {
        if self.phase != Phase::Running {
            return Err(self.invalid(Operation::Pause));
        }
        self.cancel_countdown(ports);
        self.phase = Phase::Paused;
        self.status = Some(STATUS_PAUSED.to_string());
        Ok(())
    }

    /// Resumes by opening the next item right away and arming a full
    /// countdown after it. The countdown interrupted by `pause` is discarded.
    pub fn resume(&mut self, ports: &mut dyn DispatchPorts) -> Result<(), SchedulerError> {
        if self.phase != Phase::Paused {
            return Err(self.invalid(Operation::Resume));
        }
        self.phase = Phase::Running;
        self.status = Some(STATUS_RESUMED.to_string());
        self.dispatch_next(ports);
        Ok(())
    }

    pub fn toggle_pause(&mut self, ports: &mut dyn DispatchPorts) -> Result<(), SchedulerError> {
        match self.phase {
            Phase::Paused => self.resume(ports),
            _ => self.pause(ports),
        }
    }

    pub fn stop(&mut self, ports: &mut dyn DispatchPorts) -> Result<(), SchedulerError> {
        if self.phase == Phase::Idle {
            return Err(self.invalid(Operation::Stop));
        }
        self.halt(ports, STATUS_STOPPED);
        Ok(())
    }

    pub fn on_tick(&mut self, generation: u64, ports: &mut dyn DispatchPorts) -> TickOutcome {
        if self.phase != Phase::Running || self.armed != Some(generation) {
            return TickOutcome::Stale;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Counted {
                remaining: self.remaining,
            };
        }
        self.cancel_countdown(ports);
        self.dispatch_next(ports);
        TickOutcome::Dispatched
    }

    /// Changes the delay used by the next countdown. A running countdown is
    /// shortened if it now exceeds the delay.
    pub fn set_delay(&mut self, delay_seconds: u32) {
        self.delay_seconds = delay_seconds.max(1);
        self.remaining = self.remaining.min(self.delay_seconds);
    }

    fn dispatch_next(&mut self, ports: &mut dyn DispatchPorts) {
        let Some(uri) = self.items.get(self.cursor).cloned() else {
            self.halt(ports, STATUS_FINISHED);
            return;
        };

        ports.open_external(&uri);
        self.cursor += 1;
        self.status = Some(format!(
            "Opened link {} of {}",
            self.cursor,
            self.items.len()
        ));
        self.current = Some(uri);

        if self.cursor < self.items.len() {
            self.arm_countdown(ports);
        } else {
            self.halt(ports, STATUS_FINISHED);
        }
    }

    fn arm_countdown(&mut self, ports: &mut dyn DispatchPorts) {
        self.cancel_countdown(ports);
        let generation = self.next_generation;
        self.next_generation += 1;
        self.armed = Some(generation);
        self.remaining = self.delay_seconds;
        ports.arm_countdown(generation);
    }

    fn cancel_countdown(&mut self, ports: &mut dyn DispatchPorts) {
        if let Some(generation) = self.armed.take() {
            ports.cancel_countdown(generation);
        }
        self.remaining = 0;
    }

    fn halt(&mut self, ports: &mut dyn DispatchPorts, status: &str) {
        self.cancel_countdown(ports);
        self.phase = Phase::Stopped;
        self.status = Some(status.to_string());
        self.current = None;
    }

    fn invalid(&self, operation: Operation) -> SchedulerError {
        SchedulerError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }
}

/// Display state of the scheduler controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerView {
    pub phase: Phase,
    pub status_text: Option<String>,
    /// `None` renders as the `--` placeholder.
    pub countdown: Option<u32>,
    pub link_progress: String,
    pub current_link: Option<String>,
    pub start_visible: bool,
    pub pause_visible: bool,
    pub pause_label: &'static str,
    pub stop_visible: bool,
}

impl SchedulerView {
    pub fn countdown_text(&self) -> String {
        self.countdown
            .map_or_else(|| "--".to_string(), |secs| secs.to_string())
    }
}

pub fn render(scheduler: &AutoDispatchScheduler) -> SchedulerView {
    let phase = scheduler.phase();
    let countdown = match (phase, scheduler.armed_generation()) {
        (Phase::Running, Some(_)) => Some(scheduler.remaining_countdown()),
        _ => None,
    };
    let active = matches!(phase, Phase::Running | Phase::Paused);

    SchedulerView {
        phase,
        status_text: scheduler.status().map(ToOwned::to_owned),
        countdown,
        link_progress: format!("{} / {}", scheduler.cursor(), scheduler.len()),
        current_link: scheduler.current_link().map(ToOwned::to_owned),
        start_visible: !active,
        pause_visible: active,
        pause_label: if phase == Phase::Paused {
            "Resume"
        } else {
            "Pause"
        },
        stop_visible: active,
    }
}
