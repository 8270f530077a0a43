use std::sync::Arc;
use std::time::Duration;

use pilot_logging::pilot_debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub type TickCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// The single countdown timer. Arming always aborts the previous tick task
/// first, so at most one task ever ticks.
pub struct CountdownTicker {
    runtime: Handle,
    period: Duration,
    active: Option<(u64, JoinHandle<()>)>,
}

impl CountdownTicker {
    pub fn new(runtime: Handle, period: Duration) -> Self {
        Self {
            runtime,
            period,
            active: None,
        }
    }

    /// Starts ticking every period; each tick calls `on_tick(generation)`.
    /// The first tick fires one full period after arming.
    pub fn arm(&mut self, generation: u64, on_tick: TickCallback) {
        self.cancel_active();
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                on_tick(generation);
            }
        });
        pilot_debug!("Countdown armed generation={}", generation);
        self.active = Some((generation, task));
    }

    /// Cancels the timer if it is still the one armed with `generation`.
    pub fn cancel(&mut self, generation: u64) -> bool {
        if self.armed_generation() != Some(generation) {
            return false;
        }
        self.cancel_active();
        true
    }

    pub fn armed_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|(generation, _)| *generation)
    }

    fn cancel_active(&mut self) {
        if let Some((generation, task)) = self.active.take() {
            task.abort();
            pilot_debug!("Countdown cancelled generation={}", generation);
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.cancel_active();
    }
}
