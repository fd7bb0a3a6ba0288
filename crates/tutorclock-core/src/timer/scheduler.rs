//! The single periodic clock shared by the whole roster.
//!
//! Like the session itself, the scheduler owns no thread. It only records
//! whether ticks should currently be delivered; the runtime arms a real
//! interval while [`TickScheduler::is_running`] is true and feeds each
//! elapsed period back into [`Session::tick`](crate::Session::tick).

use std::time::Duration;

/// One-second accrual period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickScheduler {
    period: Duration,
    running: bool,
}

impl TickScheduler {
    /// A stopped scheduler with the given period. A zero period falls back
    /// to [`DEFAULT_TICK_PERIOD`].
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_TICK_PERIOD
        } else {
            period
        };
        Self {
            period,
            running: false,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` if this call changed the state.
    pub fn start(&mut self) -> bool {
        let changed = !self.running;
        self.running = true;
        changed
    }

    /// Returns `true` if this call changed the state.
    pub fn stop(&mut self) -> bool {
        let changed = self.running;
        self.running = false;
        changed
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}
