//! Wall-clock budget for one extraction attempt.

use std::time::{Duration, Instant};

/// Tracks elapsed time against a maximum runtime.
///
/// Purely advisory: strategies poll [`TimeBudget::remaining`] between steps
/// and decide for themselves whether to stop early.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    max_runtime: Duration,
    started: Instant,
    /// Time consumed before `started`
    carried: Duration,
}

impl TimeBudget {
    /// Default maximum runtime in seconds.
    pub const DEFAULT_SECONDS: f64 = 10.0;

    /// Start a budget now.
    pub fn start(max_runtime: Duration) -> Self {
        Self {
            max_runtime,
            started: Instant::now(),
            carried: Duration::ZERO,
        }
    }

    /// Start a budget from a number of seconds. Negative or non-finite values
    /// give a budget that is already exhausted.
    pub fn start_secs(seconds: f64) -> Self {
        Self::start(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO))
    }

    /// Treat `elapsed` as already spent.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.carried += elapsed;
        self
    }

    /// Configured maximum.
    pub fn max_runtime(&self) -> Duration {
        self.max_runtime
    }

    /// Time spent so far.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed() + self.carried
    }

    /// Seconds left; negative once the budget is overrun.
    pub fn remaining(&self) -> f64 {
        self.max_runtime.as_secs_f64() - self.elapsed().as_secs_f64()
    }

    /// Check whether more than `seconds` remain.
    pub fn has_more_than(&self, seconds: f64) -> bool {
        self.remaining() > seconds
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::start_secs(Self::DEFAULT_SECONDS)
    }
}
