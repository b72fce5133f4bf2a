//! Anchored deadline sequence.

use std::time::{Duration, Instant};

/// Outcome of waiting for the next deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The work finished early; the caller slept for the remainder.
    OnTime {
        /// Time slept.
        slept: Duration,
    },
    /// The work ran past its deadline; the next iteration starts immediately.
    Overrun {
        /// How far past the deadline the work finished.
        late_by: Duration,
    },
}

impl Tick {
    /// Returns true for [`Tick::Overrun`].
    #[must_use]
    pub fn is_overrun(&self) -> bool {
        matches!(self, Self::Overrun { .. })
    }
}

/// Fixed-period deadline sequence anchored at construction time.
///
/// Deadlines are `anchor + n * period`. Sleeping to an absolute deadline
/// rather than for a fixed duration after each iteration keeps execution
/// jitter from accumulating.
#[derive(Debug, Clone)]
pub struct DeadlineClock {
    period: Duration,
    next_deadline: Instant,
    ticks: u64,
    overruns: u64,
}

impl DeadlineClock {
    /// Start a sequence whose first deadline is one period from now.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// Start a sequence whose first deadline is `anchor + period`.
    #[must_use]
    pub fn starting_at(anchor: Instant, period: Duration) -> Self {
        Self {
            period,
            next_deadline: anchor + period,
            ticks: 0,
            overruns: 0,
        }
    }

    /// Target period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deadline the next call to [`wait`](Self::wait) sleeps until.
    #[must_use]
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of ticks whose work finished past the deadline.
    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Classify the current deadline against `now` and advance it by one period.
    ///
    /// Does not sleep. [`wait`](Self::wait) is this plus the sleep.
    pub fn advance(&mut self, now: Instant) -> Tick {
        let deadline = self.next_deadline;
        self.next_deadline += self.period;
        self.ticks += 1;

        match deadline.checked_duration_since(now) {
            Some(slept) => Tick::OnTime { slept },
            None => {
                self.overruns += 1;
                Tick::Overrun {
                    late_by: now.saturating_duration_since(deadline),
                }
            }
        }
    }

    /// Sleep until the current deadline, then advance it by one period.
    ///
    /// Returns immediately when the deadline has already passed.
    pub fn wait(&mut self) -> Tick {
        let tick = self.advance(Instant::now());
        if let Tick::OnTime { slept } = tick
            && !slept.is_zero()
        {
            std::thread::sleep(slept);
        }
        tick
    }
}
