//! Per-task execution statistics.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// What one sample revealed about its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleOutcome {
    /// Time past the period, if the sample overran it.
    pub overrun_us: Option<u64>,
    /// Share of the period used, if above the high-utilization ratio.
    pub high_utilization: Option<f64>,
}

/// Execution-time statistics for one task. All times are microseconds.
///
/// A zero `expected_period_us` disables deadline and utilization checks; this
/// is the state of tasks that were measured without being registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskExecutionStats {
    /// Period the task is expected to fit in.
    pub expected_period_us: u64,
    /// Most recent execution time.
    pub current_us: u64,
    /// Shortest execution time, `None` before the first sample.
    pub min_us: Option<u64>,
    /// Longest execution time (WCET estimate).
    pub max_us: u64,
    /// Mean over all samples, updated incrementally.
    pub avg_us: f64,
    /// Population standard deviation over the sample window.
    pub std_dev_us: f64,
    /// Samples longer than the period.
    pub deadline_violations: u64,
    /// Largest amount by which a sample exceeded the period.
    pub worst_overrun_us: u64,
    /// Samples above the high-utilization ratio.
    pub high_utilization_count: u64,
    /// Samples recorded since registration or the last reset.
    pub sample_count: u64,
    #[serde(skip)]
    window: VecDeque<u64>,
    #[serde(skip)]
    window_capacity: usize,
}

impl TaskExecutionStats {
    /// Empty statistics for a task expected to run every `expected_period`.
    #[must_use]
    pub fn new(expected_period: Duration, window_capacity: usize) -> Self {
        let window_capacity = window_capacity.max(1);
        Self {
            expected_period_us: u64::try_from(expected_period.as_micros()).unwrap_or(u64::MAX),
            current_us: 0,
            min_us: None,
            max_us: 0,
            avg_us: 0.0,
            std_dev_us: 0.0,
            deadline_violations: 0,
            worst_overrun_us: 0,
            high_utilization_count: 0,
            sample_count: 0,
            window: VecDeque::with_capacity(window_capacity),
            window_capacity,
        }
    }

    /// Expected period.
    #[must_use]
    pub fn expected_period(&self) -> Duration {
        Duration::from_micros(self.expected_period_us)
    }

    /// Samples currently in the window, oldest first.
    pub fn window(&self) -> impl Iterator<Item = u64> + '_ {
        self.window.iter().copied()
    }

    /// Mean execution time as a share of the period, `None` without a period.
    #[must_use]
    pub fn utilization(&self) -> Option<f64> {
        (self.expected_period_us > 0).then(|| self.avg_us / self.expected_period_us as f64)
    }

    /// Clear every statistic, keeping the period and window size.
    pub fn reset(&mut self) {
        *self = Self::new(self.expected_period(), self.window_capacity);
    }

    /// Fold one sample into the statistics.
    pub fn record(&mut self, elapsed_us: u64, high_utilization_ratio: f64) -> SampleOutcome {
        self.current_us = elapsed_us;
        self.sample_count = self.sample_count.saturating_add(1);
        self.min_us = Some(self.min_us.map_or(elapsed_us, |min| min.min(elapsed_us)));
        self.max_us = self.max_us.max(elapsed_us);

        if self.window.len() == self.window_capacity {
            self.window.pop_front();
        }
        self.window.push_back(elapsed_us);

        let delta = elapsed_us as f64 - self.avg_us;
        self.avg_us += delta / self.sample_count as f64;
        self.std_dev_us = window_std_dev(&self.window);

        let mut outcome = SampleOutcome::default();
        if self.expected_period_us == 0 {
            return outcome;
        }

        if elapsed_us > self.expected_period_us {
            let overrun = elapsed_us - self.expected_period_us;
            self.deadline_violations = self.deadline_violations.saturating_add(1);
            self.worst_overrun_us = self.worst_overrun_us.max(overrun);
            outcome.overrun_us = Some(overrun);
        }

        let utilization = elapsed_us as f64 / self.expected_period_us as f64;
        if utilization > high_utilization_ratio {
            self.high_utilization_count = self.high_utilization_count.saturating_add(1);
            outcome.high_utilization = Some(utilization);
        }

        outcome
    }
}

fn window_std_dev(window: &VecDeque<u64>) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().map(|&s| s as f64).sum::<f64>() / n;
    let sum_sq = window
        .iter()
        .map(|&s| {
            let diff = s as f64 - mean;
            diff * diff
        })
        .sum::<f64>();
    (sum_sq / n).sqrt()
}
