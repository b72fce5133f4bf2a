//! Property-based tests for execution statistics.

use autohaul_perf::prelude::*;
use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use std::time::Duration;

proptest! {
    #[test]
    fn min_avg_max_are_ordered(samples in proptest::collection::vec(0u64..1_000_000, 1..300)) {
        let mut stats = TaskExecutionStats::new(Duration::from_millis(50), 100);
        for &s in &samples {
            stats.record(s, 0.8);
        }

        let min = stats.min_us.unwrap_or(0) as f64;
        let max = stats.max_us as f64;
        prop_assert!(min <= stats.avg_us + 1e-6);
        prop_assert!(stats.avg_us <= max + 1e-6);
        prop_assert!(stats.std_dev_us >= 0.0);
        prop_assert!(stats.window().count() <= 100);
        prop_assert_eq!(stats.sample_count, samples.len() as u64);
    }

    #[test]
    fn violations_match_samples_over_period(
        period_us in 1u64..100_000,
        samples in proptest::collection::vec(0u64..200_000, 0..200),
    ) {
        let mut stats = TaskExecutionStats::new(Duration::from_micros(period_us), 100);
        for &s in &samples {
            stats.record(s, 0.8);
        }

        let expected = samples.iter().filter(|&&s| s > period_us).count() as u64;
        prop_assert_eq!(stats.deadline_violations, expected);

        let worst = samples.iter().map(|&s| s.saturating_sub(period_us)).max().unwrap_or(0);
        prop_assert_eq!(stats.worst_overrun_us, worst);
    }
}

#[quickcheck]
fn constant_samples_have_zero_std_dev(value: u32, count: u8) -> bool {
    let mut stats = TaskExecutionStats::new(Duration::from_millis(1), 100);
    for _ in 0..count.max(2) {
        stats.record(u64::from(value), 0.8);
    }
    stats.std_dev_us.abs() < 1e-6
}
