//! Benchmarks for the performance monitor update path.

use autohaul_perf::{PerformanceMonitor, TaskExecutionStats};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

fn bench_stats_record(c: &mut Criterion) {
    let mut stats = TaskExecutionStats::new(Duration::from_millis(50), 100);

    c.bench_function("stats_record_full_window", |b| {
        b.iter(|| {
            black_box(stats.record(black_box(1_250), 0.8));
        });
    });
}

fn bench_monitor_record(c: &mut Criterion) {
    let monitor = PerformanceMonitor::default();
    monitor.register_task("command_logic", Duration::from_millis(50));

    c.bench_function("monitor_record_execution", |b| {
        b.iter(|| {
            black_box(monitor.record_execution(
                black_box("command_logic"),
                Duration::from_micros(800),
            ));
        });
    });
}

criterion_group!(benches, bench_stats_record, bench_monitor_record);
criterion_main!(benches);
