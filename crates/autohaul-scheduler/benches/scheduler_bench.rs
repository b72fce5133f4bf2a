//! Benchmarks for the scheduler crate.

use autohaul_scheduler::{DeadlineClock, NoopElevator, PriorityElevator, TaskPriority};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::{Duration, Instant};

fn bench_clock_advance(c: &mut Criterion) {
    let anchor = Instant::now();
    let mut clock = DeadlineClock::starting_at(anchor, Duration::from_millis(50));

    c.bench_function("deadline_clock_advance", |b| {
        b.iter(|| {
            black_box(clock.advance(black_box(anchor)));
        });
    });
}

fn bench_noop_elevate(c: &mut Criterion) {
    let elevator = NoopElevator;

    c.bench_function("noop_elevate", |b| {
        b.iter(|| {
            black_box(elevator.elevate(black_box(TaskPriority::High)).is_ok());
        });
    });
}

criterion_group!(benches, bench_clock_advance, bench_noop_elevate);
criterion_main!(benches);
