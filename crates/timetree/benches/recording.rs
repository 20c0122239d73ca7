//! Benchmarks for sample registration and the update pass.

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};
use timetree::{Builder, Registry};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("timetree");

    let registry = Registry::new();
    let leaf = registry.group("bench").profile("memoryless");
    group.bench_function("record_memoryless_leaf", |b| {
        b.iter(|| leaf.record(black_box(Duration::from_nanos(100))));
    });

    let retaining = registry.group("bench").profile_with(
        "retaining",
        &Builder::new().retain_samples(true),
    );
    group.bench_function("record_retaining_leaf", |b| {
        b.iter(|| retaining.record(black_box(Duration::from_nanos(100))));
    });

    let nested = registry.group("bench").profile("nested");
    group.bench_function("record_nested_path", |b| {
        b.iter(|| nested.record_as(&["a", "b", "c"], black_box(Duration::from_nanos(100))));
    });

    let timed = registry.group("bench").profile("timer");
    group.bench_function("start_stop_timer", |b| {
        b.iter(|| timed.start_timer().stop());
    });

    let wide = registry.group("wide");
    for i in 0..64 {
        wide.profile(&format!("p{i}")).record(Duration::from_micros(i));
    }
    group.bench_function("snapshot_clean_tree", |b| {
        b.iter(|| black_box(wide.snapshot()));
    });
    group.bench_function("snapshot_after_write", |b| {
        b.iter(|| {
            wide.profile("p0").record(Duration::from_micros(1));
            black_box(wide.snapshot())
        });
    });

    group.finish();
}
