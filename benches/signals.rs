//! Benchmarks for pulsar-reactivity
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulsar_reactivity::{create_effect, create_scope, create_signal, signal};

// =============================================================================
// SIGNAL BENCHMARKS
// =============================================================================

fn bench_signal_create(c: &mut Criterion) {
    c.bench_function("signal_create", |b| b.iter(|| black_box(create_signal(0i32))));
}

fn bench_signal_get(c: &mut Criterion) {
    let s = signal(42i32);
    c.bench_function("signal_get", |b| b.iter(|| black_box(s.get())));
}

fn bench_signal_set(c: &mut Criterion) {
    let s = signal(0i32);
    let mut next = 0i32;
    c.bench_function("signal_set", |b| {
        b.iter(|| {
            next = next.wrapping_add(1);
            s.set(black_box(next))
        })
    });
}

fn bench_signal_set_same_value(c: &mut Criterion) {
    let s = signal(42i32);
    c.bench_function("signal_set_same_value", |b| b.iter(|| s.set(black_box(42))));
}

// =============================================================================
// NOTIFICATION BENCHMARKS
// =============================================================================

fn bench_notify_subscribers(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify_subscribers");

    for count in [1, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("callbacks", count), &count, |b, &count| {
            let s = signal(0u64);
            for _ in 0..count {
                s.on_change(|v| {
                    black_box(*v);
                });
            }
            let mut next = 0u64;
            b.iter(|| {
                next += 1;
                s.set(next)
            });
        });
    }

    group.finish();
}

// =============================================================================
// EFFECT BENCHMARKS
// =============================================================================

fn bench_effect_create(c: &mut Criterion) {
    let s = signal(0i32);
    c.bench_function("effect_create", |b| {
        b.iter(|| {
            let s = s.clone();
            black_box(create_effect(move || {
                black_box(s.get());
            }))
        })
    });
}

fn bench_effect_trigger(c: &mut Criterion) {
    let s = signal(0i32);
    let _effect = create_effect({
        let s = s.clone();
        move || {
            black_box(s.get());
        }
    });

    let mut next = 0i32;
    c.bench_function("effect_trigger", |b| {
        b.iter(|| {
            next = next.wrapping_add(1);
            s.set(next)
        })
    });
}

fn bench_scope_mount_unmount(c: &mut Criterion) {
    let mut group = c.benchmark_group("scope");

    for count in [10, 100] {
        group.bench_with_input(BenchmarkId::new("mount_unmount", count), &count, |b, &count| {
            b.iter(|| {
                let scope = create_scope();
                scope.run(|| {
                    for i in 0..count {
                        let (value, _set_value) = create_signal(i);
                        create_effect(move || {
                            black_box(value.get());
                        });
                    }
                });
                scope.dispose();
            })
        });
    }

    group.finish();
}

criterion_group!(
    signal_benches,
    bench_signal_create,
    bench_signal_get,
    bench_signal_set,
    bench_signal_set_same_value,
);

criterion_group!(notify_benches, bench_notify_subscribers);

criterion_group!(
    effect_benches,
    bench_effect_create,
    bench_effect_trigger,
    bench_scope_mount_unmount,
);

criterion_main!(signal_benches, notify_benches, effect_benches);
