use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stripe_adder::counters::long_adder::LongAdder;
use stripe_adder::striped::probe::Probe;

const NUM_THREADS: usize = 8;
const ITERATIONS_PER_THREAD: usize = 1_000_000;

fn bench_contended_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_increment");

    group.bench_function(
        BenchmarkId::new(
            "LongAdder (striped)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let counter = Arc::new(LongAdder::new());
                let mut handles = vec![];

                for _ in 0..NUM_THREADS {
                    let counter_clone = Arc::clone(&counter);
                    let handle = thread::spawn(move || {
                        let mut probe = Probe::new();
                        for _ in 0..ITERATIONS_PER_THREAD {
                            counter_clone.increment(&mut probe);
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(counter.sum())
            })
        },
    );

    group.bench_function(
        BenchmarkId::new(
            "LongAdder (detached probes)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let counter = Arc::new(LongAdder::new());
                let mut handles = vec![];

                for _ in 0..NUM_THREADS {
                    let counter_clone = Arc::clone(&counter);
                    let handle = thread::spawn(move || {
                        let mut probe = Probe::detached();
                        for _ in 0..ITERATIONS_PER_THREAD {
                            counter_clone.increment(&mut probe);
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(counter.sum())
            })
        },
    );

    group.bench_function(
        BenchmarkId::new(
            "AtomicI64 (single)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let counter = Arc::new(AtomicI64::new(0));
                let mut handles = vec![];

                for _ in 0..NUM_THREADS {
                    let counter_clone = Arc::clone(&counter);
                    let handle = thread::spawn(move || {
                        for _ in 0..ITERATIONS_PER_THREAD {
                            counter_clone.fetch_add(1, Ordering::Relaxed);
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(counter.load(Ordering::Relaxed))
            })
        },
    );

    group.finish();
}

fn bench_uncontended_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread_increment");

    group.bench_function("LongAdder", |b| {
        let counter = LongAdder::new();
        let mut probe = Probe::new();
        b.iter(|| counter.increment(black_box(&mut probe)))
    });

    group.bench_function("AtomicI64", |b| {
        let counter = AtomicI64::new(0);
        b.iter(|| black_box(&counter).fetch_add(1, Ordering::Relaxed))
    });

    group.finish();
}

criterion_group!(benches, bench_contended_increment, bench_uncontended_increment);
criterion_main!(benches);
