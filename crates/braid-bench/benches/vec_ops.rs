//! Criterion micro-benchmarks for vector append, read, and iteration.

use braid_bench::uniform_values;
use braid_vec::SegVec;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Mutex;
use std::thread;

fn bench_push_back(c: &mut Criterion) {
    let values = uniform_values(42, 10_000);
    c.bench_function("vec/push_back_10k", |b| {
        b.iter(|| {
            let v: SegVec<u64> = SegVec::new();
            for &x in &values {
                black_box(v.push_back(x));
            }
            v
        })
    });
    // Baseline: the naive locked std vector, for comparison. It cannot
    // return element references across pushes, so it only covers the
    // append cost.
    c.bench_function("vec/push_back_10k_mutex_vec_baseline", |b| {
        b.iter(|| {
            let v: Mutex<Vec<u64>> = Mutex::new(Vec::new());
            for &x in &values {
                v.lock().unwrap().push(black_box(x));
            }
            v
        })
    });
}

fn bench_push_back_reserved(c: &mut Criterion) {
    let values = uniform_values(42, 10_000);
    c.bench_function("vec/push_back_10k_reserved", |b| {
        b.iter(|| {
            let mut v: SegVec<u64> = SegVec::new();
            v.reserve(values.len()).unwrap();
            for &x in &values {
                black_box(v.push_back(x));
            }
            v
        })
    });
}

fn bench_contended_push(c: &mut Criterion) {
    let per_thread = uniform_values(7, 2_500);
    c.bench_function("vec/push_back_10k_4_threads", |b| {
        b.iter(|| {
            let v: SegVec<u64> = SegVec::new();
            thread::scope(|scope| {
                for _ in 0..4 {
                    let v = &v;
                    let per_thread = &per_thread;
                    scope.spawn(move || {
                        for &x in per_thread {
                            v.push_back(x);
                        }
                    });
                }
            });
            v
        })
    });
}

fn bench_indexed_read(c: &mut Criterion) {
    let v: SegVec<u64> = uniform_values(42, 10_000).into_iter().collect();
    c.bench_function("vec/get_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for i in 0..v.len() {
                sum = sum.wrapping_add(*black_box(&v[i]));
            }
            sum
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    let v: SegVec<u64> = uniform_values(42, 10_000).into_iter().collect();
    c.bench_function("vec/iter_10k", |b| {
        b.iter(|| v.iter().fold(0u64, |acc, &x| acc.wrapping_add(x)))
    });
}

criterion_group!(
    benches,
    bench_push_back,
    bench_push_back_reserved,
    bench_contended_push,
    bench_indexed_read,
    bench_iterate,
);
criterion_main!(benches);
