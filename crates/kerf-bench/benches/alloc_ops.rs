//! Criterion micro-benchmarks for allocate, deallocate, and the audit walk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kerf_bench::{fragmented_pool, fresh_pool};

const CAPACITY: usize = 64 * 1024;

fn bench_allocate_free_pair(c: &mut Criterion) {
    c.bench_function("allocate_free_pair", |b| {
        let mut pool = fresh_pool(CAPACITY);
        b.iter(|| {
            let ptr = pool.allocate(black_box(8)).unwrap().unwrap();
            pool.deallocate(ptr, 8).unwrap();
            black_box(ptr);
        });
    });
}

fn bench_first_fit_scan_fragmented(c: &mut Criterion) {
    // Alternating 8-element blocks and 8-element holes: a 16-element
    // request has to walk the whole partition and fail.
    let (mut pool, _held) = fragmented_pool(CAPACITY, 8);
    c.bench_function("first_fit_scan_fragmented", |b| {
        b.iter(|| {
            black_box(pool.allocate(black_box(16)).err());
        });
    });
}

fn bench_fill_then_drain(c: &mut Criterion) {
    c.bench_function("fill_then_drain", |b| {
        b.iter(|| {
            let mut pool = fresh_pool(CAPACITY);
            let mut held = Vec::new();
            while let Ok(Some(ptr)) = pool.allocate(16) {
                held.push(ptr);
            }
            // Drain back to front so every free coalesces with the tail.
            while let Some(ptr) = held.pop() {
                pool.deallocate(ptr, 16).unwrap();
            }
            black_box(pool.block_count());
        });
    });
}

fn bench_audit_walk(c: &mut Criterion) {
    let (pool, _held) = fragmented_pool(CAPACITY, 8);
    c.bench_function("audit_walk", |b| {
        b.iter(|| {
            black_box(pool.audit()).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_free_pair,
    bench_first_fit_scan_fragmented,
    bench_fill_then_drain,
    bench_audit_walk,
);
criterion_main!(benches);
