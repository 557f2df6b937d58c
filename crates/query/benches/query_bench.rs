//! Benchmarks for batch transforms.
//!
//! Inputs are built once outside the measured closure and use shuffled
//! values, so the numbers reflect executor work on unsorted data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::{Batch, Column};
use strata_query::executor::{HashJoin, NestedLoopJoin};
use strata_query::{col, lit, AggSpec, BatchOps};

// ============================================================================
// Data Generation Utilities
// ============================================================================

/// Simple LCG for reproducible pseudo-random shuffling
fn shuffle_indices(count: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    let mut s = seed;
    for i in (1..count).rev() {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = (s as usize) % (i + 1);
        indices.swap(i, j);
    }
    indices
}

/// Id, name, bucket and score columns in shuffled order.
fn create_shuffled_batch(count: usize) -> Batch {
    let order = shuffle_indices(count, 12345);
    Batch::try_new(vec![
        Column::from_i64s("id", order.iter().map(|&i| i as i64).collect()),
        Column::from_strs("name", order.iter().map(|i| format!("name_{}", i)).collect()),
        Column::from_i64s("bucket", order.iter().map(|&i| (i % 100) as i64).collect()),
        Column::from_f64s("score", order.iter().map(|&i| i as f64 * 0.5).collect()),
    ])
    .unwrap()
}

/// Key and payload columns with keys drawn from `0..key_range`.
fn create_join_batch(count: usize, key_range: usize, seed: u64, payload: &str) -> Batch {
    let order = shuffle_indices(count, seed);
    Batch::try_new(vec![
        Column::from_i64s("k", order.iter().map(|&i| (i % key_range) as i64).collect()),
        Column::from_strs(payload, order.iter().map(|i| format!("value_{}", i)).collect()),
    ])
    .unwrap()
}

// ============================================================================
// JOIN Benchmarks
// ============================================================================

fn bench_hash_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_join");

    for size in [100, 1000, 10000].iter() {
        let key_range = size / 10; // 10% selectivity
        let left = create_join_batch(*size, key_range, 12345, "l");
        let right = create_join_batch(*size, key_range, 67890, "r");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let join = HashJoin::inner("k", "k");
            b.iter(|| black_box(join.execute(&left, &right)))
        });
    }

    group.finish();
}

fn bench_nested_loop_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_loop_join");

    // Smaller sizes for O(n*m) algorithm
    for size in [100, 500, 1000].iter() {
        let key_range = size / 10;
        let left = create_join_batch(*size, key_range, 12345, "l");
        let right = create_join_batch(*size, key_range, 67890, "r");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let join = NestedLoopJoin::inner("k", "k");
            b.iter(|| black_box(join.execute(&left, &right)))
        });
    }

    group.finish();
}

fn bench_left_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("left_join");

    for size in [100, 1000, 10000].iter() {
        let left = create_join_batch(*size, *size, 12345, "l");
        // Half of the left keys find no partner.
        let right = create_join_batch(*size / 2, *size, 67890, "r");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(left.left_join(&right, "k", "k")))
        });
    }

    group.finish();
}

// ============================================================================
// Single-Batch Transform Benchmarks
// ============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100, 1000, 10000].iter() {
        let batch = create_shuffled_batch(*size);
        let threshold = (*size / 2) as i64; // 50% selectivity
        let predicate = col("id").gt(lit(threshold));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(batch.filter(&predicate)))
        });
    }

    group.finish();
}

fn bench_compound_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("compound_filter");

    for size in [1000, 10000].iter() {
        let batch = create_shuffled_batch(*size);
        let predicate = col("bucket")
            .lt(lit(50))
            .and(col("score").gt_eq(lit(10.0)))
            .or(col("name").ends_with(lit("7")));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(batch.filter(&predicate)))
        });
    }

    group.finish();
}

fn bench_with_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_column");

    for size in [1000, 10000].iter() {
        let batch = create_shuffled_batch(*size);
        let expr = (col("score") * lit(2.0)) + col("bucket");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(batch.with_column("adjusted", &expr)))
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for size in [1000, 10000].iter() {
        let batch = create_shuffled_batch(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(batch.select(&["score", "id"])))
        });
    }

    group.finish();
}

// ============================================================================
// Aggregation Benchmarks
// ============================================================================

fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");

    for size in [1000, 10000, 100000].iter() {
        let batch = create_shuffled_batch(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(batch.group_by(&["bucket"]).agg(vec![
                    AggSpec::count(),
                    AggSpec::sum("score"),
                    AggSpec::avg("id"),
                    AggSpec::max("name"),
                ]))
            })
        });
    }

    group.finish();
}

fn bench_count_distinct(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_distinct");

    for size in [1000, 10000].iter() {
        let batch = create_shuffled_batch(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(
                    batch
                        .group_by(&[])
                        .agg(vec![AggSpec::count_distinct("bucket")]),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_hash_join,
    bench_nested_loop_join,
    bench_left_join,
    bench_filter,
    bench_compound_filter,
    bench_with_column,
    bench_select,
    bench_group_by,
    bench_count_distinct,
);
criterion_main!(benches);
