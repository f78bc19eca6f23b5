//! Single-threaded add and test benchmarks.
//!
//! # Scenarios
//!
//! 1. **By storage**: add latency for each storage strategy
//! 2. **By size**: hit and miss lookups as the bit array grows
//! 3. **By false positive rate**: lower rates mean more probes per key
//! 4. **By flavor**: lock-free versus single-lock `test_and_add`
//! 5. **Encoding**: envelope encode and decode throughput

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use fastbloom::core::optimal_params;
use fastbloom::hash::Fnv64;
use fastbloom::{BloomFilter, MutexBloomFilter, StorageStrategy};

mod common;
use common::*;

fn bench_add_by_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_by_storage");
    let keys = generate_strings(10_000, 32);
    group.throughput(Throughput::Elements(keys.len() as u64));

    for strategy in StorageStrategy::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &strategy, |b, &s| {
            b.iter_batched(
                || {
                    let (m, k) = optimal_params(keys.len(), 0.01).unwrap();
                    BloomFilter::explicit(m, k, s, Fnv64::new()).unwrap()
                },
                |filter| {
                    for key in &keys {
                        filter.add(black_box(key));
                    }
                    filter
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_test_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("test_by_size");

    for &size in &SIZES {
        let filter = BloomFilter::new(size, 0.01).unwrap();
        let members = generate_sequential_strings(size);
        for key in &members {
            filter.add(key);
        }
        let outsiders = generate_strings(1_000, 32);

        group.throughput(Throughput::Elements(1_000));
        group.bench_with_input(BenchmarkId::new("miss", size), &size, |b, _| {
            b.iter(|| outsiders.iter().filter(|k| filter.test(black_box(*k))).count());
        });
        group.bench_with_input(BenchmarkId::new("hit", size), &size, |b, _| {
            b.iter(|| {
                members
                    .iter()
                    .take(1_000)
                    .filter(|k| filter.test(black_box(*k)))
                    .count()
            });
        });
    }
    group.finish();
}

fn bench_add_by_fp_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_by_fp_rate");
    let keys = generate_strings(1_000, 32);
    group.throughput(Throughput::Elements(keys.len() as u64));

    for &rate in &FP_RATES {
        let filter = BloomFilter::new(100_000, rate).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(rate), &rate, |b, _| {
            b.iter(|| {
                for key in &keys {
                    filter.add(black_box(key));
                }
            });
        });
    }
    group.finish();
}

fn bench_flavors(c: &mut Criterion) {
    let mut group = c.benchmark_group("test_and_add_by_flavor");
    let keys = generate_strings(1_000, 16);
    group.throughput(Throughput::Elements(keys.len() as u64));

    let lock_free = BloomFilter::new(100_000, 0.01).unwrap();
    group.bench_function("lock_free", |b| {
        b.iter(|| {
            keys.iter()
                .filter(|k| lock_free.test_and_add(black_box(*k)))
                .count()
        });
    });

    let locked = MutexBloomFilter::new(100_000, 0.01).unwrap();
    group.bench_function("mutex", |b| {
        b.iter(|| keys.iter().filter(|k| locked.test_and_add(black_box(*k))).count());
    });
    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    let (m, k) = optimal_params(100_000, 0.01).unwrap();

    for strategy in StorageStrategy::ALL {
        let filter = BloomFilter::explicit(m, k, strategy, Fnv64::new()).unwrap();
        for key in generate_sequential_strings(50_000) {
            filter.add(&key);
        }
        let bytes = filter.encode();
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", strategy), &strategy, |b, _| {
            b.iter(|| black_box(filter.encode()));
        });
        group.bench_with_input(BenchmarkId::new("decode", strategy), &strategy, |b, _| {
            b.iter(|| BloomFilter::decode(black_box(&bytes)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add_by_storage,
    bench_test_by_size,
    bench_add_by_fp_rate,
    bench_flavors,
    bench_encoding
);
criterion_main!(benches);
