//! Performance benchmarks for stale-cache
//!
//! This benchmark suite measures:
//! - InMemory store operations (set, get, mget)
//! - StaleCache paths (fresh hit, stale hit, regeneration, bypass)
//! - Performance across different value sizes
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stale_cache::store::{InMemoryStore, Store};
use stale_cache::{Error, FetchConfig, Produced, StaleCache};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(3600);
const BUDGET: Duration = Duration::from_secs(5);

fn bench_config() -> FetchConfig {
    FetchConfig::default()
        .with_ttl(TTL)
        .with_regeneration_budget(BUDGET)
}

async fn produce(size: usize) -> Result<Produced, Error> {
    Ok(Produced::new("x".repeat(size), TTL))
}

// ============================================================================
// Group 1: InMemory Store Benchmarks
// ============================================================================

fn inmemory_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_store");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("set", size), size, |b, &size| {
                let store = InMemoryStore::new();
                let value = "x".repeat(size);

                b.to_async(&rt).iter(|| async {
                    store
                        .set(black_box("test_key"), black_box(&value), TTL)
                        .await
                        .expect("Failed to set")
                });
            });

        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("get_hit", size), size, |b, &size| {
                let store = InMemoryStore::new();
                rt.block_on(async {
                    store
                        .set("test_key", &"x".repeat(size), TTL)
                        .await
                        .expect("Failed to set");
                });

                b.to_async(&rt)
                    .iter(|| async { store.get(black_box("test_key")).await });
            });
    }

    group.bench_function("get_miss", |b| {
        let store = InMemoryStore::new();

        b.to_async(&rt)
            .iter(|| async { store.get(black_box("nonexistent_key")).await });
    });

    for count in [1usize, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("mget", count), count, |b, &count| {
            let store = InMemoryStore::new();
            let keys: Vec<String> = (0..count).map(|i| format!("key_{}", i)).collect();
            rt.block_on(async {
                // Every other key stays absent
                for key in keys.iter().step_by(2) {
                    store.set(key, "value", TTL).await.expect("Failed to set");
                }
            });
            let refs: Vec<&str> = keys.iter().map(String::as_str).collect();

            b.to_async(&rt)
                .iter(|| async { store.mget(black_box(&refs)).await });
        });
    }

    group.finish();
}

// ============================================================================
// Group 2: StaleCache Benchmarks
// ============================================================================

fn stale_cache_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("stale_cache");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");
    let config = bench_config();

    for size in [100, 1_000, 10_000].iter() {
        // Measures: value read + marker read
        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("fetch_fresh_hit", size), size, |b, &size| {
                let cache = StaleCache::new(InMemoryStore::new());
                rt.block_on(async {
                    cache
                        .set("bench_hit", &"x".repeat(size), TTL, BUDGET)
                        .await
                        .expect("Failed to populate cache");
                });

                b.to_async(&rt).iter(|| async {
                    cache
                        .fetch(black_box("bench_hit"), || produce(size), &config)
                        .await
                });
            });

        // Measures: value read + marker read + claim + producer + two writes
        group
            .throughput(Throughput::Bytes(*size as u64))
            .bench_with_input(BenchmarkId::new("fetch_regenerate", size), size, |b, &size| {
                let cache = Arc::new(StaleCache::new(InMemoryStore::new()));
                let counter = Arc::new(AtomicU64::new(0));

                b.to_async(&rt).iter(|| {
                    let cache = cache.clone();
                    let counter = counter.clone();
                    let config = config.clone();
                    async move {
                        // Unique key per iteration forces a cold miss
                        let current = counter.fetch_add(1, Ordering::Relaxed);
                        let key = format!("bench_miss_{}", current);
                        cache
                            .fetch(black_box(&key), || produce(size), &config)
                            .await
                    }
                });
            });
    }

    // Measures: value read + marker read on a claimed key
    group.bench_function("fetch_stale_hit", |b| {
        let store = InMemoryStore::new();
        let cache = StaleCache::new(store.clone());
        rt.block_on(async {
            store
                .set("bench_stale", &"x".repeat(1_000), TTL)
                .await
                .expect("Failed to set value");
            store
                .set(&stale_cache::stale_key("bench_stale"), "refreshing", TTL)
                .await
                .expect("Failed to set marker");
        });

        b.to_async(&rt).iter(|| async {
            cache
                .fetch(black_box("bench_stale"), || produce(1_000), &config)
                .await
        });
    });

    // Measures: producer only
    group.bench_function("fetch_bypass", |b| {
        let cache = StaleCache::new(InMemoryStore::new()).with_disabled(true);

        b.to_async(&rt).iter(|| async {
            cache
                .fetch(black_box("bench_bypass"), || produce(1_000), &config)
                .await
        });
    });

    group.bench_function("set", |b| {
        let cache = StaleCache::new(InMemoryStore::new());
        let value = "x".repeat(1_000);

        b.to_async(&rt).iter(|| async {
            cache
                .set(black_box("bench_set"), black_box(&value), TTL, BUDGET)
                .await
        });
    });

    group.bench_function("get_all_10", |b| {
        let cache = StaleCache::new(InMemoryStore::new());
        let keys: Vec<String> = (0..10).map(|i| format!("bench_all_{}", i)).collect();
        rt.block_on(async {
            for key in keys.iter().step_by(2) {
                cache
                    .set(key, "value", TTL, BUDGET)
                    .await
                    .expect("Failed to populate cache");
            }
        });
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();

        b.to_async(&rt)
            .iter(|| async { cache.get_all(black_box(&refs)).await });
    });

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(benches, inmemory_benchmarks, stale_cache_benchmarks);
criterion_main!(benches);
