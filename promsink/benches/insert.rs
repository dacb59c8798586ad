//! Microbenchmarks for the write-path flush.
//!
//! Measures label dedup/batching and series statement construction against a
//! no-op engine, so the numbers isolate the translation work from I/O.
//!
//! Run with: `cargo bench -p promsink -- insert`

#![allow(missing_docs, clippy::cast_possible_truncation)]

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use promsink::{Inserter, Label, LabelSet, SampleRow, SeriesStore, StoreError};

/// Engine stub that acknowledges everything without doing work.
struct NullStore;

#[async_trait]
impl SeriesStore for NullStore {
    async fn execute(&self, _sql: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn query_ids(&self, _sql: &str) -> Result<Vec<i64>, StoreError> {
        Ok(Vec::new())
    }

    async fn copy_in(
        &self,
        _table: &str,
        _columns: &[&str],
        rows: &[SampleRow],
    ) -> Result<i64, StoreError> {
        Ok(rows.len() as i64)
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn bench_insert_labels(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("insert_labels/label_count");

    for count in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                rt.block_on(async {
                    let mut inserter = Inserter::new(NullStore);
                    // Half the adds are duplicates, like a real scrape batch.
                    for i in 0..count {
                        inserter.add_label(Label::new(
                            format!("name_{}", i % (count / 2)),
                            "value",
                        ));
                    }
                    black_box(inserter.insert_labels().await.unwrap());
                });
            });
        });
    }

    group.finish();
}

fn bench_insert_series(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("insert_series/series_count");

    for count in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                rt.block_on(async {
                    let mut inserter = Inserter::new(NullStore);
                    for i in 0..count {
                        let mut set = LabelSet::new();
                        set.insert("__name__".to_string(), format!("metric_{i}"));
                        set.insert("job".to_string(), "bench".to_string());
                        inserter.add_series(i as u64, set);
                    }
                    black_box(inserter.insert_series().await.unwrap());
                });
            });
        });
    }

    group.finish();
}

fn bench_insert_samples(c: &mut Criterion) {
    let rt = runtime();
    let rows: Vec<SampleRow> = (0..10_000)
        .map(|i| SampleRow::new(i % 100, 1_700_000_000_000 + i, 42.5))
        .collect();
    let inserter = Inserter::new(NullStore);

    c.bench_function("insert_samples/10k_rows", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(inserter.insert_samples(black_box(&rows)).await.unwrap());
            });
        });
    });
}

criterion_group!(
    benches,
    bench_insert_labels,
    bench_insert_series,
    bench_insert_samples,
);
criterion_main!(benches);
