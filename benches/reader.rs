//! Point lookup and prefix scan throughput, measured against an on-disk
//! fixture database (mirroring the bench crate's `sqlite.rs` harness,
//! which measures the same underlying engine from the write side).

use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use ctlstore_ldb::{KeyValue, LdbReader, ReaderConfig, Row};

const ROW_COUNT: i64 = 10_000;

fn db_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("ctlstore_ldb_bench.db");
    path
}

fn build_fixture() -> PathBuf {
    let path = db_path();
    if path.exists() {
        std::fs::remove_file(&path).unwrap();
    }

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE \"bench___widgets\" (id INTEGER PRIMARY KEY, name TEXT, weight REAL);",
    )
    .unwrap();

    let tx = conn.unchecked_transaction().unwrap();
    for i in 0..ROW_COUNT {
        tx.execute(
            "INSERT INTO \"bench___widgets\" VALUES (?1, ?2, ?3)",
            rusqlite::params![i, format!("widget-{i}"), i as f64 * 1.5],
        )
        .unwrap();
    }
    tx.commit().unwrap();

    path
}

fn bench_point_lookup(c: &mut Criterion) {
    let path = build_fixture();
    let reader = LdbReader::open(&path, ReaderConfig::default()).unwrap();

    let mut group = c.benchmark_group("point_lookup");
    group.bench_function(BenchmarkId::new("get_row_by_key", "warm_pk_cache"), |b| {
        // Warm both caches before timing the steady-state path.
        let mut out = Row::new();
        reader
            .get_row_by_key("bench", "widgets", &[KeyValue::from(0i64)], &mut out)
            .unwrap();

        let mut rng = rand::thread_rng();
        b.iter(|| {
            let mut out = Row::new();
            let id = rng.gen_range(0..ROW_COUNT);
            reader
                .get_row_by_key("bench", "widgets", &[KeyValue::from(id)], &mut out)
                .unwrap();
        });
    });
    group.finish();
}

fn bench_prefix_scan(c: &mut Criterion) {
    let path = build_fixture();
    let reader = LdbReader::open(&path, ReaderConfig::default()).unwrap();

    let mut group = c.benchmark_group("prefix_scan");
    group.bench_function(BenchmarkId::new("get_rows_by_key_prefix", "full_table"), |b| {
        b.iter(|| {
            let mut iter = reader.get_rows_by_key_prefix("bench", "widgets", &[]).unwrap();
            let mut count = 0usize;
            while iter.next().unwrap().is_some() {
                count += 1;
            }
            assert_eq!(count, ROW_COUNT as usize);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_point_lookup, bench_prefix_scan);
criterion_main!(benches);
