//! Criterion benchmark harness: drives the same scenario set as the runner
//! binary under criterion's warmup, iteration control, and statistics.
//!
//! Needs a reachable local PostgreSQL server (`PG_CALL_BENCH_URL`, default
//! local instance); when none is available the benches print a skip notice.
//! Set `PG_CALL_BENCH_FULL_MATRIX=1` to extend the fully-synchronous row
//! iteration to all three tables instead of the reference coverage.

use criterion::measurement::WallTime;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use pg_call_bench::fixtures::{load_fixtures, FIXTURE_TABLES};
use pg_call_bench::provision::{provision, EphemeralDb};
use pg_call_bench::scenarios::{blocking, nonblocking, Table};
use std::time::Duration;
use tokio::runtime::Runtime;

const URL_ENV: &str = "PG_CALL_BENCH_URL";
const DEFAULT_SERVER_URL: &str = "postgres://postgres@localhost:5432/postgres";

/// Provision a throwaway database and seed the fixture tables.
fn setup() -> Option<EphemeralDb> {
    let _ = env_logger::try_init();
    let server_url = std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

    let db = match provision(&server_url) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Skipping call-pattern benches: {e}");
            return None;
        }
    };
    let mut client = match db.connect() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping call-pattern benches: {e}");
            return None;
        }
    };
    if let Err(e) = load_fixtures(&mut client, &FIXTURE_TABLES) {
        eprintln!("Skipping call-pattern benches: {e}");
        return None;
    }
    Some(db)
}

fn sync_row_tables() -> &'static [Table] {
    if std::env::var("PG_CALL_BENCH_FULL_MATRIX").is_ok() {
        &Table::ALL
    } else {
        &[Table::OneRow]
    }
}

fn configure_for(group: &mut BenchmarkGroup<'_, WallTime>, table: Table) {
    if table == Table::OneMillionRows {
        group.sample_size(10);
        group.measurement_time(Duration::from_secs(60));
    }
}

fn bench_call_patterns(c: &mut Criterion) {
    let Some(mut db) = setup() else { return };
    let url = db.url().to_string();
    let rt = Runtime::new().expect("Failed to create tokio runtime");

    // ── Scalar variants ─────────────────────────────────────────────
    let mut group = c.benchmark_group("scalar");
    group.bench_function("sync", |b| {
        b.iter(|| blocking::scalar_sync(&url).expect("scalar_sync"))
    });
    group.bench_function("async_open", |b| {
        let url = url.as_str();
        b.to_async(&rt).iter(|| async move {
            nonblocking::scalar_async_open(url)
                .await
                .expect("scalar_async_open")
        })
    });
    group.bench_function("async_exec", |b| {
        let url = url.as_str();
        b.to_async(&rt).iter(|| async move {
            nonblocking::scalar_async_exec(url)
                .await
                .expect("scalar_async_exec")
        })
    });
    group.finish();

    // ── Row iteration, fully synchronous ────────────────────────────
    let mut group = c.benchmark_group("rows/sync");
    group.measurement_time(Duration::from_secs(30));
    for &table in sync_row_tables() {
        configure_for(&mut group, table);
        group.bench_with_input(
            BenchmarkId::from_parameter(table.label()),
            &table,
            |b, &table| b.iter(|| blocking::rows_sync(&url, table).expect("rows_sync")),
        );
    }
    group.finish();

    // ── Row iteration, async open ───────────────────────────────────
    let mut group = c.benchmark_group("rows/async_open");
    group.measurement_time(Duration::from_secs(30));
    for table in Table::ALL {
        configure_for(&mut group, table);
        group.bench_with_input(
            BenchmarkId::from_parameter(table.label()),
            &table,
            |b, &table| {
                let url = url.as_str();
                b.to_async(&rt).iter(|| async move {
                    nonblocking::rows_async_open(url, table)
                        .await
                        .expect("rows_async_open")
                })
            },
        );
    }
    group.finish();

    // ── Row iteration, async open + async preparation ───────────────
    let mut group = c.benchmark_group("rows/async_prepare");
    group.measurement_time(Duration::from_secs(30));
    for table in Table::ALL {
        configure_for(&mut group, table);
        group.bench_with_input(
            BenchmarkId::from_parameter(table.label()),
            &table,
            |b, &table| {
                let url = url.as_str();
                b.to_async(&rt).iter(|| async move {
                    nonblocking::rows_async_prepare(url, table)
                        .await
                        .expect("rows_async_prepare")
                })
            },
        );
    }
    group.finish();

    // ── Row iteration, async open + preparation + per-row reads ─────
    let mut group = c.benchmark_group("rows/async_read");
    group.measurement_time(Duration::from_secs(30));
    for table in Table::ALL {
        configure_for(&mut group, table);
        group.bench_with_input(
            BenchmarkId::from_parameter(table.label()),
            &table,
            |b, &table| {
                let url = url.as_str();
                b.to_async(&rt).iter(|| async move {
                    nonblocking::rows_async_read(url, table)
                        .await
                        .expect("rows_async_read")
                })
            },
        );
    }
    group.finish();

    if let Err(e) = db.teardown() {
        eprintln!("Teardown after benches failed (ignored): {e}");
    }
}

criterion_group!(benches, bench_call_patterns);
criterion_main!(benches);
