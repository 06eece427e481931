//! Benchmark runner: provisions a throwaway database, seeds the fixture
//! tables, times every scenario, prints the report, and tears the database
//! down again — on every exit path once provisioning has succeeded.
//!
//! Usage:
//!   cargo run --release                          # full suite
//!   cargo run --release -- --full-matrix         # symmetric sync coverage
//!   cargo run --release -- --debug rows/sync/one_row   # one untimed invocation
//!
//! The server address comes from `PG_CALL_BENCH_URL` (a `.env` file is
//! honored), defaulting to a local instance.

use anyhow::Context;
use pg_call_bench::fixtures::{load_fixtures, FIXTURE_TABLES};
use pg_call_bench::harness::{run_benchmark, BenchOptions, CountingAlloc};
use pg_call_bench::provision::{provision, EphemeralDb};
use pg_call_bench::report::print_report;
use pg_call_bench::scenarios::{scenario_set, BenchContext, Scenario, Table};
use std::process;
use std::time::Instant;

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

const URL_ENV: &str = "PG_CALL_BENCH_URL";
const DEFAULT_SERVER_URL: &str = "postgres://postgres@localhost:5432/postgres";

const WARMUP_ITERS: u32 = 5;
const SAMPLE_ITERS: u32 = 50;
// The million-row scenarios cost seconds per invocation; sample them less.
const MILLION_WARMUP_ITERS: u32 = 2;
const MILLION_SAMPLE_ITERS: u32 = 10;

const USAGE: &str = "usage: pg-call-bench [--full-matrix] [--debug <scenario>]";

enum Mode {
    Full { full_matrix: bool },
    Debug { scenario: String },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Mode, String> {
    let mut full_matrix = false;
    let mut debug: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--full-matrix" => full_matrix = true,
            "--debug" => match args.next() {
                Some(name) => debug = Some(name),
                None => return Err(format!("--debug needs a scenario name\n{USAGE}")),
            },
            other => return Err(format!("unknown argument {other:?}\n{USAGE}")),
        }
    }

    Ok(match debug {
        Some(scenario) => Mode::Debug { scenario },
        None => Mode::Full { full_matrix },
    })
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let mode = match parse_args(std::env::args().skip(1)) {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(2);
        }
    };

    if let Err(e) = run(mode) {
        log::error!("benchmark run aborted: {e:#}");
        process::exit(1);
    }
}

fn run(mode: Mode) -> anyhow::Result<()> {
    let server_url =
        std::env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

    let mut db = provision(&server_url)?;
    let outcome = execute(&db, &mode);

    // Teardown runs regardless of the outcome above. A cleanup failure is
    // logged, never allowed to mask a completed measurement.
    if let Err(e) = db.teardown() {
        log::warn!("teardown failed (ignored): {e}");
    }

    outcome
}

fn execute(db: &EphemeralDb, mode: &Mode) -> anyhow::Result<()> {
    eprintln!("Seeding fixture tables on {}...", db.name());
    let mut client = db.connect()?;
    load_fixtures(&mut client, &FIXTURE_TABLES)?;
    drop(client);

    let ctx = BenchContext::new(db.url()).context("failed to start async runtime")?;

    match mode {
        Mode::Debug { scenario } => run_debug(&ctx, scenario),
        Mode::Full { full_matrix } => {
            run_suite(&ctx, *full_matrix);
            Ok(())
        }
    }
}

fn opts_for(scenario: &Scenario) -> BenchOptions {
    match scenario.table() {
        Some(Table::OneMillionRows) => BenchOptions {
            warmup: MILLION_WARMUP_ITERS,
            samples: MILLION_SAMPLE_ITERS,
        },
        _ => BenchOptions {
            warmup: WARMUP_ITERS,
            samples: SAMPLE_ITERS,
        },
    }
}

fn run_suite(ctx: &BenchContext, full_matrix: bool) {
    let scenarios = scenario_set(full_matrix);
    eprintln!(
        "Running {} scenarios ({WARMUP_ITERS} warmup / {SAMPLE_ITERS} samples each; \
         {MILLION_WARMUP_ITERS}/{MILLION_SAMPLE_ITERS} for the million-row table)...",
        scenarios.len()
    );

    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        eprint!("  Benchmarking {}...", scenario.name);
        let result = run_benchmark(&scenario.name, opts_for(scenario), || scenario.run(ctx));
        if result.sample_count() == 0 {
            eprintln!(" failed ({} iterations)", result.failed_iterations);
        } else {
            eprintln!(" done ({:.1}µs mean)", result.mean_us());
        }
        results.push(result);
    }

    print_report(&results);
}

/// Run exactly one named scenario once, untimed, for manual inspection.
fn run_debug(ctx: &BenchContext, name: &str) -> anyhow::Result<()> {
    let scenarios = scenario_set(true);
    let Some(scenario) = scenarios.iter().find(|s| s.name == name) else {
        eprintln!("unknown scenario {name:?}; available scenarios:");
        for s in &scenarios {
            eprintln!("  {}", s.name);
        }
        anyhow::bail!("unknown scenario {name:?}");
    };

    let start = Instant::now();
    let rows = scenario.run(ctx)?;
    println!(
        "{}: {} rows decoded in {:.1?}",
        scenario.name,
        rows,
        start.elapsed()
    );
    Ok(())
}
