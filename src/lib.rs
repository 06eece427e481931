//! PostgreSQL Call-Pattern Latency Benchmark
//!
//! Measures how the choice of client calling convention — synchronous vs
//! asynchronous connection open, command preparation/execution, and row
//! reading — affects per-call latency against a local PostgreSQL server,
//! across tables of 1 / 1,000 / 1,000,000 rows.
//!
//! Each run provisions a throwaway database, seeds three uuid-keyed fixture
//! tables, times every scenario in isolation (each invocation opens and
//! releases its own connection), and drops the database again.
//!
//! Run the suite: `cargo run --release`
//! Run under criterion: `cargo bench`
//! Run tests: `cargo test` (live-server tests need `PG_CALL_BENCH_URL`)

pub mod error;
pub mod fixtures;
pub mod harness;
pub mod provision;
pub mod report;
pub mod scenarios;
