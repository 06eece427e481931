//! Error taxonomy for the benchmark run.
//!
//! Provisioning and fixture-load failures are fatal and abort before any
//! measurement. Scenario failures belong to a single timed iteration and
//! never abort the rest of the suite. Teardown failures are logged by the
//! caller and never propagated past a completed measurement.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("provisioning against {server} failed: {source}")]
    Provisioning {
        server: String,
        #[source]
        source: postgres::Error,
    },

    #[error("fixture load for table {table} failed: {source}")]
    FixtureLoad {
        table: String,
        #[source]
        source: postgres::Error,
    },

    #[error("scenario {scenario} failed: {source}")]
    ScenarioExecution {
        scenario: String,
        #[source]
        source: postgres::Error,
    },

    #[error("teardown of database {database} failed: {source}")]
    Teardown {
        database: String,
        #[source]
        source: postgres::Error,
    },
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
