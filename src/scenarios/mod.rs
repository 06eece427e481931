//! The fixed set of timed scenarios.
//!
//! Two variant families are provided:
//! - [`blocking`] — fully-synchronous patterns over the blocking client
//! - [`nonblocking`] — async patterns over `tokio-postgres`, each suspending
//!   at a different point (connection open, command preparation, row reads)
//!
//! Each variant is its own function; the suspension point is the measured
//! variable, so the bodies are deliberately not collapsed into one
//! parameterized implementation.

pub mod blocking;
pub mod nonblocking;

use crate::error::{BenchError, Result};
use tokio::runtime::Runtime;

/// The three fixture tables a row-iteration scenario can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    OneRow,
    OneThousandRows,
    OneMillionRows,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::OneRow, Table::OneThousandRows, Table::OneMillionRows];

    /// Table name as declared in the schema contract.
    pub fn table_name(self) -> &'static str {
        match self {
            Table::OneRow => "OneRow",
            Table::OneThousandRows => "OneThousandRows",
            Table::OneMillionRows => "OneMillionRows",
        }
    }

    /// Lowercase label used in scenario names and report rows.
    pub fn label(self) -> &'static str {
        match self {
            Table::OneRow => "one_row",
            Table::OneThousandRows => "one_thousand_rows",
            Table::OneMillionRows => "one_million_rows",
        }
    }

    /// Declared row count after fixture load.
    pub fn row_count(self) -> u64 {
        match self {
            Table::OneRow => 1,
            Table::OneThousandRows => 1_000,
            Table::OneMillionRows => 1_000_000,
        }
    }

    pub fn select_sql(self) -> String {
        format!("select id from \"{}\"", self.table_name())
    }
}

/// Calling-convention variants for the scalar query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarPattern {
    /// Blocking open, blocking one-shot execution.
    Sync,
    /// Awaited open, one-shot execution awaited once.
    AsyncOpen,
    /// Awaited open, preparation and execution awaited separately.
    AsyncExec,
}

/// Calling-convention variants for row iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsPattern {
    /// Blocking open, blocking lazy row iterator.
    Sync,
    /// Awaited open, one-shot buffered query, synchronous read loop.
    AsyncOpen,
    /// Awaited open, awaited preparation, buffered query, synchronous read loop.
    AsyncPrepare,
    /// Awaited open, awaited preparation, row stream awaited per row.
    AsyncRead,
}

impl RowsPattern {
    fn label(self) -> &'static str {
        match self {
            RowsPattern::Sync => "sync",
            RowsPattern::AsyncOpen => "async_open",
            RowsPattern::AsyncPrepare => "async_prepare",
            RowsPattern::AsyncRead => "async_read",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Scalar(ScalarPattern),
    Rows(RowsPattern, Table),
}

/// One named, repeatable unit of timed work.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
}

impl Scenario {
    fn scalar(pattern: ScalarPattern) -> Self {
        let suffix = match pattern {
            ScalarPattern::Sync => "sync",
            ScalarPattern::AsyncOpen => "async_open",
            ScalarPattern::AsyncExec => "async_exec",
        };
        Scenario {
            name: format!("scalar/{suffix}"),
            kind: ScenarioKind::Scalar(pattern),
        }
    }

    fn rows(pattern: RowsPattern, table: Table) -> Self {
        Scenario {
            name: format!("rows/{}/{}", pattern.label(), table.label()),
            kind: ScenarioKind::Rows(pattern, table),
        }
    }

    /// The table this scenario iterates, if any.
    pub fn table(&self) -> Option<Table> {
        match self.kind {
            ScenarioKind::Scalar(_) => None,
            ScenarioKind::Rows(_, table) => Some(table),
        }
    }

    /// Execute one invocation: open a connection, run the query, iterate and
    /// decode any rows, release the connection. Returns the number of rows
    /// decoded (for scalar scenarios, the scalar itself).
    pub fn run(&self, ctx: &BenchContext) -> Result<u64> {
        let url = ctx.db_url();
        let out = match self.kind {
            ScenarioKind::Scalar(ScalarPattern::Sync) => blocking::scalar_sync(url),
            ScenarioKind::Scalar(ScalarPattern::AsyncOpen) => {
                ctx.runtime().block_on(nonblocking::scalar_async_open(url))
            }
            ScenarioKind::Scalar(ScalarPattern::AsyncExec) => {
                ctx.runtime().block_on(nonblocking::scalar_async_exec(url))
            }
            ScenarioKind::Rows(RowsPattern::Sync, table) => blocking::rows_sync(url, table),
            ScenarioKind::Rows(RowsPattern::AsyncOpen, table) => ctx
                .runtime()
                .block_on(nonblocking::rows_async_open(url, table)),
            ScenarioKind::Rows(RowsPattern::AsyncPrepare, table) => ctx
                .runtime()
                .block_on(nonblocking::rows_async_prepare(url, table)),
            ScenarioKind::Rows(RowsPattern::AsyncRead, table) => ctx
                .runtime()
                .block_on(nonblocking::rows_async_read(url, table)),
        };
        out.map_err(|source| BenchError::ScenarioExecution {
            scenario: self.name.clone(),
            source,
        })
    }
}

/// Build the scenario suite in execution order.
///
/// The default (`full_matrix = false`) reproduces the reference coverage:
/// the fully-synchronous row iteration runs only against the one-row table,
/// while the async variants run against all three. `full_matrix = true`
/// makes the sync variant symmetric across the tables.
pub fn scenario_set(full_matrix: bool) -> Vec<Scenario> {
    let mut set = vec![
        Scenario::scalar(ScalarPattern::Sync),
        Scenario::scalar(ScalarPattern::AsyncOpen),
        Scenario::scalar(ScalarPattern::AsyncExec),
    ];
    for table in Table::ALL {
        if full_matrix || table == Table::OneRow {
            set.push(Scenario::rows(RowsPattern::Sync, table));
        }
        set.push(Scenario::rows(RowsPattern::AsyncOpen, table));
        set.push(Scenario::rows(RowsPattern::AsyncPrepare, table));
        set.push(Scenario::rows(RowsPattern::AsyncRead, table));
    }
    set
}

/// Shared state for one benchmark run: the throwaway database's connection
/// string and the runtime that drives the async variants. Passed explicitly
/// so multiple runs can coexist in one process (the tests do exactly that).
pub struct BenchContext {
    db_url: String,
    runtime: Runtime,
}

impl BenchContext {
    pub fn new(db_url: impl Into<String>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(BenchContext {
            db_url: db_url.into(),
            runtime,
        })
    }

    pub fn db_url(&self) -> &str {
        &self.db_url
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}
