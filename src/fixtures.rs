//! Schema creation and fixture population.
//!
//! Three fixed tables, each a single `uuid` primary-key column, seeded with
//! 1 / 1,000 / 1,000,000 freshly generated identifiers. Rows go in as
//! multi-row `INSERT ... VALUES` statements capped at [`MAX_BATCH_ROWS`]
//! rows apiece — the bound the original engine put on a value list, kept so
//! the load pattern stays comparable.

use crate::error::{BenchError, Result};
use postgres::Client;
use uuid::Uuid;

/// Upper bound on rows per insert statement.
pub const MAX_BATCH_ROWS: u64 = 1_000;

/// A fixture table and the number of rows it must hold after load.
#[derive(Debug, Clone, Copy)]
pub struct FixtureTable {
    pub name: &'static str,
    pub rows: u64,
}

/// The fixed fixture set, smallest table first.
pub const FIXTURE_TABLES: [FixtureTable; 3] = [
    FixtureTable {
        name: "OneRow",
        rows: 1,
    },
    FixtureTable {
        name: "OneThousandRows",
        rows: 1_000,
    },
    FixtureTable {
        name: "OneMillionRows",
        rows: 1_000_000,
    },
];

/// Split `total` rows into consecutive batch sizes of at most `max_batch`.
///
/// Yields exactly ceil(total / max_batch) entries summing to `total`.
pub fn batch_sizes(total: u64, max_batch: u64) -> Vec<u64> {
    assert!(max_batch > 0);
    let mut sizes = Vec::with_capacity(total.div_ceil(max_batch) as usize);
    let mut remaining = total;
    while remaining > 0 {
        let n = remaining.min(max_batch);
        sizes.push(n);
        remaining -= n;
    }
    sizes
}

/// Create and seed every table in `tables` over the given connection.
///
/// Either all batches for a table succeed or the run aborts with
/// [`BenchError::FixtureLoad`]; the caller's abort path drops the whole
/// throwaway database, so a half-seeded table is never visible later.
pub fn load_fixtures(client: &mut Client, tables: &[FixtureTable]) -> Result<()> {
    for table in tables {
        load_table(client, table).map_err(|source| BenchError::FixtureLoad {
            table: table.name.to_string(),
            source,
        })?;
        log::info!("loaded fixture table {} ({} rows)", table.name, table.rows);
    }
    Ok(())
}

fn load_table(client: &mut Client, table: &FixtureTable) -> Result<(), postgres::Error> {
    client.batch_execute(&format!(
        "create table \"{}\" (\"id\" uuid not null primary key)",
        table.name
    ))?;

    for size in batch_sizes(table.rows, MAX_BATCH_ROWS) {
        let values = (0..size)
            .map(|_| format!("('{}')", Uuid::new_v4()))
            .collect::<Vec<_>>()
            .join(",");
        client.batch_execute(&format!(
            "insert into \"{}\" values {}",
            table.name, values
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{batch_sizes, FIXTURE_TABLES, MAX_BATCH_ROWS};

    #[test]
    fn batch_sizes_partitions_exactly() {
        for total in [0u64, 1, 999, 1_000, 1_001, 2_500, 1_000_000] {
            let sizes = batch_sizes(total, MAX_BATCH_ROWS);
            assert_eq!(sizes.len() as u64, total.div_ceil(MAX_BATCH_ROWS));
            assert_eq!(sizes.iter().sum::<u64>(), total);
            assert!(sizes.iter().all(|&s| s > 0 && s <= MAX_BATCH_ROWS));
        }
    }

    #[test]
    fn batch_sizes_zero_rows_means_no_statements() {
        assert!(batch_sizes(0, MAX_BATCH_ROWS).is_empty());
    }

    #[test]
    fn fixture_set_matches_schema_contract() {
        let names: Vec<_> = FIXTURE_TABLES.iter().map(|t| t.name).collect();
        assert_eq!(names, ["OneRow", "OneThousandRows", "OneMillionRows"]);
        let rows: Vec<_> = FIXTURE_TABLES.iter().map(|t| t.rows).collect();
        assert_eq!(rows, [1, 1_000, 1_000_000]);
    }
}
