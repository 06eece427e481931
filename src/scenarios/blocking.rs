//! Fully-synchronous call patterns over the blocking `postgres` client.
//!
//! Nothing here ever suspends: connection open, command execution, and row
//! reads all block the calling thread on the underlying round-trip.

use super::Table;
use fallible_iterator::FallibleIterator;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use std::iter;
use uuid::Uuid;

/// Blocking open, blocking `select 1`.
pub fn scalar_sync(url: &str) -> Result<u64, postgres::Error> {
    let mut client = Client::connect(url, NoTls)?;
    let row = client.query_one("select 1", &[])?;
    let value: i32 = row.get(0);
    Ok(value as u64)
}

/// Blocking open, lazy row iterator: each fetch blocks on the wire.
pub fn rows_sync(url: &str, table: Table) -> Result<u64, postgres::Error> {
    let mut client = Client::connect(url, NoTls)?;
    let mut rows = client.query_raw(table.select_sql().as_str(), iter::empty::<&dyn ToSql>())?;

    let mut decoded = 0u64;
    while let Some(row) = rows.next()? {
        let _id: Uuid = row.get(0);
        decoded += 1;
    }
    Ok(decoded)
}
