//! Async call patterns over `tokio-postgres`.
//!
//! The variants form a ladder of suspension points:
//! - [`scalar_async_open`] / [`rows_async_open`] suspend at connection open
//!   and once for the whole command
//! - [`scalar_async_exec`] / [`rows_async_prepare`] additionally suspend at
//!   command preparation
//! - [`rows_async_read`] suspends at every row fetch via [`RowStream`]
//!
//! Buffered variants iterate the returned row set synchronously — that is
//! the only non-suspending read loop an async client offers, and the
//! report's allocation column keeps the buffering cost visible.
//!
//! [`RowStream`]: tokio_postgres::RowStream

use super::Table;
use futures_util::{pin_mut, TryStreamExt};
use std::iter;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use uuid::Uuid;

/// Open a connection and spawn its driver task onto the current runtime.
async fn open(url: &str) -> Result<Client, tokio_postgres::Error> {
    let (client, connection) = tokio_postgres::connect(url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::debug!("connection driver exited: {e}");
        }
    });
    Ok(client)
}

/// Awaited open, one-shot `select 1` awaited once.
pub async fn scalar_async_open(url: &str) -> Result<u64, tokio_postgres::Error> {
    let client = open(url).await?;
    let row = client.query_one("select 1", &[]).await?;
    let value: i32 = row.get(0);
    Ok(value as u64)
}

/// Awaited open, preparation and execution awaited separately.
pub async fn scalar_async_exec(url: &str) -> Result<u64, tokio_postgres::Error> {
    let client = open(url).await?;
    let statement = client.prepare("select 1").await?;
    let row = client.query_one(&statement, &[]).await?;
    let value: i32 = row.get(0);
    Ok(value as u64)
}

/// Awaited open, one-shot buffered query, synchronous read loop.
pub async fn rows_async_open(url: &str, table: Table) -> Result<u64, tokio_postgres::Error> {
    let client = open(url).await?;
    let rows = client.query(table.select_sql().as_str(), &[]).await?;

    if rows.is_empty() {
        return Ok(0);
    }
    let mut decoded = 0u64;
    for row in &rows {
        let _id: Uuid = row.get(0);
        decoded += 1;
    }
    Ok(decoded)
}

/// Awaited open, awaited preparation, buffered query, synchronous read loop.
pub async fn rows_async_prepare(url: &str, table: Table) -> Result<u64, tokio_postgres::Error> {
    let client = open(url).await?;
    let statement = client.prepare(&table.select_sql()).await?;
    let rows = client.query(&statement, &[]).await?;

    if rows.is_empty() {
        return Ok(0);
    }
    let mut decoded = 0u64;
    for row in &rows {
        let _id: Uuid = row.get(0);
        decoded += 1;
    }
    Ok(decoded)
}

/// Awaited open, awaited preparation, row stream awaited per row.
pub async fn rows_async_read(url: &str, table: Table) -> Result<u64, tokio_postgres::Error> {
    let client = open(url).await?;
    let statement = client.prepare(&table.select_sql()).await?;
    let rows = client
        .query_raw(&statement, iter::empty::<&dyn ToSql>())
        .await?;
    pin_mut!(rows);

    let mut decoded = 0u64;
    while let Some(row) = rows.try_next().await? {
        let _id: Uuid = row.get(0);
        decoded += 1;
    }
    Ok(decoded)
}
