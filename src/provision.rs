//! Throwaway database provisioning.
//!
//! Each run creates a uniquely-named database on the local server, hands out
//! its connection string, and drops it again at teardown. The name carries a
//! random 64-bit suffix so concurrent runs against the same server cannot
//! collide.

use crate::error::{BenchError, Result};
use postgres::{Client, NoTls};

/// Handle to a database created for exactly one benchmark run.
///
/// Dropping the handle performs a best-effort teardown that only logs; call
/// [`EphemeralDb::teardown`] explicitly to observe the outcome.
#[derive(Debug)]
pub struct EphemeralDb {
    server_url: String,
    name: String,
    url: String,
    dropped: bool,
}

impl EphemeralDb {
    /// Connection string for the created database.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Name of the created database.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a blocking client on the created database.
    pub fn connect(&self) -> Result<Client> {
        Client::connect(&self.url, NoTls).map_err(|source| BenchError::Provisioning {
            server: self.url.clone(),
            source,
        })
    }

    /// Drop the database. Idempotent: a second call is a no-op `Ok`.
    ///
    /// Any backend still connected to the database is terminated first, so a
    /// leaked connection cannot block the drop. `IF EXISTS` keeps the call
    /// harmless when the database was already removed externally.
    pub fn teardown(&mut self) -> Result<()> {
        if self.dropped {
            return Ok(());
        }

        let teardown_err = |source| BenchError::Teardown {
            database: self.name.clone(),
            source,
        };

        let mut client = Client::connect(&self.server_url, NoTls).map_err(teardown_err)?;
        client
            .execute(
                "select pg_terminate_backend(pid) from pg_stat_activity \
                 where datname = $1 and pid <> pg_backend_pid()",
                &[&self.name],
            )
            .map_err(teardown_err)?;
        client
            .batch_execute(&format!("drop database if exists \"{}\"", self.name))
            .map_err(teardown_err)?;

        self.dropped = true;
        log::info!("dropped throwaway database {}", self.name);
        Ok(())
    }
}

impl Drop for EphemeralDb {
    fn drop(&mut self) {
        if !self.dropped {
            if let Err(e) = self.teardown() {
                log::warn!("teardown on drop failed (ignored): {e}");
            }
        }
    }
}

/// Create a throwaway database on the server named by `server_url`.
///
/// `server_url` must point at the maintenance database of a local instance,
/// e.g. `postgres://postgres@localhost:5432/postgres`.
pub fn provision(server_url: &str) -> Result<EphemeralDb> {
    let name = format!("call_bench_{:016x}", rand::random::<u64>());

    let mut client = Client::connect(server_url, NoTls).map_err(|source| {
        BenchError::Provisioning {
            server: server_url.to_string(),
            source,
        }
    })?;
    client
        .batch_execute(&format!("create database \"{name}\""))
        .map_err(|source| BenchError::Provisioning {
            server: server_url.to_string(),
            source,
        })?;

    let url = database_url(server_url, &name);
    log::info!("provisioned throwaway database {name}");

    Ok(EphemeralDb {
        server_url: server_url.to_string(),
        name,
        url,
        dropped: false,
    })
}

/// Derive the connection string for `dbname` from the server URL by
/// replacing any database path. Query parameters are not carried over; the
/// harness targets a plain local instance.
pub fn database_url(server_url: &str, dbname: &str) -> String {
    let base = match server_url.find("://") {
        Some(scheme_end) => {
            let authority = &server_url[scheme_end + 3..];
            match authority.find(['/', '?']) {
                Some(rest) => &server_url[..scheme_end + 3 + rest],
                None => server_url,
            }
        }
        None => server_url,
    };
    format!("{base}/{dbname}")
}

#[cfg(test)]
mod tests {
    use super::database_url;

    #[test]
    fn database_url_replaces_existing_path() {
        assert_eq!(
            database_url("postgres://postgres@localhost:5432/postgres", "bench_1"),
            "postgres://postgres@localhost:5432/bench_1"
        );
    }

    #[test]
    fn database_url_appends_when_no_path() {
        assert_eq!(
            database_url("postgres://postgres@localhost:5432", "bench_1"),
            "postgres://postgres@localhost:5432/bench_1"
        );
    }

    #[test]
    fn database_url_discards_query_params() {
        assert_eq!(
            database_url("postgres://u:p@localhost?connect_timeout=5", "bench_1"),
            "postgres://u:p@localhost/bench_1"
        );
    }
}
