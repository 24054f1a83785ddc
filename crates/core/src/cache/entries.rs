//! SQLite-backed [`CacheBackend`] operations.

use std::time::Duration;

use super::backend::{CacheBackend, check_value_sizes};
use super::connection::CacheDb;
use super::scope::CacheScope;
use crate::Error;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl CacheDb {
    /// Delete every expired entry across all scopes. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<usize, Error> {
        let now = now_millis();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let removed = conn.execute("DELETE FROM cache_entries WHERE expires_at <= ?1", params![now])?;
                Ok(removed)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry in one scope. Returns the number removed.
    pub async fn clear_scope(&self, scope: CacheScope) -> Result<usize, Error> {
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let removed = conn.execute("DELETE FROM cache_entries WHERE scope = ?1", params![scope.as_str()])?;
                Ok(removed)
            })
            .await
            .map_err(Error::from)
    }

    /// Count live entries in one scope.
    pub async fn count_live(&self, scope: CacheScope) -> Result<i64, Error> {
        let now = now_millis();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE scope = ?1 AND expires_at > ?2",
                    params![scope.as_str(), now],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait::async_trait]
impl CacheBackend for CacheDb {
    async fn get(&self, scope: CacheScope, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();
        let now = now_millis();
        self.conn
            .call(move |conn| -> Result<Option<Vec<u8>>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT value FROM cache_entries
                     WHERE scope = ?1 AND key = ?2 AND expires_at > ?3",
                )?;

                match stmt.query_row(params![scope.as_str(), key, now], |row| row.get(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, scope: CacheScope, entries: Vec<(String, Vec<u8>)>, ttl: Duration) -> Result<(), Error> {
        check_value_sizes(&entries, self.max_value_bytes)?;

        let stored_at = now_millis();
        let expires_at = stored_at.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO cache_entries (scope, key, value, stored_at, expires_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         ON CONFLICT(scope, key) DO UPDATE SET
                            value = excluded.value,
                            stored_at = excluded.stored_at,
                            expires_at = excluded.expires_at",
                    )?;
                    for (key, value) in &entries {
                        stmt.execute(params![scope.as_str(), key, value, stored_at, expires_at])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }
}
