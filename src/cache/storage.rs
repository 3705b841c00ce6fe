//! Durable storage for cached assets.
//!
//! SQLite driven by tokio-rusqlite, which runs every statement on a
//! dedicated background thread. Calls are executed one at a time in
//! submission order, so each method below is atomic with respect to the
//! others.

use std::path::PathBuf;

use tokio_rusqlite::{params, rusqlite, Connection};
use tracing::debug;

use super::entry::{is_expired, AssetInfo, CacheEntry};
use super::migrations;
use super::stats::CacheStats;
use crate::error::{CacheError, Result};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    File(PathBuf),
    Memory,
}

/// Handle to the opened asset database.
#[derive(Clone, Debug)]
pub struct AssetDb {
    conn: Connection,
}

impl AssetDb {
    /// Open the database, apply pragmas and run pending migrations.
    ///
    /// Any failure here is reported as [`CacheError::StorageUnavailable`].
    pub async fn open(location: &StorageLocation) -> Result<Self> {
        let conn = match location {
            StorageLocation::File(path) => Connection::open(path).await,
            StorageLocation::Memory => Connection::open_in_memory().await,
        }
        .map_err(|e| CacheError::StorageUnavailable(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;",
            )
        })
        .await
        .map_err(|e| CacheError::StorageUnavailable(e.to_string()))?;

        migrations::run(&conn)
            .await
            .map_err(|e| CacheError::StorageUnavailable(format!("migration failed: {}", e)))?;

        debug!(?location, schema = migrations::SCHEMA_VERSION, "asset database opened");
        Ok(Self { conn })
    }

    /// Applied schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        Ok(migrations::current_version(&self.conn).await?)
    }

    /// Insert or fully replace an entry.
    pub async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.conn
            .call(move |conn| -> rusqlite::Result<()> {
                conn.execute(
                    "INSERT INTO assets (key, data, type, timestamp, max_age)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        data = excluded.data,
                        type = excluded.type,
                        timestamp = excluded.timestamp,
                        max_age = excluded.max_age",
                    params![
                        entry.key,
                        entry.data,
                        entry.asset_type,
                        to_sql_int(entry.timestamp),
                        to_sql_int(entry.max_age),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Look up an entry by key, expired or not.
    pub async fn fetch(&self, key: &str) -> Result<Option<CacheEntry>> {
        let key = key.to_string();
        let entry = self
            .conn
            .call(move |conn| -> rusqlite::Result<Option<CacheEntry>> {
                let mut stmt = conn.prepare(
                    "SELECT key, data, type, timestamp, max_age FROM assets WHERE key = ?1",
                )?;

                match stmt.query_row(params![key], row_to_entry) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await?;
        Ok(entry)
    }

    /// Remove an entry. Returns whether a row existed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let removed = self
            .conn
            .call(move |conn| conn.execute("DELETE FROM assets WHERE key = ?1", params![key]))
            .await?;
        Ok(removed > 0)
    }

    /// Remove an entry only if it still carries `timestamp`.
    ///
    /// A concurrent overwrite stamps a new timestamp, so the fresh entry
    /// survives eviction of the stale one it replaced.
    pub async fn remove_version(&self, key: &str, timestamp: u64) -> Result<bool> {
        let key = key.to_string();
        let removed = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM assets WHERE key = ?1 AND timestamp = ?2",
                    params![key, to_sql_int(timestamp)],
                )
            })
            .await?;
        Ok(removed > 0)
    }

    /// Remove every entry. Returns the number removed.
    pub async fn remove_all(&self) -> Result<usize> {
        let removed = self
            .conn
            .call(|conn| conn.execute("DELETE FROM assets", []))
            .await?;
        Ok(removed)
    }

    /// Delete every entry expired at `now` in a single transaction.
    pub async fn remove_expired(&self, now: u64) -> Result<usize> {
        let removed = self
            .conn
            .call(move |conn| -> rusqlite::Result<usize> {
                let tx = conn.transaction()?;
                let mut removed = 0;
                {
                    let mut scan = tx.prepare("SELECT key, timestamp, max_age FROM assets")?;
                    let expired = scan
                        .query_map([], |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                from_sql_int(row.get(1)?),
                                from_sql_int(row.get(2)?),
                            ))
                        })?
                        .filter_map(|row| match row {
                            Ok((key, timestamp, max_age)) => {
                                is_expired(timestamp, max_age, now).then_some(Ok(key))
                            }
                            Err(e) => Some(Err(e)),
                        })
                        .collect::<rusqlite::Result<Vec<String>>>()?;

                    let mut delete = tx.prepare("DELETE FROM assets WHERE key = ?1")?;
                    for key in &expired {
                        removed += delete.execute(params![key])?;
                    }
                }
                tx.commit()?;
                Ok(removed)
            })
            .await?;
        Ok(removed)
    }

    /// Count and size of stored entries, grouped by type.
    pub async fn stats(&self) -> Result<CacheStats> {
        let stats = self
            .conn
            .call(|conn| -> rusqlite::Result<CacheStats> {
                let mut stmt = conn.prepare(
                    "SELECT type, COUNT(*), COALESCE(SUM(LENGTH(data)), 0)
                     FROM assets GROUP BY type",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        from_sql_int(row.get(1)?),
                        from_sql_int(row.get(2)?),
                    ))
                })?;

                let mut stats = CacheStats::new();
                for row in rows {
                    let (asset_type, count, size) = row?;
                    stats.record_type(asset_type, count, size);
                }
                Ok(stats)
            })
            .await?;
        Ok(stats)
    }

    /// Metadata of stored entries, ordered by key, optionally for one type.
    pub async fn list(&self, asset_type: Option<String>, now: u64) -> Result<Vec<AssetInfo>> {
        let infos = self
            .conn
            .call(move |conn| -> rusqlite::Result<Vec<AssetInfo>> {
                let mut stmt = conn.prepare(
                    "SELECT key, type, LENGTH(data), timestamp, max_age FROM assets
                     WHERE ?1 IS NULL OR type = ?1
                     ORDER BY key",
                )?;
                let rows = stmt.query_map(params![asset_type], |row| {
                    Ok(AssetInfo::new(
                        row.get(0)?,
                        row.get(1)?,
                        from_sql_int(row.get(2)?),
                        from_sql_int(row.get(3)?),
                        from_sql_int(row.get(4)?),
                        now,
                    ))
                })?;
                rows.collect()
            })
            .await?;
        Ok(infos)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        key: row.get(0)?,
        data: row.get(1)?,
        asset_type: row.get(2)?,
        timestamp: from_sql_int(row.get(3)?),
        max_age: from_sql_int(row.get(4)?),
    })
}

// SQLite integers are signed; clamp at the edges.
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> u64 {
    value.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000_000;

    async fn open_db() -> AssetDb {
        AssetDb::open(&StorageLocation::Memory).await.unwrap()
    }

    fn entry(key: &str, data: &[u8], asset_type: &str, max_age_ms: u64, at: u64) -> CacheEntry {
        CacheEntry::new(
            key,
            data.to_vec(),
            asset_type,
            Duration::from_millis(max_age_ms),
            at,
        )
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = open_db().await;
        assert_eq!(db.schema_version().await.unwrap(), migrations::SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_put_and_fetch() {
        let db = open_db().await;
        let stored = entry("a", b"payload", "image", 1000, NOW);

        db.put(stored.clone()).await.unwrap();

        assert_eq!(db.fetch("a").await.unwrap(), Some(stored));
        assert_eq!(db.fetch("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let db = open_db().await;
        db.put(entry("a", b"old", "image", 1000, NOW)).await.unwrap();
        db.put(entry("a", b"new", "logo", 5000, NOW + 10)).await.unwrap();

        let fetched = db.fetch("a").await.unwrap().unwrap();
        assert_eq!(fetched.data, b"new");
        assert_eq!(fetched.asset_type, "logo");
        assert_eq!(fetched.timestamp, NOW + 10);
        assert_eq!(fetched.max_age, 5000);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = open_db().await;
        db.put(entry("a", b"x", "asset", 1000, NOW)).await.unwrap();

        assert!(db.remove("a").await.unwrap());
        assert!(!db.remove("a").await.unwrap());
        assert_eq!(db.fetch("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_version_skips_newer_entry() {
        let db = open_db().await;
        db.put(entry("a", b"fresh", "asset", 1000, NOW + 50)).await.unwrap();

        assert!(!db.remove_version("a", NOW).await.unwrap());
        assert!(db.fetch("a").await.unwrap().is_some());

        assert!(db.remove_version("a", NOW + 50).await.unwrap());
        assert!(db.fetch("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let db = open_db().await;
        db.put(entry("stale", b"1", "asset", 100, NOW)).await.unwrap();
        db.put(entry("zero", b"2", "asset", 0, NOW)).await.unwrap();
        db.put(entry("live", b"3", "asset", 10_000, NOW)).await.unwrap();

        let removed = db.remove_expired(NOW + 101).await.unwrap();

        assert_eq!(removed, 2);
        assert!(db.fetch("live").await.unwrap().is_some());
        assert!(db.fetch("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_groups_by_type() {
        let db = open_db().await;
        db.put(entry("logo", &[0; 5120], "logo", 1000, NOW)).await.unwrap();
        db.put(entry("img1", &[0; 10], "image", 1000, NOW)).await.unwrap();
        db.put(entry("img2", &[0; 20], "image", 1000, NOW)).await.unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_assets, 3);
        assert_eq!(stats.total_size, 5150);
        assert_eq!(stats.count_of("logo"), 1);
        assert_eq!(stats.count_of("image"), 2);
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let db = open_db().await;
        db.put(entry("b", b"xx", "image", 1000, NOW)).await.unwrap();
        db.put(entry("a", b"x", "logo", 1000, NOW)).await.unwrap();

        let all = db.list(None, NOW).await.unwrap();
        assert_eq!(
            all.iter().map(|i| i.key.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );

        assert_eq!(all[1].ttl_remaining, 1000);

        let logos = db.list(Some("logo".to_string()), NOW + 5000).await.unwrap();
        assert_eq!(logos.len(), 1);
        assert_eq!(logos[0].size, 1);
        assert!(logos[0].expired);
        assert_eq!(logos[0].ttl_remaining, 0);
    }

    #[tokio::test]
    async fn test_remove_all() {
        let db = open_db().await;
        db.put(entry("a", b"1", "asset", 1000, NOW)).await.unwrap();
        db.put(entry("b", b"2", "asset", 1000, NOW)).await.unwrap();

        assert_eq!(db.remove_all().await.unwrap(), 2);
        assert_eq!(db.stats().await.unwrap(), CacheStats::new());
    }

    #[tokio::test]
    async fn test_open_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let location = StorageLocation::File(dir.path().join("missing").join("cache.db"));

        let result = AssetDb::open(&location).await;
        assert!(matches!(result, Err(CacheError::StorageUnavailable(_))));
    }
}
