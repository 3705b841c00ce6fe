//! Database schema migrations.
//!
//! Applied versions are tracked in a `_migrations` table; each migration is
//! a SQL batch applied once, in order.

use tokio_rusqlite::{params, rusqlite, Connection};

/// Migration list: (version, SQL).
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_assets.sql"))];

/// Schema version a fully migrated database reports.
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

/// Run any pending migrations.
///
/// # Errors
///
/// Returns the underlying storage error if a migration fails to apply.
pub async fn run(conn: &Connection) -> Result<(), tokio_rusqlite::Error<rusqlite::Error>> {
    conn.call(|conn| -> Result<(), rusqlite::Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |row| row.get(0),
        )?;

        for (version, sql) in MIGRATIONS {
            if *version > current {
                let tx = conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                    params![version, chrono::Utc::now().to_rfc3339()],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
    .await
}

/// Highest applied migration version.
pub async fn current_version(
    conn: &Connection,
) -> Result<i64, tokio_rusqlite::Error<rusqlite::Error>> {
    conn.call(|conn| {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM _migrations",
            [],
            |row| row.get::<_, i64>(0),
        )
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let has_assets: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='assets')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(has_assets);
        assert_eq!(current_version(&conn).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_indexes_created() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let indexes: i64 = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type='index' AND name IN ('idx_assets_type', 'idx_assets_timestamp')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert_eq!(indexes, 2);
    }
}
