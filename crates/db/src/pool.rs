use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::migration::Migration;

/// Pool sizing knobs, usually taken from the `database` settings section.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared handle to the SQLite connection pool.
///
/// Cloning is cheap; every clone points at the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `url`, creating the database file when it is missing.
    ///
    /// Foreign key enforcement is switched on for every connection.
    pub async fn connect(url: &str, config: &PoolConfig) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|source| DbError::InvalidUrl {
                url: url.to_string(),
                source,
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        tracing::info!(
            target: "bookstore-db",
            url,
            max_connections = config.max_connections,
            "database pool opened"
        );

        Ok(Self { pool })
    }

    /// Single-connection in-memory database, used by tests.
    ///
    /// The connection is never recycled so the data lives as long as the pool.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run every migration's statements in the given order.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> DbResult<()> {
        for (module, migration) in migrations {
            tracing::debug!(
                target: "bookstore-db",
                module = %module,
                migration = migration.id,
                "applying schema"
            );

            sqlx::raw_sql(migration.up)
                .execute(&self.pool)
                .await
                .map_err(|source| DbError::Migration {
                    module: module.clone(),
                    id: migration.id,
                    source,
                })?;
        }

        tracing::info!(
            target: "bookstore-db",
            count = migrations.len(),
            "schema ensured"
        );
        Ok(())
    }

    /// Cheap liveness probe.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets() -> Vec<(String, Migration)> {
        vec![(
            "widgets".to_string(),
            Migration {
                id: "001_init",
                up: r#"
                    CREATE TABLE IF NOT EXISTS parents (id INTEGER PRIMARY KEY);
                    CREATE TABLE IF NOT EXISTS widgets (
                        id        INTEGER PRIMARY KEY,
                        parent_id INTEGER NOT NULL REFERENCES parents (id)
                    );
                "#,
            },
        )]
    }

    #[tokio::test]
    async fn migrations_are_rerunnable() {
        let db = Database::in_memory().await.unwrap();
        db.apply_migrations(&widgets()).await.unwrap();
        db.apply_migrations(&widgets()).await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::in_memory().await.unwrap();
        db.apply_migrations(&widgets()).await.unwrap();

        let result = sqlx::query("INSERT INTO widgets (parent_id) VALUES (42)")
            .execute(db.pool())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn broken_migration_names_its_source() {
        let db = Database::in_memory().await.unwrap();
        let broken = vec![(
            "broken".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE (",
            },
        )];

        let err = db.apply_migrations(&broken).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to apply migration 'broken/001_init'");
    }

    #[tokio::test]
    async fn connect_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let url = format!("sqlite://{}", path.display());

        let db = Database::connect(&url, &PoolConfig::default()).await.unwrap();
        db.ping().await.unwrap();
        db.close().await;

        assert!(path.exists());
    }
}
