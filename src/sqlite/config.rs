use deadpool_sqlite::{Config as SqliteConfig, Runtime};

use crate::config::PoolSettings;
use crate::error::DbError;
use crate::pool::{DbHandle, DbPool};
use crate::types::DatabaseType;

impl DbHandle {
    /// Build a `SQLite` pool for the database at `db_path`.
    ///
    /// # Errors
    /// Returns `DbError::ConnectionError` if pool creation or the initial
    /// connection test fails.
    pub async fn new_sqlite(
        db_path: impl Into<String>,
        settings: PoolSettings,
    ) -> Result<Self, DbError> {
        let db_path = db_path.into();
        let mut cfg = SqliteConfig::new(db_path.clone());
        cfg.pool = Some(settings.pool_config());

        let pool = cfg.create_pool(Runtime::Tokio1).map_err(|e| {
            DbError::ConnectionError(format!("Failed to create SQLite pool for {db_path}: {e}"))
        })?;

        // Smoke test: fail at init time, not on first query
        let conn = pool.get().await?;
        conn.interact(|conn| conn.execute_batch("SELECT 1;"))
            .await
            .map_err(|e| {
                DbError::ConnectionError(format!("SQLite connection test failed: {e}"))
            })??;
        drop(conn);

        tracing::debug!(db_path, "sqlite pool created");
        Ok(DbHandle {
            pool: DbPool::Sqlite(pool),
            db_type: DatabaseType::Sqlite,
            idle_timeout: settings.idle_timeout(),
        })
    }
}
