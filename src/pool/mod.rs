pub mod connection;
pub mod types;

pub use connection::DbConnection;
pub use types::DbPool;

use std::time::Duration;

use crate::error::DbError;
use crate::types::DatabaseType;

/// Handle over a live connection pool.
///
/// Lifecycle is explicit: construct one with `DbHandle::new_postgres` /
/// `DbHandle::new_sqlite`, pass it to every operation, and call
/// [`DbHandle::shutdown`] when done. There is no process-wide singleton;
/// callers that want one hold it themselves.
#[derive(Clone, Debug)]
pub struct DbHandle {
    /// The connection pool
    pub(crate) pool: DbPool,
    /// The database type
    pub(crate) db_type: DatabaseType,
    /// Idle bound from `PoolSettings::idle_timeout_ms`, enforced in `acquire`
    pub(crate) idle_timeout: Option<Duration>,
}

impl DbHandle {
    /// The backend behind this handle.
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Acquire a connection, waiting until one is available or the pool's
    /// configured timeout fires.
    ///
    /// # Errors
    /// Returns a pool error if acquisition fails or times out.
    pub async fn acquire(&self) -> Result<DbConnection, DbError> {
        self.prune_idle();
        match &self.pool {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => {
                let obj = pool.get().await?;
                Ok(DbConnection::new_postgres(obj))
            }
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => {
                let obj = pool.get().await?;
                Ok(DbConnection::new_sqlite(obj))
            }
        }
    }

    // deadpool keeps no timer of its own for object age, so idle connections
    // are pruned lazily whenever one is about to be handed out.
    fn prune_idle(&self) {
        let Some(max_idle) = self.idle_timeout else {
            return;
        };
        match &self.pool {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => {
                pool.retain(|_, metrics| metrics.last_used() < max_idle);
            }
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => {
                pool.retain(|_, metrics| metrics.last_used() < max_idle);
            }
        }
    }

    /// Close the pool: idle connections are dropped and future acquisitions
    /// fail. Outstanding connections finish their work and are discarded on
    /// release. Safe to call more than once.
    pub fn shutdown(&self) {
        tracing::debug!(db_type = ?self.db_type, "shutting down pool");
        match &self.pool {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => pool.close(),
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => pool.close(),
        }
    }
}
