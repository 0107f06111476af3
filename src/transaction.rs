//! Transaction coordination: begin / commit / rollback around a
//! caller-supplied unit of work, with deterministic rollback-on-error.
//!
//! Commit and rollback consume the connection, so the `open -> committed` and
//! `open -> rolled-back` transitions are terminal at compile time; the
//! connection can never be double-released thanks to the release handle's
//! idempotence.

use crate::error::DbError;
use crate::executor::SqlExecutor;
use crate::pool::{DbConnection, DbHandle};
use crate::types::DatabaseType;

fn begin_sql(db_type: DatabaseType) -> &'static str {
    match db_type {
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => "START TRANSACTION;",
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => "BEGIN;",
    }
}

impl DbHandle {
    /// Open a transaction, or join one already in flight.
    ///
    /// Passing `Some(conn)` is a reentrant no-op join: the connection comes
    /// back unchanged and the outermost caller remains responsible for
    /// commit/rollback. Otherwise a connection is acquired and the
    /// transaction started; on failure the connection is released before the
    /// error returns.
    ///
    /// # Errors
    /// Pool acquisition failures, or the wrapped begin-statement failure.
    pub async fn begin(&self, existing: Option<DbConnection>) -> Result<DbConnection, DbError> {
        if let Some(conn) = existing {
            return Ok(conn);
        }

        let mut conn = self.acquire().await?;
        if let Err(err) = conn.execute_batch(begin_sql(conn.database_type())).await {
            conn.release();
            return Err(err);
        }
        Ok(conn)
    }

    /// Commit the transaction on `conn`. The connection is released
    /// unconditionally, whether or not the commit succeeds.
    ///
    /// # Errors
    /// The wrapped commit-statement failure.
    pub async fn commit(&self, mut conn: DbConnection) -> Result<(), DbError> {
        let result = conn.execute_batch("COMMIT;").await;
        conn.release();
        result
    }

    /// Roll back the transaction on `conn`, then release it.
    ///
    /// `None` (or an already-released connection) is not an error: rolling
    /// back an operation that never started a transaction is a no-op.
    /// Release is attempted even when the rollback statement fails.
    ///
    /// # Errors
    /// The wrapped rollback-statement failure.
    pub async fn rollback(&self, conn: Option<DbConnection>) -> Result<(), DbError> {
        let Some(mut conn) = conn else {
            return Ok(());
        };
        if conn.is_released() {
            return Ok(());
        }
        let result = conn.execute_batch("ROLLBACK;").await;
        conn.release();
        result
    }
}
