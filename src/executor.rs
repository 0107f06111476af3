use async_trait::async_trait;

use crate::error::DbError;
use crate::pool::connection::ConnInner;
use crate::pool::{DbConnection, DbHandle};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Raw statement execution at the driver boundary.
///
/// Implementations run exactly one statement (or batch) on the connection and
/// report the outcome; they never acquire, release, or roll back. Anything
/// speaking SQL through this trait is pluggable underneath the executor.
#[async_trait]
pub trait SqlExecutor {
    /// Execute a SELECT-style statement and return its rows.
    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DbError>;

    /// Execute a DML statement and return the affected row count.
    async fn execute_dml(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, DbError>;

    /// Execute a batch of statements with no parameters.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError>;
}

#[async_trait]
impl SqlExecutor for DbConnection {
    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DbError> {
        match self.inner_mut()? {
            #[cfg(feature = "postgres")]
            ConnInner::Postgres(client) => crate::postgres::execute_select(client, sql, params).await,
            #[cfg(feature = "sqlite")]
            ConnInner::Sqlite(conn) => crate::sqlite::execute_select(conn, sql, params).await,
        }
    }

    async fn execute_dml(&mut self, sql: &str, params: &[RowValues]) -> Result<usize, DbError> {
        match self.inner_mut()? {
            #[cfg(feature = "postgres")]
            ConnInner::Postgres(client) => crate::postgres::execute_dml(client, sql, params).await,
            #[cfg(feature = "sqlite")]
            ConnInner::Sqlite(conn) => crate::sqlite::execute_dml(conn, sql, params).await,
        }
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        match self.inner_mut()? {
            #[cfg(feature = "postgres")]
            ConnInner::Postgres(client) => crate::postgres::execute_batch(client, sql).await,
            #[cfg(feature = "sqlite")]
            ConnInner::Sqlite(conn) => crate::sqlite::execute_batch(conn, sql).await,
        }
    }
}

impl DbHandle {
    /// Run a single SELECT-style statement on a transiently acquired
    /// connection. The connection is released on every exit path.
    ///
    /// # Errors
    /// Pool acquisition and statement failures; statement failures carry the
    /// failing SQL text.
    pub async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, DbError> {
        let mut conn = self.acquire().await?;
        let result = conn.execute_select(sql, params).await;
        conn.release();
        result
    }

    /// Run a SELECT-style statement on a caller-supplied connection (inside a
    /// transaction boundary). Ownership of the connection stays with the
    /// caller; on statement failure the transaction is rolled back on that
    /// connection and the connection released before the error propagates.
    ///
    /// # Errors
    /// Statement failures, carrying the failing SQL text.
    pub async fn query_on(
        &self,
        conn: &mut DbConnection,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, DbError> {
        match conn.execute_select(sql, params).await {
            Ok(rows) => Ok(rows),
            Err(err) => {
                self.rollback_after_failure(conn).await;
                Err(err)
            }
        }
    }

    /// Run a single DML statement on a transiently acquired connection.
    ///
    /// # Errors
    /// Pool acquisition and statement failures.
    pub async fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, DbError> {
        let mut conn = self.acquire().await?;
        let result = conn.execute_dml(sql, params).await;
        conn.release();
        result
    }

    /// Run a DML statement on a caller-supplied connection, with the same
    /// rollback-on-failure contract as [`DbHandle::query_on`].
    ///
    /// # Errors
    /// Statement failures, carrying the failing SQL text.
    pub async fn execute_on(
        &self,
        conn: &mut DbConnection,
        sql: &str,
        params: &[RowValues],
    ) -> Result<usize, DbError> {
        match conn.execute_dml(sql, params).await {
            Ok(affected) => Ok(affected),
            Err(err) => {
                self.rollback_after_failure(conn).await;
                Err(err)
            }
        }
    }

    /// Run a multi-statement batch on a transiently acquired connection.
    ///
    /// # Errors
    /// Pool acquisition and statement failures.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        let mut conn = self.acquire().await?;
        let result = conn.execute_batch(sql).await;
        conn.release();
        result
    }

    // Best-effort cleanup while already handling a statement failure: the
    // rollback outcome is logged, never propagated, so the primary error is
    // not masked. Release-handle idempotence makes the caller's own rollback
    // a no-op afterward.
    pub(crate) async fn rollback_after_failure(&self, conn: &mut DbConnection) {
        if conn.is_released() {
            return;
        }
        if let Err(rollback_err) = conn.execute_batch("ROLLBACK;").await {
            tracing::error!(error = %rollback_err, "rollback after failed statement also failed");
        }
        conn.release();
    }
}
