use thiserror::Error;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// Unified error type for every fallible operation in this crate.
///
/// The first three variants carry the input-validation taxonomy surfaced to
/// callers (400/404/409); everything else maps to 500. Use [`DbError::code`]
/// to translate into an HTTP-style status code at the boundary.
#[derive(Debug, Error)]
pub enum DbError {
    /// Malformed, missing, or unexpected input.
    #[error("{0}")]
    Validation(String),

    /// A required existence check found no matching row.
    #[error("{0}")]
    NotFound(String),

    /// A forbidden-existence check found a matching row.
    #[error("{0}")]
    Conflict(String),

    /// A statement failed; carries the offending SQL text for diagnostics.
    #[error("sql that failed: {sql}: {message}")]
    ExecutionError { sql: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] deadpool::managed::PoolError<rusqlite::Error>),
}

impl DbError {
    /// HTTP-style status code for this error.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            DbError::Validation(_) => 400,
            DbError::NotFound(_) => 404,
            DbError::Conflict(_) => 409,
            _ => 500,
        }
    }

    /// Wrap a driver failure for `sql`, logging it once at the wrap site.
    pub(crate) fn execution(sql: &str, source: impl std::fmt::Display) -> Self {
        let message = source.to_string();
        tracing::error!(sql, error = %message, "statement failed");
        DbError::ExecutionError {
            sql: sql.to_string(),
            message,
        }
    }
}
