use crate::error::DbError;
use crate::types::DatabaseType;

pub(crate) enum ConnInner {
    #[cfg(feature = "postgres")]
    Postgres(deadpool_postgres::Object),
    #[cfg(feature = "sqlite")]
    Sqlite(deadpool_sqlite::Object),
}

/// A pooled connection together with its one-shot release handle.
///
/// The pooled object lives in an `Option`: [`DbConnection::release`] takes it
/// out, returning the session to the pool, and any further call is a no-op.
/// Dropping an unreleased connection also returns it, so an abandoned
/// operation can never orphan a session. Statements issued after release fail
/// with `DbError::ConnectionError`.
pub struct DbConnection {
    pub(crate) inner: Option<ConnInner>,
    db_type: DatabaseType,
}

impl DbConnection {
    #[cfg(feature = "postgres")]
    pub(crate) fn new_postgres(obj: deadpool_postgres::Object) -> Self {
        DbConnection {
            inner: Some(ConnInner::Postgres(obj)),
            db_type: DatabaseType::Postgres,
        }
    }

    #[cfg(feature = "sqlite")]
    pub(crate) fn new_sqlite(obj: deadpool_sqlite::Object) -> Self {
        DbConnection {
            inner: Some(ConnInner::Sqlite(obj)),
            db_type: DatabaseType::Sqlite,
        }
    }

    /// The backend this connection talks to.
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Return the connection to the pool. Idempotent: releasing twice is a
    /// no-op, never a double return.
    pub fn release(&mut self) {
        if self.inner.take().is_some() {
            tracing::debug!("connection released to pool");
        }
    }

    /// Whether the release handle has already been consumed.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    pub(crate) fn inner_mut(&mut self) -> Result<&mut ConnInner, DbError> {
        self.inner.as_mut().ok_or_else(|| {
            DbError::ConnectionError("connection was already released to the pool".to_string())
        })
    }
}

// Manual Debug implementation because pooled objects do not expose `Debug`
impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("db_type", &self.db_type)
            .field("released", &self.is_released())
            .finish()
    }
}
