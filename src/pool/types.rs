#[cfg(feature = "postgres")]
use deadpool_postgres::Pool as PostgresPool;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::Pool as SqlitePool;

/// Connection pool for database access, one variant per enabled backend.
#[derive(Clone)]
pub enum DbPool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(PostgresPool),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

// Manual Debug implementation because pool internals are not useful in logs
impl std::fmt::Debug for DbPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(pool) => f
                .debug_tuple("Postgres")
                .field(&pool.status())
                .finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.status()).finish(),
        }
    }
}
