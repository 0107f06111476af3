use deadpool_postgres::Runtime;
use tokio_postgres::NoTls;

use crate::config::{Credentials, DbConfig};
use crate::error::DbError;
use crate::pool::{DbHandle, DbPool};
use crate::types::DatabaseType;

impl DbHandle {
    /// Build a Postgres pool from `config`, merging in credentials from the
    /// configured secret file.
    ///
    /// # Errors
    /// Returns `DbError::ConfigError` if required fields are missing or the
    /// credentials file cannot be loaded, `DbError::ConnectionError` if pool
    /// creation fails.
    pub async fn new_postgres(config: DbConfig) -> Result<Self, DbError> {
        if config.host.is_empty() {
            return Err(DbError::ConfigError("host is required".to_string()));
        }
        if config.dbname.is_empty() {
            return Err(DbError::ConfigError("dbname is required".to_string()));
        }

        let credentials = Credentials::load(&config.credentials_file)?;

        let mut pg_config = deadpool_postgres::Config::new();
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.dbname);
        pg_config.user = Some(credentials.user);
        pg_config.password = Some(credentials.password);
        // Session timezone is applied server-side for every pooled connection
        pg_config.options = Some(format!("-c timezone={}", config.timezone));
        pg_config.pool = Some(config.pool.pool_config());
        let idle_timeout = config.pool.idle_timeout();

        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                DbError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;

        tracing::debug!("postgres pool created");
        Ok(DbHandle {
            pool: DbPool::Postgres(pool),
            db_type: DatabaseType::Postgres,
            idle_timeout,
        })
    }
}
