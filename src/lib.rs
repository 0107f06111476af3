//! Pooled query execution, transaction coordination, and value sanitization
//! over Postgres and `SQLite`.
//!
//! The crate is the database access layer of a larger service: it acquires
//! and releases pooled connections safely under concurrent load, runs single
//! statements or multi-statement transactions with rollback-on-error, and
//! turns untrusted input into safe, typed, existence-checked SQL values.
//!
//! ```no_run
//! use sql_conduit::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), DbError> {
//! let db = DbHandle::new_sqlite("app.db", PoolSettings::default()).await?;
//!
//! let clean = sanitize(
//!     &db,
//!     &json!(" USER@Example.com "),
//!     &SanitizeOptions::of_type(DataType::Email),
//! )
//! .await?;
//! assert_eq!(clean.value.as_sql(), "'user@example.com'");
//!
//! let mut conn = db.begin(None).await?;
//! db.execute_on(&mut conn, "INSERT INTO users (email) VALUES ($1)",
//!     &[RowValues::Text("user@example.com".into())]).await?;
//! db.commit(conn).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod pool;
pub mod prelude;
pub mod request;
pub mod results;
pub mod sanitize;
pub mod sql_text;
pub mod transaction;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::{Credentials, DbConfig, PoolSettings};
pub use error::DbError;
pub use executor::SqlExecutor;
pub use pool::{DbConnection, DbHandle, DbPool};
pub use results::{ResultSet, Row};
pub use types::{DatabaseType, RowValues};
