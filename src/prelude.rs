//! Convenient imports for common functionality.

pub use crate::config::{Credentials, DbConfig, PoolSettings};
pub use crate::error::DbError;
pub use crate::executor::SqlExecutor;
pub use crate::pool::{DbConnection, DbHandle, DbPool};
pub use crate::request::params_from_request;
pub use crate::results::{ResultSet, Row};
pub use crate::sanitize::{
    DataType, SafeValue, Sanitized, SanitizeOptions, escape, quote_literal, sanitize,
    sanitize_list, sanitize_list_from_objects, sanitize_on,
};
pub use crate::sql_text::{insert_sql_from_object_list, parameterize_string};
pub use crate::types::{DatabaseType, RowValues};
