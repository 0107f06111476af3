// PostgreSQL backend
//
// - config: pool construction from DbConfig + credentials file
// - params: RowValues -> tokio-postgres parameter conversion
// - query: statement execution and row extraction

pub mod config;
pub mod params;
pub mod query;

pub(crate) use query::{execute_batch, execute_dml, execute_select};
