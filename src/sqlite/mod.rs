// SQLite backend
//
// - config: pool construction and initial smoke test
// - params: RowValues -> rusqlite value conversion
// - query: statement execution inside `interact` closures

pub mod config;
pub mod params;
pub mod query;

pub(crate) use query::{execute_batch, execute_dml, execute_select};
