use deadpool_sqlite::rusqlite;

use crate::types::RowValues;

/// Convert middleware row values into owned `SQLite` values.
///
/// Booleans become 0/1 integers and timestamps are formatted as
/// `YYYY-MM-DD HH:MM:SS[.fff]` text, matching how `SQLite` stores both.
pub(crate) fn to_sqlite_values(params: &[RowValues]) -> Vec<rusqlite::types::Value> {
    params.iter().map(to_sqlite_value).collect()
}

fn to_sqlite_value(value: &RowValues) -> rusqlite::types::Value {
    match value {
        RowValues::Int(i) => rusqlite::types::Value::Integer(*i),
        RowValues::Float(f) => rusqlite::types::Value::Real(*f),
        RowValues::Text(s) => rusqlite::types::Value::Text(s.clone()),
        RowValues::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => {
            rusqlite::types::Value::Text(dt.format("%F %T%.f").to_string())
        }
        RowValues::Null => rusqlite::types::Value::Null,
        RowValues::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}
