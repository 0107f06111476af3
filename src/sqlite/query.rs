use std::sync::Arc;

use deadpool_sqlite::{Object, rusqlite};
use rusqlite::types::ValueRef;

use super::params::to_sqlite_values;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Execute a SELECT-style statement and collect its rows.
///
/// # Errors
/// Driver failures are wrapped with the failing SQL text.
pub(crate) async fn execute_select(
    conn: &Object,
    sql: &str,
    params: &[RowValues],
) -> Result<ResultSet, DbError> {
    let owned_sql = sql.to_string();
    let values = to_sqlite_values(params);
    let outcome = conn
        .interact(move |conn| select_sync(conn, &owned_sql, values))
        .await;
    flatten(sql, outcome)
}

/// Execute a DML statement and return the affected row count.
pub(crate) async fn execute_dml(
    conn: &Object,
    sql: &str,
    params: &[RowValues],
) -> Result<usize, DbError> {
    let owned_sql = sql.to_string();
    let values = to_sqlite_values(params);
    let outcome = conn
        .interact(move |conn| conn.execute(&owned_sql, rusqlite::params_from_iter(values)))
        .await;
    flatten(sql, outcome)
}

/// Execute a batch of semicolon-separated statements with no parameters.
pub(crate) async fn execute_batch(conn: &Object, sql: &str) -> Result<(), DbError> {
    let owned_sql = sql.to_string();
    let outcome = conn
        .interact(move |conn| conn.execute_batch(&owned_sql))
        .await;
    flatten(sql, outcome)
}

// Collapse the interact-wrapper and driver results into one DbError,
// attaching the SQL text to whichever layer failed.
fn flatten<T>(
    sql: &str,
    outcome: Result<Result<T, rusqlite::Error>, deadpool_sqlite::InteractError>,
) -> Result<T, DbError> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(driver_err)) => Err(DbError::execution(sql, driver_err)),
        Err(interact_err) => Err(DbError::execution(sql, interact_err)),
    }
}

fn select_sync(
    conn: &mut rusqlite::Connection,
    sql: &str,
    values: Vec<rusqlite::types::Value>,
) -> Result<ResultSet, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| (*name).to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(8);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows = stmt.query(rusqlite::params_from_iter(values))?;
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(extract_value(row.get_ref(idx)?));
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

fn extract_value(value: ValueRef<'_>) -> RowValues {
    match value {
        ValueRef::Null => RowValues::Null,
        ValueRef::Integer(i) => RowValues::Int(i),
        ValueRef::Real(f) => RowValues::Float(f),
        ValueRef::Text(bytes) => RowValues::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => RowValues::Blob(bytes.to_vec()),
    }
}
