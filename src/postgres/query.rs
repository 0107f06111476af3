use std::sync::Arc;

use chrono::NaiveDateTime;
use deadpool_postgres::Object;

use super::params::as_pg_refs;
use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Execute a SELECT-style statement and collect its rows.
///
/// # Errors
/// Driver failures are wrapped with the failing SQL text.
pub(crate) async fn execute_select(
    client: &Object,
    sql: &str,
    params: &[RowValues],
) -> Result<ResultSet, DbError> {
    let refs = as_pg_refs(params);
    let rows = client
        .query(sql, &refs)
        .await
        .map_err(|e| DbError::execution(sql, e))?;
    build_result_set(&rows)
}

/// Execute a DML statement and return the affected row count.
pub(crate) async fn execute_dml(
    client: &Object,
    sql: &str,
    params: &[RowValues],
) -> Result<usize, DbError> {
    let refs = as_pg_refs(params);
    let affected = client
        .execute(sql, &refs)
        .await
        .map_err(|e| DbError::execution(sql, e))?;
    usize::try_from(affected)
        .map_err(|e| DbError::ExecutionError {
            sql: sql.to_string(),
            message: format!("invalid affected-row count: {e}"),
        })
}

/// Execute a batch of semicolon-separated statements with no parameters.
pub(crate) async fn execute_batch(client: &Object, sql: &str) -> Result<(), DbError> {
    client
        .batch_execute(sql)
        .await
        .map_err(|e| DbError::execution(sql, e))
}

fn build_result_set(rows: &[tokio_postgres::Row]) -> Result<ResultSet, DbError> {
    let mut result_set = ResultSet::with_capacity(rows.len());
    if let Some(row) = rows.first() {
        let cols: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
        result_set.set_column_names(Arc::new(cols));
    }

    for row in rows {
        let col_count = row.columns().len();
        let mut values = Vec::with_capacity(col_count);
        for idx in 0..col_count {
            values.push(extract_value(row, idx)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Extract a single column as a `RowValues`, by declared Postgres type.
fn extract_value(row: &tokio_postgres::Row, idx: usize) -> Result<RowValues, DbError> {
    let type_name = row.columns()[idx].type_().name();
    let value = match type_name {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)?
            .map_or(RowValues::Null, RowValues::Int),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))),
        "float8" => row
            .try_get::<_, Option<f64>>(idx)?
            .map_or(RowValues::Null, RowValues::Float),
        "bool" => row
            .try_get::<_, Option<bool>>(idx)?
            .map_or(RowValues::Null, RowValues::Bool),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map_or(RowValues::Null, RowValues::Timestamp),
        "timestamptz" => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map_or(RowValues::Null, |v| RowValues::Timestamp(v.naive_utc())),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)?
            .map_or(RowValues::Null, RowValues::Blob),
        // text, varchar, char, and anything else readable as a string
        _ => row
            .try_get::<_, Option<String>>(idx)?
            .map_or(RowValues::Null, RowValues::Text),
    };
    Ok(value)
}
