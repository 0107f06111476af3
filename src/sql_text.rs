//! Simple SQL text assembly from pre-sanitized values. This is string
//! templating only; anything beyond splicing safe literals is out of scope.

use serde_json::{Map, Value as JsonValue};

use crate::error::DbError;
use crate::sanitize::{check_identifier, escape};

/// Replace every `{key}` occurrence in `sql` with the paired replacement, in
/// the order given. Replacements are expected to be pre-sanitized literals.
#[must_use]
pub fn parameterize_string(sql: &str, map: &[(&str, &str)]) -> String {
    let mut out = sql.to_string();
    for (key, replacement) in map {
        out = out.replace(&format!("{{{key}}}"), replacement);
    }
    out
}

/// Build a multi-row `INSERT` statement from a list of uniform objects,
/// escaping every value. Field order follows the first object's keys; with
/// `conflict_fields` the statement gains `ON CONFLICT (..) DO NOTHING`.
///
/// # Errors
/// `DbError::Validation` for an empty list, a non-escapable value, or an
/// invalid identifier.
pub fn insert_sql_from_object_list(
    list: &[Map<String, JsonValue>],
    table: &str,
    conflict_fields: &[&str],
) -> Result<String, DbError> {
    let first = list
        .first()
        .ok_or_else(|| DbError::Validation("Cannot build INSERT from an empty list".to_string()))?;

    check_identifier(table)?;
    let fields: Vec<&str> = first.keys().map(String::as_str).collect();
    for field in &fields {
        check_identifier(field)?;
    }

    let field_str = fields
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(",");

    let mut value_strs = Vec::with_capacity(list.len());
    for object in list {
        let mut rendered = Vec::with_capacity(fields.len());
        for field in &fields {
            rendered.push(escape(object.get(*field).unwrap_or(&JsonValue::Null))?);
        }
        value_strs.push(format!("({})", rendered.join(",")));
    }

    let mut sql = format!(
        "INSERT INTO {table} ({field_str}) VALUES {}",
        value_strs.join(",")
    );
    if !conflict_fields.is_empty() {
        for field in conflict_fields {
            check_identifier(field)?;
        }
        sql.push_str(&format!(
            " ON CONFLICT ({}) DO NOTHING",
            conflict_fields.join(",")
        ));
    }
    Ok(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameterize_replaces_all_occurrences() {
        let sql = parameterize_string(
            "SELECT * FROM t WHERE a = {v} OR b = {v} OR c = {w}",
            &[("v", "1"), ("w", "'x'")],
        );
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1 OR b = 1 OR c = 'x'");
    }

    #[test]
    fn parameterize_without_map_is_identity() {
        assert_eq!(parameterize_string("SELECT 1", &[]), "SELECT 1");
    }

    #[test]
    fn insert_sql_escapes_and_joins() {
        let rows = vec![
            json!({"id": 1, "name": "a"}).as_object().cloned().unwrap(),
            json!({"id": 2, "name": "o'b"}).as_object().cloned().unwrap(),
        ];
        let sql = insert_sql_from_object_list(&rows, "t", &["id"]).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO t (\"id\",\"name\") VALUES (1,'a'),(2,'o''b') ON CONFLICT (id) DO NOTHING"
        );
    }

    #[test]
    fn insert_sql_rejects_empty_list_and_bad_table() {
        assert!(insert_sql_from_object_list(&[], "t", &[]).is_err());
        let rows = vec![json!({"id": 1}).as_object().cloned().unwrap()];
        assert!(insert_sql_from_object_list(&rows, "t; drop", &[]).is_err());
    }
}
