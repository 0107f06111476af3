use serde_json::Value as JsonValue;

use crate::error::DbError;

/// Render an untrusted value as a SQL-literal-safe string.
///
/// Strings come back single-quoted with embedded quotes doubled, null (and
/// the literal string `"NULL"`) becomes `NULL`, numbers render bare, and
/// booleans become `1`/`0`. Arrays can never be escaped.
///
/// # Errors
/// Returns `DbError::Validation` for arrays and any other non-escapable value.
pub fn escape(value: &JsonValue) -> Result<String, DbError> {
    match value {
        JsonValue::Array(_) => Err(DbError::Validation("Cannot escape arrays".to_string())),
        JsonValue::Null => Ok("NULL".to_string()),
        JsonValue::String(s) if s == "NULL" => Ok("NULL".to_string()),
        JsonValue::String(s) => Ok(quote_literal(s)),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        JsonValue::Object(_) => Err(DbError::Validation(format!(
            "Could not escape value: {value}"
        ))),
    }
}

/// Single-quote `s`, doubling any embedded quotes.
#[must_use]
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}
