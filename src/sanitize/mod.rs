//! Value sanitization: coerce untrusted input against a declared type, verify
//! referential constraints against the live database, and render safe SQL
//! literals for templating.

mod escape;

pub use escape::{escape, quote_literal};

use std::sync::LazyLock;

use futures_util::future::join_all;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::DbError;
use crate::pool::{DbConnection, DbHandle};
use crate::results::Row;

static JSON_NULL: JsonValue = JsonValue::Null;

// Same grammar the surrounding application has always enforced: a dotted
// local part or a quoted one, at a dotted domain or a bracketed IPv4.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email regex is valid")
});

/// Declared type a raw value is coerced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    Int,
    Float,
    /// Plain string (the default)
    #[default]
    Text,
    Bool,
    Email,
    /// Passthrough: no coercion beyond scalar-ness, escaped like text
    Other,
}

/// Per-value sanitization options with documented defaults.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Reject missing values with a 400 (default: absent values sanitize to NULL).
    pub error_on_null: bool,
    /// Declared type driving coercion (default: [`DataType::Text`]).
    pub data_type: DataType,
    /// Field label for error messages; also the existence-check column
    /// (default column otherwise: `<table>_id`).
    pub property_name: Option<String>,
    /// Escaped output suitable for literal interpolation (default) versus the
    /// raw coerced value. No effect on numeric or bool types.
    pub return_escaped: bool,
    /// Require a matching row in this table (404 when absent).
    pub exists_in_table: Option<String>,
    /// Forbid a matching row in this table (409 when present).
    pub not_exists_in_table: Option<String>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions {
            error_on_null: false,
            data_type: DataType::Text,
            property_name: None,
            return_escaped: true,
            exists_in_table: None,
            not_exists_in_table: None,
        }
    }
}

impl SanitizeOptions {
    /// Options for a given type with all other fields at their defaults.
    #[must_use]
    pub fn of_type(data_type: DataType) -> Self {
        SanitizeOptions {
            data_type,
            ..SanitizeOptions::default()
        }
    }

    #[must_use]
    pub fn error_on_null(mut self, yes: bool) -> Self {
        self.error_on_null = yes;
        self
    }

    #[must_use]
    pub fn property_name(mut self, name: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn return_escaped(mut self, yes: bool) -> Self {
        self.return_escaped = yes;
        self
    }

    #[must_use]
    pub fn exists_in(mut self, table: impl Into<String>) -> Self {
        self.exists_in_table = Some(table.into());
        self
    }

    #[must_use]
    pub fn not_exists_in(mut self, table: impl Into<String>) -> Self {
        self.not_exists_in_table = Some(table.into());
        self
    }
}

/// A coerced value, safe to interpolate into SQL text via [`SafeValue::as_sql`].
#[derive(Debug, Clone, PartialEq)]
pub enum SafeValue {
    Null,
    Int(i64),
    Float(f64),
    /// Raw, unescaped text (requested with `return_escaped = false`)
    Text(String),
    /// Pre-escaped SQL literal, spliced verbatim
    Literal(String),
}

impl SafeValue {
    /// Render as SQL-literal text. Raw text is quoted here, so every variant
    /// is safe to splice.
    #[must_use]
    pub fn as_sql(&self) -> String {
        match self {
            SafeValue::Null => "NULL".to_string(),
            SafeValue::Int(i) => i.to_string(),
            SafeValue::Float(f) => f.to_string(),
            SafeValue::Text(s) => quote_literal(s),
            SafeValue::Literal(l) => l.clone(),
        }
    }
}

impl std::fmt::Display for SafeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_sql())
    }
}

/// A sanitized value plus, when an existence check ran, the first matched row.
#[derive(Debug, Clone)]
pub struct Sanitized {
    pub value: SafeValue,
    pub record: Option<Row>,
}

/// Sanitize one value: null handling, type coercion, existence checks,
/// escaping — in that order. Existence checks run on a transient connection.
///
/// # Errors
/// `Validation` (400) for nulls with `error_on_null` and coercion failures,
/// `NotFound` (404) / `Conflict` (409) for existence-check outcomes, plus any
/// database error from the checks themselves.
pub async fn sanitize(
    db: &DbHandle,
    value: &JsonValue,
    options: &SanitizeOptions,
) -> Result<Sanitized, DbError> {
    sanitize_inner(db, None, value, options).await
}

/// Like [`sanitize`], but existence checks run on the caller's connection so
/// they observe an open transaction.
///
/// # Errors
/// Same contract as [`sanitize`].
pub async fn sanitize_on(
    db: &DbHandle,
    conn: &mut DbConnection,
    value: &JsonValue,
    options: &SanitizeOptions,
) -> Result<Sanitized, DbError> {
    sanitize_inner(db, Some(conn), value, options).await
}

/// Sanitize every value of an ordered sequence under one options record.
/// Validations are dispatched concurrently; on failure the error of the
/// earliest element (by position, not completion order) is returned.
///
/// # Errors
/// The first element-level error in population order.
pub async fn sanitize_list(
    db: &DbHandle,
    values: &[JsonValue],
    options: &SanitizeOptions,
) -> Result<Vec<SafeValue>, DbError> {
    let pending: Vec<_> = values.iter().map(|v| sanitize(db, v, options)).collect();
    collect_in_order(join_all(pending).await)
}

/// Sanitize `property_name` out of every object of an ordered sequence.
/// Missing fields sanitize as null, subject to `error_on_null`.
///
/// # Errors
/// The first element-level error in population order.
pub async fn sanitize_list_from_objects(
    db: &DbHandle,
    objects: &[JsonValue],
    property_name: &str,
    options: &SanitizeOptions,
) -> Result<Vec<SafeValue>, DbError> {
    let opts = SanitizeOptions {
        property_name: Some(property_name.to_string()),
        ..options.clone()
    };
    let pending: Vec<_> = objects
        .iter()
        .map(|obj| sanitize(db, obj.get(property_name).unwrap_or(&JSON_NULL), &opts))
        .collect();
    collect_in_order(join_all(pending).await)
}

fn collect_in_order(results: Vec<Result<Sanitized, DbError>>) -> Result<Vec<SafeValue>, DbError> {
    let mut values = Vec::with_capacity(results.len());
    for result in results {
        values.push(result?.value);
    }
    Ok(values)
}

async fn sanitize_inner(
    db: &DbHandle,
    mut conn: Option<&mut DbConnection>,
    value: &JsonValue,
    options: &SanitizeOptions,
) -> Result<Sanitized, DbError> {
    if value.is_null() {
        if options.error_on_null {
            let message = match &options.property_name {
                Some(name) => format!("Invalid value for {name}: null"),
                None => "Invalid value: null".to_string(),
            };
            return Err(DbError::Validation(message));
        }
        return Ok(Sanitized {
            value: SafeValue::Null,
            record: None,
        });
    }

    // Arrays are non-escapable whatever the declared type
    if value.is_array() {
        return Err(DbError::Validation("Cannot escape arrays".to_string()));
    }

    let unescaped = coerce(value, options)?;

    let mut record = None;
    if let Some(table) = &options.exists_in_table {
        let field = check_field(table, options.property_name.as_deref())?;
        let sql = format!(
            "SELECT * FROM \"{table}\" WHERE \"{field}\" = {}",
            unescaped.as_sql()
        );
        let results = match conn.as_deref_mut() {
            Some(c) => db.query_on(c, &sql, &[]).await?,
            None => db.query(&sql, &[]).await?,
        };
        let Some(row) = results.rows.into_iter().next() else {
            return Err(DbError::NotFound(format!(
                "No record found for {field}: {value}"
            )));
        };
        record = Some(row);
    }

    if let Some(table) = &options.not_exists_in_table {
        let field = check_field(table, options.property_name.as_deref())?;
        let sql = format!(
            "SELECT \"{field}\" FROM \"{table}\" WHERE \"{field}\" = {}",
            unescaped.as_sql()
        );
        let results = match conn.as_deref_mut() {
            Some(c) => db.query_on(c, &sql, &[]).await?,
            None => db.query(&sql, &[]).await?,
        };
        if !results.is_empty() {
            return Err(DbError::Conflict(format!("{field}: {value} already exists")));
        }
    }

    let value = match options.data_type {
        DataType::Int | DataType::Float | DataType::Bool => unescaped,
        _ if options.return_escaped => SafeValue::Literal(unescaped.as_sql()),
        _ => unescaped,
    };

    Ok(Sanitized { value, record })
}

fn coerce(value: &JsonValue, options: &SanitizeOptions) -> Result<SafeValue, DbError> {
    let invalid = || DbError::Validation(format!("Invalid value: {value}"));
    match options.data_type {
        DataType::Int => match value {
            JsonValue::Number(n) => n.as_i64().map(SafeValue::Int).ok_or_else(invalid),
            JsonValue::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SafeValue::Int)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        },
        DataType::Float => match value {
            JsonValue::Number(n) => n.as_f64().map(SafeValue::Float).ok_or_else(invalid),
            // NaN/inf parse as f64 but have no SQL literal form
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(SafeValue::Float)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        },
        DataType::Text => match value {
            JsonValue::String(s) => Ok(SafeValue::Text(s.clone())),
            _ => Err(invalid()),
        },
        DataType::Bool => coerce_bool(value).ok_or_else(invalid),
        DataType::Email => match value {
            JsonValue::String(s) => {
                let normalized = s.trim().to_lowercase();
                if EMAIL_RE.is_match(&normalized) {
                    Ok(SafeValue::Text(normalized))
                } else {
                    Err(invalid())
                }
            }
            _ => Err(invalid()),
        },
        DataType::Other => match value {
            JsonValue::String(s) => Ok(SafeValue::Text(s.clone())),
            JsonValue::Number(n) => n
                .as_i64()
                .map(SafeValue::Int)
                .or_else(|| n.as_f64().map(SafeValue::Float))
                .ok_or_else(invalid),
            JsonValue::Bool(b) => Ok(SafeValue::Int(i64::from(*b))),
            _ => Err(invalid()),
        },
    }
}

// {true, 1, "true"} -> 1 and {false, 0, "false"} -> 0
fn coerce_bool(value: &JsonValue) -> Option<SafeValue> {
    match value {
        JsonValue::Bool(b) => Some(SafeValue::Int(i64::from(*b))),
        JsonValue::Number(n) => match n.as_i64() {
            Some(1) => Some(SafeValue::Int(1)),
            Some(0) => Some(SafeValue::Int(0)),
            _ => None,
        },
        JsonValue::String(s) if s == "true" => Some(SafeValue::Int(1)),
        JsonValue::String(s) if s == "false" => Some(SafeValue::Int(0)),
        _ => None,
    }
}

// Existence-check identifiers are interpolated, so they must be plain
// identifiers, not expressions.
fn check_field(table: &str, property_name: Option<&str>) -> Result<String, DbError> {
    check_identifier(table)?;
    let field = property_name.map_or_else(|| format!("{table}_id"), str::to_string);
    check_identifier(&field)?;
    Ok(field)
}

pub(crate) fn check_identifier(name: &str) -> Result<(), DbError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::Validation(format!("Invalid identifier: {name}")))
    }
}
