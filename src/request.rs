//! Request parameter normalization: a closed-set contract over incoming
//! field maps (merged body/query/route params upstream).

use serde_json::{Map, Value as JsonValue};

use crate::error::DbError;

/// Validate that `raw` carries exactly the declared fields.
///
/// Required names must be present (400 naming the first missing one);
/// optional names fall back to their declared default when absent. Any field
/// outside both sets fails with a 400 listing the unexpected names — the
/// contract is closed, not a permissive passthrough.
///
/// # Errors
/// `DbError::Validation` for missing required or unexpected fields.
pub fn params_from_request(
    raw: &Map<String, JsonValue>,
    required: &[&str],
    optional: &[(&str, JsonValue)],
) -> Result<Map<String, JsonValue>, DbError> {
    let mut params = Map::new();

    for &name in required {
        let Some(value) = raw.get(name) else {
            return Err(DbError::Validation(format!(
                "Missing required property: {name}"
            )));
        };
        params.insert(name.to_string(), value.clone());
    }

    for (name, default) in optional {
        match raw.get(*name) {
            Some(value) => params.insert((*name).to_string(), value.clone()),
            None => params.insert((*name).to_string(), default.clone()),
        };
    }

    let unexpected: Vec<&str> = raw
        .keys()
        .map(String::as_str)
        .filter(|key| {
            !required.contains(key) && !optional.iter().any(|(name, _)| name == key)
        })
        .collect();
    if !unexpected.is_empty() {
        return Err(DbError::Validation(format!(
            "Invalid properties received: {}",
            unexpected.join(",")
        )));
    }

    Ok(params)
}
