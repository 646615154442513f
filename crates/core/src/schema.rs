//! Tagged parameter schemas and the structural validator/sanitizer.
//!
//! A tool declares its parameters as a mapping of field name → [`ParamKind`].
//! Before any invocation the registry checks the incoming parameters against
//! that schema ([`validate_params`]) and normalizes them ([`sanitize`]).
//! Both functions are pure; sanitization is idempotent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The kind a schema field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Mapping,
    Sequence,
}

impl ParamKind {
    /// Whether a JSON value has this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Mapping => value.is_object(),
            ParamKind::Sequence => value.is_array(),
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Mapping => "mapping",
            ParamKind::Sequence => "sequence",
        };
        write!(f, "{s}")
    }
}

/// A tool's parameter schema: field name → expected kind.
///
/// Ordered map so catalog listings and error messages are deterministic.
pub type ParamSchema = BTreeMap<String, ParamKind>;

/// Check that every schema field is present with the declared kind.
///
/// Fields not named by the schema are allowed through untouched; the schema
/// states requirements, not an exhaustive shape.
pub fn validate_params(
    params: &Map<String, Value>,
    schema: &ParamSchema,
) -> std::result::Result<(), String> {
    for (field, kind) in schema {
        match params.get(field) {
            None => return Err(format!("missing required field '{field}'")),
            Some(value) if !kind.matches(value) => {
                return Err(format!("field '{field}' must be a {kind}"));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Normalize a parameter value before invocation.
///
/// Strings are trimmed; mappings and sequences are sanitized recursively,
/// element-wise; numbers, booleans, and null pass through; anything else
/// would already be one of those in JSON, so the leaf fallback is null.
///
/// Idempotent: `sanitize(sanitize(v)) == sanitize(v)`.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Number(_) | Value::Bool(_) => value.clone(),
        Value::Object(map) => Value::Object(sanitize_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Null => Value::Null,
    }
}

/// Sanitize every entry of a parameter mapping.
pub fn sanitize_map(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), sanitize(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(fields: &[(&str, ParamKind)]) -> ParamSchema {
        fields
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect()
    }

    fn as_map(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn validate_accepts_matching_params() {
        let s = schema(&[("input", ParamKind::String), ("limit", ParamKind::Number)]);
        let params = as_map(json!({"input": "capital of France", "limit": 3}));
        assert!(validate_params(&params, &s).is_ok());
    }

    #[test]
    fn validate_rejects_missing_field() {
        let s = schema(&[("input", ParamKind::String)]);
        let params = as_map(json!({"query": "oops"}));
        let err = validate_params(&params, &s).unwrap_err();
        assert!(err.contains("input"));
    }

    #[test]
    fn validate_rejects_wrong_kind() {
        let s = schema(&[("limit", ParamKind::Number)]);
        let params = as_map(json!({"limit": "three"}));
        let err = validate_params(&params, &s).unwrap_err();
        assert!(err.contains("number"));
    }

    #[test]
    fn validate_allows_extra_fields() {
        let s = schema(&[("input", ParamKind::String)]);
        let params = as_map(json!({"input": "x", "verbose": true}));
        assert!(validate_params(&params, &s).is_ok());
    }

    #[test]
    fn mapping_and_sequence_kinds() {
        let s = schema(&[("opts", ParamKind::Mapping), ("tags", ParamKind::Sequence)]);
        let good = as_map(json!({"opts": {"a": 1}, "tags": ["x"]}));
        assert!(validate_params(&good, &s).is_ok());

        let bad = as_map(json!({"opts": ["not", "a", "map"], "tags": ["x"]}));
        assert!(validate_params(&bad, &s).is_err());
    }

    #[test]
    fn sanitize_trims_strings() {
        assert_eq!(sanitize(&json!("  padded  ")), json!("padded"));
    }

    #[test]
    fn sanitize_recurses_into_nested_structures() {
        let input = json!({
            "name": "  alice ",
            "tags": ["  a", "b  "],
            "meta": {"note": " deep  "}
        });
        let expected = json!({
            "name": "alice",
            "tags": ["a", "b"],
            "meta": {"note": "deep"}
        });
        assert_eq!(sanitize(&input), expected);
    }

    #[test]
    fn sanitize_preserves_scalars_and_null() {
        assert_eq!(sanitize(&json!(42)), json!(42));
        assert_eq!(sanitize(&json!(2.5)), json!(2.5));
        assert_eq!(sanitize(&json!(true)), json!(true));
        assert_eq!(sanitize(&json!(null)), json!(null));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let values = [
            json!("  padded  "),
            json!({"a": [" x ", {"b": "  y"}], "n": 1, "f": false}),
            json!([null, " s ", [42, " t "]]),
            json!(null),
        ];
        for v in values {
            let once = sanitize(&v);
            let twice = sanitize(&once);
            assert_eq!(once, twice);
        }
    }
}
