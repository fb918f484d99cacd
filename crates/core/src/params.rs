//! Helpers for extracting typed tunables from a `serde_json::Value` object.
//!
//! The lenient helpers (`param_f64`, `param_usize`, `param_bool`) fall back
//! to a default when a key is missing or mistyped and never fail.
//! [`check_param_types`] is the strict counterpart used by front ends that
//! want to reject a typo'd value instead of silently ignoring it.

use crate::error::FieldError;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Checks every key of `params` that also appears in `schema` against the
/// schema's declared `"type"` (`number`, `integer`, or `boolean`).
///
/// Keys absent from the schema are ignored.
pub fn check_param_types(params: &Value, schema: &Value) -> Result<(), FieldError> {
    let Some(obj) = params.as_object() else {
        return Ok(());
    };
    for (name, value) in obj {
        let Some(expected) = schema
            .get(name)
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        let ok = match expected {
            "number" => value.is_number(),
            "integer" => value.is_u64(),
            "boolean" => value.is_boolean(),
            _ => true,
        };
        if !ok {
            return Err(FieldError::ParamTypeMismatch {
                name: name.clone(),
                expected: expected.to_string(),
                got: json_type_name(value).to_string(),
            });
        }
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
