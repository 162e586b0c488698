//! Helpers over JSON values: deep paths, deep merge and structural matching.

mod path;

pub use path::{Path, Segment};

use serde_json::Value;

/// Deep-merges `patch` into `target`.
///
/// When both sides are objects, every key of `patch` is merged into the
/// matching key of `target` (or inserted if absent). In every other case,
/// arrays included, `patch` replaces `target` wholesale.
pub fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Returns true if `value` structurally contains `pattern`.
///
/// - objects match if every key of the pattern matches the same key of the
///   value (extra keys in the value are ignored)
/// - arrays match if every pattern element matches some value element
/// - numbers compare by numeric value, so `1` matches `1.0`
/// - everything else compares by equality
#[must_use]
pub fn is_match(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(value), Value::Object(pattern)) => pattern
            .iter()
            .all(|(key, p)| value.get(key).is_some_and(|v| is_match(v, p))),
        (Value::Array(values), Value::Array(pattern)) => pattern
            .iter()
            .all(|p| values.iter().any(|v| is_match(v, p))),
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) if a.is_f64() || b.is_f64() => x == y,
            _ => a == b,
        },
        (value, pattern) => value == pattern,
    }
}

/// Returns a short name for the JSON type of `value`, for error messages.
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
