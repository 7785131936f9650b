//! Helpers over the parsed JSON value tree

use serde_json::Value;

use super::number::{append_float64, append_integer};
use super::string::append_normalized_string;

/// Name of a JSON value's type, as used in mismatch errors
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deepest object/array nesting in `value`; scalars are depth 0.
///
/// Iterative so that hostile input cannot overflow the stack.
pub fn value_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        match node {
            Value::Array(items) => {
                deepest = deepest.max(depth + 1);
                stack.extend(items.iter().map(|item| (item, depth + 1)));
            }
            Value::Object(map) => {
                deepest = deepest.max(depth + 1);
                stack.extend(map.values().map(|item| (item, depth + 1)));
            }
            _ => {}
        }
    }
    deepest
}

/// Append a JSON scalar; `false` for arrays and objects, which the caller
/// must open through its own depth-bounded scopes.
///
/// Non-finite floats cannot occur in a [`Value`], so scalars cannot fail.
pub fn append_scalar(buf: &mut Vec<u8>, value: &Value) -> bool {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                append_integer(buf, i);
            } else if let Some(u) = n.as_u64() {
                append_integer(buf, u);
            } else if let Some(f) = n.as_f64() {
                append_float64(buf, f);
            }
        }
        Value::String(s) => append_normalized_string(buf, s),
        Value::Array(_) | Value::Object(_) => return false,
    }
    true
}
