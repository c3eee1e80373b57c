//! JSON vocabulary shared across the engine.

use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

/// A JSON object, insertion-ordered.
pub type Object = Map<ByteString, Value>;

/// Human-readable JSON type name for diagnostics.
pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
    }
}

/// String form of an entity id, used for result keys and cursors.
pub(crate) fn stringified_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.as_str().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
