use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a scalar JSON value as the string we persist, dropping control
/// characters. Objects and arrays fall back to their JSON text.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    raw.chars().filter(|c| !c.is_control()).collect()
}

/// Pull the human readable failure text out of an error payload.
/// The server uses `message` in some handlers and `error` in others.
pub fn error_message(payload: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| payload.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Serde helper for ids the server sends either as numbers or strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(_) | Value::Number(_) => Ok(value_to_string(value)),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_scalars() {
        assert_eq!(value_to_string(json!(42)), "42");
        assert_eq!(value_to_string(json!("abc\n")), "abc");
        assert_eq!(value_to_string(Value::Null), "");
    }

    #[test]
    fn prefers_message_then_error() {
        assert_eq!(
            error_message(&json!({"message": "bad", "error": "worse"})),
            Some("bad".to_string())
        );
        assert_eq!(
            error_message(&json!({"error": "wrong username or password"})),
            Some("wrong username or password".to_string())
        );
        assert_eq!(error_message(&json!({"message": ""})), None);
        assert_eq!(error_message(&json!([1, 2])), None);
    }
}
