//! Tagged-union decoding for loosely shaped text in AI-produced payloads.
//!
//! The backend does not schema-check model output, so a field documented as a list of
//! strings may arrive as one string, a list of objects, a bare object, or `null`.
//! [`LooseText`] names each shape explicitly and maps it to text deterministically:
//! objects contribute their first well-known text field, and anything else is
//! stringified as compact JSON (object keys are sorted, so the result is stable).

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Keys tried, in order, when an object stands in for a single line of text.
const TEXT_KEYS: [&str; 7] = [
    "text", "content", "suggestion", "tip", "description", "message", "msg",
];

/// Every shape a "list of strings" field has been observed to take.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseText {
    Single(String),
    Many(Vec<Value>),
    Structured(Map<String, Value>),
    Scalar(Value),
}

impl LooseText {
    /// Flattens the value into non-blank lines, preserving source order.
    pub fn into_lines(self) -> Vec<String> {
        match self {
            LooseText::Single(text) => non_blank(text).into_iter().collect(),
            LooseText::Many(items) => items.into_iter().filter_map(value_to_text).collect(),
            LooseText::Structured(map) => value_to_text(Value::Object(map)).into_iter().collect(),
            LooseText::Scalar(value) => value_to_text(value).into_iter().collect(),
        }
    }

    /// Collapses the value into a single block of text, or `None` when nothing is left.
    pub fn into_text(self) -> Option<String> {
        let lines = self.into_lines();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Converts one JSON value into a line of text. `null` and blank strings yield `None`.
pub fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => non_blank(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(map) => {
            for key in TEXT_KEYS {
                if let Some(Value::String(text)) = map.get(key) {
                    if let Some(text) = non_blank(text.clone()) {
                        return Some(text);
                    }
                }
            }
            if map.is_empty() {
                None
            } else {
                Some(Value::Object(map).to_string())
            }
        }
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

/// `deserialize_with` adapter producing `Vec<String>` from any [`LooseText`] shape.
pub fn deserialize_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LooseText::deserialize(deserializer)?.into_lines())
}

/// `deserialize_with` adapter producing `Option<String>` from any [`LooseText`] shape.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LooseText::deserialize(deserializer)?.into_text())
}
