//! Turns a completed job's generated content into a Content Model.
//!
//! A decode failure never fails the run. The best value available is kept instead: the
//! parsed JSON when it parses but does not fit the model, otherwise the raw string.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{ContentModel, DecodeError, GeneratedPayload};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedContent {
    Document(ContentModel),
    /// Valid JSON that does not fit the Content Model.
    Unstructured { value: Value, reason: String },
    /// Text that is not JSON at all.
    Raw { text: String, reason: String },
    Missing,
}

impl NormalizedContent {
    pub fn document(&self) -> Option<&ContentModel> {
        match self {
            NormalizedContent::Document(model) => Some(model),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, NormalizedContent::Document(_))
    }
}

pub fn normalize_generated(payload: Option<GeneratedPayload>) -> NormalizedContent {
    match payload {
        None => NormalizedContent::Missing,
        Some(GeneratedPayload::Structured(value)) => from_value(value),
        Some(GeneratedPayload::Encoded(text)) => {
            match serde_json::from_str::<Value>(strip_json_fences(&text)) {
                Ok(value) => from_value(value),
                Err(e) => {
                    let reason = DecodeError::Json(e).to_string();
                    warn!(%reason, "generated content is not JSON; keeping raw text");
                    NormalizedContent::Raw { text, reason }
                }
            }
        }
    }
}

fn from_value(value: Value) -> NormalizedContent {
    let value = unwrap_single(value);
    if value.is_null() {
        return NormalizedContent::Missing;
    }
    match ContentModel::from_value(value.clone()) {
        Ok(model) => NormalizedContent::Document(model),
        Err(e) => {
            let reason = e.to_string();
            warn!(%reason, "generated content does not fit the resume shape; keeping parsed value");
            NormalizedContent::Unstructured { value, reason }
        }
    }
}

/// A one-element top-level array stands for its only element.
fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences around model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_resume() -> Value {
        json!({
            "full_name": "Dana Reyes",
            "contact_info": {"email": "dana@example.com"},
            "summary": "Backend engineer",
            "work_experience": [{"company": "Acme", "role": "Engineer", "duration": "2020 - 2024", "points": ["Built things"]}]
        })
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        assert_eq!(strip_json_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_json_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_encoded_string_decodes_to_document() {
        let payload = GeneratedPayload::Encoded(make_resume().to_string());
        let content = normalize_generated(Some(payload));
        let model = content.document().unwrap();
        assert_eq!(model.full_name, "Dana Reyes");
        assert_eq!(model.experience.len(), 1);
    }

    #[test]
    fn test_fenced_single_element_array_is_unwrapped() {
        let text = format!("```json\n[{}]\n```", make_resume());
        let content = normalize_generated(Some(GeneratedPayload::Encoded(text)));
        assert!(!content.is_degraded());
    }

    #[test]
    fn test_structured_object_decodes_to_document() {
        let content = normalize_generated(Some(GeneratedPayload::Structured(make_resume())));
        assert_eq!(content.document().unwrap().summary(), Some("Backend engineer"));
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        let text = "Dana Reyes - Backend engineer".to_string();
        match normalize_generated(Some(GeneratedPayload::Encoded(text.clone()))) {
            NormalizedContent::Raw { text: raw, reason } => {
                assert_eq!(raw, text);
                assert!(reason.contains("not valid JSON"));
            }
            other => panic!("expected raw fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_email_keeps_parsed_value() {
        let value = json!({"full_name": "Dana Reyes", "contact_info": {"email": " "}});
        match normalize_generated(Some(GeneratedPayload::Structured(value.clone()))) {
            NormalizedContent::Unstructured { value: kept, reason } => {
                assert_eq!(kept, value);
                assert!(reason.contains("contact_info.email"));
            }
            other => panic!("expected unstructured fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_or_null_content_is_missing() {
        assert_eq!(normalize_generated(None), NormalizedContent::Missing);
        assert_eq!(
            normalize_generated(Some(GeneratedPayload::Encoded("null".to_string()))),
            NormalizedContent::Missing
        );
    }
}
