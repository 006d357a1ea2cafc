use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::loose_text::{deserialize_lines, deserialize_text};

/// Metadata for a selectable visual layout. The `id` is what the renderer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// Option lists consumed by setup forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub experience_levels: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub industries: Vec<String>,
}

/// Request body for the per-section writing assistant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    pub section_name: String,
    pub current_content: Option<Value>,
    pub job_role: String,
    pub experience_level: String,
    pub industry: String,
}

/// Writing-assistant output after loose-shape normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSuggestions {
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub suggestions: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub tips: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub improved_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_uses_name_on_the_wire() {
        let descriptor: TemplateDescriptor = serde_json::from_value(json!({
            "id": "modern-ats",
            "name": "Modern ATS",
            "description": "Compact sans layout",
            "category": "professional"
        }))
        .unwrap();
        assert_eq!(descriptor.display_name, "Modern ATS");
        assert!(descriptor.preview_url.is_none());
    }

    #[test]
    fn test_suggestions_normalize_every_shape() {
        let suggestions: SectionSuggestions = serde_json::from_value(json!({
            "suggestions": "Spearheaded platform migration",
            "tips": [{"tip": "Lead with outcomes"}, "Keep it to three lines"],
            "improved_content": ["Results-driven engineer.", "Ships reliable systems."]
        }))
        .unwrap();
        assert_eq!(suggestions.suggestions, vec!["Spearheaded platform migration"]);
        assert_eq!(
            suggestions.tips,
            vec!["Lead with outcomes", "Keep it to three lines"]
        );
        assert_eq!(
            suggestions.improved_content.as_deref(),
            Some("Results-driven engineer.\nShips reliable systems.")
        );
    }

    #[test]
    fn test_empty_suggestions_payload() {
        let suggestions: SectionSuggestions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(suggestions, SectionSuggestions::default());
    }
}
