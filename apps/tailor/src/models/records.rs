//! Records created by the backend and handed to the client as read-only projections.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::content::{ContentModel, DecodeError};
use crate::models::loose_text::deserialize_lines;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of an uploaded Source Artifact.
    SourceId
);
record_id!(
    /// Identifier of a submitted Target Description.
    TargetId
);
record_id!(
    /// Identifier of a Generation Job.
    JobId
);

// ────────────────────────────────────────────────────────────────────────────
// Source Artifact
// ────────────────────────────────────────────────────────────────────────────

/// The parsed record derived from an uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceArtifact {
    pub id: SourceId,
    /// Where the backend stored the original file.
    #[serde(default, rename = "file_path")]
    pub stored_ref: Option<String>,
    /// Content Model extracted by the backend; kept as raw JSON until asked for.
    #[serde(default, rename = "parsed_content")]
    pub extracted: Option<Value>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default, rename = "meta_data")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl SourceArtifact {
    /// Decodes the extracted content.
    pub fn content(&self) -> Result<ContentModel, DecodeError> {
        match &self.extracted {
            Some(Value::Null) | None => Err(DecodeError::NoContent),
            Some(value) => ContentModel::from_value(value.clone()),
        }
    }
}

/// Setup choices for a document started from scratch instead of uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub job_role: String,
    pub experience_level: String,
    pub industry: String,
    pub template_id: String,
}

/// Replaces one top-level section of a draft's content, e.g. `summary` or `skills`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionUpdate {
    pub section_name: String,
    pub content: Value,
}

// ────────────────────────────────────────────────────────────────────────────
// Target Description
// ────────────────────────────────────────────────────────────────────────────

/// Labels used when the user gives none; the backend requires both fields.
pub const DEFAULT_POSITION_LABEL: &str = "Target Role";
pub const DEFAULT_ORGANIZATION_LABEL: &str = "Target Company";

/// What the user submits to create a Target Description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRequest {
    pub text: String,
    pub position_label: String,
    pub organization_label: String,
}

impl TargetRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position_label: DEFAULT_POSITION_LABEL.to_string(),
            organization_label: DEFAULT_ORGANIZATION_LABEL.to_string(),
        }
    }

    pub fn with_position(mut self, label: impl Into<String>) -> Self {
        self.position_label = label.into();
        self
    }

    pub fn with_organization(mut self, label: impl Into<String>) -> Self {
        self.organization_label = label.into();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// The job posting a document is tailored against. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescription {
    pub id: TargetId,
    #[serde(rename = "text_content")]
    pub text: String,
    #[serde(default, rename = "position")]
    pub position_label: String,
    #[serde(default, rename = "company")]
    pub organization_label: String,
    pub created_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation Job
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Generated content as the backend sends it: either a structured object or the
/// same object JSON-encoded into a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedPayload {
    Encoded(String),
    Structured(Value),
}

/// Structured ATS feedback. Every list tolerates the loose shapes AI output takes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsFeedback {
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub match_percentage: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub missing_keywords: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub feedback: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub improvement_tips: Vec<String>,
}

/// The asynchronous unit of work. The backend is its only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub generated_content: Option<GeneratedPayload>,
    #[serde(default)]
    pub ats_score: Option<i64>,
    #[serde(default)]
    pub ats_feedback: Option<AtsFeedback>,
    #[serde(default)]
    pub template_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Compatibility score clamped to 0–100, falling back to the score inside the feedback.
    pub fn score(&self) -> Option<u8> {
        self.ats_score
            .or_else(|| self.ats_feedback.as_ref().and_then(|f| f.score))
            .map(clamp_percent)
    }
}

pub(crate) fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_job(extra: Value) -> GenerationJob {
        let mut base = json!({
            "id": 9,
            "status": "processing",
            "created_at": "2026-03-01T12:00:00Z"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_job_status_uses_snake_case() {
        let job = make_job(json!({"status": "completed"}));
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.status.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
    }

    #[test]
    fn test_generated_content_string_stays_encoded() {
        let job = make_job(json!({"generated_content": "{\"full_name\": \"A\"}"}));
        assert!(matches!(
            job.generated_content,
            Some(GeneratedPayload::Encoded(_))
        ));
    }

    #[test]
    fn test_generated_content_object_is_structured() {
        let job = make_job(json!({"generated_content": {"full_name": "A"}}));
        assert!(matches!(
            job.generated_content,
            Some(GeneratedPayload::Structured(_))
        ));
    }

    #[test]
    fn test_score_is_clamped_and_falls_back_to_feedback() {
        assert_eq!(make_job(json!({"ats_score": 140})).score(), Some(100));
        assert_eq!(make_job(json!({"ats_score": -3})).score(), Some(0));
        let job = make_job(json!({"ats_feedback": {"score": 71}}));
        assert_eq!(job.score(), Some(71));
        assert_eq!(make_job(json!({})).score(), None);
    }

    #[test]
    fn test_feedback_accepts_loose_shapes() {
        let job = make_job(json!({
            "ats_feedback": {
                "score": 82,
                "missing_keywords": "Kubernetes",
                "feedback": [{"text": "Strong Go background"}],
                "improvement_tips": null
            }
        }));
        let feedback = job.ats_feedback.unwrap();
        assert_eq!(feedback.missing_keywords, vec!["Kubernetes"]);
        assert_eq!(feedback.feedback, vec!["Strong Go background"]);
        assert!(feedback.improvement_tips.is_empty());
    }

    #[test]
    fn test_target_description_wire_names() {
        let target: TargetDescription = serde_json::from_value(json!({
            "id": 2,
            "text_content": "Senior Engineer",
            "position": "Engineer",
            "company": "Acme",
            "created_at": "2026-03-01T12:00:00+02:00"
        }))
        .unwrap();
        assert_eq!(target.id, TargetId(2));
        assert_eq!(target.organization_label, "Acme");
    }

    #[test]
    fn test_target_request_defaults_and_blank_check() {
        let request = TargetRequest::new("  ");
        assert!(request.is_blank());
        assert_eq!(request.position_label, DEFAULT_POSITION_LABEL);
        let request = TargetRequest::new("Go role").with_organization("Acme");
        assert!(!request.is_blank());
        assert_eq!(request.organization_label, "Acme");
    }

    #[test]
    fn test_source_artifact_content_decodes() {
        let artifact: SourceArtifact = serde_json::from_value(json!({
            "id": 1,
            "file_path": "uploads/1_cv.pdf",
            "parsed_content": {"full_name": "Dana", "contact_info": {"email": "d@x.io"}},
            "created_at": "2026-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(artifact.id, SourceId(1));
        assert!(!artifact.is_draft);
        assert_eq!(artifact.content().unwrap().full_name, "Dana");
    }

    #[test]
    fn test_fresh_draft_has_no_content() {
        let artifact: SourceArtifact = serde_json::from_value(json!({
            "id": 7,
            "parsed_content": null,
            "is_draft": true,
            "template_id": "minimal-pro",
            "created_at": "2026-03-01T12:00:00Z"
        }))
        .unwrap();
        assert!(artifact.is_draft);
        assert_eq!(artifact.template_id.as_deref(), Some("minimal-pro"));
        assert!(matches!(artifact.content(), Err(DecodeError::NoContent)));
    }
}
