//! The Content Model: normalized, template-agnostic resume data.
//!
//! Only `full_name` and `contact_info.email` are mandatory. Every other section may be
//! missing, `null`, or empty, and the renderer omits it in that case.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::loose_text::deserialize_lines;

/// Generated or extracted content could not be turned into a [`ContentModel`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("content is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("content does not match the resume shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("required field `{0}` is missing or blank")]
    MissingField(&'static str),

    #[error("no content has been extracted yet")]
    NoContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentModel {
    pub full_name: String,
    pub contact_info: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        rename = "work_experience",
        deserialize_with = "null_as_default"
    )]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Professional-network handle, e.g. a LinkedIn profile path.
    #[serde(default, rename = "linkedin", skip_serializing_if = "Option::is_none")]
    pub network_handle: Option<String>,
}

/// One position. Bullet points keep their source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, rename = "company")]
    pub organization: String,
    #[serde(default, rename = "role")]
    pub title: String,
    #[serde(default, rename = "duration")]
    pub period: String,
    #[serde(
        default,
        rename = "points",
        alias = "description",
        deserialize_with = "deserialize_lines"
    )]
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: String,
    #[serde(default, rename = "degree")]
    pub credential: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ContentModel {
    /// Decodes and validates a JSON value.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let model: ContentModel = serde_json::from_value(value).map_err(DecodeError::Shape)?;
        model.validate()?;
        Ok(model)
    }

    /// Checks the two mandatory identity fields.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.full_name.trim().is_empty() {
            return Err(DecodeError::MissingField("full_name"));
        }
        if self.contact_info.email.trim().is_empty() {
            return Err(DecodeError::MissingField("contact_info.email"));
        }
        Ok(())
    }

    /// The summary, if present and not blank.
    pub fn summary(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Projects as a slice; an absent section reads as empty.
    pub fn projects(&self) -> &[ProjectEntry] {
        self.projects.as_deref().unwrap_or(&[])
    }
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
