//! Job Service Client: the remote operations the pipeline depends on.
//!
//! Every call is a single request/response. Nothing here retries; the poll loop in
//! `pipeline::poller` is the only place a failed call is tried again.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::models::{
    DraftRequest, GenerationJob, JobId, SectionSuggestions, SectionUpdate, SourceArtifact,
    SourceId, SuggestionRequest, TargetDescription, TargetId, TargetRequest, TemplateDescriptor,
    TemplateMetadata,
};

pub mod http;

pub use http::{ApiCredentials, HttpJobService};

/// Failure of one request at the transport level.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Api { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Which remote operation failed.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("upload failed: {0}")]
    Upload(#[source] TransportError),

    #[error("job description submission failed: {0}")]
    Submission(#[source] TransportError),

    #[error("could not start generation: {0}")]
    Start(#[source] TransportError),

    #[error("status check failed: {0}")]
    Poll(#[source] TransportError),

    #[error("template catalog unavailable: {0}")]
    Catalog(#[source] TransportError),

    #[error("writing assistant failed: {0}")]
    Assistant(#[source] TransportError),

    #[error("draft update failed: {0}")]
    Draft(#[source] TransportError),
}

impl ServiceError {
    /// Only status checks are retried, and only by the poll loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Poll(_))
    }

    pub fn transport(&self) -> &TransportError {
        match self {
            ServiceError::Upload(e)
            | ServiceError::Submission(e)
            | ServiceError::Start(e)
            | ServiceError::Poll(e)
            | ServiceError::Catalog(e)
            | ServiceError::Assistant(e)
            | ServiceError::Draft(e) => e,
        }
    }
}

/// A source document ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).map(str::to_string);
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "doc" => Some("application/msword"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// The remote job-processing service.
#[async_trait]
pub trait JobService: Send + Sync {
    async fn upload_source(&self, file: &SourceFile) -> Result<SourceArtifact, ServiceError>;

    async fn submit_target(
        &self,
        request: &TargetRequest,
    ) -> Result<TargetDescription, ServiceError>;

    /// The returned job is `pending` or `processing`; it only means polling may begin.
    async fn start_generation(
        &self,
        source: SourceId,
        target: TargetId,
    ) -> Result<GenerationJob, ServiceError>;

    async fn job_status(&self, job: JobId) -> Result<GenerationJob, ServiceError>;

    async fn list_templates(&self) -> Result<Vec<TemplateDescriptor>, ServiceError>;

    async fn template_metadata(&self) -> Result<TemplateMetadata, ServiceError>;

    async fn section_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SectionSuggestions, ServiceError>;

    /// Creates an empty draft Source Artifact bound to a template.
    async fn create_draft(&self, request: &DraftRequest) -> Result<SourceArtifact, ServiceError>;

    /// Replaces one section of a draft and returns the updated artifact.
    async fn update_section(
        &self,
        source: SourceId,
        update: &SectionUpdate,
    ) -> Result<SourceArtifact, ServiceError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted fake used by pipeline tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_only_poll_errors_are_retryable() {
        let api = || TransportError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert!(ServiceError::Poll(api()).is_retryable());
        assert!(!ServiceError::Upload(api()).is_retryable());
        assert!(!ServiceError::Submission(api()).is_retryable());
        assert!(!ServiceError::Start(api()).is_retryable());
        assert!(!ServiceError::Draft(api()).is_retryable());
        assert_eq!(ServiceError::Start(api()).transport().status(), Some(502));
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(
            SourceFile::new("cv.PDF", Vec::new()).content_type.as_deref(),
            Some("application/pdf")
        );
        assert!(SourceFile::new("cv", Vec::new()).content_type.is_none());
    }

    #[tokio::test]
    async fn test_source_file_from_path() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"Dana Reyes\nBackend Engineer").unwrap();

        let source = SourceFile::from_path(file.path()).await.unwrap();
        assert!(source.file_name.ends_with(".txt"));
        assert_eq!(source.content_type.as_deref(), Some("text/plain"));
        assert_eq!(&source.bytes[..], b"Dana Reyes\nBackend Engineer");
    }

    #[tokio::test]
    async fn test_missing_source_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::from_path(dir.path().join("absent.pdf")).await.unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
