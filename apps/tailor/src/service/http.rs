//! reqwest-backed `JobService` talking to the resume backend's REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::models::loose_text::LooseText;
use crate::models::{
    DraftRequest, GenerationJob, JobId, SectionSuggestions, SectionUpdate, SourceArtifact,
    SourceId, SuggestionRequest, TargetDescription, TargetId, TargetRequest, TemplateDescriptor,
    TemplateMetadata,
};
use crate::service::{JobService, ServiceError, SourceFile, TransportError};

/// Credentials attached to every request. Passed in explicitly; the client keeps no
/// other session state.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum ApiCredentials {
    #[default]
    Anonymous,
    Bearer(String),
}

impl ApiCredentials {
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => ApiCredentials::Bearer(token),
            _ => ApiCredentials::Anonymous,
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiCredentials::Anonymous => f.write_str("Anonymous"),
            ApiCredentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// FastAPI error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: LooseText,
}

#[derive(Clone)]
pub struct HttpJobService {
    client: Client,
    base_url: String,
    credentials: ApiCredentials,
}

impl fmt::Debug for HttpJobService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJobService")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl HttpJobService {
    pub fn new(
        base_url: impl Into<String>,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            ApiCredentials::Anonymous => request,
            ApiCredentials::Bearer(token) => request.bearer_auth(token),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = self.authorize(request).send().await?;
        read_json(response).await
    }

    async fn upload(&self, file: &SourceFile) -> Result<SourceArtifact, TransportError> {
        let mut part = Part::bytes(file.bytes.to_vec()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part("file", part);
        debug!(file = %file.file_name, bytes = file.bytes.len(), "uploading source document");
        self.send(self.client.post(self.url("resume/upload")).multipart(form))
            .await
    }
}

/// Maps non-2xx responses to `TransportError::Api`, flattening FastAPI's `detail`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|e| e.detail.into_text())
            .unwrap_or(body);
        return Err(TransportError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl JobService for HttpJobService {
    async fn upload_source(&self, file: &SourceFile) -> Result<SourceArtifact, ServiceError> {
        self.upload(file).await.map_err(ServiceError::Upload)
    }

    async fn submit_target(
        &self,
        request: &TargetRequest,
    ) -> Result<TargetDescription, ServiceError> {
        let form = [
            ("text_content", request.text.as_str()),
            ("position", request.position_label.as_str()),
            ("company", request.organization_label.as_str()),
        ];
        debug!(position = %request.position_label, "submitting job description");
        self.send(self.client.post(self.url("resume/job")).form(&form))
            .await
            .map_err(ServiceError::Submission)
    }

    async fn start_generation(
        &self,
        source: SourceId,
        target: TargetId,
    ) -> Result<GenerationJob, ServiceError> {
        let form = [
            ("resume_id", source.to_string()),
            ("job_id", target.to_string()),
        ];
        debug!(%source, %target, "starting generation");
        self.send(self.client.post(self.url("resume/generate")).form(&form))
            .await
            .map_err(ServiceError::Start)
    }

    async fn job_status(&self, job: JobId) -> Result<GenerationJob, ServiceError> {
        let url = self.url(&format!("resume/application/{job}"));
        self.send(self.client.get(url))
            .await
            .map_err(ServiceError::Poll)
    }

    async fn list_templates(&self) -> Result<Vec<TemplateDescriptor>, ServiceError> {
        self.send(self.client.get(self.url("resume/templates")))
            .await
            .map_err(ServiceError::Catalog)
    }

    async fn template_metadata(&self) -> Result<TemplateMetadata, ServiceError> {
        self.send(self.client.get(self.url("resume/template-metadata")))
            .await
            .map_err(ServiceError::Catalog)
    }

    async fn section_suggestions(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SectionSuggestions, ServiceError> {
        self.send(self.client.post(self.url("resume/ai-assistant")).json(request))
            .await
            .map_err(ServiceError::Assistant)
    }

    async fn create_draft(&self, request: &DraftRequest) -> Result<SourceArtifact, ServiceError> {
        debug!(role = %request.job_role, template = %request.template_id, "creating draft");
        self.send(self.client.post(self.url("resume/scratch")).json(request))
            .await
            .map_err(ServiceError::Draft)
    }

    async fn update_section(
        &self,
        source: SourceId,
        update: &SectionUpdate,
    ) -> Result<SourceArtifact, ServiceError> {
        let url = self.url(&format!("resume/{source}/update-section"));
        debug!(%source, section = %update.section_name, "updating draft section");
        self.send(self.client.patch(url).json(update))
            .await
            .map_err(ServiceError::Draft)
    }
}
