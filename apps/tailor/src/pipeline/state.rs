//! Observable state of one pipeline run.

use std::fmt;

use serde::Serialize;

use crate::models::{GenerationJob, JobId, SourceArtifact, TargetDescription};
use crate::pipeline::normalize::NormalizedContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Uploading,
    ResumeReady,
    SubmittingJob,
    JobReady,
    Generating,
    Completed,
    Failed,
}

impl Stage {
    /// A remote call or poll loop is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Stage::Uploading | Stage::SubmittingJob | Stage::Generating
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::Uploading => "uploading",
            Stage::ResumeReady => "resume_ready",
            Stage::SubmittingJob => "submitting_job",
            Stage::JobReady => "job_ready",
            Stage::Generating => "generating",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Upload,
    Submission,
    Start,
    /// The backend reported the job as failed.
    Generation,
    /// The poll budget ran out before a terminal status arrived.
    Polling,
}

impl FailedStage {
    /// The ready state `retry` returns to.
    pub fn retry_from(self) -> Stage {
        match self {
            FailedStage::Upload => Stage::Idle,
            FailedStage::Submission => Stage::ResumeReady,
            FailedStage::Start | FailedStage::Generation | FailedStage::Polling => Stage::JobReady,
        }
    }
}

/// User-facing failure. Always carries an actionable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNotice {
    pub stage: FailedStage,
    pub message: String,
    /// The underlying error, when there is one.
    pub detail: Option<String>,
    pub job: Option<JobId>,
    pub retry_from: Stage,
}

impl FailureNotice {
    pub fn new(stage: FailedStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            detail: None,
            job: None,
            retry_from: stage.retry_from(),
        }
    }

    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_job(mut self, job: JobId) -> Self {
        self.job = Some(job);
        self
    }
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Result of a completed job after content normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationOutcome {
    pub job: GenerationJob,
    pub content: NormalizedContent,
    pub score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    pub stage: Stage,
    pub source: Option<SourceArtifact>,
    pub target: Option<TargetDescription>,
    pub job: Option<GenerationJob>,
    pub outcome: Option<GenerationOutcome>,
    pub failure: Option<FailureNotice>,
    /// Name of the file being uploaded or last uploaded.
    pub selected_file: Option<String>,
    /// Cosmetic progress, 0–100. Never consulted by a transition.
    pub progress: u8,
    pub disposed: bool,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            source: None,
            target: None,
            job: None,
            outcome: None,
            failure: None,
            selected_file: None,
            progress: 0,
            disposed: false,
        }
    }
}
