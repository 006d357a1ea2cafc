//! Data model shared by the renderer, the job service client, and the orchestrator.
//! Field names follow the backend's JSON; the Rust side uses domain names via serde renames.

pub mod content;
pub mod loose_text;
pub mod records;
pub mod template;

pub use content::{
    ContactInfo, ContentModel, DecodeError, EducationEntry, ExperienceEntry, ProjectEntry,
};
pub use records::{
    AtsFeedback, DraftRequest, GeneratedPayload, GenerationJob, JobId, JobStatus, SectionUpdate,
    SourceArtifact, SourceId, TargetDescription, TargetId, TargetRequest,
};
pub use template::{SectionSuggestions, SuggestionRequest, TemplateDescriptor, TemplateMetadata};
