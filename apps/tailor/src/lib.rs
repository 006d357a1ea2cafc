//! Tailor: a client for tailoring a resume to a job description.
//!
//! The crate has two cores. [`pipeline::Orchestrator`] drives one generation run against a
//! remote [`service::JobService`]. [`render::render`] lays a [`models::ContentModel`] out
//! under one of the registered templates.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod presentation;
pub mod render;
pub mod service;

pub use config::Config;
pub use errors::OrchestratorError;
pub use pipeline::{Orchestrator, PipelineState, PollPolicy, Stage};
pub use service::{ApiCredentials, HttpJobService, JobService, ServiceError, SourceFile};
