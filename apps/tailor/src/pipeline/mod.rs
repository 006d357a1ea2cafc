//! The client-driven generation pipeline: state, polling, and the orchestrator that
//! sequences upload, job submission, generation, and status checks.

pub mod normalize;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod state;

pub use normalize::{normalize_generated, NormalizedContent};
pub use orchestrator::Orchestrator;
pub use poller::{PollPolicy, DEFAULT_POLL_INTERVAL};
pub use progress::ProgressEstimate;
pub use state::{FailedStage, FailureNotice, GenerationOutcome, PipelineState, Stage};
