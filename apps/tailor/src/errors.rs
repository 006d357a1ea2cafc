use thiserror::Error;

use crate::pipeline::Stage;
use crate::service::ServiceError;

/// Errors returned by orchestrator operations.
///
/// Every variant except `Service` is a local rejection and leaves the pipeline state
/// untouched. `Service` means the stage call failed and the run is now `Failed`.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("operation rejected: a {stage} call is already in flight")]
    Busy { stage: Stage },

    #[error("cannot {action} while the pipeline is {from}")]
    InvalidTransition { from: Stage, action: &'static str },

    #[error("job description text is empty")]
    EmptyTarget,

    #[error("no {0} yet; complete the earlier step first")]
    MissingArtifact(&'static str),

    #[error("pipeline has been disposed")]
    Disposed,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl OrchestratorError {
    /// True when the operation was refused without touching state.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, OrchestratorError::Service(_))
    }
}
