//! The Generation Orchestrator: drives one pipeline run through
//! `Idle → Uploading → ResumeReady → SubmittingJob → JobReady → Generating → Completed`,
//! with `Failed` reachable from each in-flight stage.
//!
//! State lives in a `watch` channel. Every transition and `dispose` go through the
//! channel's write lock, so a transition either lands before disposal or is discarded.
//! Stage calls are raced against the shutdown token; after `dispose` no call resolves
//! into a state change.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::OrchestratorError;
use crate::models::{GenerationJob, JobId, SourceArtifact, TargetDescription, TargetRequest};
use crate::pipeline::normalize::normalize_generated;
use crate::pipeline::poller::{poll_job, PollHandle, PollPolicy};
use crate::pipeline::progress::ProgressEstimate;
use crate::pipeline::state::{FailedStage, FailureNotice, GenerationOutcome, PipelineState, Stage};
use crate::service::{JobService, ServiceError, SourceFile};

const UPLOAD_FAILED: &str = "Upload failed. Check the file and try again.";
const SUBMISSION_FAILED: &str = "Job description submission failed. Submit it again.";
const START_FAILED: &str = "Generation failed to start. Try again.";
const GENERATION_FAILED: &str = "Resume generation failed. Please try again.";

pub(crate) struct Shared {
    pub(crate) service: Arc<dyn JobService>,
    pub(crate) policy: PollPolicy,
    run_id: Uuid,
    state: watch::Sender<PipelineState>,
    shutdown: CancellationToken,
    poll: Mutex<Option<PollHandle>>,
    next_epoch: AtomicU64,
}

pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn JobService>, policy: PollPolicy) -> Self {
        let (state, _) = watch::channel(PipelineState::default());
        let run_id = Uuid::new_v4();
        info!(%run_id, interval_ms = policy.interval.as_millis() as u64, "pipeline created");
        Self {
            shared: Arc::new(Shared {
                service,
                policy,
                run_id,
                state,
                shutdown: CancellationToken::new(),
                poll: Mutex::new(None),
                next_epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.shared.run_id
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> PipelineState {
        self.shared.state.borrow().clone()
    }

    pub fn stage(&self) -> Stage {
        self.shared.state.borrow().stage
    }

    pub fn is_polling(&self) -> bool {
        self.shared.poll_slot().is_some()
    }

    /// `Idle → Uploading → ResumeReady`. A second upload while one is in flight is
    /// rejected with `Busy`.
    pub async fn upload(&self, file: SourceFile) -> Result<SourceArtifact, OrchestratorError> {
        let file_name = file.file_name.clone();
        self.begin("upload", |state| match state.stage {
            Stage::Idle => {
                state.stage = Stage::Uploading;
                state.selected_file = Some(file_name);
                Ok(())
            }
            Stage::Uploading => Err(OrchestratorError::Busy {
                stage: Stage::Uploading,
            }),
            from => Err(OrchestratorError::InvalidTransition {
                from,
                action: "upload",
            }),
        })?;
        info!(run_id = %self.shared.run_id, file = %file.file_name, "uploading source document");

        match self.call(self.shared.service.upload_source(&file)).await? {
            Ok(artifact) => {
                let source = artifact.clone();
                self.commit(Stage::Uploading, move |state| {
                    state.stage = Stage::ResumeReady;
                    state.source = Some(source);
                })?;
                info!(run_id = %self.shared.run_id, source = %artifact.id, "source document ready");
                Ok(artifact)
            }
            Err(e) => {
                let notice = FailureNotice::new(FailedStage::Upload, UPLOAD_FAILED).with_detail(&e);
                self.fail(Stage::Uploading, notice, |state| state.selected_file = None)?;
                Err(e.into())
            }
        }
    }

    /// `ResumeReady → SubmittingJob → JobReady`. Blank text is rejected without any state
    /// change. Submitting again from `JobReady` replaces the target.
    pub async fn submit_target(
        &self,
        request: TargetRequest,
    ) -> Result<TargetDescription, OrchestratorError> {
        if request.is_blank() {
            return Err(OrchestratorError::EmptyTarget);
        }
        self.begin("submit a job description", |state| match state.stage {
            Stage::ResumeReady | Stage::JobReady => {
                state.stage = Stage::SubmittingJob;
                Ok(())
            }
            Stage::SubmittingJob => Err(OrchestratorError::Busy {
                stage: Stage::SubmittingJob,
            }),
            from => Err(OrchestratorError::InvalidTransition {
                from,
                action: "submit a job description",
            }),
        })?;
        info!(run_id = %self.shared.run_id, position = %request.position_label, "submitting job description");

        match self.call(self.shared.service.submit_target(&request)).await? {
            Ok(target) => {
                let stored = target.clone();
                self.commit(Stage::SubmittingJob, move |state| {
                    state.stage = Stage::JobReady;
                    state.target = Some(stored);
                })?;
                info!(run_id = %self.shared.run_id, target = %target.id, "job description ready");
                Ok(target)
            }
            Err(e) => {
                let notice =
                    FailureNotice::new(FailedStage::Submission, SUBMISSION_FAILED).with_detail(&e);
                self.fail(Stage::SubmittingJob, notice, |_| {})?;
                Err(e.into())
            }
        }
    }

    /// `JobReady → Generating`, then starts the poll loop for the returned job.
    pub async fn start_generation(&self) -> Result<GenerationJob, OrchestratorError> {
        let mut ids = None;
        self.begin("start generation", |state| {
            match state.stage {
                Stage::JobReady => {}
                Stage::Generating => {
                    return Err(OrchestratorError::Busy {
                        stage: Stage::Generating,
                    })
                }
                from => {
                    return Err(OrchestratorError::InvalidTransition {
                        from,
                        action: "start generation",
                    })
                }
            }
            let source = state
                .source
                .as_ref()
                .ok_or(OrchestratorError::MissingArtifact("source document"))?;
            let target = state
                .target
                .as_ref()
                .ok_or(OrchestratorError::MissingArtifact("job description"))?;
            ids = Some((source.id, target.id));
            state.stage = Stage::Generating;
            state.job = None;
            state.outcome = None;
            state.progress = ProgressEstimate::new().value();
            Ok(())
        })?;
        let Some((source, target)) = ids else {
            return Err(OrchestratorError::MissingArtifact("source document"));
        };
        self.shared.stop_polling();
        info!(run_id = %self.shared.run_id, %source, %target, "starting generation");

        match self
            .call(self.shared.service.start_generation(source, target))
            .await?
        {
            Ok(job) => {
                let stored = job.clone();
                self.commit(Stage::Generating, move |state| state.job = Some(stored))?;
                info!(run_id = %self.shared.run_id, job = %job.id, status = %job.status, "generation accepted; polling");
                Shared::spawn_poll(&self.shared, job.id);
                Ok(job)
            }
            Err(e) => {
                let notice = FailureNotice::new(FailedStage::Start, START_FAILED).with_detail(&e);
                self.fail(Stage::Generating, notice, |_| {})?;
                Err(e.into())
            }
        }
    }

    /// Moves `Failed` back to the ready state the failure points to. Artifacts from earlier
    /// stages are kept.
    pub fn retry(&self) -> Result<Stage, OrchestratorError> {
        let mut target = Stage::Failed;
        self.begin("retry", |state| {
            if state.stage != Stage::Failed {
                return Err(OrchestratorError::InvalidTransition {
                    from: state.stage,
                    action: "retry",
                });
            }
            target = state
                .failure
                .take()
                .map(|f| f.retry_from)
                .unwrap_or(Stage::Idle);
            state.stage = target;
            state.progress = 0;
            state.outcome = None;
            Ok(())
        })?;
        info!(run_id = %self.shared.run_id, stage = %target, "retrying");
        Ok(target)
    }

    /// Stops polling and freezes the state. Idempotent; also runs on drop.
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    /// Waits until the run is `Completed` or `Failed`.
    ///
    /// Returns `Disposed` if the orchestrator is disposed first, and `InvalidTransition`
    /// when the run settles in a ready state with no stage call or poll loop outstanding.
    pub async fn wait_for_terminal(&self) -> Result<PipelineState, OrchestratorError> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(|s| !s.stage.is_busy() || s.disposed)
            .await
            .map_err(|_| OrchestratorError::Disposed)?
            .clone();
        match state.stage {
            stage if stage.is_terminal() => Ok(state),
            _ if state.disposed => Err(OrchestratorError::Disposed),
            from => Err(OrchestratorError::InvalidTransition {
                from,
                action: "wait for a result",
            }),
        }
    }

    // ── transition helpers ──────────────────────────────────────────────────

    /// Applies a guarded transition. Nothing is published when `f` rejects it.
    fn begin(
        &self,
        action: &'static str,
        f: impl FnOnce(&mut PipelineState) -> Result<(), OrchestratorError>,
    ) -> Result<(), OrchestratorError> {
        let mut outcome = Err(OrchestratorError::Disposed);
        self.shared.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            outcome = f(state);
            outcome.is_ok()
        });
        if let Err(e) = &outcome {
            info!(run_id = %self.shared.run_id, action, error = %e, "operation rejected");
        }
        outcome
    }

    /// Completes an in-flight stage, provided the run is still in it.
    fn commit(
        &self,
        expected: Stage,
        f: impl FnOnce(&mut PipelineState),
    ) -> Result<(), OrchestratorError> {
        let mut outcome = Err(OrchestratorError::Disposed);
        self.shared.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            if state.stage != expected {
                outcome = Err(OrchestratorError::InvalidTransition {
                    from: state.stage,
                    action: "complete the stage",
                });
                return false;
            }
            f(state);
            outcome = Ok(());
            true
        });
        outcome
    }

    fn fail(
        &self,
        expected: Stage,
        notice: FailureNotice,
        f: impl FnOnce(&mut PipelineState),
    ) -> Result<(), OrchestratorError> {
        error!(run_id = %self.shared.run_id, stage = ?notice.stage, detail = ?notice.detail, "{}", notice.message);
        self.commit(expected, move |state| {
            f(state);
            state.stage = Stage::Failed;
            state.failure = Some(notice);
        })
    }

    /// Runs a stage call unless the orchestrator is disposed first.
    async fn call<T>(
        &self,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<Result<T, ServiceError>, OrchestratorError> {
        tokio::select! {
            biased;
            _ = self.shared.shutdown.cancelled() => Err(OrchestratorError::Disposed),
            result = call => Ok(result),
        }
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl Shared {
    fn poll_slot(&self) -> MutexGuard<'_, Option<PollHandle>> {
        self.poll.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_poll(shared: &Arc<Shared>, job: JobId) {
        let mut slot = shared.poll_slot();
        if shared.shutdown.is_cancelled() {
            return;
        }
        // Only one loop per run; replacing the handle drops and cancels the previous one.
        let epoch = shared.next_epoch.fetch_add(1, Ordering::SeqCst);
        let token = shared.shutdown.child_token();
        let span = info_span!("poll", run_id = %shared.run_id, %job);
        let task = tokio::spawn(
            poll_job(Arc::clone(shared), job, token.clone(), epoch).instrument(span),
        );
        *slot = Some(PollHandle::new(epoch, token, task));
    }

    pub(crate) fn stop_polling(&self) {
        let handle = self.poll_slot().take();
        drop(handle);
    }

    /// Clears the slot when the loop that owns it has finished on its own.
    pub(crate) fn release_poll(&self, epoch: u64) {
        let mut slot = self.poll_slot();
        if slot.as_ref().is_some_and(|h| h.epoch == epoch) {
            if let Some(handle) = slot.take() {
                handle.disarm();
            }
        }
    }

    fn dispose(&self) {
        let first = self.state.send_if_modified(|state| {
            if state.disposed {
                return false;
            }
            state.disposed = true;
            true
        });
        self.shutdown.cancel();
        self.stop_polling();
        if first {
            info!(run_id = %self.run_id, "pipeline disposed");
        }
    }

    /// Applies a poll result if the loop is still live and the run is still generating
    /// this job. Returns whether anything changed.
    fn apply_poll(
        &self,
        token: &CancellationToken,
        job: JobId,
        f: impl FnOnce(&mut PipelineState),
    ) -> bool {
        self.state.send_if_modified(|state| {
            if state.disposed
                || token.is_cancelled()
                || state.stage != Stage::Generating
                || state.job.as_ref().map(|j| j.id) != Some(job)
            {
                return false;
            }
            f(state);
            true
        })
    }

    pub(crate) fn record_progress(
        &self,
        token: &CancellationToken,
        job: JobId,
        update: GenerationJob,
        progress: u8,
    ) -> bool {
        self.apply_poll(token, job, move |state| {
            state.progress = state.progress.max(progress);
            state.job = Some(update);
        })
    }

    pub(crate) fn finish_completed(
        &self,
        token: &CancellationToken,
        job: JobId,
        update: GenerationJob,
    ) -> bool {
        let content = normalize_generated(update.generated_content.clone());
        let score = update.score();
        let outcome = GenerationOutcome {
            job: update.clone(),
            content,
            score,
        };
        let applied = self.apply_poll(token, job, move |state| {
            state.stage = Stage::Completed;
            state.progress = ProgressEstimate::new().complete();
            state.job = Some(update);
            state.outcome = Some(outcome);
        });
        if applied {
            info!(run_id = %self.run_id, %job, score = ?score, "generation completed");
        }
        applied
    }

    pub(crate) fn finish_failed(
        &self,
        token: &CancellationToken,
        job: JobId,
        update: GenerationJob,
    ) -> bool {
        let notice = FailureNotice::new(FailedStage::Generation, GENERATION_FAILED).with_job(job);
        let applied = self.apply_poll(token, job, move |state| {
            state.stage = Stage::Failed;
            state.job = Some(update);
            state.failure = Some(notice);
        });
        if applied {
            error!(run_id = %self.run_id, %job, "generation failed on the server");
        }
        applied
    }

    pub(crate) fn finish_exhausted(
        &self,
        token: &CancellationToken,
        job: JobId,
        attempts: u32,
    ) -> bool {
        let notice = FailureNotice::new(
            FailedStage::Polling,
            format!("Generation did not finish after {attempts} status checks. Start it again."),
        )
        .with_job(job);
        let applied = self.apply_poll(token, job, move |state| {
            state.stage = Stage::Failed;
            state.failure = Some(notice);
        });
        if applied {
            error!(run_id = %self.run_id, %job, attempts, "poll budget exhausted");
        }
        applied
    }
}
