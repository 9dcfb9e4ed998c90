use std::time::Duration;

use anyhow::anyhow;
use tracing::{error, info};
use uuid::Uuid;

use super::dto::TranscriptResponse;
use super::model::{JobError, JobFailure, JobOutcome, JobStatus, SourceKind};
use crate::common::chunk::{MAX_SEGMENT_CHARS, split_transcript};
use crate::infrastructure::download::link;
use crate::modules::session::SessionState;
use crate::state::AppState;

// Joining the waiter task itself should never take long once the backend
// pop returns; this is the "bounded overhead" on top of the ceiling.
const WAIT_OVERHEAD: Duration = Duration::from_secs(30);

pub struct TranscriptionService;

impl TranscriptionService {
    pub fn open_session(state: &AppState, user_id: &str) -> Result<(), JobError> {
        state.sessions.open(user_id)?;
        Ok(())
    }

    /// Pasted-link submission. Classification happens while the session is
    /// still awaiting input: an unrecognized link is rejected without
    /// creating a job, and the session stays open for another try.
    pub async fn submit_link(
        state: AppState,
        user_id: &str,
        url: &str,
    ) -> Result<TranscriptResponse, JobError> {
        match state.sessions.state(user_id) {
            SessionState::AwaitingInput => {}
            SessionState::Processing => return Err(JobError::SessionBusy),
            SessionState::Idle => return Err(JobError::NoSession),
        }

        let source = link::classify(url).ok_or(JobError::UnsupportedSource)?;
        Self::submit_and_wait(state, user_id, source, url).await
    }

    /// Uploaded-media submission; the locator is the object key the upload
    /// handler just wrote.
    pub async fn submit_upload(
        state: AppState,
        user_id: &str,
        object_key: &str,
    ) -> Result<TranscriptResponse, JobError> {
        Self::submit_and_wait(state, user_id, SourceKind::Upload, object_key).await
    }

    /// Gate → single enqueue → bounded wait → chunked delivery. The session
    /// ticket is released exactly once on every path out of here.
    async fn submit_and_wait(
        state: AppState,
        user_id: &str,
        source: SourceKind,
        locator: &str,
    ) -> Result<TranscriptResponse, JobError> {
        let ticket = state.sessions.begin(user_id)?;

        let job_id = state
            .queue
            .submit(source, locator)
            .await
            .map_err(JobError::Internal)?;
        info!("Job {} ({:?}) submitted for user {}", job_id, source, user_id);

        let waited = Self::wait(&state, job_id).await;
        ticket.release();

        let outcome = waited?;
        Self::deliver(job_id, source, outcome)
    }

    /// Block this request on the job's outcome without tying up the server:
    /// the backend pop runs on its own task and we await its handle under
    /// the ceiling. A timed-out job keeps running; its result just ages
    /// out of the backend unread.
    async fn wait(state: &AppState, job_id: Uuid) -> Result<JobOutcome, JobError> {
        let ceiling = Duration::from_secs(state.config.wait_ceiling_secs);
        let redis = state.redis.clone();

        let waiter = tokio::spawn(async move { redis.wait_for_outcome(job_id, ceiling).await });

        match tokio::time::timeout(ceiling + WAIT_OVERHEAD, waiter).await {
            Err(_) => {
                error!("Job {} still unresolved after wait ceiling", job_id);
                Err(JobError::Timeout)
            }
            Ok(Err(join_err)) => Err(JobError::Internal(anyhow!(join_err))),
            Ok(Ok(Err(e))) => Err(JobError::Internal(e)),
            Ok(Ok(Ok(None))) => {
                error!("Job {} still unresolved after wait ceiling", job_id);
                Err(JobError::Timeout)
            }
            Ok(Ok(Ok(Some(outcome)))) => Ok(outcome),
        }
    }

    fn deliver(
        job_id: Uuid,
        source: SourceKind,
        outcome: JobOutcome,
    ) -> Result<TranscriptResponse, JobError> {
        match outcome.status {
            JobStatus::Succeeded => {
                let text = outcome.text.unwrap_or_default();
                Ok(TranscriptResponse {
                    job_id,
                    source,
                    segments: split_transcript(&text, MAX_SEGMENT_CHARS),
                })
            }
            _ => {
                let failure = outcome
                    .failure
                    .unwrap_or_else(|| JobFailure::Internal("missing failure detail".to_string()));
                error!("Job {} failed: {:?}", job_id, failure);
                Err(JobError::Failed(failure))
            }
        }
    }
}
