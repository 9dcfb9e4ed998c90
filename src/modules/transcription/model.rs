use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where the media for a job comes from. Decides which download strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Media was uploaded by the caller and sits in object storage; the
    /// locator is the object key.
    Upload,
    /// Public Google Drive share link; the locator is the raw URL.
    GoogleDrive,
    /// Public Yandex Disk link; the locator is the raw URL.
    YandexDisk,
}

/// Lifecycle of a job. Set only by the worker that claimed it, and only
/// forward; see [`Job::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Downloading,
    Transcribing,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// Why a job failed, as reported through the result backend. The HTTP layer
/// only ever surfaces the kind, never the detail string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum JobFailure {
    Download(String),
    Engine(String),
    Internal(String),
}

/// One transcription request's unit of work. Lives inside the worker that
/// claimed it; only the terminal [`JobOutcome`] crosses the result backend.
#[derive(Debug)]
pub struct Job {
    pub id: Uuid,
    pub source: SourceKind,
    pub locator: String,
    status: JobStatus,
    result: Option<String>,
    failure: Option<JobFailure>,
}

impl Job {
    pub fn new(id: Uuid, source: SourceKind, locator: String) -> Self {
        Self {
            id,
            source,
            locator,
            status: JobStatus::Queued,
            result: None,
            failure: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Move the status forward. Regressions and transitions out of a terminal
    /// state are refused, which keeps the sequence monotonic no matter what
    /// order the processing code calls this in.
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if self.status.is_terminal() || next <= self.status {
            return false;
        }
        self.status = next;
        true
    }

    pub fn succeed(&mut self, text: String) {
        if self.advance(JobStatus::Succeeded) {
            self.result = Some(text);
        }
    }

    pub fn fail(&mut self, failure: JobFailure) {
        if self.advance(JobStatus::Failed) {
            self.failure = Some(failure);
        }
    }

    pub fn into_outcome(self) -> JobOutcome {
        JobOutcome {
            job_id: self.id,
            status: self.status,
            text: self.result,
            failure: self.failure,
            finished_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Terminal result of a job, pushed to the result backend keyed by job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub text: Option<String>,
    pub failure: Option<JobFailure>,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
}

impl JobOutcome {
    pub fn internal_failure(job_id: Uuid, detail: &str) -> Self {
        Self {
            job_id,
            status: JobStatus::Failed,
            text: None,
            failure: Some(JobFailure::Internal(detail.to_string())),
            finished_at: OffsetDateTime::now_utc(),
        }
    }
}

/// What the submitting side can get back from `submit_and_wait`.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("unsupported media source")]
    UnsupportedSource,
    #[error("no open session for this user")]
    NoSession,
    #[error("a transcription is already in progress for this user")]
    SessionBusy,
    #[error("transcription job failed")]
    Failed(JobFailure),
    #[error("timed out waiting for the transcription result")]
    Timeout,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}
