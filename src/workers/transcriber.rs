use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::BasicAckOptions;
use tracing::{error, info, warn};

use crate::infrastructure::download::Downloader;
use crate::infrastructure::engine::SpeechEngine;
use crate::modules::transcription::events::{TRANSCRIPTION_QUEUE, TranscribeJob};
use crate::modules::transcription::model::{Job, JobFailure, JobOutcome, JobStatus};
use crate::state::AppState;

/// Everything one job needs besides its message: where to put scratch
/// files, how to fetch, and what transcribes. Split out of [`AppState`] so
/// the pipeline can run without a broker attached.
#[derive(Clone)]
pub struct WorkerContext {
    pub downloader: Downloader,
    pub engine: Arc<dyn SpeechEngine>,
    pub scratch_dir: PathBuf,
    pub language: String,
}

impl From<&AppState> for WorkerContext {
    fn from(state: &AppState) -> Self {
        Self {
            downloader: state.downloader.clone(),
            engine: state.engine.clone(),
            scratch_dir: state.config.download_dir.clone(),
            language: state.config.whisper_language.clone(),
        }
    }
}

/// Scratch file for one job, named after the job id. Owned by the worker
/// processing that job and nobody else; removing it on drop covers success,
/// handled failure, and unwinding alike.
pub struct TempMediaFile {
    path: PathBuf,
}

impl TempMediaFile {
    pub fn claim(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempMediaFile {
    fn drop(&mut self) {
        if self.path.exists() {
            info!("🧹 Removing scratch file {}", self.path.display());
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

pub fn spawn_workers(state: AppState) {
    let count = state.config.worker_concurrency.max(1);
    info!("🎥 Starting {} transcriber worker(s)...", count);
    for index in 0..count {
        tokio::spawn(worker_loop(state.clone(), index));
    }
}

async fn worker_loop(state: AppState, index: usize) {
    let tag = format!("transcriber_{index}");

    loop {
        let mut consumer = match state.queue.consumer(TRANSCRIPTION_QUEUE, &tag).await {
            Ok(consumer) => consumer,
            Err(e) => {
                error!("Worker {}: consumer setup failed: {}", index, e);
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        info!(
            "🎙️ Transcriber worker {} listening on '{}'",
            index, TRANSCRIPTION_QUEUE
        );

        while let Some(delivery) = consumer.next().await {
            match delivery {
                Ok(delivery) => handle_delivery(&state, delivery).await,
                Err(e) => {
                    error!("Worker {}: delivery error: {}", index, e);
                    break;
                }
            }
        }

        warn!("Worker {}: consumer stream ended, reconnecting", index);
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

async fn handle_delivery(state: &AppState, delivery: Delivery) {
    match serde_json::from_slice::<TranscribeJob>(&delivery.data) {
        Ok(msg) => {
            let job_id = msg.job_id;
            info!("📦 Claimed job {}", job_id);

            // The job runs on its own task: a panic inside it must not take
            // the consumer loop down, and must still report an outcome.
            let ctx = WorkerContext::from(state);
            let outcome = match tokio::spawn(run_job(ctx, msg)).await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!("Job {} crashed: {}", job_id, join_err);
                    JobOutcome::internal_failure(job_id, "worker crashed while processing the job")
                }
            };

            if let Err(e) = state.redis.store_outcome(&outcome).await {
                error!("Failed to report outcome of job {}: {}", job_id, e);
            }
        }
        Err(e) => error!("❌ Failed to parse job payload: {}", e),
    }

    if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
        error!("Failed to ack delivery: {}", e);
    }
}

/// One job end to end: acquire → transcribe → report, with the scratch file
/// gone before the outcome leaves this function no matter which step failed.
pub async fn run_job(ctx: WorkerContext, msg: TranscribeJob) -> JobOutcome {
    let mut job = Job::new(msg.job_id, msg.source, msg.locator);
    let scratch = TempMediaFile::claim(ctx.scratch_dir.join(format!("{}.tmp", job.id)));

    job.advance(JobStatus::Downloading);
    info!("⬇️ Job {}: fetching media ({:?})", job.id, job.source);

    match ctx
        .downloader
        .acquire(job.source, &job.locator, scratch.path())
        .await
    {
        Err(e) => {
            error!("Job {}: download failed: {}", job.id, e);
            job.fail(JobFailure::Download(e.to_string()));
        }
        Ok(()) => {
            job.advance(JobStatus::Transcribing);
            info!("📝 Job {}: transcribing", job.id);

            match ctx.engine.transcribe(scratch.path(), &ctx.language).await {
                Ok(text) => {
                    info!(
                        "✅ Job {}: transcription finished ({} chars)",
                        job.id,
                        text.chars().count()
                    );
                    job.succeed(text);
                }
                Err(e) => {
                    error!("Job {}: transcription failed: {}", job.id, e);
                    job.fail(JobFailure::Engine(e.to_string()));
                }
            }
        }
    }

    // Scratch file must be gone before the outcome is reported.
    drop(scratch);
    job.into_outcome()
}
