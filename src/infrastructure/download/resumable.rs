use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header::RANGE;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::DownloadError;

/// Attempt ceiling and backoff for the resumable fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        // Linear backoff, capped so late attempts don't wait forever.
        self.backoff * attempt.min(5)
    }
}

/// Resumable fetch with the default policy (10 attempts).
pub async fn fetch(client: &reqwest::Client, url: &str, dest: &Path) -> Result<(), DownloadError> {
    fetch_with(client, url, dest, RetryPolicy::default()).await
}

/// Fetch `url` into `dest`, continuing from whatever bytes a previous
/// attempt already wrote. Transient failures (timeouts, dropped streams,
/// 5xx) are retried up to the policy's attempt ceiling against the same
/// destination path; exhaustion is terminal.
pub async fn fetch_with(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    policy: RetryPolicy,
) -> Result<(), DownloadError> {
    let mut last: Option<DownloadError> = None;

    for attempt in 1..=policy.attempts {
        match try_fetch(client, url, dest).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() => {
                warn!(
                    "Download attempt {}/{} for {} failed: {}",
                    attempt, policy.attempts, url, e
                );
                last = Some(e);
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay(attempt)).await;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(DownloadError::RetriesExhausted {
        attempts: policy.attempts,
        last: last
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string()),
    })
}

async fn try_fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), DownloadError> {
    let mut resume_from = match tokio::fs::metadata(dest).await {
        Ok(meta) => meta.len(),
        Err(_) => 0,
    };

    let mut request = client.get(url);
    if resume_from > 0 {
        request = request.header(RANGE, format!("bytes={resume_from}-"));
    }

    let resp = request.send().await?;
    let status = resp.status();

    if resume_from > 0 && status == StatusCode::OK {
        // Server ignored the range request; the partial file is useless.
        debug!("Server ignored range request for {}, restarting from zero", url);
        tokio::fs::remove_file(dest).await.ok();
        resume_from = 0;
    }

    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }

    if resume_from > 0 {
        debug!("Resuming download of {} at byte {}", url, resume_from);
    }

    let mut file = if resume_from > 0 {
        OpenOptions::new().append(true).open(dest).await?
    } else {
        File::create(dest).await?
    };

    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    Ok(())
}
