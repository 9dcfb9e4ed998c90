pub mod link;
pub mod resumable;

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::infrastructure::storage::s3::StorageService;
use crate::modules::transcription::model::SourceKind;

// Per-attempt network timeouts, shared by every strategy.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

// Presigned upload URLs only need to live long enough for the worker to
// start streaming.
const PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("unsupported media source: {0}")]
    UnsupportedSource(String),
    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider could not resolve the public link: {0}")]
    Provider(String),
    #[error("gave up after {attempts} attempts, last error: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Timeouts, dropped connections and transient server errors are worth
    /// another attempt; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Network(_) => true,
            DownloadError::Status(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Strategy facade over the three ways media reaches the scratch directory.
///
/// Retry behavior differs per strategy on purpose: only the Drive path runs
/// the resumable multi-attempt fetch. Presigned upload URLs are short-lived
/// (retrying a dead link buys nothing) and the Disk provider call is an
/// all-or-nothing resolution the user can simply re-issue.
#[derive(Clone)]
pub struct Downloader {
    http: reqwest::Client,
    storage: StorageService,
    disk_api_base: String,
}

impl Downloader {
    pub fn new(storage: StorageService, disk_api_base: String) -> Result<Self, DownloadError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            storage,
            disk_api_base: disk_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the media behind `locator` into `dest`. On failure a partial
    /// file may remain at `dest`. The caller owns that path for the whole
    /// job, including failed states, and cleans it up itself.
    pub async fn acquire(
        &self,
        source: SourceKind,
        locator: &str,
        dest: &Path,
    ) -> Result<(), DownloadError> {
        match source {
            SourceKind::Upload => {
                let url = self
                    .storage
                    .presigned_get_url(locator, PRESIGN_EXPIRY)
                    .await
                    .map_err(|e| DownloadError::Provider(e.to_string()))?;
                stream_to_file(&self.http, &url, dest).await
            }
            SourceKind::GoogleDrive => {
                let direct = link::to_direct_download(locator)?;
                resumable::fetch(&self.http, &direct, dest).await
            }
            SourceKind::YandexDisk => {
                let href = self.resolve_public_link(locator).await?;
                stream_to_file(&self.http, &href, dest).await
            }
        }
    }

    /// Ask the Disk API to turn a public share link into a direct download
    /// URL. One attempt only: the provider treats resolution + fetch as a unit.
    async fn resolve_public_link(&self, public_url: &str) -> Result<String, DownloadError> {
        #[derive(Deserialize)]
        struct PublicDownload {
            href: String,
        }

        let endpoint = format!("{}/v1/disk/public/resources/download", self.disk_api_base);
        let resp = self
            .http
            .get(&endpoint)
            .query(&[("public_key", public_url)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DownloadError::Provider(format!(
                "public link resolution returned {}",
                resp.status()
            )));
        }

        let body: PublicDownload = resp.json().await?;
        Ok(body.href)
    }
}

/// Single-attempt streamed fetch. Any non-success status or I/O error is
/// terminal for the caller.
pub async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), DownloadError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }

    let mut file = File::create(dest).await?;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    Ok(())
}
