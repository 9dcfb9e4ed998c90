use std::path::PathBuf;

use serde::Deserialize;

use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub amqp_url: String,
    pub redis_url: String,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub whisper_bin: String,
    pub whisper_model: String,
    pub whisper_language: String,
    pub download_dir: PathBuf,
    pub worker_concurrency: usize,
    pub wait_ceiling_secs: u64,
    pub disk_api_base: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            amqp_url: env::get(EnvKey::AmqpUrl)?,
            redis_url: env::get(EnvKey::RedisUrl)?,
            minio_url: env::get(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)?,
            minio_access_key: env::get(EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(EnvKey::MinioSecretKey)?,
            whisper_bin: env::get_or(EnvKey::WhisperBin, "whisper"),
            whisper_model: env::get_or(EnvKey::WhisperModel, "base"),
            whisper_language: env::get_or(EnvKey::WhisperLanguage, "en"),
            download_dir: PathBuf::from(env::get_or(EnvKey::DownloadDir, "downloads")),
            worker_concurrency: env::get_parsed(EnvKey::WorkerConcurrency, 2),
            // Essentially unbounded, but not infinite: a job that takes longer
            // than this is reported to the caller as timed out.
            wait_ceiling_secs: env::get_parsed(EnvKey::WaitCeilingSecs, 28_800),
            disk_api_base: env::get_or(EnvKey::DiskApiBase, "https://cloud-api.yandex.net"),
        })
    }
}
