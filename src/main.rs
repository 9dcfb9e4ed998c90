use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scribe_backend::config::settings::AppConfig;
use scribe_backend::infrastructure::download::Downloader;
use scribe_backend::infrastructure::engine::WhisperEngine;
use scribe_backend::infrastructure::queue::rabbitmq::QueueService;
use scribe_backend::infrastructure::redis::client::RedisService;
use scribe_backend::infrastructure::storage::s3::StorageService;
use scribe_backend::modules::session::SessionGate;
use scribe_backend::state::AppState;
use scribe_backend::{app, workers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("missing required environment variables")?;

    // Scratch directory for in-flight media, created up front.
    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .context("failed to create download directory")?;

    let redis = RedisService::new(&config.redis_url).await?;
    let queue = QueueService::new(&config.amqp_url).await?;
    let storage = StorageService::new(
        &config.minio_url,
        &config.minio_bucket,
        &config.minio_access_key,
        &config.minio_secret_key,
    )
    .await;

    // The engine must be up before any job can be claimed.
    let engine = WhisperEngine::load(&config.whisper_bin, &config.whisper_model).await?;
    let downloader = Downloader::new(storage.clone(), config.disk_api_base.clone())?;

    let state = AppState {
        config: config.clone(),
        queue,
        redis,
        storage,
        downloader,
        engine: Arc::new(engine),
        sessions: SessionGate::default(),
    };

    workers::transcriber::spawn_workers(state.clone());

    let app = app::create_app(state).await;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
