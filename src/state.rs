use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::download::Downloader;
use crate::infrastructure::engine::SpeechEngine;
use crate::infrastructure::queue::rabbitmq::QueueService;
use crate::infrastructure::redis::client::RedisService;
use crate::infrastructure::storage::s3::StorageService;
use crate::modules::session::SessionGate;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub queue: QueueService,
    pub redis: RedisService,
    pub storage: StorageService,
    pub downloader: Downloader,
    pub engine: Arc<dyn SpeechEngine>,
    pub sessions: SessionGate,
}
