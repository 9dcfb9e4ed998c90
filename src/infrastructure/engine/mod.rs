pub mod whisper;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

pub use whisper::WhisperEngine;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("speech engine unavailable: {0}")]
    Unavailable(String),
    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
    #[error("speech engine failed: {0}")]
    Failed(String),
}

/// The speech-to-text collaborator: local media path in, transcript out.
/// Implementations must be safe to call from any number of workers at once.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn transcribe(&self, media: &Path, language: &str) -> Result<String, EngineError>;
}
