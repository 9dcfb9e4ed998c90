use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::{EngineError, SpeechEngine};

// Lecture recordings run long; the job-wait ceiling is the real bound, this
// just keeps a wedged process from pinning a worker forever.
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(4 * 3600);

/// Whisper CLI wrapper. We shell out to the binary rather than linking the
/// model in; the model weights load in the whisper process, and the same
/// binary+model pair serves every worker.
pub struct WhisperEngine {
    bin: String,
    model: String,
}

impl WhisperEngine {
    /// Probe the binary once at startup. Jobs are only accepted after this
    /// has succeeded, so a worker never discovers a missing engine mid-job.
    pub async fn load(bin: &str, model: &str) -> Result<Self, EngineError> {
        info!("Loading whisper engine (binary: {}, model: {})...", bin, model);

        let probe = Command::new(bin)
            .arg("--help")
            .output()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{bin}: {e}")))?;

        if !probe.status.success() {
            return Err(EngineError::Unavailable(format!(
                "{bin} --help exited with {}",
                probe.status
            )));
        }

        info!("🎙️ Whisper engine ready");
        Ok(Self {
            bin: bin.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    async fn transcribe(&self, media: &Path, language: &str) -> Result<String, EngineError> {
        let started = Instant::now();

        let output = tokio::time::timeout(
            TRANSCRIBE_TIMEOUT,
            Command::new(&self.bin)
                .args([
                    "--model",
                    self.model.as_str(),
                    "--language",
                    language,
                    "--no-timestamps",
                    "--file",
                ])
                .arg(media)
                .output(),
        )
        .await
        .map_err(|_| EngineError::Timeout(TRANSCRIBE_TIMEOUT))?
        .map_err(|e| EngineError::Unavailable(format!("{}: {e}", self.bin)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(
            "Transcribed {} in {:?} ({} chars)",
            media.display(),
            started.elapsed(),
            text.chars().count()
        );

        Ok(text)
    }
}
