use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::SourceKind;

pub const TRANSCRIPTION_QUEUE: &str = "transcription_tasks";

/// Message published to the task queue for each accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeJob {
    pub job_id: Uuid,
    pub source: SourceKind,
    pub locator: String,
}
