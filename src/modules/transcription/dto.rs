use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::model::SourceKind;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenSessionRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitLinkRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
    #[validate(url(message = "Locator must be a valid URL"))]
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub state: String,
}

/// Finished transcript, split into display-sized segments. Concatenating
/// the segments reproduces the engine output exactly.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub job_id: Uuid,
    pub source: SourceKind,
    pub segments: Vec<String>,
}
