use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::modules::transcription::model::JobError;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

pub struct ApiSuccess<T>(pub ApiResponse<T>, pub StatusCode);

impl<T> IntoResponse for ApiSuccess<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let (response, status) = (self.0, self.1);
        (status, Json(response)).into_response()
    }
}

/// Machine-readable error kind carried in the error envelope.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub kind: &'static str,
}

pub struct ApiError {
    pub kind: &'static str,
    pub message: String,
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(kind: &'static str, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
        }
    }

    pub fn validation(err: validator::ValidationErrors) -> Self {
        Self::new("validation", err.to_string(), StatusCode::BAD_REQUEST)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message, StatusCode::BAD_REQUEST)
    }
}

// Callers only ever see the taxonomy kind and a generic message; whatever
// detail rode along on the error stays in the logs.
impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::UnsupportedSource => ApiError::new(
                "unsupported_source",
                "Only uploads, Google Drive links and Yandex Disk links are supported",
                StatusCode::BAD_REQUEST,
            ),
            JobError::NoSession => ApiError::new(
                "no_session",
                "Open a session before submitting media",
                StatusCode::CONFLICT,
            ),
            JobError::SessionBusy => ApiError::new(
                "session_busy",
                "A transcription is already in progress for this user",
                StatusCode::CONFLICT,
            ),
            JobError::Failed(_) => ApiError::new(
                "job_failed",
                "Transcription failed, please try again",
                StatusCode::BAD_GATEWAY,
            ),
            JobError::Timeout => ApiError::new(
                "timeout",
                "Timed out waiting for the transcription to finish",
                StatusCode::GATEWAY_TIMEOUT,
            ),
            JobError::Internal(_) => ApiError::new(
                "internal",
                "Internal error",
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            status: "error".to_string(),
            message: self.message,
            data: Some(ErrorBody { kind: self.kind }),
        };
        (self.status, Json(body)).into_response()
    }
}
