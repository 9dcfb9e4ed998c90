use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::stream_to_storage;
use crate::modules::session::SessionState;
use crate::modules::transcription::dto::*;
use crate::modules::transcription::model::JobError;
use crate::modules::transcription::service::TranscriptionService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/sessions/open",
    request_body = OpenSessionRequest,
    responses(
        (status = 200, description = "Session ready for media", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "A job is already in flight")
    ),
    tag = "Transcription"
)]
pub async fn open_session(
    State(state): State<AppState>,
    Json(req): Json<OpenSessionRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::validation(e).into_response();
    }

    match TranscriptionService::open_session(&state, &req.user_id) {
        Ok(()) => ApiSuccess(
            ApiResponse::success(
                SessionResponse {
                    user_id: req.user_id,
                    state: "awaiting_input".to_string(),
                },
                "Send an audio file or a share link",
            ),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/transcriptions",
    request_body = SubmitLinkRequest,
    responses(
        (status = 200, description = "Transcript ready", body = ApiResponse<TranscriptResponse>),
        (status = 400, description = "Unsupported or malformed link"),
        (status = 409, description = "No open session, or one already busy"),
        (status = 502, description = "Transcription failed"),
        (status = 504, description = "Wait ceiling exceeded")
    ),
    tag = "Transcription"
)]
pub async fn submit_link(
    State(state): State<AppState>,
    Json(req): Json<SubmitLinkRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError::validation(e).into_response();
    }

    info!("User {} submitted link {}", req.user_id, req.url);

    match TranscriptionService::submit_link(state, &req.user_id, &req.url).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Transcription finished"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/transcriptions/upload",
    responses(
        (status = 200, description = "Transcript ready", body = ApiResponse<TranscriptResponse>),
        (status = 400, description = "Malformed upload"),
        (status = 409, description = "No open session, or one already busy"),
        (status = 502, description = "Transcription failed"),
        (status = 504, description = "Wait ceiling exceeded")
    ),
    tag = "Transcription"
)]
pub async fn submit_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Fields arrive in body order; user_id has to precede the file so the
    // session can be checked before we accept a multi-gigabyte stream.
    let mut user_id: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return ApiError::bad_request(format!("Malformed multipart body: {e}"))
                    .into_response();
            }
        };

        // Name is copied out first so the field itself can be consumed below.
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("user_id") => match field.text().await {
                Ok(value) => user_id = Some(value),
                Err(e) => {
                    return ApiError::bad_request(format!("Unreadable user_id field: {e}"))
                        .into_response();
                }
            },
            Some("file") => {
                let Some(user_id) = user_id.clone() else {
                    return ApiError::bad_request("user_id field must precede the file")
                        .into_response();
                };

                match state.sessions.state(&user_id) {
                    SessionState::AwaitingInput => {}
                    SessionState::Processing => {
                        return ApiError::from(JobError::SessionBusy).into_response();
                    }
                    SessionState::Idle => {
                        return ApiError::from(JobError::NoSession).into_response();
                    }
                }

                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "media".to_string());
                let key = format!("uploads/{}/{}", Uuid::new_v4(), file_name);

                let key = match stream_to_storage(&state.storage, field, key).await {
                    Ok(key) => key,
                    Err(e) => return ApiError::bad_request(e.to_string()).into_response(),
                };
                info!("📤 User {} uploaded {}", user_id, key);

                return match TranscriptionService::submit_upload(state, &user_id, &key).await {
                    Ok(res) => ApiSuccess(
                        ApiResponse::success(res, "Transcription finished"),
                        StatusCode::OK,
                    )
                    .into_response(),
                    Err(e) => ApiError::from(e).into_response(),
                };
            }
            _ => {} // unknown fields are skipped
        }
    }

    ApiError::bad_request("Multipart body must contain a file field").into_response()
}
