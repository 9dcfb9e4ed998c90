use utoipa::OpenApi;

use crate::modules::transcription::dto::*;
use crate::modules::transcription::model::SourceKind;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::transcription::handler::open_session,
        crate::modules::transcription::handler::submit_link,
        crate::modules::transcription::handler::submit_upload,
    ),
    components(
        schemas(
            OpenSessionRequest, SubmitLinkRequest, SessionResponse,
            TranscriptResponse, SourceKind,
        )
    ),
    tags(
        (name = "Transcription", description = "Media transcription pipeline")
    )
)]
pub struct ApiDoc;
