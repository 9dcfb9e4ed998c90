use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod dto;
pub mod events;
pub mod handler;
pub mod model;
pub mod service;

// Lectures can be big; bound the upload body at 2 GiB.
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    let upload_routes = Router::new()
        .route("/transcriptions/upload", post(handler::submit_upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/sessions/open", post(handler::open_session))
        .route("/transcriptions", post(handler::submit_link))
        .merge(upload_routes)
}
