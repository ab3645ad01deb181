//! Bedside voice server - HTTP front end for the voice note pipeline
//!
//! Exposes audio transcription, text command detection and session memory
//! management over a JSON API.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::*;
pub use server::AppState;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use error_common::codes;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Largest accepted upload
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    let error_id = uuid::Uuid::new_v4().to_string();
    error!(error_id = %error_id, "Handler panicked");

    let body = ApiErrorResponse {
        error: "Internal error while processing audio".to_string(),
        code: codes::internal::UNEXPECTED.to_string(),
        error_id,
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}

/// Create the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
