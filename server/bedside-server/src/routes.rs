use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{commands, health, sessions, transcribe};
use crate::server::AppState;

pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const TRANSCRIBE: &str = "/api/audio/transcribe";
    pub const COMMANDS: &str = "/api/voice/commands";
    pub const SESSIONS: &str = "/api/sessions";
    pub const SESSION_BY_ID: &str = "/api/sessions/:session_id";
}

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route(paths::HEALTH, get(health::health_check))
}

/// Create voice note routes
pub fn voice_routes() -> Router<AppState> {
    Router::new()
        .route(paths::TRANSCRIBE, post(transcribe::transcribe_audio))
        .route(paths::COMMANDS, post(commands::detect_command))
}

/// Create session memory routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route(paths::SESSIONS, delete(sessions::clear_sessions))
        .route(
            paths::SESSION_BY_ID,
            get(sessions::get_session).delete(sessions::delete_session),
        )
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(voice_routes())
        .merge(session_routes())
}
