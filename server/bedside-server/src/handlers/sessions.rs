use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use voice_note_pipeline::SessionMemory;

use crate::error::ApiError;
use crate::server::AppState;

/// Current memory of one session. Reading does not create the session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionMemory>, ApiError> {
    state
        .sessions()
        .snapshot(&session_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Session"))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions().remove(&session_id).await? {
        info!(session_id = %session_id, "Session memory cleared");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Session"))
    }
}

pub async fn clear_sessions(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.sessions().clear().await?;
    info!("All session memory cleared");
    Ok(StatusCode::NO_CONTENT)
}
