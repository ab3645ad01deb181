use axum::Json;
use serde::{Deserialize, Serialize};
use voice_note_pipeline::Command;

#[derive(Debug, Deserialize)]
pub struct DetectCommandRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectCommandResponse {
    pub command: Command,
}

/// Classify a text utterance without transcription or side effects.
pub async fn detect_command(Json(request): Json<DetectCommandRequest>) -> Json<DetectCommandResponse> {
    Json(DetectCommandResponse {
        command: voice_note_pipeline::detect_command(&request.text),
    })
}
