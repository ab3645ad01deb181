use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use error_common::ErrorContext;
use serde::Deserialize;
use tracing::{debug, info};
use voice_note_pipeline::{AudioPayload, PatientContext, TranscriptionRequest, TranscriptionResult};

use crate::error::ApiError;
use crate::server::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

const FILE_FIELD: &str = "file";
const CONTEXT_FIELD: &str = "patientContext";

/// Query-string hints; they win over the `patientContext` form field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeQuery {
    pub bed: Option<String>,
    pub patient_id: Option<String>,
    pub session_id: Option<String>,
}

struct UploadForm {
    audio: Option<AudioPayload>,
    context_blob: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        audio: None,
        context_blob: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {}", e.body_text())))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or("audio").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::validation(format!("Could not read audio: {}", e.body_text()))
                })?;
                let mut audio = AudioPayload::new(bytes.to_vec(), file_name);
                if let Some(content_type) = content_type {
                    audio = audio.with_content_type(content_type);
                }
                form.audio = Some(audio);
            }
            Some(CONTEXT_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    ApiError::validation(format!("Could not read patientContext: {}", e.body_text()))
                })?;
                form.context_blob = Some(text);
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn session_id(query: &TranscribeQuery, headers: &HeaderMap) -> Option<String> {
    query
        .session_id
        .clone()
        .or_else(|| {
            headers
                .get(SESSION_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Transcribe an uploaded recording and either navigate or structure the note.
pub async fn transcribe_audio(
    State(state): State<AppState>,
    Query(query): Query<TranscribeQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResult>, Response> {
    let session_id = session_id(&query, &headers);
    let mut context = ErrorContext::new().add_context("endpoint", "transcribe");
    if let Some(id) = &session_id {
        context = context.with_session_id(id.clone());
    }

    let run = async {
        let form = read_form(multipart?).await?;
        let audio = form
            .audio
            .filter(|audio| !audio.is_empty())
            .ok_or_else(|| ApiError::validation("Missing file"))?;

        info!(
            file_name = %audio.file_name,
            size = audio.bytes.len(),
            session_id = ?session_id,
            "Received audio for transcription"
        );

        let hints = PatientContext::from_hints(
            query.bed.as_deref(),
            query.patient_id.as_deref(),
            form.context_blob.as_deref(),
        );

        let mut request = TranscriptionRequest::new(audio).with_hints(hints);
        if let Some(id) = &session_id {
            request = request.with_session(id.clone());
        }

        Ok::<_, ApiError>(state.pipeline.transcribe(request).await?)
    };

    run.await
        .map(Json)
        .map_err(|err| err.into_response_with_context(&context))
}
