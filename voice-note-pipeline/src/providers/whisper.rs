//! Self-hosted Whisper transcription service client.
//!
//! Sends the audio as multipart field `file` to `{base_url}/transcribe` and
//! expects `{"text": ..., "language": ..., "duration": ...}` back.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult, TranscriptionFailure};
use crate::providers::{http_client, truncate_body, TranscriptionProvider};
use crate::transcription::{AudioPayload, Transcript};

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    /// Absent or `null` means the service heard nothing.
    #[serde(default)]
    text: Option<String>,
    language: Option<String>,
    duration: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
}

impl WhisperClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        let client = http_client(timeout)
            .map_err(|e| PipelineError::Config(format!("Failed to build transcription client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/transcribe", self.base_url)
    }

    fn form(audio: &AudioPayload) -> Result<Form, TranscriptionFailure> {
        let mut part = Part::bytes(audio.bytes.clone()).file_name(audio.file_name.clone());
        if let Some(content_type) = &audio.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| TranscriptionFailure::service(format!("Invalid audio content type: {e}")))?;
        }
        Ok(Form::new().part("file", part))
    }

    /// Prefer the upstream's own `error`/`detail` message when it sent one.
    /// The `error` or `detail` field of an error body, if the service sent one.
    fn upstream_message(body: &str) -> Option<String> {
        serde_json::from_str::<Value>(body).ok().and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("detail"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperClient {
    async fn transcribe(&self, audio: &AudioPayload) -> Result<Transcript, TranscriptionFailure> {
        debug!(audio_size = audio.bytes.len(), file_name = %audio.file_name, "Sending audio to Whisper");

        let response = self
            .client
            .post(self.url())
            .multipart(Self::form(audio)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscriptionFailure::service("Transcription service timed out")
                } else {
                    TranscriptionFailure::service(format!("Transcription request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let upstream_message = Self::upstream_message(&body);
            let reason = upstream_message.clone().unwrap_or_else(|| {
                format!("Transcription service returned {status}: {}", truncate_body(&body))
            });
            return Err(TranscriptionFailure::ServiceError {
                reason,
                status: Some(status.as_u16()),
                upstream_message,
            });
        }

        let body: WhisperResponse = response.json().await.map_err(|e| {
            TranscriptionFailure::service(format!("Unparsable transcription response: {e}"))
        })?;

        Ok(Transcript {
            text: body.text.unwrap_or_default(),
            language: body.language,
            duration_seconds: body.duration,
        })
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}
