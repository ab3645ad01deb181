//! Outbound collaborators: speech-to-text and note structuring.

pub mod structuring;
pub mod whisper;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::PatientContext;
use crate::error::{StructuringFailure, TranscriptionFailure};
use crate::transcription::{AudioPayload, Transcript};

pub use structuring::NoteStructuringClient;
pub use whisper::WhisperClient;

/// Speech-to-text collaborator. Mandatory step of the pipeline.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe one audio payload. Called exactly once per request.
    async fn transcribe(&self, audio: &AudioPayload) -> Result<Transcript, TranscriptionFailure>;

    fn name(&self) -> &'static str;
}

/// Free-text to structured-note collaborator. Optional enrichment.
#[async_trait]
pub trait StructuringProvider: Send + Sync {
    async fn structure(
        &self,
        raw_text: &str,
        context: &PatientContext,
    ) -> Result<Value, StructuringFailure>;

    fn name(&self) -> &'static str;
}

/// Build the HTTP client shared by collaborator clients; `timeout` bounds each call.
pub(crate) fn http_client(timeout: std::time::Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Cut an upstream body down to something safe to carry in an error.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", body.get(..idx).unwrap_or(body)),
        None => body.to_string(),
    }
}
