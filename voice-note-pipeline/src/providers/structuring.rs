//! Clinical note structuring service client.
//!
//! Posts `{"rawText", "patientContext"}` to `{base_url}/parse-audio-note` and
//! returns whatever JSON document the service produces.
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::PatientContext;
use crate::error::{PipelineError, PipelineResult, StructuringFailure};
use crate::providers::{http_client, truncate_body, StructuringProvider};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseNoteRequest<'a> {
    raw_text: &'a str,
    patient_context: &'a PatientContext,
}

#[derive(Debug, Clone)]
pub struct NoteStructuringClient {
    client: reqwest::Client,
    base_url: String,
}

impl NoteStructuringClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PipelineResult<Self> {
        let client = http_client(timeout)
            .map_err(|e| PipelineError::Config(format!("Failed to build structuring client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/parse-audio-note", self.base_url)
    }
}

#[async_trait]
impl StructuringProvider for NoteStructuringClient {
    async fn structure(
        &self,
        raw_text: &str,
        context: &PatientContext,
    ) -> Result<Value, StructuringFailure> {
        debug!(text_len = raw_text.len(), bed = ?context.bed, "Requesting note structuring");

        let response = self
            .client
            .post(self.url())
            .json(&ParseNoteRequest {
                raw_text,
                patient_context: context,
            })
            .send()
            .await
            .map_err(|e| StructuringFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StructuringFailure::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StructuringFailure::MalformedPayload(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "note-structuring"
    }
}
