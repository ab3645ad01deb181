use std::sync::Arc;
use std::time::Instant;

use logger_redacted::{InteractionAudit, PiiRedactor, ResponseKind};
use tracing::{debug, info, warn};

use crate::ambiguity::AmbiguityResolver;
use crate::commands::{detect, Command};
use crate::config::PipelineConfig;
use crate::context::{ContextDefaults, PatientContext};
use crate::error::{PipelineError, PipelineResult, TranscriptionFailure};
use crate::memory::{InMemorySessionStore, SessionStore};
use crate::normalize::normalize;
use crate::providers::{
    NoteStructuringClient, StructuringProvider, TranscriptionProvider, WhisperClient,
};
use crate::transcription::{AudioPayload, TranscriptionResult};

/// One inbound spoken note.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: AudioPayload,
    /// Caller-supplied hints; defaults are applied by the orchestrator.
    pub hints: PatientContext,
    /// Scopes conversational memory. Requests without one are stateless.
    pub session_id: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(audio: AudioPayload) -> Self {
        Self {
            audio,
            hints: PatientContext::default(),
            session_id: None,
        }
    }

    pub fn with_hints(mut self, hints: PatientContext) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Spoken-note pipeline: transcription, command detection, session memory
/// and best-effort structuring.
pub struct TranscriptionOrchestrator {
    transcriber: Arc<dyn TranscriptionProvider>,
    structurer: Arc<dyn StructuringProvider>,
    resolver: AmbiguityResolver,
    defaults: ContextDefaults,
    redactor: PiiRedactor,
}

impl TranscriptionOrchestrator {
    pub fn new(
        transcriber: Arc<dyn TranscriptionProvider>,
        structurer: Arc<dyn StructuringProvider>,
        resolver: AmbiguityResolver,
        defaults: ContextDefaults,
    ) -> Self {
        Self {
            transcriber,
            structurer,
            resolver,
            defaults,
            redactor: PiiRedactor::default(),
        }
    }

    /// Wire the HTTP collaborators and an in-memory session store from configuration.
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let transcriber = WhisperClient::new(
            config.transcription.api_url.clone(),
            config.transcription.timeout,
        )?;
        let structurer = NoteStructuringClient::new(
            config.structuring.api_url.clone(),
            config.structuring.timeout,
        )?;

        let mut store = InMemorySessionStore::new().with_history_limit(config.session_history_limit);
        if let Some(ttl) = config.session_ttl {
            store = store.with_ttl(ttl);
        }

        info!(
            transcription_url = %config.transcription.api_url,
            structuring_url = %config.structuring.api_url,
            "Voice note pipeline configured"
        );

        Ok(Self::new(
            Arc::new(transcriber),
            Arc::new(structurer),
            AmbiguityResolver::new(Arc::new(store)),
            config.context_defaults.clone(),
        ))
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.resolver.store()
    }

    pub fn context_defaults(&self) -> &ContextDefaults {
        &self.defaults
    }

    /// Run one spoken note through the pipeline.
    ///
    /// Fails only on missing audio, missing context (when required) or a
    /// transcription failure. A select-patient command returns without
    /// calling the structuring service; any structuring failure yields
    /// `structured: None` alongside the verbatim transcript.
    pub async fn transcribe(&self, request: TranscriptionRequest) -> PipelineResult<TranscriptionResult> {
        let started = Instant::now();
        let TranscriptionRequest {
            audio,
            hints,
            session_id,
        } = request;

        if audio.is_empty() {
            return Err(PipelineError::Validation("Missing file".to_string()));
        }

        let context = hints.clone().with_defaults(&self.defaults)?;

        let transcript = self.transcriber.transcribe(&audio).await?;
        if transcript.is_blank() {
            return Err(TranscriptionFailure::EmptyTranscript.into());
        }
        let text = transcript.text;
        debug!(
            provider = self.transcriber.name(),
            transcript = %self.redactor.redact(&text),
            "Audio transcribed"
        );

        let command = detect(&normalize(&text));
        let resolved = match session_id.as_deref() {
            Some(session_id) => Some(self.remember(session_id, command, &text, &hints).await),
            None => None,
        };

        let audit = InteractionAudit {
            session_id: session_id.clone(),
            detected_intention: command.intention().to_string(),
            resolved_intention: resolved.unwrap_or_else(|| command.intention().to_string()),
            response_kind: ResponseKind::Navigation,
            structuring_used: false,
            duration_ms: 0,
        };

        if let Command::SelectPatient { bed } = command {
            info!(bed, "Voice navigation command detected");
            audit.finish(started.elapsed()).emit();
            return Ok(TranscriptionResult::Navigation { text, command });
        }

        let structured = match self.structurer.structure(&text, &context).await {
            Ok(value) => Some(value),
            Err(failure) => {
                warn!(
                    provider = self.structurer.name(),
                    code = failure.code(),
                    error = %failure,
                    "Structuring failed, returning transcript only"
                );
                None
            }
        };

        InteractionAudit {
            response_kind: ResponseKind::Note,
            structuring_used: structured.is_some(),
            ..audit
        }
        .finish(started.elapsed())
        .emit();

        Ok(TranscriptionResult::Note { text, structured })
    }

    /// Update session memory for this utterance and return the resolved
    /// intention. Store failures are logged and never fail the request.
    async fn remember(
        &self,
        session_id: &str,
        command: Command,
        text: &str,
        hints: &PatientContext,
    ) -> String {
        let detected = command.intention();
        let store = self.resolver.store();

        let resolved = self
            .resolver
            .resolve_ambiguity(session_id, detected, text)
            .await
            .unwrap_or_else(|err| {
                warn!(session_id = %session_id, error = %err, "Ambiguity resolution unavailable");
                detected.to_string()
            });

        let active_patient = match command {
            Command::SelectPatient { bed } => Some(format!("bed-{bed}")),
            _ => hints.patient_id.clone(),
        };
        if let Some(patient_id) = active_patient {
            if let Err(err) = store.set_active_patient(session_id, Some(patient_id)).await {
                warn!(session_id = %session_id, error = %err, "Failed to update active patient");
            }
        }

        if let Err(err) = store.record_intention(session_id, &resolved, None).await {
            warn!(session_id = %session_id, error = %err, "Failed to record intention");
        }

        debug!(session_id = %session_id, detected, resolved = %resolved, "Session memory updated");
        resolved
    }
}

impl std::fmt::Debug for TranscriptionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionOrchestrator")
            .field("transcriber", &self.transcriber.name())
            .field("structurer", &self.structurer.name())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
