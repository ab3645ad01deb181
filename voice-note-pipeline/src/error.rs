use error_common::codes;
use thiserror::Error;

/// Fatal failure of the mandatory transcription step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionFailure {
    /// The upstream call failed: network error, timeout, non-success status or unparsable body.
    #[error("Transcription service error: {reason}")]
    ServiceError {
        reason: String,
        /// Upstream HTTP status, when the service answered at all.
        status: Option<u16>,
        /// The service's own `error`/`detail` message. Safe to show to callers,
        /// unlike `reason`, which may carry transport details.
        upstream_message: Option<String>,
    },

    /// The call succeeded but produced no text.
    #[error("Transcription returned an empty transcript")]
    EmptyTranscript,
}

impl TranscriptionFailure {
    pub fn service(reason: impl Into<String>) -> Self {
        Self::ServiceError {
            reason: reason.into(),
            status: None,
            upstream_message: None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ServiceError { .. } => codes::transcription::SERVICE_ERROR,
            Self::EmptyTranscript => codes::transcription::EMPTY_TRANSCRIPT,
        }
    }
}

/// Soft failure of the optional structuring step.
///
/// Never converted into [`PipelineError`]; callers fold it into an absent
/// structured note.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuringFailure {
    #[error("Structuring service unreachable: {0}")]
    Unreachable(String),

    #[error("Structuring service returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Structuring response could not be parsed: {0}")]
    MalformedPayload(String),
}

impl StructuringFailure {
    pub fn code(&self) -> &'static str {
        codes::structuring::SOFT_FAILURE
    }
}

/// Failure of the session memory backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

pub type SessionResult<T> = Result<T, SessionStoreError>;

/// Errors that abort a pipeline request.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Transcription(#[from] TranscriptionFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => codes::validation::MISSING_REQUIRED_FIELD,
            Self::Transcription(failure) => failure.code(),
            Self::Config(_) => codes::configuration::INVALID_VALUE,
            Self::Internal(_) => codes::internal::UNEXPECTED,
        }
    }
}

impl From<PipelineError> for error_common::BedsideError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(msg) => Self::ValidationError(msg),
            PipelineError::Transcription(failure) => Self::TranscriptionError(failure.to_string()),
            PipelineError::Config(msg) => Self::ConfigError(msg),
            PipelineError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_failures_are_distinguishable() {
        let empty = PipelineError::from(TranscriptionFailure::EmptyTranscript);
        let upstream = PipelineError::from(TranscriptionFailure::service("boom"));

        assert_eq!(empty.code(), codes::transcription::EMPTY_TRANSCRIPT);
        assert_eq!(upstream.code(), codes::transcription::SERVICE_ERROR);
        assert_ne!(empty.code(), StructuringFailure::Unreachable("x".into()).code());
    }
}
