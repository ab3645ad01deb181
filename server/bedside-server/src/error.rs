use axum::{
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use error_common::{codes, ErrorContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;
use voice_note_pipeline::{PipelineError, SessionStoreError, TranscriptionFailure};

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable error code
    pub code: String,
    /// Correlates the response with the server log line
    pub error_id: String,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{resource_type} not found")]
    NotFound { resource_type: String },

    #[error("{failure}")]
    Transcription { failure: TranscriptionFailure },

    #[error("Session store unavailable: {message}")]
    SessionStore { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Transcription { failure } => match failure {
                TranscriptionFailure::EmptyTranscript => StatusCode::BAD_REQUEST,
                TranscriptionFailure::ServiceError { status, .. } => status
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
            },
            ApiError::SessionStore { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::MISSING_REQUIRED_FIELD,
            ApiError::NotFound { .. } => codes::session::NOT_FOUND,
            ApiError::Transcription { failure } => failure.code(),
            ApiError::SessionStore { .. } => codes::session::STORE_UNAVAILABLE,
            ApiError::Internal { .. } => codes::internal::UNEXPECTED,
        }
    }

    /// Message safe to show to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Transcription {
                failure: TranscriptionFailure::EmptyTranscript,
            } => "Empty transcript".to_string(),
            ApiError::Transcription {
                failure: TranscriptionFailure::ServiceError { upstream_message, .. },
            } => upstream_message
                .clone()
                .unwrap_or_else(|| "Transcription service unavailable".to_string()),
            ApiError::Internal { .. } => "Internal error while processing audio".to_string(),
            _ => self.to_string(),
        }
    }

    /// Log with correlation data and build the response.
    pub fn into_response_with_context(self, context: &ErrorContext) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        error!(
            error_id = %error_id,
            code = self.code(),
            status_code = status_code.as_u16(),
            request_id = ?context.request_id,
            session_id = ?context.session_id,
            error = %self,
            "API error occurred"
        );

        let body = ApiErrorResponse {
            error: self.public_message(),
            code: self.code().to_string(),
            error_id,
        };

        (status_code, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with_context(&ErrorContext::new())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(message) => Self::Validation { message },
            PipelineError::Transcription(failure) => Self::Transcription { failure },
            PipelineError::Config(message) | PipelineError::Internal(message) => {
                Self::Internal { message }
            }
        }
    }
}

impl From<SessionStoreError> for ApiError {
    fn from(err: SessionStoreError) -> Self {
        Self::SessionStore {
            message: err.to_string(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::validation(format!("Expected multipart form data: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcription_status_mapping() {
        let upstream = ApiError::from(PipelineError::Transcription(
            TranscriptionFailure::ServiceError {
                reason: "model not loaded".into(),
                status: Some(503),
                upstream_message: Some("model not loaded".into()),
            },
        ));
        assert_eq!(upstream.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let unreachable = ApiError::from(PipelineError::Transcription(
            TranscriptionFailure::service("connection refused"),
        ));
        assert_eq!(unreachable.status_code(), StatusCode::BAD_GATEWAY);

        let empty = ApiError::from(PipelineError::Transcription(
            TranscriptionFailure::EmptyTranscript,
        ));
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(empty.code(), codes::transcription::EMPTY_TRANSCRIPT);
    }

    #[test]
    fn test_transport_errors_do_not_leak() {
        let unreachable = ApiError::from(PipelineError::Transcription(TranscriptionFailure::service(
            "Transcription request failed: error sending request for url (http://whisper.internal:9000/transcribe)",
        )));
        assert_eq!(unreachable.public_message(), "Transcription service unavailable");

        let upstream = ApiError::from(PipelineError::Transcription(
            TranscriptionFailure::ServiceError {
                reason: "Transcription service returned 500: <html>".into(),
                status: Some(500),
                upstream_message: None,
            },
        ));
        assert_eq!(upstream.public_message(), "Transcription service unavailable");

        let explained = ApiError::from(PipelineError::Transcription(
            TranscriptionFailure::ServiceError {
                reason: "audio too long".into(),
                status: Some(413),
                upstream_message: Some("audio too long".into()),
            },
        ));
        assert_eq!(explained.public_message(), "audio too long");
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = ApiError::from(PipelineError::Internal("db password=hunter2".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("hunter2"));
    }
}
