use thiserror::Error;

use crate::codes;

/// Top-level error shared by the engine's crates and binaries
#[derive(Error, Debug)]
pub enum BedsideError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Speech-to-text failures
    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    /// Note structuring failures
    #[error("Structuring error: {0}")]
    StructuringError(String),

    /// Session memory backend errors
    #[error("Session store error: {0}")]
    SessionError(String),

    /// Network communication errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BedsideError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => codes::validation::INVALID_INPUT,
            Self::TranscriptionError(_) => codes::transcription::SERVICE_ERROR,
            Self::StructuringError(_) => codes::structuring::SOFT_FAILURE,
            Self::SessionError(_) => codes::session::STORE_UNAVAILABLE,
            Self::ConfigError(_) => codes::configuration::INVALID_VALUE,
            Self::NetworkError(_) | Self::ServerError(_) | Self::InternalError(_) | Self::Other(_) => {
                codes::internal::UNEXPECTED
            }
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, BedsideError>;

/// Log an error with its code and where it happened
pub fn log_error(context: &str, error: &BedsideError) {
    tracing::error!(
        context = context,
        code = error.code(),
        error = %error,
        "Bedside engine error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            BedsideError::ValidationError("x".into()).code(),
            codes::validation::INVALID_INPUT
        );
        assert_eq!(
            BedsideError::ConfigError("x".into()).code(),
            codes::configuration::INVALID_VALUE
        );
        let wrapped: BedsideError = anyhow::anyhow!("boom").into();
        assert_eq!(wrapped.code(), codes::internal::UNEXPECTED);
    }
}
