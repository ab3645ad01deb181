//! Logging for clinical voice services
//!
//! Spoken notes are protected health information. This crate keeps them out
//! of the logs in a readable form:
//!
//! - **Tracing setup**: one call installs an `EnvFilter`-driven subscriber,
//!   pretty in development and JSON in production
//! - **PHI redaction**: [`PiiRedactor`] masks or hashes e-mail addresses,
//!   CPF numbers, health card (CNS) numbers, phone numbers and medical
//!   record numbers before transcript text reaches a log line
//! - **Audit events**: [`InteractionAudit`] records what was decided for each
//!   interaction without the transcript itself
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_tracing, LoggerConfig, PiiRedactor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing(&LoggerConfig::for_environment("production", "info"))?;
//!
//! let redactor = PiiRedactor::default();
//! tracing::debug!(transcript = %redactor.redact("paciente CPF 123.456.789-09"), "Audio transcribed");
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod redactor;

pub use audit::*;
pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

impl From<LoggerError> for error_common::BedsideError {
    fn from(err: LoggerError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// [`LoggerConfig::default_filter`] when set.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_filter)
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init(),
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}
