use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::ContextDefaults;
use crate::error::{PipelineError, PipelineResult};
use crate::memory::DEFAULT_HISTORY_LIMIT;

/// Endpoint and per-call deadline of an outbound collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    pub api_url: String,
    pub timeout: Duration,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Whisper transcription service
    pub transcription: CollaboratorConfig,
    /// Note structuring (LLM) service
    pub structuring: CollaboratorConfig,
    pub context_defaults: ContextDefaults,
    /// Idle time after which session memory is dropped; `None` keeps it forever
    pub session_ttl: Option<Duration>,
    pub session_history_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            transcription: CollaboratorConfig {
                api_url: "http://localhost:8080".to_string(),
                timeout: Duration::from_secs(60),
            },
            structuring: CollaboratorConfig {
                api_url: "http://localhost:8080".to_string(),
                timeout: Duration::from_secs(30),
            },
            context_defaults: ContextDefaults::default(),
            session_ttl: Some(Duration::from_secs(3600)),
            session_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> PipelineResult<T> {
    match lookup(key).map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .parse()
            .map_err(|_| PipelineError::Config(format!("Invalid value for {key}: {raw:?}"))),
        None => Ok(default),
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unset keys take their
    /// defaults; set but unparsable keys are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let defaults = Self::default();

        let transcription = CollaboratorConfig {
            api_url: lookup("WHISPER_API_URL").unwrap_or(defaults.transcription.api_url),
            timeout: Duration::from_secs(parse_var(&lookup, "TRANSCRIPTION_TIMEOUT_SECS", 60)?),
        };

        let structuring = CollaboratorConfig {
            api_url: lookup("LLM_API_URL").unwrap_or(defaults.structuring.api_url),
            timeout: Duration::from_secs(parse_var(&lookup, "STRUCTURING_TIMEOUT_SECS", 30)?),
        };

        let bed: u32 = parse_var(&lookup, "DEFAULT_PATIENT_BED", defaults.context_defaults.bed)?;
        if bed == 0 {
            return Err(PipelineError::Config(
                "DEFAULT_PATIENT_BED must be a positive integer".to_string(),
            ));
        }

        let context_defaults = ContextDefaults {
            bed,
            unit: lookup("DEFAULT_UNIT").unwrap_or(defaults.context_defaults.unit),
            require_context: parse_var(&lookup, "REQUIRE_PATIENT_CONTEXT", false)?,
        };

        let ttl_secs: u64 = parse_var(&lookup, "SESSION_TTL_SECS", 3600)?;
        let session_ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));

        let session_history_limit: usize =
            parse_var(&lookup, "SESSION_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        if !(1..=DEFAULT_HISTORY_LIMIT).contains(&session_history_limit) {
            return Err(PipelineError::Config(format!(
                "SESSION_HISTORY_LIMIT must be between 1 and {DEFAULT_HISTORY_LIMIT}"
            )));
        }

        Ok(Self {
            transcription,
            structuring,
            context_defaults,
            session_ttl,
            session_history_limit,
        })
    }
}
