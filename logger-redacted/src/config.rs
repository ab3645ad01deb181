// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored output for development
    Pretty,
    /// Structured JSON lines for production
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Include file and line numbers in events
    pub include_location: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_filter: "info".to_string(),
            include_location: false,
        }
    }
}

impl LoggerConfig {
    /// Pick the format from the deployment environment name: anything other
    /// than `development` logs JSON.
    pub fn for_environment(environment: &str, default_filter: impl Into<String>) -> Self {
        let format = if environment.eq_ignore_ascii_case("development") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        Self {
            format,
            default_filter: default_filter.into(),
            include_location: format == LogFormat::Pretty,
        }
    }
}
