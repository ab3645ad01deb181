//! Common error handling utilities for the bedside voice engine
//!
//! Provides the shared error type, stable error codes and error context used
//! across the engine's crates.
//!
//! # Error Categories
//!
//! - **ValidationError**: missing or malformed request input (client errors)
//! - **TranscriptionError**: speech-to-text failures, fatal for a request
//! - **StructuringError**: note structuring failures, recovered locally
//! - **SessionError**: session memory backend failures
//! - **ConfigError**: invalid startup configuration
//! - **InternalError**: anything unexpected; surfaced without internals
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, BedsideError, ErrorContext};
//!
//! let err = BedsideError::ValidationError("Missing file".to_string());
//! assert_eq!(err.code(), codes::validation::INVALID_INPUT);
//!
//! let context = ErrorContext::new().with_session_id("ward-round-1");
//! tracing::warn!(code = err.code(), session_id = ?context.session_id, "Rejected request");
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
