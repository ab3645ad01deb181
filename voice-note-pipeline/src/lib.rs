//! Spoken-note intent resolution for bedside clinical dictation
//!
//! Turns a dictated audio clip into one of two outcomes:
//!
//! - a **navigation command** ("mostrar paciente 5", "abre o leito 3"),
//!   returned immediately without calling the structuring service;
//! - a **clinical note**: the verbatim transcript plus a best-effort
//!   structured document from the note structuring service. Opinion
//!   updates ("parecer do paciente 5") take this path too.
//!
//! # Pipeline
//!
//! 1. Resolve the patient context (caller hints, else configured fallback)
//! 2. Transcribe the audio (mandatory; failures abort the request)
//! 3. Normalize the transcript and detect a command
//! 4. Update per-session memory and resolve ambiguous follow-ups
//! 5. Structure the note unless it was a navigation command (optional;
//!    failures degrade to `structured: null`)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use voice_note_pipeline::{AudioPayload, PipelineConfig, TranscriptionOrchestrator, TranscriptionRequest};
//!
//! # async fn example(audio: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let pipeline = TranscriptionOrchestrator::from_config(&config)?;
//!
//! let request = TranscriptionRequest::new(AudioPayload::new(audio, "nota.webm"))
//!     .with_session("ward-round-1");
//! let result = pipeline.transcribe(request).await?;
//!
//! println!("Transcript: {}", result.text());
//! # Ok(())
//! # }
//! ```

pub mod ambiguity;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod normalize;
pub mod providers;
pub mod service;
pub mod transcription;

pub use ambiguity::{intentions, AmbiguityResolver, AmbiguityStrategy, DeicticKeywordStrategy};
pub use commands::{detect, detect_command, Command, Phase};
pub use config::*;
pub use context::*;
pub use error::*;
pub use memory::{InMemorySessionStore, IntentionRecord, SessionMemory, SessionStore};
pub use normalize::normalize;
pub use providers::{StructuringProvider, TranscriptionProvider};
pub use service::*;
pub use transcription::*;
