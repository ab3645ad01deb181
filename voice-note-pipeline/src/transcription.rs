use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::Command;

/// Uploaded audio as received from the caller.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl AudioPayload {
    pub fn new(bytes: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Speech-to-text output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            duration_seconds: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranscriptionResult {
    /// Navigation short-circuit; structuring was skipped.
    Navigation { text: String, command: Command },
    /// General note. `structured` is `None` when enrichment was unavailable.
    Note {
        text: String,
        structured: Option<Value>,
    },
}

impl TranscriptionResult {
    pub fn text(&self) -> &str {
        match self {
            Self::Navigation { text, .. } | Self::Note { text, .. } => text,
        }
    }

    pub fn command(&self) -> Option<Command> {
        match self {
            Self::Navigation { command, .. } => Some(*command),
            Self::Note { .. } => None,
        }
    }

    pub fn structured(&self) -> Option<&Value> {
        match self {
            Self::Navigation { .. } => None,
            Self::Note { structured, .. } => structured.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_navigation_wire_shape() {
        let result = TranscriptionResult::Navigation {
            text: "mostrar paciente 5".into(),
            command: Command::SelectPatient { bed: 5 },
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"text": "mostrar paciente 5", "command": {"type": "select-patient", "bed": 5}})
        );
    }

    #[test]
    fn test_note_without_structure_serializes_null() {
        let result = TranscriptionResult::Note {
            text: "paciente estável".into(),
            structured: None,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"text": "paciente estável", "structured": null})
        );
    }
}
