//! Audit events for clinical voice interactions.
//!
//! Events go to the tracing pipeline under the [`AUDIT_TARGET`] target so a
//! subscriber can route them to a dedicated sink. Transcript text is never
//! part of an audit event.

use std::time::Duration;

use serde::Serialize;

pub const AUDIT_TARGET: &str = "audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Navigation,
    Note,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Navigation => "navigation",
            ResponseKind::Note => "note",
        }
    }
}

/// One completed voice interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionAudit {
    pub session_id: Option<String>,
    pub detected_intention: String,
    pub resolved_intention: String,
    pub response_kind: ResponseKind,
    pub structuring_used: bool,
    pub duration_ms: u64,
}

impl InteractionAudit {
    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn emit(&self) {
        tracing::info!(
            target: AUDIT_TARGET,
            session_id = self.session_id.as_deref().unwrap_or("-"),
            detected_intention = %self.detected_intention,
            resolved_intention = %self.resolved_intention,
            response_kind = self.response_kind.as_str(),
            structuring_used = self.structuring_used,
            duration_ms = self.duration_ms,
            "Clinical voice interaction"
        );
    }
}
