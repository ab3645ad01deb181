//! Cross-turn disambiguation of detected intentions.

use std::sync::Arc;

use tracing::debug;

use crate::error::SessionResult;
use crate::memory::{SessionMemory, SessionStore};

/// Intention labels recorded in session memory.
pub mod intentions {
    /// Nothing specific was detected.
    pub const FALLBACK: &str = "FALLBACK";
    /// A fallback utterance that refers to the session's active patient.
    pub const PATIENT_SPECIFIC: &str = "PATIENT_SPECIFIC";
    pub const SELECT_PATIENT: &str = "SELECT_PATIENT";
    pub const UPDATE_OPINION: &str = "UPDATE_OPINION";
}

/// Replaceable heuristic deciding the final intention of an utterance.
pub trait AmbiguityStrategy: Send + Sync {
    fn resolve(&self, memory: &SessionMemory, detected: &str, raw_message: &str) -> String;
}

/// Escalates generic utterances that point at "the patient" to the active patient.
#[derive(Debug, Clone)]
pub struct DeicticKeywordStrategy {
    markers: Vec<String>,
}

impl DeicticKeywordStrategy {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|marker| marker.into().to_lowercase())
                .collect(),
        }
    }

    fn mentions_patient(&self, raw_message: &str) -> bool {
        let message = raw_message.to_lowercase();
        self.markers.iter().any(|marker| message.contains(marker.as_str()))
    }
}

impl Default for DeicticKeywordStrategy {
    fn default() -> Self {
        Self::new(["paciente", "ele", "ela", "este"])
    }
}

impl AmbiguityStrategy for DeicticKeywordStrategy {
    fn resolve(&self, memory: &SessionMemory, detected: &str, raw_message: &str) -> String {
        if detected == intentions::FALLBACK
            && memory.active_patient_id.is_some()
            && self.mentions_patient(raw_message)
        {
            return intentions::PATIENT_SPECIFIC.to_string();
        }

        let continues_previous = memory
            .last_interaction
            .as_ref()
            .is_some_and(|last| last.intention == detected);
        if continues_previous {
            debug!(session_id = %memory.session_id, intention = detected, "Continuing previous intention");
        }

        detected.to_string()
    }
}

/// Runs an [`AmbiguityStrategy`] against the session's stored memory.
#[derive(Clone)]
pub struct AmbiguityResolver {
    store: Arc<dyn SessionStore>,
    strategy: Arc<dyn AmbiguityStrategy>,
}

impl AmbiguityResolver {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_strategy(store, Arc::new(DeicticKeywordStrategy::default()))
    }

    pub fn with_strategy(store: Arc<dyn SessionStore>, strategy: Arc<dyn AmbiguityStrategy>) -> Self {
        Self { store, strategy }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Resolve `detected` for `session_id`, creating the session if needed.
    pub async fn resolve_ambiguity(
        &self,
        session_id: &str,
        detected: &str,
        raw_message: &str,
    ) -> SessionResult<String> {
        let memory = self.store.get_or_create(session_id).await?;
        Ok(self.strategy.resolve(&memory, detected, raw_message))
    }
}

impl std::fmt::Debug for AmbiguityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbiguityResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySessionStore;

    fn resolver() -> (Arc<InMemorySessionStore>, AmbiguityResolver) {
        let store = Arc::new(InMemorySessionStore::new());
        let resolver = AmbiguityResolver::new(store.clone());
        (store, resolver)
    }

    #[tokio::test]
    async fn test_deictic_fallback_escalates_with_active_patient() {
        let (store, resolver) = resolver();
        store.set_active_patient("s", Some("bed-5".into())).await.unwrap();

        for message in ["Como está o paciente?", "ELA piorou", "este aqui", "ele melhorou"] {
            let resolved = resolver
                .resolve_ambiguity("s", intentions::FALLBACK, message)
                .await
                .unwrap();
            assert_eq!(resolved, intentions::PATIENT_SPECIFIC, "message: {message:?}");
        }
    }

    #[tokio::test]
    async fn test_no_escalation_without_active_patient() {
        let (_store, resolver) = resolver();
        let resolved = resolver
            .resolve_ambiguity("s", intentions::FALLBACK, "como está o paciente")
            .await
            .unwrap();
        assert_eq!(resolved, intentions::FALLBACK);
    }

    #[tokio::test]
    async fn test_no_escalation_without_marker() {
        let (store, resolver) = resolver();
        store.set_active_patient("s", Some("bed-5".into())).await.unwrap();
        let resolved = resolver
            .resolve_ambiguity("s", intentions::FALLBACK, "qual o plano hoje")
            .await
            .unwrap();
        assert_eq!(resolved, intentions::FALLBACK);
    }

    #[tokio::test]
    async fn test_specific_intentions_pass_through() {
        let (store, resolver) = resolver();
        store.set_active_patient("s", Some("bed-5".into())).await.unwrap();
        store
            .record_intention("s", intentions::UPDATE_OPINION, None)
            .await
            .unwrap();

        let continued = resolver
            .resolve_ambiguity("s", intentions::UPDATE_OPINION, "parecer do paciente")
            .await
            .unwrap();
        assert_eq!(continued, intentions::UPDATE_OPINION);

        let other = resolver
            .resolve_ambiguity("s", intentions::SELECT_PATIENT, "paciente 3")
            .await
            .unwrap();
        assert_eq!(other, intentions::SELECT_PATIENT);
    }

    #[tokio::test]
    async fn test_custom_strategy_is_used() {
        struct AlwaysFallback;
        impl AmbiguityStrategy for AlwaysFallback {
            fn resolve(&self, _: &SessionMemory, _: &str, _: &str) -> String {
                intentions::FALLBACK.to_string()
            }
        }

        let store = Arc::new(InMemorySessionStore::new());
        let resolver = AmbiguityResolver::with_strategy(store, Arc::new(AlwaysFallback));
        let resolved = resolver
            .resolve_ambiguity("s", intentions::SELECT_PATIENT, "leito 1")
            .await
            .unwrap();
        assert_eq!(resolved, intentions::FALLBACK);
    }

    #[test]
    fn test_markers_are_case_insensitive() {
        let strategy = DeicticKeywordStrategy::new(["Paciente"]);
        assert!(strategy.mentions_patient("PACIENTE grave"));
        assert!(!strategy.mentions_patient("leito vazio"));
    }
}
