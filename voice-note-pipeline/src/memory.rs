//! Per-session conversational memory.
//!
//! Sessions are created lazily on first reference and keep the active patient
//! plus a bounded history of recent intentions. Storage sits behind
//! [`SessionStore`] so a shared key-value backend can replace the in-process
//! map when the server runs as several instances.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionResult;

/// Upper bound (and default) for [`SessionMemory::intention_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Clamp a configured history limit into `1..=DEFAULT_HISTORY_LIMIT`.
pub fn clamp_history_limit(limit: usize) -> usize {
    limit.clamp(1, DEFAULT_HISTORY_LIMIT)
}

/// One remembered intention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentionRecord {
    pub intention: String,
    pub timestamp: DateTime<Utc>,
    pub patient_id: Option<String>,
}

/// Conversational state of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMemory {
    pub session_id: String,
    pub active_patient_id: Option<String>,
    /// Oldest first.
    pub intention_history: VecDeque<IntentionRecord>,
    pub last_interaction: Option<IntentionRecord>,
}

impl SessionMemory {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            active_patient_id: None,
            intention_history: VecDeque::new(),
            last_interaction: None,
        }
    }

    /// Append an intention, evicting the oldest entries beyond `limit`
    /// (clamped to `1..=DEFAULT_HISTORY_LIMIT`).
    ///
    /// The entry's patient is `patient_id` when given and non-empty, else the
    /// current active patient.
    pub fn record(
        &mut self,
        intention: &str,
        patient_id: Option<String>,
        limit: usize,
    ) -> IntentionRecord {
        let patient_id = patient_id
            .filter(|id| !id.is_empty())
            .or_else(|| self.active_patient_id.clone());

        let entry = IntentionRecord {
            intention: intention.to_string(),
            timestamp: Utc::now(),
            patient_id,
        };

        self.intention_history.push_back(entry.clone());
        self.last_interaction = Some(entry.clone());

        let limit = clamp_history_limit(limit);
        while self.intention_history.len() > limit {
            self.intention_history.pop_front();
        }

        entry
    }
}

/// Storage interface for session memory.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session, creating an empty one if absent. Idempotent.
    async fn get_or_create(&self, session_id: &str) -> SessionResult<SessionMemory>;

    /// Read a session without creating or refreshing it.
    async fn snapshot(&self, session_id: &str) -> SessionResult<Option<SessionMemory>>;

    /// Overwrite the active patient.
    async fn set_active_patient(
        &self,
        session_id: &str,
        patient_id: Option<String>,
    ) -> SessionResult<()>;

    /// Append to the intention history and update the last interaction.
    async fn record_intention(
        &self,
        session_id: &str,
        intention: &str,
        patient_id: Option<String>,
    ) -> SessionResult<IntentionRecord>;

    /// Drop one session. Returns whether it existed.
    async fn remove(&self, session_id: &str) -> SessionResult<bool>;

    /// Drop every session.
    async fn clear(&self) -> SessionResult<()>;

    /// Drop sessions idle for longer than the TTL. Returns how many went.
    async fn purge_expired(&self) -> SessionResult<usize>;
}

#[derive(Debug)]
struct Entry {
    memory: SessionMemory,
    last_touched: Instant,
}

impl Entry {
    fn new(session_id: &str) -> Self {
        Self {
            memory: SessionMemory::new(session_id),
            last_touched: Instant::now(),
        }
    }
}

/// Process-local store on a concurrent map with idle-TTL eviction.
///
/// Expired sessions read as absent and are replaced on the next write; a
/// periodic [`SessionStore::purge_expired`] reclaims the memory of sessions
/// that are never touched again.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    entries: Arc<DashMap<String, Entry>>,
    ttl: Option<Duration>,
    history_limit: usize,
}

impl InMemorySessionStore {
    /// Store without expiry and with the default history limit.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = clamp_history_limit(limit);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.last_touched.elapsed() > ttl)
    }

    fn with_live_entry<R>(&self, session_id: &str, f: impl FnOnce(&mut SessionMemory) -> R) -> R {
        let mut entry = self
            .entries
            .entry(session_id.to_string())
            .or_insert_with(|| Entry::new(session_id));

        if self.is_expired(&entry) {
            debug!(session_id = %session_id, "Session expired, starting fresh");
            *entry = Entry::new(session_id);
        }
        entry.last_touched = Instant::now();

        f(&mut entry.memory)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, session_id: &str) -> SessionResult<SessionMemory> {
        Ok(self.with_live_entry(session_id, |memory| memory.clone()))
    }

    async fn snapshot(&self, session_id: &str) -> SessionResult<Option<SessionMemory>> {
        let snapshot = self
            .entries
            .get(session_id)
            .and_then(|entry| (!self.is_expired(&entry)).then(|| entry.memory.clone()));

        if snapshot.is_none() {
            self.entries
                .remove_if(session_id, |_, entry| self.is_expired(entry));
        }
        Ok(snapshot)
    }

    async fn set_active_patient(
        &self,
        session_id: &str,
        patient_id: Option<String>,
    ) -> SessionResult<()> {
        self.with_live_entry(session_id, |memory| memory.active_patient_id = patient_id);
        Ok(())
    }

    async fn record_intention(
        &self,
        session_id: &str,
        intention: &str,
        patient_id: Option<String>,
    ) -> SessionResult<IntentionRecord> {
        let limit = self.history_limit;
        Ok(self.with_live_entry(session_id, |memory| {
            memory.record(intention, patient_id, limit)
        }))
    }

    async fn remove(&self, session_id: &str) -> SessionResult<bool> {
        Ok(self.entries.remove(session_id).is_some())
    }

    async fn clear(&self) -> SessionResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn purge_expired(&self) -> SessionResult<usize> {
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let keep = !self.is_expired(entry);
            if !keep {
                purged += 1;
            }
            keep
        });
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = InMemorySessionStore::new();

        let first = store.get_or_create("s1").await.unwrap();
        assert_eq!(first.session_id, "s1");
        assert!(first.active_patient_id.is_none());
        assert!(first.intention_history.is_empty());
        assert!(first.last_interaction.is_none());

        store.set_active_patient("s1", Some("p-3".into())).await.unwrap();
        let second = store.get_or_create("s1").await.unwrap();
        assert_eq!(second.active_patient_id.as_deref(), Some("p-3"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_bounded_fifo() {
        let store = InMemorySessionStore::new();

        for i in 0..11 {
            store
                .record_intention("s1", &format!("INTENT_{i}"), None)
                .await
                .unwrap();
        }

        let memory = store.get_or_create("s1").await.unwrap();
        assert_eq!(memory.intention_history.len(), 10);
        assert!(memory
            .intention_history
            .iter()
            .all(|record| record.intention != "INTENT_0"));
        assert_eq!(memory.intention_history[0].intention, "INTENT_1");
        assert_eq!(
            memory.last_interaction.map(|record| record.intention).as_deref(),
            Some("INTENT_10")
        );
    }

    #[tokio::test]
    async fn test_custom_history_limit() {
        let store = InMemorySessionStore::new().with_history_limit(3);
        for i in 0..5 {
            store.record_intention("s", &i.to_string(), None).await.unwrap();
        }
        let memory = store.snapshot("s").await.unwrap().unwrap();
        let kept: Vec<_> = memory.intention_history.iter().map(|r| r.intention.as_str()).collect();
        assert_eq!(kept, ["2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_history_limit_never_exceeds_ten() {
        let store = InMemorySessionStore::new().with_history_limit(50);
        for i in 0..11 {
            store.record_intention("s", &i.to_string(), None).await.unwrap();
        }
        let memory = store.snapshot("s").await.unwrap().unwrap();
        assert_eq!(memory.intention_history.len(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_record_clamps_limit() {
        let mut memory = SessionMemory::new("s");
        for i in 0..12 {
            memory.record(&i.to_string(), None, 100);
        }
        assert_eq!(memory.intention_history.len(), DEFAULT_HISTORY_LIMIT);

        memory.record("last", None, 0);
        assert_eq!(memory.intention_history.len(), 1);
    }

    #[tokio::test]
    async fn test_record_resolves_patient() {
        let store = InMemorySessionStore::new();

        let none = store.record_intention("s1", "FALLBACK", None).await.unwrap();
        assert_eq!(none.patient_id, None);

        store.set_active_patient("s1", Some("bed-4".into())).await.unwrap();
        let inherited = store.record_intention("s1", "FALLBACK", None).await.unwrap();
        assert_eq!(inherited.patient_id.as_deref(), Some("bed-4"));

        let explicit = store
            .record_intention("s1", "FALLBACK", Some("p-9".into()))
            .await
            .unwrap();
        assert_eq!(explicit.patient_id.as_deref(), Some("p-9"));

        let blank = store
            .record_intention("s1", "FALLBACK", Some(String::new()))
            .await
            .unwrap();
        assert_eq!(blank.patient_id.as_deref(), Some("bed-4"));
    }

    #[tokio::test]
    async fn test_snapshot_does_not_create() {
        let store = InMemorySessionStore::new();
        assert!(store.snapshot("missing").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = InMemorySessionStore::new();
        store.get_or_create("a").await.unwrap();
        store.get_or_create("b").await.unwrap();

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert_eq!(store.len(), 1);

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = InMemorySessionStore::new().with_ttl(Duration::from_millis(10));
        store.set_active_patient("old", Some("bed-1".into())).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.snapshot("old").await.unwrap().is_none());
        let fresh = store.get_or_create("old").await.unwrap();
        assert!(fresh.active_patient_id.is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemorySessionStore::new().with_ttl(Duration::from_millis(10));
        store.get_or_create("a").await.unwrap();
        store.get_or_create("b").await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        store.get_or_create("c").await.unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_without_ttl_nothing_expires() {
        let store = InMemorySessionStore::new();
        store.get_or_create("a").await.unwrap();
        assert_eq!(store.purge_expired().await.unwrap(), 0);
        assert!(store.snapshot("a").await.unwrap().is_some());
    }
}
