use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use voice_note_pipeline::{PipelineConfig, PipelineResult, SessionStore, TranscriptionOrchestrator};

/// Shared state of the HTTP server
#[derive(Clone)]
pub struct AppState {
    /// Voice note pipeline
    pub pipeline: Arc<TranscriptionOrchestrator>,
    /// Server start time, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: TranscriptionOrchestrator) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            started_at: Instant::now(),
        }
    }

    /// Build the pipeline with HTTP collaborators from configuration
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let pipeline = TranscriptionOrchestrator::from_config(config)?;
        Ok(Self::new(pipeline))
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        self.pipeline.sessions()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Periodically drop expired session memory.
    pub fn spawn_session_janitor(&self, every: Duration) -> JoinHandle<()> {
        let sessions = Arc::clone(self.sessions());
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                match sessions.purge_expired().await {
                    Ok(purged) => debug!(purged, "Session janitor pass complete"),
                    Err(err) => warn!(error = %err, "Session janitor pass failed"),
                }
            }
        })
    }
}

/// Janitor period for a session TTL: a quarter of the TTL, at least 30 seconds.
pub fn janitor_interval(ttl: Duration) -> Duration {
    (ttl / 4).max(Duration::from_secs(30))
}
