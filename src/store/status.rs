use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{GenerationState, GenerationStatus};

#[derive(Debug, Clone)]
struct StatusEntry {
    status: GenerationStatus,
    expires_at: DateTime<Utc>,
}

/// In-memory status store with time-based expiry.
///
/// Every write refreshes the entry's retention deadline, mirroring a
/// setex-style key-value store. Progress is monotone per generation and
/// terminal states are frozen: updates arriving after completion or failure
/// are dropped.
#[derive(Clone)]
pub struct StatusStore {
    entries: Arc<RwLock<HashMap<String, StatusEntry>>>,
    ttl: Duration,
}

impl StatusStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Record the initial status for a generation
    pub async fn insert(&self, status: GenerationStatus) {
        let mut entries = self.entries.write().await;
        entries.insert(
            status.generation_id.clone(),
            StatusEntry {
                status,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    /// Advance a processing generation to a later checkpoint.
    /// Progress never decreases and terminal entries are left untouched.
    pub async fn advance(&self, generation_id: &str, progress: u8, message: &str) {
        let mut entries = self.entries.write().await;

        let Some(entry) = entries.get_mut(generation_id) else {
            warn!("Progress update for unknown generation: {}", generation_id);
            return;
        };

        if entry.status.is_terminal() {
            warn!(
                "Ignoring progress update for terminal generation: {}",
                generation_id
            );
            return;
        }

        entry.status.progress = entry.status.progress.max(progress.min(100));
        entry.status.message = message.to_string();
        entry.expires_at = Utc::now() + self.ttl;

        debug!(
            "Generation {} at {}%: {}",
            generation_id, entry.status.progress, message
        );
    }

    /// Transition a generation to the terminal `completed` state
    pub async fn complete(&self, generation_id: &str, message: &str, result_url: &str) {
        let mut entries = self.entries.write().await;

        let Some(entry) = entries.get_mut(generation_id) else {
            warn!("Completion for unknown generation: {}", generation_id);
            return;
        };

        if entry.status.is_terminal() {
            return;
        }

        entry.status.status = GenerationState::Completed;
        entry.status.progress = 100;
        entry.status.message = message.to_string();
        entry.status.result_url = Some(result_url.to_string());
        entry.expires_at = Utc::now() + self.ttl;

        debug!("Generation {} completed: {}", generation_id, result_url);
    }

    /// Transition a generation to the terminal `error` state.
    /// The progress value is retained at its last checkpoint.
    pub async fn fail(&self, generation_id: &str, message: &str, error: &str) {
        let mut entries = self.entries.write().await;

        let Some(entry) = entries.get_mut(generation_id) else {
            warn!("Failure report for unknown generation: {}", generation_id);
            return;
        };

        if entry.status.is_terminal() {
            return;
        }

        entry.status.status = GenerationState::Error;
        entry.status.message = message.to_string();
        entry.status.error = Some(error.to_string());
        entry.expires_at = Utc::now() + self.ttl;

        debug!("Generation {} failed: {}", generation_id, error);
    }

    /// Fetch the current status, treating expired entries as absent
    pub async fn get(&self, generation_id: &str) -> Option<GenerationStatus> {
        let entries = self.entries.read().await;
        entries
            .get(generation_id)
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| entry.status.clone())
    }

    /// Drop expired entries; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let initial_count = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);

        let removed_count = initial_count - entries.len();
        if removed_count > 0 {
            debug!("Swept {} expired status entries", removed_count);
        }

        removed_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checkpoints;

    fn processing(id: &str) -> GenerationStatus {
        GenerationStatus::processing(id, checkpoints::QUEUED, checkpoints::QUEUED_MESSAGE)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = StatusStore::new(3600);
        store.insert(processing("gen-1")).await;

        let status = store.get("gen-1").await.unwrap();
        assert_eq!(status.status, GenerationState::Processing);
        assert_eq!(status.progress, 0);
    }

    #[tokio::test]
    async fn test_progress_is_monotone() {
        let store = StatusStore::new(3600);
        store.insert(processing("gen-1")).await;

        store.advance("gen-1", 75, "optimizing").await;
        store.advance("gen-1", 25, "late update").await;

        let status = store.get("gen-1").await.unwrap();
        assert_eq!(status.progress, 75);
    }

    #[tokio::test]
    async fn test_terminal_state_is_frozen() {
        let store = StatusStore::new(3600);
        store.insert(processing("gen-1")).await;
        store
            .complete("gen-1", "done", "/sites/gen-1/index.html")
            .await;

        store.advance("gen-1", 50, "stale update").await;
        store.fail("gen-1", "late failure", "should be ignored").await;

        let status = store.get("gen-1").await.unwrap();
        assert_eq!(status.status, GenerationState::Completed);
        assert_eq!(status.progress, 100);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_retains_last_progress() {
        let store = StatusStore::new(3600);
        store.insert(processing("gen-1")).await;
        store.advance("gen-1", 25, "generating").await;

        store.fail("gen-1", "generation failed", "backend unreachable").await;

        let status = store.get("gen-1").await.unwrap();
        assert_eq!(status.status, GenerationState::Error);
        assert_eq!(status.progress, 25);
        assert_eq!(status.error.as_deref(), Some("backend unreachable"));
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible_and_swept() {
        let store = StatusStore::new(0);
        store.insert(processing("gen-1")).await;

        assert!(store.get("gen-1").await.is_none());
        assert_eq!(store.sweep().await, 1);
        assert_eq!(store.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_update_for_unknown_generation_is_ignored() {
        let store = StatusStore::new(3600);
        store.advance("missing", 25, "generating").await;
        assert!(store.get("missing").await.is_none());
    }
}
