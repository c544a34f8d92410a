use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Cache value: where an equivalent request's finished output lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSite {
    pub generation_id: String,
    pub result_url: String,
}

#[derive(Debug, Clone)]
struct CacheSlot {
    value: CachedSite,
    expires_at: DateTime<Utc>,
}

/// Bounded result cache keyed by the request's cache key.
///
/// Capacity is enforced by LRU eviction; freshness by a per-entry deadline
/// checked on read. Within the retention window an identical
/// (name, description, style) triple never triggers a second backend call.
#[derive(Clone)]
pub struct ResultCache {
    entries: Arc<Mutex<LruCache<String, CacheSlot>>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl_secs: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Look up a fresh entry; expired entries are evicted on the way out
    pub async fn get(&self, cache_key: &str) -> Option<CachedSite> {
        let mut entries = self.entries.lock().await;

        match entries.get(cache_key) {
            Some(slot) if slot.expires_at > Utc::now() => Some(slot.value.clone()),
            Some(_) => {
                debug!("Evicting expired cache entry for key {}", cache_key);
                entries.pop(cache_key);
                None
            }
            None => None,
        }
    }

    /// Store a finished generation under its cache key. Concurrent writers to
    /// the same key race; the last writer wins.
    pub async fn insert(&self, cache_key: String, value: CachedSite) {
        let mut entries = self.entries.lock().await;
        entries.put(
            cache_key,
            CacheSlot {
                value,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str) -> CachedSite {
        CachedSite {
            generation_id: id.to_string(),
            result_url: format!("/sites/{}/index.html", id),
        }
    }

    #[tokio::test]
    async fn test_insert_and_hit() {
        let cache = ResultCache::new(8, 3600);
        cache.insert("key-a".to_string(), site("gen-1")).await;

        let hit = cache.get("key-a").await.unwrap();
        assert_eq!(hit.generation_id, "gen-1");
        assert_eq!(hit.result_url, "/sites/gen-1/index.html");
    }

    #[tokio::test]
    async fn test_miss_on_unknown_key() {
        let cache = ResultCache::new(8, 3600);
        assert!(cache.get("key-a").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted_on_read() {
        let cache = ResultCache::new(8, 0);
        cache.insert("key-a".to_string(), site("gen-1")).await;

        assert!(cache.get("key-a").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_bound_evicts_least_recently_used() {
        let cache = ResultCache::new(2, 3600);
        cache.insert("key-a".to_string(), site("gen-1")).await;
        cache.insert("key-b".to_string(), site("gen-2")).await;
        cache.insert("key-c".to_string(), site("gen-3")).await;

        assert!(cache.get("key-a").await.is_none());
        assert!(cache.get("key-c").await.is_some());
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_last_writer_wins_on_same_key() {
        let cache = ResultCache::new(8, 3600);
        cache.insert("key-a".to_string(), site("gen-1")).await;
        cache.insert("key-a".to_string(), site("gen-2")).await;

        let hit = cache.get("key-a").await.unwrap();
        assert_eq!(hit.generation_id, "gen-2");
    }
}
