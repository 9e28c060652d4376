//! Key-value cache capability.
//!
//! The cache is an acceleration and deduplication layer, never a source of
//! truth. Implementations must absorb their own failures: a read from an
//! unreachable cache is a miss, a write is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Operations the core needs from a key-value cache.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Fetch a live value. `None` for missing, expired, or unreachable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration);

    /// Remove a key if present.
    async fn delete(&self, key: &str);

    /// Whether a live value exists. `false` when unreachable.
    async fn exists(&self, key: &str) -> bool;

    /// Store a value only when the key is absent.
    ///
    /// Returns `Some(true)` if stored, `Some(false)` if the key already held
    /// a live value, and `None` if the cache could not be reached.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Option<bool>;

    /// Whether the backend currently holds a usable connection.
    fn is_connected(&self) -> bool;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Writes between two sweeps of expired entries.
const SWEEP_EVERY: usize = 64;

/// Process-local cache with passive expiry.
///
/// Used when no external cache is configured and in tests. Expired entries
/// are treated as absent, pruned on access, and swept from the whole map
/// every [`SWEEP_EVERY`] writes so keys that are never read again do not
/// accumulate.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    writes: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn sweep_due(&self) -> bool {
        self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1
    }
}

fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
    entries.retain(|_, e| e.is_live(now));
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_owned(),
            expires_at: now + ttl,
        };
        let mut entries = self.entries.lock().await;
        if self.sweep_due() {
            sweep(&mut entries, now);
        }
        entries.insert(key.to_owned(), entry);
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Option<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if self.sweep_due() {
            sweep(&mut entries, now);
        }
        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Some(false);
        }
        entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: now + ttl,
            },
        );
        Some(true)
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// A cache that is never reachable.
///
/// Models a backend outage: every read misses and every write is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedCache;

#[async_trait]
impl KeyValueCache for DisconnectedCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) {}

    async fn delete(&self, _key: &str) {}

    async fn exists(&self, _key: &str) -> bool {
        false
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Option<bool> {
        None
    }

    fn is_connected(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get() {
        let cache = MemoryCache::new();
        cache.set("k", "v", MINUTE).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        assert!(cache.exists("k").await);
    }

    #[tokio::test]
    async fn expired_entries_are_absent() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::ZERO).await;
        assert_eq!(cache.get("k").await, None);
        assert!(!cache.exists("k").await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new();
        cache.set("k", "v", MINUTE).await;
        cache.delete("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn set_if_absent_only_stores_once() {
        let cache = MemoryCache::new();
        assert_eq!(cache.set_if_absent("lock", "1", MINUTE).await, Some(true));
        assert_eq!(cache.set_if_absent("lock", "2", MINUTE).await, Some(false));
        assert_eq!(cache.get("lock").await.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn set_if_absent_reclaims_expired_key() {
        let cache = MemoryCache::new();
        cache.set("lock", "old", Duration::ZERO).await;
        assert_eq!(cache.set_if_absent("lock", "new", MINUTE).await, Some(true));
    }

    #[tokio::test]
    async fn expired_keys_that_are_never_read_are_swept() {
        let cache = MemoryCache::new();
        for n in 0..10_000 {
            cache.set(&format!("record:{n}"), "v", Duration::ZERO).await;
        }
        assert!(cache.is_empty().await);
        assert!(cache.entries.lock().await.len() <= SWEEP_EVERY);

        for n in 0..10_000 {
            cache
                .set_if_absent(&format!("lock:{n}"), "1", Duration::ZERO)
                .await;
        }
        assert!(cache.entries.lock().await.len() <= SWEEP_EVERY);
    }

    #[tokio::test]
    async fn sweep_keeps_live_entries() {
        let cache = MemoryCache::new();
        cache.set("keep", "v", MINUTE).await;
        for n in 0..(SWEEP_EVERY * 2) {
            cache.set(&format!("gone:{n}"), "v", Duration::ZERO).await;
        }
        assert_eq!(cache.get("keep").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn disconnected_cache_is_inert() {
        let cache = DisconnectedCache;
        cache.set("k", "v", MINUTE).await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.set_if_absent("k", "v", MINUTE).await, None);
        assert!(!cache.is_connected());
    }
}
