//! Idempotency guard for mutating operations.
//!
//! A guarded operation is identified by `(user, token)`. The first
//! completion stores its response under that key for the retention window;
//! later invocations with the same key get the stored response verbatim.
//!
//! Lookup-then-store is not atomic. A short-lived per-key lock narrows the
//! window for concurrent duplicates; when the cache is unreachable the lock
//! is skipped and the store-level conditional decrement is the only safety
//! net.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::KeyValueCache;
use crate::error::CoreError;
use crate::types::DbId;

/// Default retention of a stored result (24 hours).
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default lifetime of the in-flight lock.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(30);

/// Maximum accepted token length.
pub const MAX_KEY_LEN: usize = 255;

/// A validated client-supplied idempotency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validate a raw header value. Missing or blank tokens are rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let token = raw.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            return Err(CoreError::Validation(
                "Idempotency-Key header is required".into(),
            ));
        }
        if token.len() > MAX_KEY_LEN {
            return Err(CoreError::Validation(format!(
                "Idempotency-Key must be at most {MAX_KEY_LEN} characters"
            )));
        }
        Ok(Self(token.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of trying to take the per-key lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// This request holds the lock and must release it.
    Acquired,
    /// Another request with the same key is executing.
    InFlight,
    /// The cache is unreachable; proceed without a lock.
    Unavailable,
}

/// Stores and replays results of one kind of guarded operation.
#[derive(Clone)]
pub struct IdempotencyGuard {
    cache: Arc<dyn KeyValueCache>,
    scope: &'static str,
    record_ttl: Duration,
    lock_ttl: Duration,
}

impl IdempotencyGuard {
    /// A guard for operations named `scope` (e.g. `"upgrade"`).
    pub fn new(cache: Arc<dyn KeyValueCache>, scope: &'static str) -> Self {
        Self {
            cache,
            scope,
            record_ttl: DEFAULT_RECORD_TTL,
            lock_ttl: DEFAULT_LOCK_TTL,
        }
    }

    pub fn with_ttls(mut self, record_ttl: Duration, lock_ttl: Duration) -> Self {
        self.record_ttl = record_ttl;
        self.lock_ttl = lock_ttl;
        self
    }

    pub fn record_key(&self, user_id: DbId, key: &IdempotencyKey) -> String {
        format!("{}_idempotency:{user_id}:{}", self.scope, key.as_str())
    }

    fn lock_key(&self, user_id: DbId, key: &IdempotencyKey) -> String {
        format!("{}_idempotency_lock:{user_id}:{}", self.scope, key.as_str())
    }

    /// Previously stored result, if present and not expired.
    ///
    /// A record that no longer decodes is treated as a miss.
    pub async fn lookup<T: DeserializeOwned>(
        &self,
        user_id: DbId,
        key: &IdempotencyKey,
    ) -> Option<T> {
        let raw = self.cache.get(&self.record_key(user_id, key)).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(user_id, scope = self.scope, error = %e, "Discarding undecodable idempotency record");
                None
            }
        }
    }

    /// Persist the result of a completed operation.
    pub async fn store<T: Serialize>(&self, user_id: DbId, key: &IdempotencyKey, result: &T) {
        match serde_json::to_string(result) {
            Ok(encoded) => {
                self.cache
                    .set(&self.record_key(user_id, key), &encoded, self.record_ttl)
                    .await;
            }
            Err(e) => {
                tracing::error!(user_id, scope = self.scope, error = %e, "Failed to encode idempotency record");
            }
        }
    }

    /// Try to take the in-flight lock for `(user, key)`.
    pub async fn acquire(&self, user_id: DbId, key: &IdempotencyKey) -> LockOutcome {
        match self
            .cache
            .set_if_absent(&self.lock_key(user_id, key), "1", self.lock_ttl)
            .await
        {
            Some(true) => LockOutcome::Acquired,
            Some(false) => LockOutcome::InFlight,
            None => LockOutcome::Unavailable,
        }
    }

    /// Release a lock taken by [`acquire`](Self::acquire).
    pub async fn release(&self, user_id: DbId, key: &IdempotencyKey) {
        self.cache.delete(&self.lock_key(user_id, key)).await;
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde::Deserialize;

    use super::*;
    use crate::cache::{DisconnectedCache, MemoryCache};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Receipt {
        tx_id: String,
        success: bool,
    }

    fn key(raw: &str) -> IdempotencyKey {
        IdempotencyKey::parse(Some(raw)).expect("valid key")
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert_matches!(IdempotencyKey::parse(None), Err(CoreError::Validation(_)));
        assert_matches!(
            IdempotencyKey::parse(Some("  ")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn overlong_key_is_rejected() {
        let long = "k".repeat(MAX_KEY_LEN + 1);
        assert_matches!(
            IdempotencyKey::parse(Some(&long)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn key_is_trimmed() {
        assert_eq!(key("  abc ").as_str(), "abc");
    }

    #[tokio::test]
    async fn stored_result_is_replayed() {
        let guard = IdempotencyGuard::new(Arc::new(MemoryCache::new()), "upgrade");
        let receipt = Receipt {
            tx_id: "tx-1".into(),
            success: true,
        };
        assert_eq!(guard.lookup::<Receipt>(1, &key("a")).await, None);
        guard.store(1, &key("a"), &receipt).await;
        assert_eq!(guard.lookup::<Receipt>(1, &key("a")).await, Some(receipt));
    }

    #[tokio::test]
    async fn records_are_scoped_per_user_and_token() {
        let guard = IdempotencyGuard::new(Arc::new(MemoryCache::new()), "upgrade");
        let receipt = Receipt {
            tx_id: "tx-1".into(),
            success: false,
        };
        guard.store(1, &key("a"), &receipt).await;
        assert_eq!(guard.lookup::<Receipt>(2, &key("a")).await, None);
        assert_eq!(guard.lookup::<Receipt>(1, &key("b")).await, None);
    }

    #[tokio::test]
    async fn expired_record_is_a_miss() {
        let guard = IdempotencyGuard::new(Arc::new(MemoryCache::new()), "upgrade")
            .with_ttls(Duration::ZERO, DEFAULT_LOCK_TTL);
        let receipt = Receipt {
            tx_id: "tx-1".into(),
            success: true,
        };
        guard.store(1, &key("a"), &receipt).await;
        assert_eq!(guard.lookup::<Receipt>(1, &key("a")).await, None);
    }

    #[tokio::test]
    async fn undecodable_record_is_a_miss() {
        let cache = Arc::new(MemoryCache::new());
        let guard = IdempotencyGuard::new(cache.clone(), "upgrade");
        cache
            .set(&guard.record_key(1, &key("a")), "not json", DEFAULT_RECORD_TTL)
            .await;
        assert_eq!(guard.lookup::<Receipt>(1, &key("a")).await, None);
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let guard = IdempotencyGuard::new(Arc::new(MemoryCache::new()), "upgrade");
        assert_eq!(guard.acquire(1, &key("a")).await, LockOutcome::Acquired);
        assert_eq!(guard.acquire(1, &key("a")).await, LockOutcome::InFlight);
        assert_eq!(guard.acquire(1, &key("b")).await, LockOutcome::Acquired);
        guard.release(1, &key("a")).await;
        assert_eq!(guard.acquire(1, &key("a")).await, LockOutcome::Acquired);
    }

    #[tokio::test]
    async fn disconnected_cache_fails_open() {
        let guard = IdempotencyGuard::new(Arc::new(DisconnectedCache), "upgrade");
        let receipt = Receipt {
            tx_id: "tx-1".into(),
            success: true,
        };
        guard.store(1, &key("a"), &receipt).await;
        assert_eq!(guard.lookup::<Receipt>(1, &key("a")).await, None);
        assert_eq!(guard.acquire(1, &key("a")).await, LockOutcome::Unavailable);
    }
}
