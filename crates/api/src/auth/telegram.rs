//! Abuse controls for Telegram sign-in.
//!
//! Both checks are cache-backed. When the cache is unreachable they let the
//! request through, since the signature and freshness checks still apply.

use std::time::Duration;

use vortex_core::cache::KeyValueCache;
use vortex_core::error::CoreError;
use vortex_core::telegram::TelegramIdentity;

/// Sign-in attempts allowed per client IP within [`RATE_LIMIT_WINDOW`].
pub const RATE_LIMIT_MAX: u32 = 10;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// How long a used `initData` signature is remembered.
pub const REPLAY_WINDOW: Duration = Duration::from_secs(3600);

/// Count one sign-in attempt for `client_ip`.
///
/// Fails with [`CoreError::RateLimited`] once the window's budget is spent.
/// Each counted attempt restarts the window.
pub async fn enforce_rate_limit(
    cache: &dyn KeyValueCache,
    client_ip: &str,
) -> Result<(), CoreError> {
    if client_ip.is_empty() {
        return Ok(());
    }
    let key = format!("rl:auth:{client_ip}");
    let current = match cache.get(&key).await {
        None => 0,
        Some(raw) => raw.parse::<u32>().unwrap_or(0),
    };
    if current >= RATE_LIMIT_MAX {
        return Err(CoreError::RateLimited(
            "Too many auth attempts, slow down".into(),
        ));
    }
    cache
        .set(&key, &(current + 1).to_string(), RATE_LIMIT_WINDOW)
        .await;
    Ok(())
}

/// Reject an `initData` payload that was already used to sign in.
pub async fn check_replay(
    cache: &dyn KeyValueCache,
    identity: &TelegramIdentity,
) -> Result<(), CoreError> {
    let signature: String = identity.hash.chars().take(16).collect();
    let key = format!(
        "replay:tg:{}:{}:{signature}",
        identity.telegram_id, identity.auth_date
    );
    if cache.exists(&key).await {
        return Err(CoreError::Unauthorized("Replay detected".into()));
    }
    cache.set(&key, "1", REPLAY_WINDOW).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vortex_core::cache::{DisconnectedCache, MemoryCache};

    use super::*;

    fn identity(hash: &str) -> TelegramIdentity {
        TelegramIdentity {
            telegram_id: 7,
            username: None,
            auth_date: 1_700_000_000,
            hash: hash.into(),
        }
    }

    #[tokio::test]
    async fn eleventh_attempt_is_rate_limited() {
        let cache = MemoryCache::new();
        for _ in 0..RATE_LIMIT_MAX {
            enforce_rate_limit(&cache, "10.0.0.1").await.unwrap();
        }
        assert_matches!(
            enforce_rate_limit(&cache, "10.0.0.1").await,
            Err(CoreError::RateLimited(_))
        );
        enforce_rate_limit(&cache, "10.0.0.2").await.unwrap();
    }

    #[tokio::test]
    async fn second_use_of_a_signature_is_a_replay() {
        let cache = MemoryCache::new();
        check_replay(&cache, &identity("abcdef0123456789ffff")).await.unwrap();
        assert_matches!(
            check_replay(&cache, &identity("abcdef0123456789ffff")).await,
            Err(CoreError::Unauthorized(_))
        );
        check_replay(&cache, &identity("0000000000000000ffff")).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_cache_lets_requests_through() {
        let cache = DisconnectedCache;
        for _ in 0..=RATE_LIMIT_MAX {
            enforce_rate_limit(&cache, "10.0.0.1").await.unwrap();
        }
        check_replay(&cache, &identity("aa")).await.unwrap();
        check_replay(&cache, &identity("aa")).await.unwrap();
    }
}
