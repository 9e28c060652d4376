//! Redis-backed [`KeyValueCache`].
//!
//! The connection is established explicitly by the process entry point and
//! re-established lazily after a failure. Every Redis error is logged and
//! degraded to a miss or a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use vortex_core::cache::KeyValueCache;

/// Wait after a failed connect before the next attempt.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

pub struct RedisCache {
    client: redis::Client,
    /// Never held across an await.
    connection: Mutex<Option<ConnectionManager>>,
    connected: AtomicBool,
    /// Set while one caller is connecting. Others skip the cache meanwhile.
    reconnecting: AtomicBool,
    retry_after: Mutex<Option<Instant>>,
    prefix: String,
}

/// Clears the reconnect flag even if the connecting caller is dropped.
struct ReconnectSlot<'a>(&'a AtomicBool);

impl Drop for ReconnectSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RedisCache {
    /// Create an unconnected cache for `url`. Fails only on a malformed URL.
    pub fn new(url: &str, prefix: String) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            connected: AtomicBool::new(false),
            reconnecting: AtomicBool::new(false),
            retry_after: Mutex::new(None),
            prefix,
        })
    }

    /// Open the connection. The server keeps running on failure; operations
    /// retry the connection on demand.
    pub async fn connect(&self) -> Result<(), redis::RedisError> {
        match self.client.get_connection_manager_with_config(manager_config()).await {
            Ok(manager) => {
                self.install(manager);
                Ok(())
            }
            Err(err) => {
                self.back_off();
                Err(err)
            }
        }
    }

    /// Drop the connection.
    pub async fn disconnect(&self) {
        locked(&self.connection).take();
        self.connected.store(false, Ordering::Relaxed);
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn install(&self, manager: ConnectionManager) {
        *locked(&self.connection) = Some(manager);
        *locked(&self.retry_after) = None;
        self.connected.store(true, Ordering::Relaxed);
    }

    fn back_off(&self) {
        *locked(&self.retry_after) = Some(Instant::now() + RECONNECT_BACKOFF);
        self.connected.store(false, Ordering::Relaxed);
    }

    fn backing_off(&self) -> bool {
        locked(&self.retry_after).is_some_and(|at| Instant::now() < at)
    }

    /// A handle to the shared connection, reconnecting if needed.
    ///
    /// Only one caller connects at a time and the lock is not held while it
    /// does. Everyone else gets `None` until the connection is back.
    async fn handle(&self) -> Option<ConnectionManager> {
        if let Some(conn) = locked(&self.connection).clone() {
            return Some(conn);
        }
        if self.backing_off() {
            return None;
        }
        if self
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let _slot = ReconnectSlot(&self.reconnecting);

        match self.client.get_connection_manager_with_config(manager_config()).await {
            Ok(manager) => {
                self.install(manager.clone());
                Some(manager)
            }
            Err(err) => {
                tracing::warn!("Redis cache connection failed: {err}");
                self.back_off();
                None
            }
        }
    }

    fn reset(&self, op: &'static str, err: redis::RedisError) {
        tracing::warn!(op, "Redis cache {op} failed: {err}");
        locked(&self.connection).take();
        self.connected.store(false, Ordering::Relaxed);
    }
}

/// Short timeouts and a single retry: an outage must not stall requests.
fn manager_config() -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_secs(2))
        .set_response_timeout(Duration::from_secs(2))
}

/// Expiry in whole seconds; Redis rejects zero.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.handle().await?;
        let result: redis::RedisResult<Option<String>> = conn.get(self.key(key)).await;
        match result {
            Ok(value) => value,
            Err(err) => {
                self.reset("get", err);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let Some(mut conn) = self.handle().await else {
            return;
        };
        let result: redis::RedisResult<()> = conn.set_ex(self.key(key), value, ttl_secs(ttl)).await;
        if let Err(err) = result {
            self.reset("set", err);
        }
    }

    async fn delete(&self, key: &str) {
        let Some(mut conn) = self.handle().await else {
            return;
        };
        let result: redis::RedisResult<()> = conn.del(self.key(key)).await;
        if let Err(err) = result {
            self.reset("delete", err);
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let Some(mut conn) = self.handle().await else {
            return false;
        };
        let result: redis::RedisResult<bool> = conn.exists(self.key(key)).await;
        match result {
            Ok(found) => found,
            Err(err) => {
                self.reset("exists", err);
                false
            }
        }
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Option<bool> {
        let mut conn = self.handle().await?;
        // SET NX EX replies OK when stored and nil when the key exists.
        let result: redis::RedisResult<Option<String>> = redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await;
        match result {
            Ok(reply) => Some(reply.is_some()),
            Err(err) => {
                self.reset("set_if_absent", err);
                None
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
