use std::sync::Arc;
use std::time::Duration;

use vortex_core::cache::KeyValueCache;
use vortex_core::idempotency::IdempotencyGuard;

use crate::config::ServerConfig;

/// Scope of the idempotency records written by the upgrade endpoint.
pub const UPGRADE_SCOPE: &str = "upgrade";

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vortex_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Key-value cache (Redis or process-local). Never authoritative.
    pub cache: Arc<dyn KeyValueCache>,
}

impl AppState {
    /// Idempotency guard for upgrade requests, with configured TTLs.
    pub fn upgrade_guard(&self) -> IdempotencyGuard {
        IdempotencyGuard::new(Arc::clone(&self.cache), UPGRADE_SCOPE).with_ttls(
            Duration::from_secs(self.config.idempotency.record_ttl_secs),
            Duration::from_secs(self.config.idempotency.lock_ttl_secs),
        )
    }
}
