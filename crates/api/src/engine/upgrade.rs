//! Upgrade transaction orchestrator.
//!
//! Order of operations for one request:
//!
//! 1. Validate the `Idempotency-Key` and the source instance id (no I/O).
//! 2. Replay a stored response for `(user, key)` if one exists.
//! 3. Take the per-key in-flight lock (skipped when the cache is down).
//! 4. Resolve the caller's inventory, the source item and both gifts.
//! 5. Compute the chance and draw the wheel outcome.
//! 6. Settle atomically: consume the source, append the ledger entry,
//!    credit the target on success.
//! 7. Store the response under the idempotency key and release the lock.
//!
//! Steps 3 to 7 run on a spawned task. Dropping the caller (client
//! disconnect, request timeout) cannot stop a settled upgrade short of
//! storing its response and releasing the lock.
//!
//! The replay check runs before the store-backed validation, so a retry that
//! arrives after the source row was consumed still gets the original
//! response instead of a not-found.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use vortex_core::error::CoreError;
use vortex_core::fairness::FairnessSeed;
use vortex_core::idempotency::{IdempotencyGuard, IdempotencyKey, LockOutcome};
use vortex_core::inventory::{
    format_instance_id, parse_instance_id, upgrade_description, LEDGER_STATUS_COMPLETED,
    LEDGER_TYPE_UPGRADE,
};
use vortex_core::types::{DbId, Timestamp};
use vortex_core::upgrade::{generate_wheel_outcome, upgrade_chance};
use vortex_db::models::gift::Gift;
use vortex_db::models::inventory::InventoryItem;
use vortex_db::models::ledger::CreateLedgerEntry;
use vortex_db::models::upgrade::{SettledUpgrade, UpgradeSettlement};
use vortex_db::repositories::{GiftRepo, InventoryItemRepo, InventoryRepo, UpgradeRepo};
use vortex_db::DbPool;

use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /upgrade/`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    /// Public id of the inventory row to consume, e.g. `inv_42`.
    #[validate(length(min = 1, max = 64))]
    pub source_instance_id: String,
    #[validate(range(min = 1))]
    pub target_gift_id: DbId,
    /// Optional client contribution to the draw's seed, at most
    /// [`vortex_core::fairness::MAX_CLIENT_SEED_LEN`] bytes.
    #[validate(length(max = 64))]
    pub client_seed: Option<String>,
}

/// The item credited by a successful upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub instance_id: String,
    pub gift_id: DbId,
    pub name: String,
    pub price: f64,
}

/// Response of `POST /upgrade/`. Stored verbatim for idempotent replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    pub tx_id: String,
    pub chance: f64,
    pub success: bool,
    pub final_angle: f64,
    pub rotation_spins: u32,
    /// Present on success only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_item: Option<NewItem>,
    pub consumed_instance_id: String,
    pub server_time: Timestamp,
}

// ---------------------------------------------------------------------------
// Store capability
// ---------------------------------------------------------------------------

/// Storage operations the orchestrator needs.
#[async_trait]
pub trait UpgradeStore: Send + Sync {
    /// The caller's inventory id, creating the inventory on first use.
    async fn inventory_id(&self, user_id: DbId) -> AppResult<DbId>;

    /// An item that belongs to `inventory_id`.
    async fn source_item(
        &self,
        inventory_id: DbId,
        item_id: DbId,
    ) -> AppResult<Option<InventoryItem>>;

    async fn gift(&self, gift_id: DbId) -> AppResult<Option<Gift>>;

    /// Apply the outcome atomically. `None` when the source unit is gone.
    async fn settle(&self, settlement: &UpgradeSettlement) -> AppResult<Option<SettledUpgrade>>;
}

#[async_trait]
impl<T: UpgradeStore + ?Sized> UpgradeStore for std::sync::Arc<T> {
    async fn inventory_id(&self, user_id: DbId) -> AppResult<DbId> {
        (**self).inventory_id(user_id).await
    }

    async fn source_item(
        &self,
        inventory_id: DbId,
        item_id: DbId,
    ) -> AppResult<Option<InventoryItem>> {
        (**self).source_item(inventory_id, item_id).await
    }

    async fn gift(&self, gift_id: DbId) -> AppResult<Option<Gift>> {
        (**self).gift(gift_id).await
    }

    async fn settle(&self, settlement: &UpgradeSettlement) -> AppResult<Option<SettledUpgrade>> {
        (**self).settle(settlement).await
    }
}

/// PostgreSQL-backed [`UpgradeStore`].
#[derive(Clone)]
pub struct PgUpgradeStore {
    pool: DbPool,
}

impl PgUpgradeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UpgradeStore for PgUpgradeStore {
    async fn inventory_id(&self, user_id: DbId) -> AppResult<DbId> {
        Ok(InventoryRepo::get_or_create(&self.pool, user_id).await?.id)
    }

    async fn source_item(
        &self,
        inventory_id: DbId,
        item_id: DbId,
    ) -> AppResult<Option<InventoryItem>> {
        Ok(InventoryItemRepo::find_in_inventory(&self.pool, inventory_id, item_id).await?)
    }

    async fn gift(&self, gift_id: DbId) -> AppResult<Option<Gift>> {
        Ok(GiftRepo::find_by_id(&self.pool, gift_id).await?)
    }

    async fn settle(&self, settlement: &UpgradeSettlement) -> AppResult<Option<SettledUpgrade>> {
        Ok(UpgradeRepo::settle(&self.pool, settlement).await?)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct UpgradeEngine<S> {
    store: S,
    guard: IdempotencyGuard,
}

impl<S: UpgradeStore + Clone + 'static> UpgradeEngine<S> {
    pub fn new(store: S, guard: IdempotencyGuard) -> Self {
        Self { store, guard }
    }

    /// Run one upgrade request for `user_id`.
    ///
    /// `idempotency_key` is the raw `Idempotency-Key` header value.
    pub async fn execute(
        &self,
        user_id: DbId,
        idempotency_key: Option<&str>,
        request: &UpgradeRequest,
    ) -> AppResult<UpgradeResponse> {
        let key = IdempotencyKey::parse(idempotency_key)?;
        request.validate()?;
        let source_item_id = parse_instance_id(&request.source_instance_id)?;

        if let Some(stored) = self.guard.lookup::<UpgradeResponse>(user_id, &key).await {
            tracing::info!(user_id, tx_id = %stored.tx_id, "Replaying stored upgrade result");
            return Ok(stored);
        }

        let engine = self.clone();
        let request = request.clone();
        tokio::spawn(async move {
            engine
                .run_exclusive(user_id, key, source_item_id, request)
                .await
        })
        .await
        .map_err(|e| AppError::InternalError(format!("Upgrade task failed: {e}")))?
    }

    async fn run_exclusive(
        &self,
        user_id: DbId,
        key: IdempotencyKey,
        source_item_id: DbId,
        request: UpgradeRequest,
    ) -> AppResult<UpgradeResponse> {
        let lock = self.guard.acquire(user_id, &key).await;
        match lock {
            LockOutcome::InFlight => {
                return Err(AppError::Core(CoreError::Conflict(
                    "An upgrade with this Idempotency-Key is already in progress".into(),
                )));
            }
            LockOutcome::Unavailable => {
                tracing::warn!(user_id, "Cache unavailable, running upgrade without idempotency lock");
            }
            LockOutcome::Acquired => {}
        }

        let result = self.run_locked(user_id, &key, source_item_id, &request).await;

        if lock == LockOutcome::Acquired {
            self.guard.release(user_id, &key).await;
        }
        result
    }

    async fn run_locked(
        &self,
        user_id: DbId,
        key: &IdempotencyKey,
        source_item_id: DbId,
        request: &UpgradeRequest,
    ) -> AppResult<UpgradeResponse> {
        // A holder that finished between our lookup and our acquire has
        // already stored its response.
        if let Some(stored) = self.guard.lookup::<UpgradeResponse>(user_id, key).await {
            return Ok(stored);
        }

        let inventory_id = self.store.inventory_id(user_id).await?;
        let source = self
            .store
            .source_item(inventory_id, source_item_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "InventoryItem",
                id: source_item_id,
            })?;
        if source.quantity <= 0 {
            return Err(CoreError::Conflict("Source item is locked".into()).into());
        }

        let source_gift = self.require_gift(source.gift_id).await?;
        let target_gift = self.require_gift(request.target_gift_id).await?;

        let chance = upgrade_chance(source_gift.price, target_gift.price);
        let seed = FairnessSeed::generate(request.client_seed.as_deref());
        let outcome = generate_wheel_outcome(chance, &mut seed.rng());
        tracing::debug!(
            user_id,
            commitment = %seed.commitment(),
            client_seed = seed.client_seed().unwrap_or(""),
            "Upgrade draw seeded"
        );

        let tx_id = Uuid::new_v4();
        let settlement = UpgradeSettlement {
            inventory_id,
            source_item_id: source.id,
            target_gift_id: target_gift.id,
            success: outcome.success,
            ledger: CreateLedgerEntry {
                user_id,
                reference: tx_id,
                amount: source_gift.price,
                entry_type: LEDGER_TYPE_UPGRADE.to_string(),
                description: Some(upgrade_description(
                    &source_gift.name,
                    &target_gift.name,
                    outcome.success,
                )),
                status: LEDGER_STATUS_COMPLETED.to_string(),
            },
        };

        let settled = self.store.settle(&settlement).await?.ok_or_else(|| {
            CoreError::Conflict("Source item is locked or already consumed".into())
        })?;

        let new_item = match (outcome.success, settled.target_item_id) {
            (true, Some(item_id)) => Some(NewItem {
                instance_id: format_instance_id(item_id),
                gift_id: target_gift.id,
                name: target_gift.name.clone(),
                price: target_gift.price,
            }),
            (true, None) => {
                return Err(AppError::InternalError(
                    "Successful settlement did not credit the target".into(),
                ));
            }
            (false, _) => None,
        };

        let response = UpgradeResponse {
            tx_id: tx_id.to_string(),
            chance,
            success: outcome.success,
            final_angle: outcome.final_angle,
            rotation_spins: outcome.rotation_spins,
            new_item,
            consumed_instance_id: format_instance_id(source.id),
            server_time: Utc::now(),
        };

        self.guard.store(user_id, key, &response).await;

        tracing::info!(
            user_id,
            tx_id = %response.tx_id,
            chance,
            success = response.success,
            source_remaining = settled.source_remaining,
            "Upgrade settled"
        );

        Ok(response)
    }

    async fn require_gift(&self, gift_id: DbId) -> AppResult<Gift> {
        self.store.gift(gift_id).await?.ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Gift",
                id: gift_id,
            })
        })
    }
}
