//! Inventory ledger service
//!
//! Owns all mutation of stock quantities. Adjustments are additive, clamp at
//! zero rather than erroring, and every stored quantity is rounded to 2
//! decimal places after mutation. Read-modify-write cycles are serialized
//! per item through an in-process lock; a writer on another backend instance
//! can still race, in which case the store's last write wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use shared::models::InventoryItem;
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::store::{self, collections, Store};

/// Per-item mutexes serializing stock read-modify-write cycles
#[derive(Clone, Default)]
pub struct StockLocks {
    inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl StockLocks {
    pub fn new() -> Self {
        Self::default()
    }

    async fn acquire(&self, inventory_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .entry(inventory_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// Inventory service owning stock levels
#[derive(Clone)]
pub struct InventoryService {
    store: Store,
    locks: StockLocks,
}

/// Input for creating or replacing an inventory item
#[derive(Debug, Deserialize)]
pub struct InventoryItemInput {
    pub name: String,
    pub description: Option<String>,
    pub supplier_id: Uuid,
    pub category_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub base_unit: Option<String>,
    pub pieces_per_unit: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
}

/// Stored quantities are kept at 2 decimal places, halves away from zero
fn round_stock(quantity: Decimal) -> Decimal {
    quantity.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: Store, locks: StockLocks) -> Self {
        Self { store, locks }
    }

    /// List all inventory items, sorted by name
    pub async fn list(&self) -> AppResult<Vec<InventoryItem>> {
        let mut items: Vec<InventoryItem> =
            store::fetch_all(self.store.as_ref(), collections::INVENTORY).await?;
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }

    /// Snapshot of all inventory items keyed by id
    pub async fn items_by_id(&self) -> AppResult<HashMap<Uuid, InventoryItem>> {
        let items: Vec<InventoryItem> =
            store::fetch_all(self.store.as_ref(), collections::INVENTORY).await?;
        Ok(items.into_iter().map(|item| (item.id, item)).collect())
    }

    /// Get an inventory item by id
    pub async fn get(&self, inventory_id: Uuid) -> AppResult<InventoryItem> {
        store::fetch_one(
            self.store.as_ref(),
            collections::INVENTORY,
            &inventory_id.to_string(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// Get an inventory item by exact name, case-insensitively
    pub async fn get_by_name(&self, name: &str) -> AppResult<InventoryItem> {
        let items: Vec<InventoryItem> =
            store::fetch_all(self.store.as_ref(), collections::INVENTORY).await?;
        items
            .into_iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// Create a new inventory item
    pub async fn create(&self, input: InventoryItemInput) -> AppResult<InventoryItem> {
        Self::validate(&input)?;

        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            supplier_id: input.supplier_id,
            category_id: input.category_id,
            quantity: round_stock(input.quantity),
            unit: input.unit,
            base_unit: input.base_unit,
            pieces_per_unit: input.pieces_per_unit,
            reorder_point: input.reorder_point,
            last_updated: Utc::now(),
        };

        store::put(
            self.store.as_ref(),
            collections::INVENTORY,
            &item.id.to_string(),
            &item,
        )
        .await?;
        Ok(item)
    }

    /// Replace an inventory item wholesale
    pub async fn update(
        &self,
        inventory_id: Uuid,
        input: InventoryItemInput,
    ) -> AppResult<InventoryItem> {
        Self::validate(&input)?;

        let _guard = self.locks.acquire(inventory_id).await;
        self.get(inventory_id).await?;

        let item = InventoryItem {
            id: inventory_id,
            name: input.name,
            description: input.description,
            supplier_id: input.supplier_id,
            category_id: input.category_id,
            quantity: round_stock(input.quantity.max(Decimal::ZERO)),
            unit: input.unit,
            base_unit: input.base_unit,
            pieces_per_unit: input.pieces_per_unit,
            reorder_point: input.reorder_point,
            last_updated: Utc::now(),
        };

        store::put(
            self.store.as_ref(),
            collections::INVENTORY,
            &inventory_id.to_string(),
            &item,
        )
        .await?;
        Ok(item)
    }

    /// Additively adjust stock, clamping at zero
    ///
    /// Requesting to remove more than is available succeeds and floors the
    /// quantity at zero; the clamp is silent.
    pub async fn adjust(&self, inventory_id: Uuid, delta: Decimal) -> AppResult<InventoryItem> {
        let _guard = self.locks.acquire(inventory_id).await;

        let key = inventory_id.to_string();
        let mut item: InventoryItem =
            store::fetch_one(self.store.as_ref(), collections::INVENTORY, &key)
                .await?
                .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let quantity = round_stock((item.quantity + delta).max(Decimal::ZERO));
        let now = Utc::now();

        store::patch(
            self.store.as_ref(),
            collections::INVENTORY,
            &key,
            json!({ "quantity": quantity, "last_updated": now }),
        )
        .await?;

        item.quantity = quantity;
        item.last_updated = now;
        Ok(item)
    }

    /// Set stock to an absolute level, clamping at zero
    ///
    /// `reason` is recorded in the log only; it is not validated or stored.
    pub async fn set_stock(
        &self,
        inventory_id: Uuid,
        quantity: Decimal,
        reason: Option<String>,
    ) -> AppResult<InventoryItem> {
        let _guard = self.locks.acquire(inventory_id).await;

        let key = inventory_id.to_string();
        let mut item: InventoryItem =
            store::fetch_one(self.store.as_ref(), collections::INVENTORY, &key)
                .await?
                .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let quantity = round_stock(quantity.max(Decimal::ZERO));
        let now = Utc::now();

        store::patch(
            self.store.as_ref(),
            collections::INVENTORY,
            &key,
            json!({ "quantity": quantity, "last_updated": now }),
        )
        .await?;

        tracing::info!(
            %inventory_id,
            %quantity,
            reason = reason.as_deref().unwrap_or("not given"),
            "stock level set manually"
        );

        item.quantity = quantity;
        item.last_updated = now;
        Ok(item)
    }

    /// Delete an inventory item
    ///
    /// Recipes referencing the item are not checked here; checkout tolerates
    /// dangling references by skipping them.
    pub async fn delete(&self, inventory_id: Uuid) -> AppResult<()> {
        self.get(inventory_id).await?;
        self.store
            .delete_one(collections::INVENTORY, &inventory_id.to_string())
            .await?;
        Ok(())
    }

    /// Items below their reorder threshold
    pub async fn list_low_stock(&self) -> AppResult<Vec<InventoryItem>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|item| item.is_low_stock())
            .collect())
    }

    fn validate(input: &InventoryItemInput) -> AppResult<()> {
        validation::validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        validation::validate_non_negative_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;
        validation::validate_pieces_per_unit(input.pieces_per_unit)
            .map_err(|msg| AppError::validation("pieces_per_unit", msg))?;
        Ok(())
    }
}
