//! HTTP handlers for inventory management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::InventoryItem;
use crate::services::inventory::{InventoryItemInput, InventoryService};
use crate::AppState;

/// Input for an additive stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub delta: Decimal,
}

/// Input for setting an absolute stock level
#[derive(Debug, Deserialize)]
pub struct SetStockInput {
    pub quantity: Decimal,
    pub reason: Option<String>,
}

/// List all inventory items
pub async fn list_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let items = service.list().await?;
    Ok(Json(items))
}

/// Items below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let items = service.list_low_stock().await?;
    Ok(Json(items))
}

/// Get an inventory item
pub async fn get_inventory_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let item = service.get(inventory_id).await?;
    Ok(Json(item))
}

/// Create an inventory item
pub async fn create_inventory_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<InventoryItemInput>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let item = service.create(input).await?;
    Ok(Json(item))
}

/// Replace an inventory item
pub async fn update_inventory_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<InventoryItemInput>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let item = service.update(inventory_id, input).await?;
    Ok(Json(item))
}

/// Delete an inventory item (admin only)
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    service.delete(inventory_id).await?;
    Ok(Json(()))
}

/// Additively adjust stock; clamps at zero
pub async fn adjust_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<InventoryItem>> {
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let item = service.adjust(inventory_id, input.delta).await?;
    Ok(Json(item))
}

/// Set stock to an absolute level (admin only)
pub async fn set_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(inventory_id): Path<Uuid>,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<InventoryItem>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let item = service
        .set_stock(inventory_id, input.quantity, input.reason)
        .await?;
    Ok(Json(item))
}
