//! HTTP handlers for supplier management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::Supplier;
use crate::services::supplier::{SupplierInput, SupplierService};
use crate::AppState;

/// List all suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.store.clone());
    let suppliers = service.list().await?;
    Ok(Json(suppliers))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.store.clone());
    let supplier = service.create(input).await?;
    Ok(Json(supplier))
}

/// Replace a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.store.clone());
    let supplier = service.update(supplier_id, input).await?;
    Ok(Json(supplier))
}

/// Delete a supplier (admin only)
///
/// Blocked while any inventory item references the supplier.
pub async fn delete_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = SupplierService::new(state.store.clone());
    service.delete(supplier_id).await?;
    Ok(Json(()))
}
