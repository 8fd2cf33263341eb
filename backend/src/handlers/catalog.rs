//! HTTP handlers for product and category endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{Category, Product};
use crate::services::catalog::{CatalogService, CategoryInput, ProductInput, ProductWithAvailability};
use crate::services::inventory::InventoryService;
use crate::AppState;

/// Availability of a single product
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub product_id: Uuid,
    pub available: bool,
}

fn catalog_service(state: &AppState) -> CatalogService {
    let ledger = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    CatalogService::new(state.store.clone(), ledger)
}

/// List all products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let products = catalog_service(&state).list_products().await?;
    Ok(Json(products))
}

/// List all products decorated with availability, for the POS grid
pub async fn list_products_with_availability(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductWithAvailability>>> {
    let products = catalog_service(&state).list_with_availability().await?;
    Ok(Json(products))
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let product = catalog_service(&state).get_product(product_id).await?;
    Ok(Json(product))
}

/// Availability of a single product
pub async fn get_product_availability(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<AvailabilityResponse>> {
    let available = catalog_service(&state).is_available(product_id).await?;
    Ok(Json(AvailabilityResponse {
        product_id,
        available,
    }))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let product = catalog_service(&state).create_product(input).await?;
    Ok(Json(product))
}

/// Replace a product, including its recipe
pub async fn update_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let product = catalog_service(&state)
        .update_product(product_id, input)
        .await?;
    Ok(Json(product))
}

/// Delete a product (admin only)
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    catalog_service(&state).delete_product(product_id).await?;
    Ok(Json(()))
}

/// List all categories
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let categories = catalog_service(&state).list_categories().await?;
    Ok(Json(categories))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let category = catalog_service(&state).create_category(input).await?;
    Ok(Json(category))
}
