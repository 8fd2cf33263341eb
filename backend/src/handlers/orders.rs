//! HTTP handlers for order and checkout endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::catalog::CatalogService;
use crate::services::inventory::InventoryService;
use crate::services::order::{CreateOrderInput, OrderService, Receipt};
use crate::AppState;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PaginationQuery {
    fn into_pagination(self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

fn order_service(state: &AppState) -> OrderService {
    let ledger = InventoryService::new(state.store.clone(), state.stock_locks.clone());
    let catalog = CatalogService::new(state.store.clone(), ledger.clone());
    OrderService::new(
        state.store.clone(),
        ledger,
        catalog,
        state.config.checkout.strict_stock,
    )
}

/// Check out the current cart as a completed order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<Order>> {
    let order = order_service(&state)
        .create_order(current_user.0.user_id, input)
        .await?;
    Ok(Json(order))
}

/// List orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PaginationQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let orders = order_service(&state).list(query.into_pagination()).await?;
    Ok(Json(orders))
}

/// Get an order
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = order_service(&state).get(order_id).await?;
    Ok(Json(order))
}

/// Printable receipt for an order
pub async fn get_receipt(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Receipt>> {
    let receipt = order_service(&state).receipt(order_id).await?;
    Ok(Json(receipt))
}
