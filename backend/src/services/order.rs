//! Order checkout service
//!
//! Orders are an append-only log: they are created once, in `completed`
//! status, and never updated or deleted. Creating an order consumes
//! inventory according to each line's product recipe.
//!
//! Consumption is two-phase. The full consumption plan is computed and
//! validated first (resolving products and ingredients, converting every
//! recipe requirement into its inventory item's stocking unit); only then is
//! the order persisted and the plan applied through the ledger, in recipe
//! order. An unconvertible unit therefore rejects the order before anything
//! is written. Missing products or ingredients are tolerated and skipped
//! with a warning.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{
    calculate_totals, round_money, DiscountType, Order, OrderItem, OrderStatus, PaymentMethod,
};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::units;
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::services::catalog::CatalogService;
use crate::services::inventory::InventoryService;
use crate::store::{self, collections, Store};

/// Order service for checkout and order history
#[derive(Clone)]
pub struct OrderService {
    store: Store,
    ledger: InventoryService,
    catalog: CatalogService,
    strict_stock: bool,
}

/// Input for creating an order from a finalized cart
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub payment_method: PaymentMethod,
    /// For card/e-wallet
    pub transaction_reference: Option<String>,
    /// For cash
    pub amount_tendered: Option<Decimal>,
}

/// Resolved payment fields for an order
#[derive(Debug, PartialEq)]
pub struct PaymentDetails {
    pub transaction_reference: Option<String>,
    pub amount_tendered: Option<Decimal>,
    pub change: Option<Decimal>,
}

/// One planned stock deduction
struct Consumption {
    inventory_id: Uuid,
    item_name: String,
    amount: Decimal,
}

/// A printable receipt for a completed order
#[derive(Debug, Serialize)]
pub struct Receipt {
    pub order_id: Uuid,
    pub order_date: chrono::DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount_type: DiscountType,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_tendered: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
}

/// One line of a receipt
#[derive(Debug, Serialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Validate payment fields against the order total
///
/// Cash requires `amount_tendered >= total` and yields change; card and
/// e-wallet require a non-empty transaction reference.
pub fn resolve_payment(
    payment_method: PaymentMethod,
    amount_tendered: Option<Decimal>,
    transaction_reference: Option<&str>,
    total_amount: Decimal,
) -> AppResult<PaymentDetails> {
    if payment_method.is_cash() {
        let tendered = amount_tendered.ok_or_else(|| {
            AppError::validation("amount_tendered", "Amount tendered is required for cash payment")
        })?;
        if tendered < total_amount {
            return Err(AppError::InsufficientTender {
                required: total_amount,
                tendered,
            });
        }
        Ok(PaymentDetails {
            transaction_reference: None,
            amount_tendered: Some(tendered),
            change: Some(tendered - total_amount),
        })
    } else {
        let reference = transaction_reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                AppError::validation(
                    "transaction_reference",
                    "Transaction reference is required for non-cash payment",
                )
            })?;
        Ok(PaymentDetails {
            transaction_reference: Some(reference.to_string()),
            amount_tendered: None,
            change: None,
        })
    }
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(
        store: Store,
        ledger: InventoryService,
        catalog: CatalogService,
        strict_stock: bool,
    ) -> Self {
        Self {
            store,
            ledger,
            catalog,
            strict_stock,
        }
    }

    /// Check out a finalized cart: persist the order and consume inventory
    pub async fn create_order(
        &self,
        employee_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::validation(
                "items",
                "Order must contain at least one item",
            ));
        }
        for item in &input.items {
            if item.quantity == 0 {
                return Err(AppError::validation(
                    "items",
                    "Order item quantity must be positive",
                ));
            }
            validation::validate_price(item.price_at_sale)
                .map_err(|msg| AppError::validation("items", msg))?;
        }

        let totals = calculate_totals(&input.items, input.discount_type);
        let payment = resolve_payment(
            input.payment_method,
            input.amount_tendered,
            input.transaction_reference.as_deref(),
            totals.total_amount,
        )?;

        let plan = self.plan_consumption(&input.items).await?;

        let order = Order {
            id: Uuid::new_v4(),
            order_date: Utc::now(),
            customer_id: input.customer_id,
            employee_id,
            items: input.items,
            subtotal: totals.subtotal,
            discount_type: input.discount_type,
            discount_amount: totals.discount_amount,
            total_amount: totals.total_amount,
            payment_method: input.payment_method,
            transaction_reference: payment.transaction_reference,
            amount_tendered: payment.amount_tendered,
            change: payment.change,
            status: OrderStatus::Completed,
        };

        store::put(
            self.store.as_ref(),
            collections::ORDERS,
            &order.id.to_string(),
            &order,
        )
        .await?;

        self.apply_consumption(&order.id, plan).await?;

        Ok(order)
    }

    /// List orders, newest first
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<Order>> {
        let mut orders: Vec<Order> =
            store::fetch_all(self.store.as_ref(), collections::ORDERS).await?;
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

        let total_items = orders.len() as u64;
        let data = orders
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page.max(1) as usize)
            .collect();

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(pagination, total_items),
        })
    }

    /// Get an order by id
    pub async fn get(&self, order_id: Uuid) -> AppResult<Order> {
        store::fetch_one(
            self.store.as_ref(),
            collections::ORDERS,
            &order_id.to_string(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Build a printable receipt for an order
    pub async fn receipt(&self, order_id: Uuid) -> AppResult<Receipt> {
        let order = self.get(order_id).await?;
        let products = self.catalog.products_by_id().await?;

        let lines = order
            .items
            .iter()
            .map(|item| {
                let name = products
                    .get(&item.product_id)
                    .map(|product| product.name.clone())
                    .unwrap_or_else(|| "Unknown item".to_string());
                ReceiptLine {
                    name,
                    quantity: item.quantity,
                    unit_price: item.price_at_sale,
                    line_total: round_money(
                        item.price_at_sale * Decimal::from(item.quantity),
                    ),
                }
            })
            .collect();

        Ok(Receipt {
            order_id: order.id,
            order_date: order.order_date,
            lines,
            subtotal: order.subtotal,
            tax: round_money(order.subtotal * Decimal::new(8, 2)),
            discount_type: order.discount_type,
            discount_amount: order.discount_amount,
            total_amount: order.total_amount,
            payment_method: order.payment_method,
            transaction_reference: order.transaction_reference,
            amount_tendered: order.amount_tendered,
            change: order.change,
        })
    }

    /// Resolve every recipe requirement of the cart into ledger deductions
    ///
    /// Returns deductions in recipe order. When `strict_stock` is on, the
    /// aggregated requirements are also checked against current stock and
    /// any shortfall rejects the whole cart.
    async fn plan_consumption(&self, items: &[OrderItem]) -> AppResult<Vec<Consumption>> {
        let products = self.catalog.products_by_id().await?;
        let inventory = self.ledger.items_by_id().await?;

        let mut plan = Vec::new();
        for order_item in items {
            let Some(product) = products.get(&order_item.product_id) else {
                tracing::warn!(
                    product_id = %order_item.product_id,
                    "product not found, skipping consumption"
                );
                continue;
            };

            for recipe_item in &product.recipe {
                let Some(item) = inventory.get(&recipe_item.inventory_id) else {
                    tracing::warn!(
                        inventory_id = %recipe_item.inventory_id,
                        product = %product.name,
                        "inventory item not found, skipping ingredient"
                    );
                    continue;
                };

                let converted = units::convert_to_inventory_unit(
                    recipe_item.quantity,
                    recipe_item.unit.as_deref(),
                    item,
                )
                .ok_or_else(|| AppError::IncompatibleUnits {
                    recipe_unit: recipe_item
                        .unit
                        .clone()
                        .unwrap_or_else(|| "units".to_string()),
                    inventory_unit: item.stocking_unit().to_string(),
                })?;

                // Keep extra precision through conversion; the ledger's own
                // 2-decimal rounding applies when the adjustment lands.
                let amount = (converted * Decimal::from(order_item.quantity))
                    .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero);

                plan.push(Consumption {
                    inventory_id: item.id,
                    item_name: item.name.clone(),
                    amount,
                });
            }
        }

        if self.strict_stock {
            let mut required: HashMap<Uuid, Decimal> = HashMap::new();
            for consumption in &plan {
                *required.entry(consumption.inventory_id).or_default() += consumption.amount;
            }
            for (inventory_id, amount) in required {
                let item = &inventory[&inventory_id];
                if item.quantity < amount {
                    return Err(AppError::InsufficientStock {
                        item: item.name.clone(),
                        required: amount,
                        available: item.quantity,
                    });
                }
            }
        }

        Ok(plan)
    }

    /// Apply planned deductions through the ledger, in recipe order
    async fn apply_consumption(&self, order_id: &Uuid, plan: Vec<Consumption>) -> AppResult<()> {
        for consumption in plan {
            match self
                .ledger
                .adjust(consumption.inventory_id, -consumption.amount)
                .await
            {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(
                        %order_id,
                        inventory_id = %consumption.inventory_id,
                        item = %consumption.item_name,
                        "inventory item disappeared during checkout, skipping deduction"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
