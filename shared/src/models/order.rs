//! Order models and checkout totals

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of an order
///
/// `price_at_sale` snapshots the product price at checkout time so later
/// catalog price changes never alter recorded orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub price_at_sale: Decimal,
}

/// Flat-rate discount categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    None,
    Pwd,
    Senior,
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    #[serde(rename = "e-wallet")]
    EWallet,
}

impl PaymentMethod {
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

/// Order lifecycle status. Orders are created directly in `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A completed sale. Orders are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_date: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub employee_id: Uuid,
    pub items: Vec<OrderItem>,

    // Financials
    pub subtotal: Decimal,
    pub discount_type: DiscountType,
    pub discount_amount: Decimal,
    /// Final amount after discount
    pub total_amount: Decimal,

    // Payment
    pub payment_method: PaymentMethod,
    /// For card/e-wallet
    pub transaction_reference: Option<String>,
    /// For cash
    pub amount_tendered: Option<Decimal>,
    /// For cash
    pub change: Option<Decimal>,

    pub status: OrderStatus,
}

/// Totals computed for a cart at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

/// Round a money amount to 2 decimal places, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute checkout totals for a set of order items
///
/// Tax is a flat 8% on the subtotal; the PWD/senior discount is a flat 20%
/// off the post-tax total.
pub fn calculate_totals(items: &[OrderItem], discount_type: DiscountType) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| item.price_at_sale * Decimal::from(item.quantity))
        .sum();
    let subtotal = round_money(subtotal);

    let tax = round_money(subtotal * Decimal::new(8, 2));
    let pre_discount_total = subtotal + tax;

    let discount_amount = if discount_type == DiscountType::None {
        Decimal::ZERO
    } else {
        round_money(pre_discount_total * Decimal::new(20, 2))
    };

    OrderTotals {
        subtotal,
        tax,
        discount_amount,
        total_amount: pre_discount_total - discount_amount,
    }
}
