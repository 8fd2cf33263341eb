//! Checkout and order tests
//!
//! Exercises the consumption algorithm (two-phase: plan, then persist and
//! apply), totals and payment validation, the default oversell-and-clamp
//! behavior, and the strict-stock rejection mode.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use brewpos_backend::error::AppError;
use brewpos_backend::services::catalog::{CatalogService, ProductInput};
use brewpos_backend::services::inventory::{InventoryItemInput, InventoryService, StockLocks};
use brewpos_backend::services::order::{resolve_payment, CreateOrderInput, OrderService};
use brewpos_backend::store::{MemoryStore, Store};
use shared::models::{DiscountType, OrderItem, OrderStatus, PaymentMethod, RecipeItem};
use shared::types::Pagination;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Fixture {
    ledger: InventoryService,
    catalog: CatalogService,
    orders: OrderService,
}

fn fixture(strict_stock: bool) -> Fixture {
    let store: Store = Arc::new(MemoryStore::new());
    let ledger = InventoryService::new(store.clone(), StockLocks::new());
    let catalog = CatalogService::new(store.clone(), ledger.clone());
    let orders = OrderService::new(store, ledger.clone(), catalog.clone(), strict_stock);
    Fixture {
        ledger,
        catalog,
        orders,
    }
}

fn stock_input(name: &str, quantity: &str, unit: &str) -> InventoryItemInput {
    InventoryItemInput {
        name: name.to_string(),
        description: None,
        supplier_id: Uuid::new_v4(),
        category_id: None,
        quantity: dec(quantity),
        unit: Some(unit.to_string()),
        base_unit: None,
        pieces_per_unit: None,
        reorder_point: None,
    }
}

fn product_input(name: &str, price: &str, recipe: Vec<RecipeItem>) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        price: dec(price),
        category_id: Uuid::new_v4(),
        recipe,
    }
}

fn requirement(inventory_id: Uuid, quantity: &str, unit: &str) -> RecipeItem {
    RecipeItem {
        inventory_id,
        quantity: dec(quantity),
        unit: Some(unit.to_string()),
    }
}

fn cash_order(items: Vec<OrderItem>, tendered: &str) -> CreateOrderInput {
    CreateOrderInput {
        customer_id: None,
        items,
        discount_type: DiscountType::None,
        payment_method: PaymentMethod::Cash,
        transaction_reference: None,
        amount_tendered: Some(dec(tendered)),
    }
}

fn line(product_id: Uuid, quantity: u32, price: &str) -> OrderItem {
    OrderItem {
        product_id,
        quantity,
        price_at_sale: dec(price),
    }
}

// ============================================================================
// Consumption
// ============================================================================

#[tokio::test]
async fn test_checkout_consumes_recipe_inventory() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "1000", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![requirement(milk.id, "200", "ml")],
        ))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 2, "3.50")], "10"),
        )
        .await
        .unwrap();

    // 2 lattes at 200 ml each
    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("600"));

    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.subtotal, dec("7.00"));
    assert_eq!(order.total_amount, dec("7.56"));
    assert_eq!(order.change, Some(dec("2.44")));

    // the order is persisted and readable back
    let stored = f.orders.get(order.id).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].quantity, 2);
}

#[tokio::test]
async fn test_checkout_converts_recipe_units_into_stocking_unit() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "10", "l")).await.unwrap();
    let cortado = f
        .catalog
        .create_product(product_input(
            "Cortado",
            "3.00",
            vec![requirement(milk.id, "1", "cups")],
        ))
        .await
        .unwrap();

    f.orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(cortado.id, 1, "3.00")], "5"),
        )
        .await
        .unwrap();

    // 1 US cup = 0.236588 l; stock rounds to 2 decimals after deduction
    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("9.76"));
}

#[tokio::test]
async fn test_checkout_without_recipe_consumes_nothing() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "500", "ml")).await.unwrap();
    let water = f
        .catalog
        .create_product(product_input("Bottled Water", "1.50", vec![]))
        .await
        .unwrap();

    f.orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(water.id, 3, "1.50")], "10"),
        )
        .await
        .unwrap();

    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("500"));
}

#[tokio::test]
async fn test_missing_ingredient_is_skipped_not_fatal() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "1000", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![
                requirement(Uuid::new_v4(), "1", "pieces"),
                requirement(milk.id, "200", "ml"),
            ],
        ))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 1, "3.50")], "5"),
        )
        .await
        .unwrap();

    // the dangling reference is skipped, the real ingredient is consumed
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("800"));
}

#[tokio::test]
async fn test_incompatible_units_reject_order_before_any_write() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "1000", "ml")).await.unwrap();
    let cups = f
        .ledger
        .create(stock_input("Paper cups", "500", "pieces"))
        .await
        .unwrap();

    // second ingredient is grams against a count-tracked item
    let broken = f
        .catalog
        .create_product(product_input(
            "Broken Drink",
            "4.00",
            vec![
                requirement(milk.id, "200", "ml"),
                requirement(cups.id, "10", "g"),
            ],
        ))
        .await
        .unwrap();

    let result = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(broken.id, 1, "4.00")], "10"),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::IncompatibleUnits { .. })
    ));

    // the plan failed validation, so neither the order nor any earlier
    // ingredient deduction was written
    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("1000"));
    let orders = f.orders.list(Pagination::default()).await.unwrap();
    assert!(orders.data.is_empty());
}

#[tokio::test]
async fn test_oversell_clamps_stock_at_zero_by_default() {
    let f = fixture(false);
    let milk = f.ledger.create(stock_input("Milk", "100", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![requirement(milk.id, "200", "ml")],
        ))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 1, "3.50")], "5"),
        )
        .await
        .unwrap();

    // the order is still recorded as completed while stock floors at zero
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(
        f.ledger.get(milk.id).await.unwrap().quantity,
        Decimal::ZERO
    );
}

// ============================================================================
// Strict stock mode
// ============================================================================

#[tokio::test]
async fn test_strict_stock_rejects_insufficient_inventory() {
    let f = fixture(true);
    let milk = f.ledger.create(stock_input("Milk", "100", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![requirement(milk.id, "200", "ml")],
        ))
        .await
        .unwrap();

    let result = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 1, "3.50")], "5"),
        )
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
    assert_eq!(f.ledger.get(milk.id).await.unwrap().quantity, dec("100"));
    assert!(f
        .orders
        .list(Pagination::default())
        .await
        .unwrap()
        .data
        .is_empty());
}

#[tokio::test]
async fn test_strict_stock_aggregates_requirements_across_lines() {
    let f = fixture(true);
    let milk = f.ledger.create(stock_input("Milk", "300", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![requirement(milk.id, "200", "ml")],
        ))
        .await
        .unwrap();

    // two lattes need 400 ml in total even though each fits alone
    let result = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 2, "3.50")], "10"),
        )
        .await;

    assert!(matches!(result, Err(AppError::InsufficientStock { .. })));
}

#[tokio::test]
async fn test_strict_stock_allows_sufficient_inventory() {
    let f = fixture(true);
    let milk = f.ledger.create(stock_input("Milk", "400", "ml")).await.unwrap();
    let latte = f
        .catalog
        .create_product(product_input(
            "Latte",
            "3.50",
            vec![requirement(milk.id, "200", "ml")],
        ))
        .await
        .unwrap();

    f.orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 2, "3.50")], "10"),
        )
        .await
        .unwrap();

    assert_eq!(
        f.ledger.get(milk.id).await.unwrap().quantity,
        Decimal::ZERO
    );
}

// ============================================================================
// Totals and payment
// ============================================================================

#[tokio::test]
async fn test_senior_discount_totals() {
    let f = fixture(false);
    let cake = f
        .catalog
        .create_product(product_input("Cake Slice", "100", vec![]))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            CreateOrderInput {
                customer_id: None,
                items: vec![line(cake.id, 1, "100")],
                discount_type: DiscountType::Senior,
                payment_method: PaymentMethod::Cash,
                transaction_reference: None,
                amount_tendered: Some(dec("100")),
            },
        )
        .await
        .unwrap();

    // subtotal 100, tax 8, pre-discount 108, discount 21.60
    assert_eq!(order.subtotal, dec("100"));
    assert_eq!(order.discount_amount, dec("21.60"));
    assert_eq!(order.total_amount, dec("86.40"));
    assert_eq!(order.change, Some(dec("13.60")));
}

#[test]
fn test_resolve_payment_cash_rules() {
    // total 50: tendering 40 is rejected, 60 yields 10 change
    let short = resolve_payment(PaymentMethod::Cash, Some(dec("40")), None, dec("50"));
    assert!(matches!(
        short,
        Err(AppError::InsufficientTender { .. })
    ));

    let paid = resolve_payment(PaymentMethod::Cash, Some(dec("60")), None, dec("50")).unwrap();
    assert_eq!(paid.amount_tendered, Some(dec("60")));
    assert_eq!(paid.change, Some(dec("10")));
    assert_eq!(paid.transaction_reference, None);

    let missing = resolve_payment(PaymentMethod::Cash, None, None, dec("50"));
    assert!(matches!(missing, Err(AppError::Validation { .. })));
}

#[test]
fn test_resolve_payment_non_cash_requires_reference() {
    let missing = resolve_payment(PaymentMethod::Card, None, None, dec("50"));
    assert!(matches!(missing, Err(AppError::Validation { .. })));

    let blank = resolve_payment(PaymentMethod::EWallet, None, Some("   "), dec("50"));
    assert!(matches!(blank, Err(AppError::Validation { .. })));

    let paid =
        resolve_payment(PaymentMethod::Card, None, Some(" txn-123 "), dec("50")).unwrap();
    assert_eq!(paid.transaction_reference.as_deref(), Some("txn-123"));
    assert_eq!(paid.amount_tendered, None);
    assert_eq!(paid.change, None);
}

#[tokio::test]
async fn test_insufficient_cash_rejects_order() {
    let f = fixture(false);
    let cake = f
        .catalog
        .create_product(product_input("Cake Slice", "100", vec![]))
        .await
        .unwrap();

    // total is 108 with tax
    let result = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(cake.id, 1, "100")], "100"),
        )
        .await;

    assert!(matches!(result, Err(AppError::InsufficientTender { .. })));
    assert!(f
        .orders
        .list(Pagination::default())
        .await
        .unwrap()
        .data
        .is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let f = fixture(false);
    let result = f
        .orders
        .create_order(Uuid::new_v4(), cash_order(vec![], "10"))
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_zero_quantity_line_is_rejected() {
    let f = fixture(false);
    let result = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(Uuid::new_v4(), 0, "3.50")], "10"),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_price_at_sale_is_snapshotted() {
    let f = fixture(false);
    let latte = f
        .catalog
        .create_product(product_input("Latte", "3.50", vec![]))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 1, "3.50")], "5"),
        )
        .await
        .unwrap();

    // a later price change does not touch the recorded order
    f.catalog
        .update_product(latte.id, product_input("Latte", "4.50", vec![]))
        .await
        .unwrap();

    let stored = f.orders.get(order.id).await.unwrap();
    assert_eq!(stored.items[0].price_at_sale, dec("3.50"));
    assert_eq!(stored.subtotal, dec("3.50"));
}

// ============================================================================
// Listing and receipts
// ============================================================================

#[tokio::test]
async fn test_orders_list_newest_first_with_pagination() {
    let f = fixture(false);
    let water = f
        .catalog
        .create_product(product_input("Bottled Water", "1.50", vec![]))
        .await
        .unwrap();

    for _ in 0..3 {
        f.orders
            .create_order(
                Uuid::new_v4(),
                cash_order(vec![line(water.id, 1, "1.50")], "5"),
            )
            .await
            .unwrap();
    }

    let page = f
        .orders
        .list(Pagination {
            page: 1,
            per_page: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total_items, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert!(page.data[0].order_date >= page.data[1].order_date);

    let last_page = f
        .orders
        .list(Pagination {
            page: 2,
            per_page: 2,
        })
        .await
        .unwrap();
    assert_eq!(last_page.data.len(), 1);
}

#[tokio::test]
async fn test_receipt_resolves_product_names_and_totals() {
    let f = fixture(false);
    let latte = f
        .catalog
        .create_product(product_input("Latte", "3.50", vec![]))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 2, "3.50")], "10"),
        )
        .await
        .unwrap();

    let receipt = f.orders.receipt(order.id).await.unwrap();
    assert_eq!(receipt.lines.len(), 1);
    assert_eq!(receipt.lines[0].name, "Latte");
    assert_eq!(receipt.lines[0].line_total, dec("7.00"));
    assert_eq!(receipt.subtotal, dec("7.00"));
    assert_eq!(receipt.tax, dec("0.56"));
    assert_eq!(receipt.total_amount, dec("7.56"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod totals_properties {
    use super::*;
    use proptest::prelude::*;
    use shared::models::calculate_totals;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    fn cart_strategy() -> impl Strategy<Value = Vec<OrderItem>> {
        prop::collection::vec(
            (price_strategy(), 1u32..=10).prop_map(|(price, quantity)| OrderItem {
                product_id: Uuid::new_v4(),
                quantity,
                price_at_sale: price,
            }),
            1..10,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The discount is always 20% of the post-tax total
        #[test]
        fn prop_discount_is_twenty_percent_of_pre_discount_total(cart in cart_strategy()) {
            let totals = calculate_totals(&cart, DiscountType::Senior);
            let pre_discount = totals.subtotal + totals.tax;
            let expected = (pre_discount * Decimal::new(20, 2))
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
            prop_assert_eq!(totals.discount_amount, expected);
            prop_assert_eq!(totals.total_amount, pre_discount - totals.discount_amount);
        }

        /// Totals are never negative, and the discounted total never exceeds
        /// the undiscounted one
        #[test]
        fn prop_totals_are_ordered(cart in cart_strategy()) {
            let none = calculate_totals(&cart, DiscountType::None);
            let senior = calculate_totals(&cart, DiscountType::Senior);
            prop_assert!(none.total_amount > Decimal::ZERO);
            prop_assert!(senior.total_amount > Decimal::ZERO);
            prop_assert!(senior.total_amount <= none.total_amount);
            prop_assert_eq!(none.discount_amount, Decimal::ZERO);
        }

        /// Sufficient cash always produces non-negative change
        #[test]
        fn prop_cash_change_is_tendered_minus_total(
            cart in cart_strategy(),
            extra in price_strategy()
        ) {
            let totals = calculate_totals(&cart, DiscountType::None);
            let tendered = totals.total_amount + extra;
            let payment = resolve_payment(
                PaymentMethod::Cash,
                Some(tendered),
                None,
                totals.total_amount,
            ).unwrap();
            prop_assert_eq!(payment.change, Some(extra));
        }
    }
}

#[tokio::test]
async fn test_receipt_for_deleted_product_uses_placeholder_name() {
    let f = fixture(false);
    let latte = f
        .catalog
        .create_product(product_input("Latte", "3.50", vec![]))
        .await
        .unwrap();

    let order = f
        .orders
        .create_order(
            Uuid::new_v4(),
            cash_order(vec![line(latte.id, 1, "3.50")], "5"),
        )
        .await
        .unwrap();

    f.catalog.delete_product(latte.id).await.unwrap();

    let receipt = f.orders.receipt(order.id).await.unwrap();
    assert_eq!(receipt.lines[0].name, "Unknown item");
}
