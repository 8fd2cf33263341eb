//! Inventory ledger tests
//!
//! Covers the clamp-at-zero policy, the 2-decimal rounding of stored
//! quantities, lookup semantics, and serialization of concurrent
//! adjustments against the same item.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use brewpos_backend::error::AppError;
use brewpos_backend::services::inventory::{InventoryItemInput, InventoryService, StockLocks};
use brewpos_backend::store::{MemoryStore, Store};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn ledger() -> InventoryService {
    let store: Store = Arc::new(MemoryStore::new());
    InventoryService::new(store, StockLocks::new())
}

fn input(name: &str, quantity: &str) -> InventoryItemInput {
    InventoryItemInput {
        name: name.to_string(),
        description: None,
        supplier_id: Uuid::new_v4(),
        category_id: None,
        quantity: dec(quantity),
        unit: Some("ml".to_string()),
        base_unit: None,
        pieces_per_unit: None,
        reorder_point: None,
    }
}

#[tokio::test]
async fn test_adjust_adds_stock() {
    let ledger = ledger();
    let item = ledger.create(input("Milk", "100")).await.unwrap();

    let adjusted = ledger.adjust(item.id, dec("25.5")).await.unwrap();
    assert_eq!(adjusted.quantity, dec("125.5"));
    assert_eq!(ledger.get(item.id).await.unwrap().quantity, dec("125.5"));
}

#[tokio::test]
async fn test_adjust_clamps_at_zero() {
    let ledger = ledger();
    let item = ledger.create(input("Milk", "5")).await.unwrap();

    // removing far more than available floors at zero instead of erroring
    let adjusted = ledger.adjust(item.id, dec("-1000")).await.unwrap();
    assert_eq!(adjusted.quantity, Decimal::ZERO);
    assert_eq!(ledger.get(item.id).await.unwrap().quantity, Decimal::ZERO);
}

#[tokio::test]
async fn test_adjust_rounds_to_two_decimals() {
    let ledger = ledger();
    let item = ledger.create(input("Syrup", "1")).await.unwrap();

    let adjusted = ledger.adjust(item.id, dec("0.005")).await.unwrap();
    assert_eq!(adjusted.quantity, dec("1.01"));

    let adjusted = ledger.adjust(item.id, dec("-0.004")).await.unwrap();
    assert_eq!(adjusted.quantity, dec("1.01"));
}

#[tokio::test]
async fn test_set_stock_clamps_negative_to_zero() {
    let ledger = ledger();
    let item = ledger.create(input("Beans", "50")).await.unwrap();

    let set = ledger
        .set_stock(item.id, dec("-10"), Some("recount".to_string()))
        .await
        .unwrap();
    assert_eq!(set.quantity, Decimal::ZERO);
}

#[tokio::test]
async fn test_set_stock_rounds_and_persists() {
    let ledger = ledger();
    let item = ledger.create(input("Beans", "50")).await.unwrap();

    let set = ledger.set_stock(item.id, dec("12.345"), None).await.unwrap();
    assert_eq!(set.quantity, dec("12.35"));
    assert_eq!(ledger.get(item.id).await.unwrap().quantity, dec("12.35"));
}

#[tokio::test]
async fn test_get_by_name_is_case_insensitive() {
    let ledger = ledger();
    ledger.create(input("Oat Milk", "10")).await.unwrap();

    let found = ledger.get_by_name("oat milk").await.unwrap();
    assert_eq!(found.name, "Oat Milk");

    let missing = ledger.get_by_name("almond milk").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_adjust_missing_item_is_not_found() {
    let ledger = ledger();
    let result = ledger.adjust(Uuid::new_v4(), dec("-1")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_removes_item() {
    let ledger = ledger();
    let item = ledger.create(input("Cups", "100")).await.unwrap();

    ledger.delete(item.id).await.unwrap();
    assert!(matches!(
        ledger.get(item.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_rejects_negative_quantity() {
    let ledger = ledger();
    let result = ledger.create(input("Bad", "-1")).await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_create_rejects_non_positive_pieces_per_unit() {
    let ledger = ledger();
    let mut bad = input("Bags", "10");
    bad.pieces_per_unit = Some(Decimal::ZERO);
    let result = ledger.create(bad).await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[tokio::test]
async fn test_low_stock_uses_reorder_point_with_default() {
    let ledger = ledger();

    // default threshold is 10
    ledger.create(input("Low by default", "5")).await.unwrap();
    ledger.create(input("Fine by default", "50")).await.unwrap();

    let mut custom = input("Low by custom point", "50");
    custom.reorder_point = Some(dec("100"));
    ledger.create(custom).await.unwrap();

    let low = ledger.list_low_stock().await.unwrap();
    let names: Vec<&str> = low.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Low by custom point", "Low by default"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_adjustments_lose_no_decrements() {
    let ledger = ledger();
    let item = ledger.create(input("Beans", "10")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let ledger = ledger.clone();
        let id = item.id;
        handles.push(tokio::spawn(async move {
            ledger.adjust(id, Decimal::from(-2)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // a lost update would leave more than 2 behind
    assert_eq!(ledger.get(item.id).await.unwrap().quantity, dec("2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_overconsumption_never_goes_negative() {
    let ledger = ledger();
    let item = ledger.create(input("Beans", "10")).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = ledger.clone();
        let id = item.id;
        handles.push(tokio::spawn(async move {
            ledger.adjust(id, Decimal::from(-2)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(ledger.get(item.id).await.unwrap().quantity, Decimal::ZERO);
}
