//! Inventory item model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw-material stock item consumed by product recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    /// Name of the inventory item (e.g., "Milk", "Sugar", "Coffee Beans")
    pub name: String,
    pub description: Option<String>,
    /// Supplier for this inventory item
    pub supplier_id: Uuid,
    pub category_id: Option<Uuid>,
    /// Current stock, expressed in `unit`. Never negative.
    pub quantity: Decimal,
    /// Stocking unit (e.g., "bags", "l", "kg"). Defaults to "units".
    pub unit: Option<String>,
    /// Finest-grained unit the item is measured in (e.g., "pieces", "ml", "g")
    pub base_unit: Option<String>,
    /// How many `base_unit` make up one `unit` (e.g., 100 pieces per bag)
    pub pieces_per_unit: Option<Decimal>,
    /// Threshold for low-stock alerts
    pub reorder_point: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// Unit the `quantity` field is expressed in
    pub fn stocking_unit(&self) -> &str {
        self.unit.as_deref().unwrap_or("units")
    }

    /// The base unit if declared, otherwise the stocking unit
    pub fn base_unit(&self) -> &str {
        self.base_unit
            .as_deref()
            .or(self.unit.as_deref())
            .unwrap_or("units")
    }

    /// Reorder threshold, falling back to the platform default of 10
    pub fn reorder_threshold(&self) -> Decimal {
        self.reorder_point.unwrap_or(Decimal::TEN)
    }

    /// Whether current stock has fallen below the reorder threshold
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.reorder_threshold()
    }
}
