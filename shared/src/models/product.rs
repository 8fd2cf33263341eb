//! Product and category models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A menu category (e.g., "Espresso Drinks", "Pastries")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// One inventory requirement of a product recipe
///
/// The quantity is per single unit of the product and may be expressed in
/// any unit compatible with the inventory item's stocking unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeItem {
    pub inventory_id: Uuid,
    pub quantity: Decimal,
    /// Unit of measurement for this requirement (e.g., "ml", "tbsp", "pieces")
    pub unit: Option<String>,
}

/// A priced menu item, optionally backed by a recipe of inventory requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    /// Inventory requirements per unit sold. Empty means always available.
    #[serde(default)]
    pub recipe: Vec<RecipeItem>,
}

impl Product {
    pub fn has_recipe(&self) -> bool {
        !self.recipe.is_empty()
    }
}
