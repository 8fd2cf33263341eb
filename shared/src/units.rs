//! Unit conversion engine
//!
//! Recipes are authored in whatever unit is natural for a chef (tablespoons,
//! shots, pieces) while stock is tracked in whatever unit is natural for
//! purchasing (bags, liters, kg). This module decouples the two: linear
//! conversion within a category goes through the category base unit, and
//! container-to-piece conversion for count units goes through the inventory
//! item's `pieces_per_unit` factor, which is a per-item business fact rather
//! than a physical constant.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::InventoryItem;

/// Measurement categories. Units convert only within their own category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Count,
    Volume,
    Weight,
}

struct UnitDef {
    name: &'static str,
    category: UnitCategory,
    /// Factor to the category base unit, as (mantissa, scale)
    to_base: (i64, u32),
}

impl UnitDef {
    fn factor(&self) -> Decimal {
        Decimal::new(self.to_base.0, self.to_base.1)
    }
}

/// Known units. Base units: pieces (count), ml (volume), g (weight).
/// Count factors are all 1; container sizing is handled via `pieces_per_unit`.
const UNITS: &[UnitDef] = &[
    // Count
    UnitDef { name: "pieces", category: UnitCategory::Count, to_base: (1, 0) },
    UnitDef { name: "units", category: UnitCategory::Count, to_base: (1, 0) },
    UnitDef { name: "boxes", category: UnitCategory::Count, to_base: (1, 0) },
    UnitDef { name: "bags", category: UnitCategory::Count, to_base: (1, 0) },
    UnitDef { name: "scoops", category: UnitCategory::Count, to_base: (1, 0) },
    UnitDef { name: "shots", category: UnitCategory::Count, to_base: (1, 0) },
    // Volume
    UnitDef { name: "ml", category: UnitCategory::Volume, to_base: (1, 0) },
    UnitDef { name: "l", category: UnitCategory::Volume, to_base: (1000, 0) },
    UnitDef { name: "liters", category: UnitCategory::Volume, to_base: (1000, 0) },
    // US cup
    UnitDef { name: "cups", category: UnitCategory::Volume, to_base: (236_588, 3) },
    // US fluid ounce
    UnitDef { name: "fl oz", category: UnitCategory::Volume, to_base: (295_735, 4) },
    UnitDef { name: "tbsp", category: UnitCategory::Volume, to_base: (147_868, 4) },
    UnitDef { name: "tsp", category: UnitCategory::Volume, to_base: (492_892, 5) },
    // "oz" is treated as fluid ounces
    UnitDef { name: "oz", category: UnitCategory::Volume, to_base: (295_735, 4) },
    // Weight
    UnitDef { name: "g", category: UnitCategory::Weight, to_base: (1, 0) },
    UnitDef { name: "kg", category: UnitCategory::Weight, to_base: (1000, 0) },
    UnitDef { name: "lbs", category: UnitCategory::Weight, to_base: (453_592, 3) },
    UnitDef { name: "pounds", category: UnitCategory::Weight, to_base: (453_592, 3) },
];

fn find_unit(unit: &str) -> Option<&'static UnitDef> {
    let needle = unit.trim().to_ascii_lowercase();
    UNITS.iter().find(|def| def.name == needle)
}

/// Category of a unit string, or `None` for unknown units
pub fn unit_category(unit: &str) -> Option<UnitCategory> {
    find_unit(unit).map(|def| def.category)
}

/// Whether two units resolve to the same (known) category
pub fn units_compatible(a: &str, b: &str) -> bool {
    match (unit_category(a), unit_category(b)) {
        (Some(cat_a), Some(cat_b)) => cat_a == cat_b,
        _ => false,
    }
}

/// Convert a value between two units of the same category
///
/// Returns the value unchanged when the units match (case-insensitively),
/// and `None` when either unit is unknown or the categories differ.
pub fn convert_unit(value: Decimal, from: &str, to: &str) -> Option<Decimal> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return None;
    }
    if from.trim().eq_ignore_ascii_case(to.trim()) {
        return Some(value);
    }

    let from_def = find_unit(from)?;
    let to_def = find_unit(to)?;
    if from_def.category != to_def.category {
        return None;
    }

    let base_value = value * from_def.factor();
    Some(base_value / to_def.factor())
}

/// Convert a recipe requirement into the inventory item's stocking unit
///
/// A missing recipe unit defaults to "units". For count units backed by a
/// `pieces_per_unit` factor, container and piece quantities are translated
/// through the item's base unit; volume and weight fall through to the
/// linear table. Returns `None` when the units are incompatible.
pub fn convert_to_inventory_unit(
    recipe_quantity: Decimal,
    recipe_unit: Option<&str>,
    item: &InventoryItem,
) -> Option<Decimal> {
    let recipe_unit = recipe_unit.unwrap_or("units");
    let inventory_unit = item.stocking_unit();

    if recipe_unit.eq_ignore_ascii_case(inventory_unit) {
        return Some(recipe_quantity);
    }
    if !units_compatible(recipe_unit, inventory_unit) {
        return None;
    }

    if unit_category(recipe_unit) == Some(UnitCategory::Count) {
        if let Some(ppu) = item.pieces_per_unit.filter(|p| *p > Decimal::ZERO) {
            let base = item.base_unit();
            let recipe_is_base = recipe_unit.eq_ignore_ascii_case(base);
            let inventory_is_base = inventory_unit.eq_ignore_ascii_case(base);

            return match (recipe_is_base, inventory_is_base) {
                // pieces consumed become a fraction of a container
                (true, false) => Some(recipe_quantity / ppu),
                // whole containers consumed from piece-tracked stock
                (false, true) => Some(recipe_quantity * ppu),
                // different container units: normalize both through the base unit
                _ => {
                    let recipe_in_base = if recipe_is_base {
                        recipe_quantity
                    } else {
                        recipe_quantity * ppu
                    };
                    let inventory_per_unit = if inventory_is_base {
                        Decimal::ONE
                    } else {
                        ppu
                    };
                    Some(recipe_in_base / inventory_per_unit)
                }
            };
        }
    }

    convert_unit(recipe_quantity, recipe_unit, inventory_unit)
}

fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Total stock of an item expressed in its base unit, rounded to 2 decimals
pub fn total_base_quantity(item: &InventoryItem) -> Decimal {
    let unit = item.stocking_unit();
    let base = item.base_unit();

    let base_quantity = if unit.eq_ignore_ascii_case(base) {
        item.quantity
    } else {
        match item.pieces_per_unit.filter(|p| *p > Decimal::ZERO) {
            Some(ppu) if unit_category(unit) == Some(UnitCategory::Count) => item.quantity * ppu,
            _ => convert_unit(item.quantity, unit, base).unwrap_or(item.quantity),
        }
    };

    round_quantity(base_quantity)
}

/// Display an item's stock, with the base-unit total when one is tracked
pub fn format_quantity(item: &InventoryItem) -> String {
    let quantity = round_quantity(item.quantity).normalize();
    let unit = item.stocking_unit();
    let base = item.base_unit();

    if item.base_unit.is_none() || item.pieces_per_unit.is_none() {
        return format!("{} {}", quantity, unit);
    }
    if unit.eq_ignore_ascii_case(base) {
        return format!("{} {}", quantity, base);
    }
    format!(
        "{} {} ({} {})",
        quantity,
        unit,
        total_base_quantity(item).normalize(),
        base
    )
}
