//! Validation helpers shared by the catalog, inventory, and checkout services

use rust_decimal::Decimal;

use crate::models::RecipeItem;

/// Validate a display name is non-empty after trimming
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        Err("Name must not be empty")
    } else {
        Ok(())
    }
}

/// Validate a price is non-negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        Err("Price must not be negative")
    } else {
        Ok(())
    }
}

/// Validate a stock or recipe quantity is positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        Err("Quantity must be positive")
    } else {
        Ok(())
    }
}

/// Validate a stock quantity is non-negative
pub fn validate_non_negative_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        Err("Quantity must not be negative")
    } else {
        Ok(())
    }
}

/// Validate a pieces-per-unit conversion factor is positive when present
pub fn validate_pieces_per_unit(pieces_per_unit: Option<Decimal>) -> Result<(), &'static str> {
    match pieces_per_unit {
        Some(factor) if factor <= Decimal::ZERO => {
            Err("Pieces per unit must be positive")
        }
        _ => Ok(()),
    }
}

/// Validate every entry of a recipe requires a positive quantity
pub fn validate_recipe(recipe: &[RecipeItem]) -> Result<(), &'static str> {
    for entry in recipe {
        validate_positive_quantity(entry.quantity)?;
    }
    Ok(())
}
