//! Product and category catalog service
//!
//! Products optionally carry a recipe of inventory requirements; the
//! availability predicate converts each requirement into the inventory
//! item's stocking unit and checks current stock. The predicate is advisory
//! only: it reserves nothing, and checkout re-reads stock when consuming.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{Category, InventoryItem, Product, RecipeItem};
use shared::units;
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryService;
use crate::store::{self, collections, Store};

/// Catalog service for products and categories
#[derive(Clone)]
pub struct CatalogService {
    store: Store,
    ledger: InventoryService,
}

/// Input for creating or replacing a product
///
/// The recipe is replaced wholesale on update; there is no partial patch.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Uuid,
    #[serde(default)]
    pub recipe: Vec<RecipeItem>,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// A product decorated with its current availability
#[derive(Debug, Serialize)]
pub struct ProductWithAvailability {
    #[serde(flatten)]
    pub product: Product,
    pub available: bool,
}

/// Whether every recipe requirement of a product is currently in stock
///
/// Fail-closed: a missing inventory item or an unconvertible unit makes the
/// product unavailable. Products without a recipe are always available.
pub fn product_available(product: &Product, inventory: &HashMap<Uuid, InventoryItem>) -> bool {
    if product.recipe.is_empty() {
        return true;
    }

    product.recipe.iter().all(|entry| {
        let Some(item) = inventory.get(&entry.inventory_id) else {
            return false;
        };
        match units::convert_to_inventory_unit(entry.quantity, entry.unit.as_deref(), item) {
            Some(required) => item.quantity >= required,
            None => false,
        }
    })
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(store: Store, ledger: InventoryService) -> Self {
        Self { store, ledger }
    }

    /// List all products, sorted by name
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let mut products: Vec<Product> =
            store::fetch_all(self.store.as_ref(), collections::PRODUCTS).await?;
        products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(products)
    }

    /// Snapshot of all products keyed by id
    pub async fn products_by_id(&self) -> AppResult<HashMap<Uuid, Product>> {
        let products: Vec<Product> =
            store::fetch_all(self.store.as_ref(), collections::PRODUCTS).await?;
        Ok(products
            .into_iter()
            .map(|product| (product.id, product))
            .collect())
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        store::fetch_one(
            self.store.as_ref(),
            collections::PRODUCTS,
            &product_id.to_string(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Create a new product
    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        Self::validate(&input)?;

        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            category_id: input.category_id,
            recipe: input.recipe,
        };

        store::put(
            self.store.as_ref(),
            collections::PRODUCTS,
            &product.id.to_string(),
            &product,
        )
        .await?;
        Ok(product)
    }

    /// Replace a product wholesale, including its recipe
    pub async fn update_product(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        Self::validate(&input)?;
        self.get_product(product_id).await?;

        let product = Product {
            id: product_id,
            name: input.name,
            description: input.description,
            price: input.price,
            category_id: input.category_id,
            recipe: input.recipe,
        };

        store::put(
            self.store.as_ref(),
            collections::PRODUCTS,
            &product_id.to_string(),
            &product,
        )
        .await?;
        Ok(product)
    }

    /// Delete a product
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        self.get_product(product_id).await?;
        self.store
            .delete_one(collections::PRODUCTS, &product_id.to_string())
            .await?;
        Ok(())
    }

    /// Whether a product can currently be sold
    pub async fn is_available(&self, product_id: Uuid) -> AppResult<bool> {
        let product = self.get_product(product_id).await?;
        let inventory = self.ledger.items_by_id().await?;
        Ok(product_available(&product, &inventory))
    }

    /// All products decorated with availability, for the POS grid
    pub async fn list_with_availability(&self) -> AppResult<Vec<ProductWithAvailability>> {
        let products = self.list_products().await?;
        let inventory = self.ledger.items_by_id().await?;
        Ok(products
            .into_iter()
            .map(|product| {
                let available = product_available(&product, &inventory);
                ProductWithAvailability { product, available }
            })
            .collect())
    }

    /// List all categories, sorted by name
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> =
            store::fetch_all(self.store.as_ref(), collections::CATEGORIES).await?;
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    /// Create a new category
    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        validation::validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let category = Category {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
        };

        store::put(
            self.store.as_ref(),
            collections::CATEGORIES,
            &category.id.to_string(),
            &category,
        )
        .await?;
        Ok(category)
    }

    fn validate(input: &ProductInput) -> AppResult<()> {
        validation::validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        validation::validate_price(input.price)
            .map_err(|msg| AppError::validation("price", msg))?;
        validation::validate_recipe(&input.recipe)
            .map_err(|msg| AppError::validation("recipe", msg))?;
        Ok(())
    }
}
