//! Supplier management service

use serde::Deserialize;
use uuid::Uuid;

use shared::models::{InventoryItem, Supplier};
use shared::validation;

use crate::error::{AppError, AppResult};
use crate::store::{self, collections, Store};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    store: Store,
}

/// Input for creating or replacing a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact_info: Option<String>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// List all suppliers, sorted by name
    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> =
            store::fetch_all(self.store.as_ref(), collections::SUPPLIERS).await?;
        suppliers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(suppliers)
    }

    /// Get a supplier by id
    pub async fn get(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        store::fetch_one(
            self.store.as_ref(),
            collections::SUPPLIERS,
            &supplier_id.to_string(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Create a new supplier
    pub async fn create(&self, input: SupplierInput) -> AppResult<Supplier> {
        validation::validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name,
            contact_info: input.contact_info,
        };

        store::put(
            self.store.as_ref(),
            collections::SUPPLIERS,
            &supplier.id.to_string(),
            &supplier,
        )
        .await?;
        Ok(supplier)
    }

    /// Replace a supplier wholesale
    pub async fn update(&self, supplier_id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        validation::validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        self.get(supplier_id).await?;

        let supplier = Supplier {
            id: supplier_id,
            name: input.name,
            contact_info: input.contact_info,
        };

        store::put(
            self.store.as_ref(),
            collections::SUPPLIERS,
            &supplier_id.to_string(),
            &supplier,
        )
        .await?;
        Ok(supplier)
    }

    /// Delete a supplier
    ///
    /// Deletion is blocked while any inventory item references the supplier.
    pub async fn delete(&self, supplier_id: Uuid) -> AppResult<()> {
        self.get(supplier_id).await?;

        let items: Vec<InventoryItem> =
            store::fetch_all(self.store.as_ref(), collections::INVENTORY).await?;
        let referencing = items
            .iter()
            .filter(|item| item.supplier_id == supplier_id)
            .count();

        if referencing > 0 {
            return Err(AppError::Conflict {
                resource: "supplier".to_string(),
                message: format!(
                    "Supplier is referenced by {} inventory item(s); reassign or remove them first",
                    referencing
                ),
            });
        }

        self.store
            .delete_one(collections::SUPPLIERS, &supplier_id.to_string())
            .await?;
        Ok(())
    }
}
