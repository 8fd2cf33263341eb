//! Business logic services for the Brewpos backend

pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod order;
pub mod supplier;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use inventory::{InventoryService, StockLocks};
pub use order::OrderService;
pub use supplier::SupplierService;
