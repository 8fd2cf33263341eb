//! Document-store abstraction
//!
//! The core reads and writes keyed JSON records per collection through this
//! minimal contract; any backend satisfying it can be plugged in. `PgStore`
//! persists to Postgres, `MemoryStore` keeps everything in process for tests
//! and local runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Collections used by the core
pub mod collections {
    pub const INVENTORY: &str = "inventory";
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const SUPPLIERS: &str = "suppliers";
    pub const ORDERS: &str = "orders";
    pub const USERS: &str = "users";
}

/// Storage-layer failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend failure")]
    Backend(#[source] sqlx::Error),

    #[error("stored record could not be decoded")]
    Decode(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle to a document store
pub type Store = Arc<dyn DocumentStore>;

/// Minimal keyed-document contract consumed by the services
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load every record of a collection
    async fn read_all(&self, collection: &str) -> StoreResult<BTreeMap<String, Value>>;

    async fn read_one(&self, collection: &str, key: &str) -> StoreResult<Option<Value>>;

    /// Full overwrite of a record
    async fn write_one(&self, collection: &str, key: &str, record: Value) -> StoreResult<()>;

    /// Merge the given top-level fields into an existing record
    async fn patch_one(&self, collection: &str, key: &str, fields: Value) -> StoreResult<()>;

    async fn delete_one(&self, collection: &str, key: &str) -> StoreResult<()>;
}

/// Drop top-level null fields so optional values are stored as absent
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        other => other,
    }
}

/// Fetch and decode every record in a collection
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> StoreResult<Vec<T>> {
    let records = store.read_all(collection).await?;
    records
        .into_values()
        .map(|value| Ok(serde_json::from_value(value)?))
        .collect()
}

/// Fetch and decode a single record
pub async fn fetch_one<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.read_one(collection, key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and store a record, overwriting any existing one
pub async fn put<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
    record: &T,
) -> StoreResult<()> {
    let value = strip_nulls(serde_json::to_value(record)?);
    store.write_one(collection, key, value).await
}

/// Merge fields into an existing record
pub async fn patch(
    store: &dyn DocumentStore,
    collection: &str,
    key: &str,
    fields: Value,
) -> StoreResult<()> {
    store.patch_one(collection, key, strip_nulls(fields)).await
}
