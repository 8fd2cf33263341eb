//! In-memory document store for tests and local runs

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read_all(&self, collection: &str) -> StoreResult<BTreeMap<String, Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn read_one(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn write_one(&self, collection: &str, key: &str, record: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn patch_one(&self, collection: &str, key: &str, fields: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(key));

        if let (Some(Value::Object(target)), Value::Object(fields)) = (record, fields) {
            for (field, value) in fields {
                target.insert(field, value);
            }
        }
        Ok(())
    }

    async fn delete_one(&self, collection: &str, key: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(records) = collections.get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }
}
