//! Postgres-backed document store
//!
//! Records live in a single `documents` table keyed by (collection, key)
//! with the payload as JSONB; partial updates use a JSONB merge.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};

use super::{DocumentStore, StoreResult};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn read_all(&self, collection: &str) -> StoreResult<BTreeMap<String, Value>> {
        let rows = sqlx::query("SELECT key, data FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        let mut records = BTreeMap::new();
        for row in rows {
            records.insert(row.get::<String, _>("key"), row.get::<Value, _>("data"));
        }
        Ok(records)
    }

    async fn read_one(&self, collection: &str, key: &str) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<Value, _>("data")))
    }

    async fn write_one(&self, collection: &str, key: &str, record: Value) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(record)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn patch_one(&self, collection: &str, key: &str, fields: Value) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = now()
            WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(fields)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_one(&self, collection: &str, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
