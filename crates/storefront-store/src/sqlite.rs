use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use storefront_types::ports::document_store::{DocumentStore, Predicate, StoreError, WriteOp};

/// File-backed document store: one table, JSON in a text column.
/// `apply_batch` runs inside a sqlite transaction, which is where the
/// engine's all-or-nothing guarantee actually comes from.
pub struct SqliteStore {
    pool: SqlitePool,
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await?;

        // Run migration from migration file.
        let ddl = include_str!("../migrations/0001_create_documents.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT doc FROM documents WHERE collection = ? AND key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        raw.map(|s| serde_json::from_str(&s).map_err(db_err))
            .transpose()
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&doc).map_err(db_err)?;
        sqlx::query(
            "INSERT INTO documents (collection, key, doc, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (collection, key)
             DO UPDATE SET doc = excluded.doc, updated_at = excluded.updated_at",
        )
        .bind(collection)
        .bind(key)
        .bind(raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND key = ?")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        predicate: Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT doc FROM documents WHERE collection = ?")
                .bind(collection)
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        let mut out = Vec::new();
        for raw in rows {
            let doc: Value = serde_json::from_str(&raw).map_err(db_err)?;
            if predicate.matches(&doc) {
                out.push(doc);
            }
        }
        Ok(out)
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for op in writes {
            match op {
                WriteOp::Put {
                    collection,
                    key,
                    doc,
                } => {
                    let raw = serde_json::to_string(&doc).map_err(db_err)?;
                    sqlx::query(
                        "INSERT INTO documents (collection, key, doc, updated_at) VALUES (?, ?, ?, ?)
                         ON CONFLICT (collection, key)
                         DO UPDATE SET doc = excluded.doc, updated_at = excluded.updated_at",
                    )
                    .bind(collection)
                    .bind(key)
                    .bind(raw)
                    .bind(Utc::now().to_rfc3339())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                }
                WriteOp::Delete { collection, key } => {
                    sqlx::query("DELETE FROM documents WHERE collection = ? AND key = ?")
                        .bind(collection)
                        .bind(key)
                        .execute(&mut *tx)
                        .await
                        .map_err(db_err)?;
                }
            }
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}
