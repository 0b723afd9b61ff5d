#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a store feature: `memory` or `sqlite`.");

use serde_json::Value;
use storefront_types::ports::document_store::{DocumentStore, Predicate, StoreError, WriteOp};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub struct Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    memory: memory::MemoryStore,
    #[cfg(feature = "sqlite")]
    sqlite: sqlite::SqliteStore,
}

pub async fn build_store(url: Option<&str>) -> anyhow::Result<Store> {
    Store::build_store(url).await
}

impl Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_store(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: crate::memory::MemoryStore::new(),
        })
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_store(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://storefront.db");
        let sqlite = sqlite::SqliteStore::new(url).await?;
        Ok(Self { sqlite })
    }

    // If both features are enabled, sqlite is the system of record.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_store(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://storefront.db");
        let sqlite = sqlite::SqliteStore::new(url).await?;
        Ok(Self { sqlite })
    }
}

#[cfg(all(feature = "memory", not(feature = "sqlite")))]
#[async_trait::async_trait]
impl DocumentStore for Store {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.memory.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.memory.set(collection, key, doc).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.memory.delete(collection, key).await
    }

    async fn query(
        &self,
        collection: &str,
        predicate: Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        self.memory.query(collection, predicate).await
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        self.memory.apply_batch(writes).await
    }
}

#[cfg(all(feature = "sqlite", not(feature = "memory")))]
#[async_trait::async_trait]
impl DocumentStore for Store {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.sqlite.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.sqlite.set(collection, key, doc).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.sqlite.delete(collection, key).await
    }

    async fn query(
        &self,
        collection: &str,
        predicate: Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        self.sqlite.query(collection, predicate).await
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        self.sqlite.apply_batch(writes).await
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
#[async_trait::async_trait]
impl DocumentStore for Store {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.sqlite.get(collection, key).await
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.sqlite.set(collection, key, doc).await
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.sqlite.delete(collection, key).await
    }

    async fn query(
        &self,
        collection: &str,
        predicate: Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        self.sqlite.query(collection, predicate).await
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        self.sqlite.apply_batch(writes).await
    }
}
