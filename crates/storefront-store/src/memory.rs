use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use storefront_types::ports::document_store::{DocumentStore, Predicate, StoreError, WriteOp};

/// Process-local document store keyed by (collection, key). Batches cannot
/// fail partway here, so applying the ops in order already satisfies the
/// all-or-nothing contract.
#[derive(Clone)]
pub struct MemoryStore {
    pub map: Arc<DashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .map
            .get(&(collection.to_string(), key.to_string()))
            .map(|r| r.clone()))
    }

    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError> {
        self.map
            .insert((collection.to_string(), key.to_string()), doc);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.map.remove(&(collection.to_string(), key.to_string()));
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        predicate: Predicate,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .map
            .iter()
            .filter(|kv| kv.key().0 == collection && predicate.matches(kv.value()))
            .map(|kv| kv.value().clone())
            .collect())
    }

    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        for op in writes {
            match op {
                WriteOp::Put {
                    collection,
                    key,
                    doc,
                } => {
                    self.map.insert((collection, key), doc);
                }
                WriteOp::Delete { collection, key } => {
                    self.map.remove(&(collection, key));
                }
            }
        }
        Ok(())
    }
}
