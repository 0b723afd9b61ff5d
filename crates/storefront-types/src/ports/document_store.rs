use async_trait::async_trait;
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One entry of an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put {
        collection: String,
        key: String,
        doc: Value,
    },
    Delete {
        collection: String,
        key: String,
    },
}

impl WriteOp {
    pub fn put(collection: &str, key: &str, doc: Value) -> Self {
        Self::Put {
            collection: collection.to_string(),
            key: key.to_string(),
            doc,
        }
    }

    pub fn delete(collection: &str, key: &str) -> Self {
        Self::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }
}

/// Filter for `query`. Field matches compare a top-level document field
/// for equality, which is all the engine's read side asks of the store.
#[derive(Debug, Clone)]
pub enum Predicate {
    All,
    FieldEquals { field: String, value: Value },
}

impl Predicate {
    pub fn field_equals(field: &str, value: Value) -> Self {
        Self::FieldEquals {
            field: field.to_string(),
            value,
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Predicate::All => true,
            Predicate::FieldEquals { field, value } => doc.get(field) == Some(value),
        }
    }
}

/// The hosted document database the engine writes through. Keys are unique
/// per collection; `set` is a full-document upsert. `apply_batch` commits
/// all writes or none, which is what order placement and cart merge lean
/// on.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, collection: &str, key: &str, doc: Value) -> Result<(), StoreError>;
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;
    /// Documents in `collection` matching `predicate`. Read-side listing
    /// only; the engine never mutates through a query.
    async fn query(&self, collection: &str, predicate: Predicate)
        -> Result<Vec<Value>, StoreError>;
    async fn apply_batch(&self, writes: Vec<WriteOp>) -> Result<(), StoreError>;
}
