use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Top-level field equality filter for queries
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub equals: Value,
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            equals: value.into(),
        }
    }
}

/// Schemaless JSON document storage
///
/// Every document carries server-stamped `createdAt` and `updatedAt`
/// fields plus its own `id`, so callers never manage timestamps.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document, returning the stored value
    ///
    /// Stamps `id`, `createdAt` and `updatedAt`. Fails when the id is
    /// already taken.
    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<Value, StoreError>;

    /// Fetch one document
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Merge top-level fields of `patch` into an existing document
    ///
    /// Stamps `updatedAt` and returns the merged value. Fails when the
    /// document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, StoreError>;

    /// Remove a document; removing an absent document is a no-op
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Fetch all documents matching every filter
    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;
}
