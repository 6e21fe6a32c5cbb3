use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use serde_json::Value;

use crate::{
    document::{DocumentStore, Filter},
    error::StoreError,
};

/// In-memory document store (single instance only)
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    fn collection(&self, name: &str) -> dashmap::mapref::one::RefMut<'_, String, DashMap<String, Value>> {
        self.collections.entry(name.to_string()).or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, id: &str, data: Value) -> Result<Value, StoreError> {
        let documents = self.collection(collection);
        match documents.entry(id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            Entry::Vacant(entry) => {
                let stored = stamp_new(id, data);
                entry.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|documents| documents.get(id).map(|doc| doc.value().clone())))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, StoreError> {
        let documents = self.collection(collection);
        let Some(mut existing) = documents.get_mut(id) else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        merge_top_level(existing.value_mut(), patch);
        Ok(existing.value().clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        if let Some(documents) = self.collections.get(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let Some(documents) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|entry| {
                filters
                    .iter()
                    .all(|filter| entry.value().get(&filter.field) == Some(&filter.equals))
            })
            .map(|entry| entry.value().clone())
            .collect())
    }
}

fn stamp_new(id: &str, mut data: Value) -> Value {
    let now = jiff::Timestamp::now().to_string();
    if let Some(fields) = data.as_object_mut() {
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert("createdAt".to_string(), Value::String(now.clone()));
        fields.insert("updatedAt".to_string(), Value::String(now));
    }
    data
}

fn merge_top_level(existing: &mut Value, patch: Value) {
    let now = jiff::Timestamp::now().to_string();
    if let (Some(fields), Value::Object(changes)) = (existing.as_object_mut(), patch) {
        for (key, value) in changes {
            fields.insert(key, value);
        }
        fields.insert("updatedAt".to_string(), Value::String(now));
    }
}
