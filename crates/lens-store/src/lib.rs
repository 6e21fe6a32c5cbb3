#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Document and blob storage
//!
//! Documents are schemaless JSON values addressed by collection and id.
//! Binary audio rides on top of the document layer as base64 text, the
//! same way the mobile clients sync it.

mod blob;
mod document;
mod error;
mod memory;

pub use blob::{BlobHandle, BlobStore, MAX_ENCODED_LEN, StoredBlob};
pub use document::{DocumentStore, Filter};
pub use error::StoreError;
pub use memory::MemoryStore;

use std::sync::Arc;

use lens_config::{StorageBackend, StorageConfig};

/// Create a document store from configuration
pub fn create_store(config: &StorageConfig) -> Arc<dyn DocumentStore> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
