use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use jiff::Timestamp;
use serde_json::{Value, json};

use lens_core::{collections::AUDIO_FILES, generate_doc_id};

use crate::{document::DocumentStore, error::StoreError};

/// Ceiling on the base64-encoded payload, in characters
///
/// Keeps each audio document comfortably under the 1MiB per-document
/// limit of the hosted backends the store mirrors.
pub const MAX_ENCODED_LEN: usize = 900_000;

/// Reference to a stored blob
#[derive(Debug, Clone)]
pub struct BlobHandle {
    pub id: String,
    /// Original payload size in bytes
    pub size: usize,
}

/// A blob read back out of the store
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub payload: Vec<u8>,
    pub content_type: String,
}

/// Base64 blob storage on top of the document layer
///
/// Expiry is checked when a blob is read. An expired document stays in
/// its collection but is never served again.
#[derive(Clone)]
pub struct BlobStore {
    store: Arc<dyn DocumentStore>,
}

impl BlobStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a payload, optionally expiring after a number of days
    ///
    /// The size check happens before anything is written; an oversize
    /// payload leaves no document behind.
    pub async fn store(
        &self,
        payload: &[u8],
        content_type: &str,
        expires_in_days: Option<u32>,
    ) -> Result<BlobHandle, StoreError> {
        let encoded = STANDARD.encode(payload);
        if encoded.len() > MAX_ENCODED_LEN {
            return Err(StoreError::Oversize {
                encoded_kb: encoded.len() / 1024,
                original_kb: payload.len() / 1024,
            });
        }

        let mut document = json!({
            "audioData": encoded,
            "contentType": content_type,
            "size": payload.len(),
        });
        if let Some(days) = expires_in_days {
            let expires_at = expiry_timestamp(days)?;
            if let Some(fields) = document.as_object_mut() {
                fields.insert("expiresAt".to_string(), Value::String(expires_at.to_string()));
            }
        }

        let id = generate_doc_id("audio");
        self.store.create(AUDIO_FILES, &id, document).await?;

        Ok(BlobHandle {
            id,
            size: payload.len(),
        })
    }

    /// Read a blob back, or `None` when it is absent or expired
    pub async fn retrieve(&self, id: &str) -> Result<Option<StoredBlob>, StoreError> {
        let Some(document) = self.store.get(AUDIO_FILES, id).await? else {
            return Ok(None);
        };

        if let Some(raw) = document.get("expiresAt").and_then(Value::as_str) {
            let expires_at: Timestamp = raw
                .parse()
                .map_err(|e| StoreError::Malformed(format!("bad expiresAt on {id}: {e}")))?;
            if expires_at < Timestamp::now() {
                return Ok(None);
            }
        }

        let encoded = document
            .get("audioData")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Malformed(format!("missing audioData on {id}")))?;
        let payload = STANDARD
            .decode(encoded)
            .map_err(|e| StoreError::Malformed(format!("bad audioData on {id}: {e}")))?;
        let content_type = document
            .get("contentType")
            .and_then(Value::as_str)
            .unwrap_or("audio/mpeg")
            .to_string();

        Ok(Some(StoredBlob { payload, content_type }))
    }
}

fn expiry_timestamp(days: u32) -> Result<Timestamp, StoreError> {
    let ttl = jiff::SignedDuration::from_secs(86_400 * i64::from(days));
    Timestamp::now()
        .checked_add(ttl)
        .map_err(|e| StoreError::Malformed(format!("expiry out of range: {e}")))
}
