use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with this id already exists in the collection
    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    /// The document does not exist
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Encoded payload exceeds the per-document ceiling
    #[error(
        "audio file too large: {encoded_kb}KB (max ~900KB after base64 encoding). original size: {original_kb}KB"
    )]
    Oversize { encoded_kb: usize, original_kb: usize },

    /// A stored blob no longer matches the shape we wrote
    #[error("stored blob is malformed: {0}")]
    Malformed(String),
}
