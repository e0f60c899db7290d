/// Errors raised by the document store and by model handles.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model '{0}' is already defined")]
    ModelExists(String),

    #[error("Document '{id}' already exists in '{collection}'")]
    DuplicateKey { collection: String, id: String },

    #[error("Validation failed for '{collection}': {reason}")]
    Validation { collection: String, reason: String },
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
