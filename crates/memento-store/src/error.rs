/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Serialization or deserialization of stored envelopes failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data is malformed or cannot be decoded.
    #[error("corrupt blob {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The backend could not be reached or refused the request.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
