//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index service could not be reached or refused the request.
    #[error("index service unavailable: {0}")]
    Unavailable(String),

    /// A paged read stopped making progress before the set was exhausted.
    #[error("incomplete timeline for {key}: {reason}")]
    IncompleteTimeline { key: String, reason: String },

    /// A stored record could not be decoded.
    #[error("corrupt index record {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed service.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
