//! Error types for snapshot handling.

use memento_types::TypeError;

/// Errors produced while building, extracting, or serializing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot cannot be traversed or is missing a required fact.
    #[error("malformed snapshot for {id}: {reason}")]
    Malformed { id: String, reason: String },

    /// Body encoding or decoding failed.
    #[error("body codec error: {0}")]
    Codec(String),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl SnapshotError {
    pub(crate) fn malformed(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
