use thiserror::Error;

use memento_types::VersionKey;

#[derive(Debug, Error)]
pub enum MementoError {
    /// A version already exists at this key; versions are never overwritten.
    #[error("version already exists: {0}")]
    VersionExists(VersionKey),

    /// The snapshot could not be traversed or serialized.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] memento_snapshot::SnapshotError),

    #[error("blob store error: {0}")]
    Store(#[from] memento_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] memento_index::IndexError),

    #[error("type error: {0}")]
    Type(#[from] memento_types::TypeError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MementoError {
    /// Returns `true` if a backing store failed (as opposed to bad input).
    pub fn is_backing_store_failure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Index(_))
    }
}

pub type MementoResult<T> = Result<T, MementoError>;
