use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("resource identifier must not be empty")]
    EmptyIdentifier,

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
