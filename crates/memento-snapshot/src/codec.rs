//! Body serialization.
//!
//! Stores treat the body as opaque bytes plus a declared media type; the codec
//! is the only place that knows the format.

use crate::error::{SnapshotError, SnapshotResult};
use crate::statement::Statement;

/// Serializes a statement set to bytes and back.
pub trait BodyCodec: Send + Sync {
    /// Media type recorded alongside encoded bodies.
    fn media_type(&self) -> &str;

    fn encode(&self, statements: &[Statement]) -> SnapshotResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> SnapshotResult<Vec<Statement>>;
}

/// JSON array of statements.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBodyCodec;

impl JsonBodyCodec {
    pub const MEDIA_TYPE: &'static str = "application/json";
}

impl BodyCodec for JsonBodyCodec {
    fn media_type(&self) -> &str {
        Self::MEDIA_TYPE
    }

    fn encode(&self, statements: &[Statement]) -> SnapshotResult<Vec<u8>> {
        serde_json::to_vec(statements).map_err(|e| SnapshotError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> SnapshotResult<Vec<Statement>> {
        serde_json::from_slice(bytes).map_err(|e| SnapshotError::Codec(e.to_string()))
    }
}
