use memento_index::IndexError;
use memento_snapshot::{BodyCodec, MetadataBundle, Snapshot, SnapshotResult, Statement};
use memento_types::VersionKey;

/// A stored version as read back from the blob store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memento {
    pub key: VersionKey,
    /// The backend key the blob was read from.
    pub storage_key: String,
    pub media_type: String,
    pub metadata: MetadataBundle,
    /// The encoded statement set, untouched.
    pub body: Vec<u8>,
}

impl Memento {
    /// Decode the body.
    pub fn statements(&self, codec: &dyn BodyCodec) -> SnapshotResult<Vec<Statement>> {
        codec.decode(&self.body)
    }

    /// Rebuild the full snapshot from the metadata bundle and decoded body.
    pub fn to_snapshot(&self, codec: &dyn BodyCodec) -> SnapshotResult<Snapshot> {
        Snapshot::from_parts(self.key.id.clone(), &self.metadata, self.statements(codec)?)
    }
}

/// Outcome of a successful `put`.
///
/// The blob is always durable when a receipt is returned. If recording the
/// timestamp in the index failed afterwards, the blob is orphaned: reachable
/// by exact-key reads but invisible to timeline resolution until the index is
/// rebuilt.
#[derive(Debug)]
pub struct PutReceipt {
    pub key: VersionKey,
    pub storage_key: String,
    pub index_error: Option<IndexError>,
}

impl PutReceipt {
    pub fn is_orphaned(&self) -> bool {
        self.index_error.is_some()
    }
}
