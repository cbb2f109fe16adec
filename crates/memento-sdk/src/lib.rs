//! High-level memento store.
//!
//! [`MementoStore`] composes the temporal key codec, the metadata extractor,
//! the version index, and a blob store into the public versioning API:
//!
//! - `put` stores an immutable snapshot and records its timestamp
//! - `get` resolves a point-in-time read to the version current at that instant
//! - `list` returns the version timeline as ranges (a timemap)
//! - `delete` removes one version from both stores
//!
//! The blob is always written before its timestamp is indexed, so a timeline
//! entry never points at a blob that was not written.

pub mod config;
pub mod error;
pub mod memento;
pub mod store;

pub use config::MementoConfig;
pub use error::{MementoError, MementoResult};
pub use memento::{Memento, PutReceipt};
pub use store::MementoStore;

// Re-export key types
pub use memento_index::{FsIndexService, InMemoryIndexService, IndexService};
pub use memento_snapshot::{
    BinaryDescriptor, GraphName, InteractionModel, Membership, MetadataBundle, Snapshot, Statement,
    StatementGraph, Term,
};
pub use memento_store::{BlobStore, FsBlobStore, InMemoryBlobStore};
pub use memento_types::{ResourceId, Timestamp, VersionKey, VersionRange};
