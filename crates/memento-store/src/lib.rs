//! Blob storage for memento snapshots.
//!
//! Snapshots are stored as opaque byte payloads under string keys produced by
//! the temporal key codec, together with a media type and a flat metadata map.
//! The store never interprets either.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsBlobStore`] -- one self-describing envelope file per key under a root directory
//!
//! # Design Rules
//!
//! 1. A key is written once; callers must not rely on overwrite semantics.
//! 2. Writes land completely or not at all (staged, then moved into place).
//! 3. Listing returns keys in lexicographic order, one page at a time.
//! 4. All I/O errors are propagated, never silently ignored or retried.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use object::{KeyPage, StoredBlob};
pub use traits::BlobStore;
