//! Version index for memento storage.
//!
//! Tracks, per resource, the sorted set of timestamps at which a version was
//! stored, and answers the floor query behind every time-travel read.
//!
//! # Key Types
//!
//! - [`IndexService`] -- The backing sorted-set service contract
//! - [`InMemoryIndexService`] -- `HashMap`-backed service for tests and embedding
//! - [`FsIndexService`] -- One JSON record per resource under a root directory
//! - [`VersionIndex`] -- `record` / `timeline` / `floor` over any service
//!
//! Entries form a set: `record` is idempotent and commutative, so concurrent
//! writers never need a lock at this layer.

pub mod error;
pub mod fs;
pub mod index;
pub mod memory;
pub mod service;

pub use error::{IndexError, IndexResult};
pub use fs::FsIndexService;
pub use index::{floor_in, VersionIndex};
pub use memory::InMemoryIndexService;
pub use service::{IndexPage, IndexService};
