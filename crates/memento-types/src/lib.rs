//! Foundation types for memento storage.
//!
//! This crate provides the identity, temporal, and key types shared by every
//! other memento crate.
//!
//! # Key Types
//!
//! - [`ResourceId`] -- Opaque identifier of a versionable resource
//! - [`Timestamp`] -- Second-precision instant; all version keys truncate to it
//! - [`VersionKey`] -- `(ResourceId, Timestamp)` naming one stored snapshot
//! - [`VersionRange`] -- Interval during which one version was current
//! - [`KeyCodec`] -- Maps version keys to and from backend storage keys

pub mod error;
pub mod identity;
pub mod key;
pub mod temporal;

pub use error::TypeError;
pub use identity::{ResourceId, VersionKey};
pub use key::{KeyCodec, DEFAULT_DATA_PREFIX, FOREIGN_TAG, VERSION_MARKER};
pub use temporal::{Timestamp, VersionRange};
