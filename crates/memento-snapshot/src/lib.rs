//! Snapshot model and metadata extraction for memento storage.
//!
//! A [`Snapshot`] is the full state of a resource at one instant: a handful of
//! typed structural facts plus the complete statement set (the body). Stores
//! keep the body opaque and persist a flat [`MetadataBundle`] next to it so
//! structural questions can be answered without decoding the body.
//!
//! # Modules
//!
//! - [`statement`] -- Statements, terms, graph partitions, and vocabulary IRIs
//! - [`snapshot`] -- The typed [`Snapshot`] and its [`MetadataSource`] accessors
//! - [`graph`] -- Adapter building a [`Snapshot`] from a raw statement graph
//! - [`metadata`] -- The [`MetadataBundle`] and its field names
//! - [`extract`] -- Projection of a snapshot into a bundle
//! - [`codec`] -- Body serialization ([`BodyCodec`], [`JsonBodyCodec`])

pub mod codec;
pub mod error;
pub mod extract;
pub mod graph;
pub mod metadata;
pub mod snapshot;
pub mod statement;

pub use codec::{BodyCodec, JsonBodyCodec};
pub use error::{SnapshotError, SnapshotResult};
pub use extract::extract;
pub use graph::StatementGraph;
pub use metadata::MetadataBundle;
pub use snapshot::{BinaryDescriptor, InteractionModel, Membership, MetadataSource, Snapshot};
pub use statement::{GraphName, Statement, Term};
