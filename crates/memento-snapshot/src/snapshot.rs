//! The typed snapshot and the accessor capability extraction reads from.

use std::fmt;

use chrono::{DateTime, Utc};
use memento_types::{ResourceId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{SnapshotError, SnapshotResult};
use crate::metadata::MetadataBundle;
use crate::statement::{vocab, GraphName, Statement};

/// The enumerated resource type of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionModel {
    Resource,
    RdfSource,
    NonRdfSource,
    Container,
    BasicContainer,
    DirectContainer,
    IndirectContainer,
}

impl InteractionModel {
    /// The LDP IRI for this type.
    pub fn as_iri(&self) -> &'static str {
        match self {
            Self::Resource => "http://www.w3.org/ns/ldp#Resource",
            Self::RdfSource => "http://www.w3.org/ns/ldp#RDFSource",
            Self::NonRdfSource => "http://www.w3.org/ns/ldp#NonRDFSource",
            Self::Container => "http://www.w3.org/ns/ldp#Container",
            Self::BasicContainer => "http://www.w3.org/ns/ldp#BasicContainer",
            Self::DirectContainer => "http://www.w3.org/ns/ldp#DirectContainer",
            Self::IndirectContainer => "http://www.w3.org/ns/ldp#IndirectContainer",
        }
    }

    /// Parse from an LDP IRI.
    pub fn from_iri(iri: &str) -> Option<Self> {
        let local = iri.strip_prefix(vocab::LDP)?;
        match local {
            "Resource" => Some(Self::Resource),
            "RDFSource" => Some(Self::RdfSource),
            "NonRDFSource" => Some(Self::NonRdfSource),
            "Container" => Some(Self::Container),
            "BasicContainer" => Some(Self::BasicContainer),
            "DirectContainer" => Some(Self::DirectContainer),
            "IndirectContainer" => Some(Self::IndirectContainer),
            _ => None,
        }
    }
}

impl fmt::Display for InteractionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_iri())
    }
}

/// Pointer to the binary content of a non-RDF resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryDescriptor {
    /// Where the bytes live.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// When the binary itself was last modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

impl BinaryDescriptor {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            media_type: None,
            size: None,
            modified: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }
}

/// Membership configuration of a direct or indirect container.
///
/// Each relation is independently optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_of_relation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_content_relation: Option<String>,
}

impl Membership {
    pub fn is_empty(&self) -> bool {
        self.membership_resource.is_none()
            && self.member_relation.is_none()
            && self.member_of_relation.is_none()
            && self.inserted_content_relation.is_none()
    }
}

/// Typed accessors for every fact a [`MetadataBundle`] carries.
///
/// Extraction only ever reads through this trait, so any snapshot
/// representation can be stored once it can answer these questions.
pub trait MetadataSource {
    fn identifier(&self) -> &ResourceId;
    fn modified(&self) -> DateTime<Utc>;
    fn interaction_model(&self) -> InteractionModel;
    fn container(&self) -> Option<&str>;
    fn binary(&self) -> Option<&BinaryDescriptor>;
    fn membership(&self) -> &Membership;
    /// Positive hint that access-control statements exist.
    ///
    /// `false` is not proof of absence.
    fn has_acl(&self) -> bool;
}

/// The full versioned state of a resource at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: ResourceId,
    pub modified: DateTime<Utc>,
    pub interaction_model: InteractionModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryDescriptor>,
    #[serde(default)]
    pub membership: Membership,
    /// Set by producers that already know access-control data is present.
    #[serde(default)]
    pub acl_present: bool,
    /// The body: the complete statement set.
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl Snapshot {
    pub fn new(id: ResourceId, modified: DateTime<Utc>, interaction_model: InteractionModel) -> Self {
        Self {
            id,
            modified,
            interaction_model,
            container: None,
            binary: None,
            membership: Membership::default(),
            acl_present: false,
            statements: Vec::new(),
        }
    }

    /// Rebuild a snapshot from a stored bundle and a decoded body.
    pub fn from_parts(
        id: ResourceId,
        metadata: &MetadataBundle,
        statements: Vec<Statement>,
    ) -> SnapshotResult<Self> {
        let modified = metadata
            .modified()
            .ok_or_else(|| SnapshotError::malformed(&id, "stored metadata lacks a modification date"))?;
        let interaction_model = metadata
            .interaction_model()
            .ok_or_else(|| SnapshotError::malformed(&id, "stored metadata lacks an interaction model"))?;
        Ok(Self {
            id,
            modified,
            interaction_model,
            container: metadata.container().map(str::to_string),
            binary: metadata.binary(),
            membership: metadata.membership(),
            acl_present: metadata.has_acl(),
            statements,
        })
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_binary(mut self, binary: BinaryDescriptor) -> Self {
        self.binary = Some(binary);
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = membership;
        self
    }

    pub fn with_statements(mut self, statements: Vec<Statement>) -> Self {
        self.statements = statements;
        self
    }

    /// The version timestamp this snapshot is stored under.
    pub fn timestamp(&self) -> Timestamp {
        Timestamp::from_datetime(&self.modified)
    }
}

impl MetadataSource for Snapshot {
    fn identifier(&self) -> &ResourceId {
        &self.id
    }

    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    fn interaction_model(&self) -> InteractionModel {
        self.interaction_model
    }

    fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    fn binary(&self) -> Option<&BinaryDescriptor> {
        self.binary.as_ref()
    }

    fn membership(&self) -> &Membership {
        &self.membership
    }

    fn has_acl(&self) -> bool {
        self.acl_present
            || self
                .statements
                .iter()
                .any(|s| s.graph == GraphName::AccessControl)
    }
}
