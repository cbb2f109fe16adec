//! Statements and the graph partitions they live in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vocabulary IRIs consulted when reading snapshot structure.
pub mod vocab {
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    pub const DC_MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const DC_HAS_PART: &str = "http://purl.org/dc/terms/hasPart";
    pub const DC_IS_PART_OF: &str = "http://purl.org/dc/terms/isPartOf";
    pub const DC_EXTENT: &str = "http://purl.org/dc/terms/extent";
    pub const DC_FORMAT: &str = "http://purl.org/dc/terms/format";

    pub const LDP: &str = "http://www.w3.org/ns/ldp#";
    pub const LDP_MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";
    pub const LDP_HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";
    pub const LDP_IS_MEMBER_OF_RELATION: &str = "http://www.w3.org/ns/ldp#isMemberOfRelation";
    pub const LDP_INSERTED_CONTENT_RELATION: &str =
        "http://www.w3.org/ns/ldp#insertedContentRelation";

    pub const TRELLIS_SERVER_MANAGED: &str = "http://www.trellisldp.org/ns/trellis#PreferServerManaged";
    pub const TRELLIS_USER_MANAGED: &str = "http://www.trellisldp.org/ns/trellis#PreferUserManaged";
    pub const TRELLIS_ACCESS_CONTROL: &str = "http://www.trellisldp.org/ns/trellis#PreferAccessControl";
    pub const TRELLIS_AUDIT: &str = "http://www.trellisldp.org/ns/trellis#PreferAudit";
}

/// The partition of the dataset a statement belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphName {
    /// Facts maintained by the server (type, modification date, binaries).
    ServerManaged,
    /// Facts written by clients, including membership configuration.
    UserManaged,
    /// Authorization statements.
    AccessControl,
    /// Audit trail statements.
    Audit,
    /// Any other named graph.
    Other(String),
}

impl GraphName {
    /// The IRI naming this partition.
    pub fn as_iri(&self) -> &str {
        match self {
            Self::ServerManaged => vocab::TRELLIS_SERVER_MANAGED,
            Self::UserManaged => vocab::TRELLIS_USER_MANAGED,
            Self::AccessControl => vocab::TRELLIS_ACCESS_CONTROL,
            Self::Audit => vocab::TRELLIS_AUDIT,
            Self::Other(iri) => iri,
        }
    }

    /// Map a graph IRI onto a known partition.
    pub fn from_iri(iri: &str) -> Self {
        match iri {
            vocab::TRELLIS_SERVER_MANAGED => Self::ServerManaged,
            vocab::TRELLIS_USER_MANAGED => Self::UserManaged,
            vocab::TRELLIS_ACCESS_CONTROL => Self::AccessControl,
            vocab::TRELLIS_AUDIT => Self::Audit,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The object position of a statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    Iri { value: String },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    Blank { value: String },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri { value: value.into() }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// The IRI string, if this term is an IRI.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri { value } => Some(value),
            _ => None,
        }
    }

    /// The lexical form, if this term is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri { value } => write!(f, "<{value}>"),
            Self::Literal { value, datatype: Some(dt) } => write!(f, "{value:?}^^<{dt}>"),
            Self::Literal { value, datatype: None } => write!(f, "{value:?}"),
            Self::Blank { value } => write!(f, "_:{value}"),
        }
    }
}

/// A single quad: subject, predicate, object, and graph partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub graph: GraphName,
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    pub fn new(
        graph: GraphName,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: Term,
    ) -> Self {
        Self {
            graph,
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}
