use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::temporal::Timestamp;

/// Opaque, globally unique name of a versionable resource.
///
/// The identifier is stable across every version of the resource. It is never
/// empty; beyond that the store does not interpret it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Create an identifier, rejecting the empty string.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TypeError::EmptyIdentifier);
        }
        Ok(Self(value))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names exactly one stored snapshot.
///
/// Created once at put time and never reused. The timestamp is already
/// truncated to whole seconds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionKey {
    pub id: ResourceId,
    pub timestamp: Timestamp,
}

impl VersionKey {
    pub fn new(id: ResourceId, timestamp: Timestamp) -> Self {
        Self { id, timestamp }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.timestamp.epoch_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifier_rejected() {
        assert_eq!(ResourceId::new(""), Err(TypeError::EmptyIdentifier));
        assert!("".parse::<ResourceId>().is_err());
    }

    #[test]
    fn identifier_preserved_verbatim() {
        let id = ResourceId::new("trellis:data/a/b c").unwrap();
        assert_eq!(id.as_str(), "trellis:data/a/b c");
        assert_eq!(id.to_string(), "trellis:data/a/b c");
    }

    #[test]
    fn serde_rejects_empty() {
        assert!(serde_json::from_str::<ResourceId>("\"\"").is_err());
        let id: ResourceId = serde_json::from_str("\"res1\"").unwrap();
        assert_eq!(id.as_str(), "res1");
    }

    #[test]
    fn version_key_display() {
        let key = VersionKey::new(ResourceId::new("res1").unwrap(), Timestamp::from_epoch_seconds(100));
        assert_eq!(key.to_string(), "res1@100");
    }

    #[test]
    fn version_keys_order_by_id_then_time() {
        let a = ResourceId::new("a").unwrap();
        let b = ResourceId::new("b").unwrap();
        let k1 = VersionKey::new(a.clone(), Timestamp::from_epoch_seconds(200));
        let k2 = VersionKey::new(a, Timestamp::from_epoch_seconds(300));
        let k3 = VersionKey::new(b, Timestamp::from_epoch_seconds(100));
        assert!(k1 < k2);
        assert!(k2 < k3);
    }
}
