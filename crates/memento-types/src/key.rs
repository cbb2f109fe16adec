//! Temporal key codec.
//!
//! Maps `(ResourceId, Timestamp)` to backend storage keys of the form
//! `path_prefix + segment(id) + "?version=" + epoch_seconds`, and back.
//! Everything here is pure: no I/O, no allocation beyond the returned key.
//!
//! The segment is the identifier with the data prefix stripped. Identifiers
//! outside the data prefix are tagged with [`FOREIGN_TAG`], and a stripped
//! remainder that itself starts with `~` gets its tilde doubled, so distinct
//! identifiers never share a segment.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::identity::ResourceId;
use crate::temporal::Timestamp;

/// Separates the resource namespace from the version component of a key.
pub const VERSION_MARKER: &str = "?version=";

/// Identifier namespace the resource server uses for its own data.
pub const DEFAULT_DATA_PREFIX: &str = "trellis:data/";

/// Leads the segment of an identifier that does not start with the data prefix.
pub const FOREIGN_TAG: &str = "~ext/";

const ESCAPE: char = '~';

/// Encodes and decodes storage keys for a single key namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCodec {
    /// Prepended to every key (e.g. a per-deployment folder in the bucket).
    pub path_prefix: String,
    /// Stripped from identifiers that start with it.
    pub data_prefix: String,
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            data_prefix: DEFAULT_DATA_PREFIX.to_string(),
        }
    }
}

impl KeyCodec {
    pub fn new(path_prefix: impl Into<String>, data_prefix: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            data_prefix: data_prefix.into(),
        }
    }

    /// Build the storage key for `id` at `timestamp`.
    ///
    /// With `None`, returns the namespace prefix shared by every version key
    /// of `id` (ending in the version marker). It is used for enumeration and
    /// is not itself a valid version key.
    pub fn encode(&self, id: &ResourceId, timestamp: Option<Timestamp>) -> String {
        let mut key = self.namespace(id);
        if let Some(ts) = timestamp {
            key.push_str(&ts.epoch_seconds().to_string());
        }
        key
    }

    /// Key prefix covering every version of `id`.
    pub fn namespace(&self, id: &ResourceId) -> String {
        let segment = self.segment(id);
        let mut key =
            String::with_capacity(self.path_prefix.len() + segment.len() + VERSION_MARKER.len() + 20);
        key.push_str(&self.path_prefix);
        key.push_str(&segment);
        key.push_str(VERSION_MARKER);
        key
    }

    /// Extract the timestamp from a storage key.
    ///
    /// Returns `None` when the marker is missing or the suffix is not the
    /// canonical decimal form of an integer. Never fails.
    pub fn decode(key: &str) -> Option<Timestamp> {
        let (_, suffix) = key.rsplit_once(VERSION_MARKER)?;
        let seconds: i64 = suffix.parse().ok()?;
        // Reject "+5", "007" and friends so that decode(key) == Some(t)
        // implies key == encode(id, t).
        if seconds.to_string() != suffix {
            return None;
        }
        Some(Timestamp::from_epoch_seconds(seconds))
    }

    /// The identifier's part of a key. Injective over identifiers.
    fn segment<'a>(&self, id: &'a ResourceId) -> Cow<'a, str> {
        let raw = id.as_str();
        match raw.strip_prefix(self.data_prefix.as_str()) {
            Some(rest) if rest.starts_with(ESCAPE) => Cow::Owned(format!("{ESCAPE}{rest}")),
            Some(rest) => Cow::Borrowed(rest),
            None => Cow::Owned(format!("{FOREIGN_TAG}{raw}")),
        }
    }
}
