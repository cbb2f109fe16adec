//! The flat attribute bundle stored alongside each snapshot body.
//!
//! Absent attributes are omitted, never stored as empty strings: an empty
//! value would make "absent" and "empty" indistinguishable on read-back.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::{BinaryDescriptor, InteractionModel, Membership};

/// Field names used in a [`MetadataBundle`].
pub mod keys {
    pub const INTERACTION_MODEL: &str = "interaction-model";
    pub const MODIFIED: &str = "modified";
    pub const CONTAINER: &str = "container";
    pub const BINARY_LOCATION: &str = "binary-location";
    pub const BINARY_TYPE: &str = "binary-type";
    pub const BINARY_SIZE: &str = "binary-size";
    pub const BINARY_DATE: &str = "binary-date";
    pub const MEMBERSHIP_RESOURCE: &str = "membership-resource";
    pub const MEMBER_RELATION: &str = "member-relation";
    pub const MEMBER_OF_RELATION: &str = "member-of-relation";
    pub const INSERTED_CONTENT_RELATION: &str = "inserted-content-relation";
    pub const HAS_ACL: &str = "has-acl";
}

/// String-keyed projection of a snapshot's structural facts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataBundle {
    fields: BTreeMap<String, String>,
}

impl MetadataBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap fields read back from a store, dropping any empty values.
    pub fn from_map(fields: BTreeMap<String, String>) -> Self {
        Self {
            fields: fields.into_iter().filter(|(_, v)| !v.is_empty()).collect(),
        }
    }

    /// Set a field. Empty values are ignored.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.fields
    }

    // -- typed read-back --------------------------------------------------

    pub fn interaction_model(&self) -> Option<InteractionModel> {
        self.get(keys::INTERACTION_MODEL).and_then(InteractionModel::from_iri)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.get(keys::MODIFIED).and_then(parse_instant)
    }

    pub fn container(&self) -> Option<&str> {
        self.get(keys::CONTAINER)
    }

    pub fn binary(&self) -> Option<BinaryDescriptor> {
        let location = self.get(keys::BINARY_LOCATION)?;
        Some(BinaryDescriptor {
            location: location.to_string(),
            media_type: self.get(keys::BINARY_TYPE).map(str::to_string),
            size: self.get(keys::BINARY_SIZE).and_then(|s| s.parse().ok()),
            modified: self.get(keys::BINARY_DATE).and_then(parse_instant),
        })
    }

    pub fn membership(&self) -> Membership {
        let field = |key: &str| self.get(key).map(str::to_string);
        Membership {
            membership_resource: field(keys::MEMBERSHIP_RESOURCE),
            member_relation: field(keys::MEMBER_RELATION),
            member_of_relation: field(keys::MEMBER_OF_RELATION),
            inserted_content_relation: field(keys::INSERTED_CONTENT_RELATION),
        }
    }

    /// Positive hint only; `false` does not prove absence of access control.
    pub fn has_acl(&self) -> bool {
        self.get(keys::HAS_ACL) == Some("true")
    }
}

impl FromIterator<(String, String)> for MetadataBundle {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

pub(crate) fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
