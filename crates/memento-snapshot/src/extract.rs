//! Projection of a snapshot into its [`MetadataBundle`].

use crate::error::{SnapshotError, SnapshotResult};
use crate::metadata::{format_instant, keys, MetadataBundle};
use crate::snapshot::MetadataSource;

/// Build the metadata bundle for `source`.
///
/// Every optional attribute that is present appears in the bundle and every
/// absent one is omitted. Missing optional attributes never cause a failure;
/// a present-but-empty value does, since it cannot be told apart from absence
/// once stored.
pub fn extract<S: MetadataSource + ?Sized>(source: &S) -> SnapshotResult<MetadataBundle> {
    let id = source.identifier();
    let mut bundle = MetadataBundle::new();

    bundle.insert(keys::INTERACTION_MODEL, source.interaction_model().as_iri());
    bundle.insert(keys::MODIFIED, format_instant(&source.modified()));

    if let Some(container) = source.container() {
        bundle.insert(keys::CONTAINER, non_empty(id, keys::CONTAINER, container)?);
    }

    if let Some(binary) = source.binary() {
        bundle.insert(keys::BINARY_LOCATION, non_empty(id, keys::BINARY_LOCATION, &binary.location)?);
        if let Some(media_type) = &binary.media_type {
            bundle.insert(keys::BINARY_TYPE, non_empty(id, keys::BINARY_TYPE, media_type)?);
        }
        if let Some(size) = binary.size {
            bundle.insert(keys::BINARY_SIZE, size.to_string());
        }
        if let Some(modified) = &binary.modified {
            bundle.insert(keys::BINARY_DATE, format_instant(modified));
        }
    }

    let membership = source.membership();
    let relations = [
        (keys::MEMBERSHIP_RESOURCE, &membership.membership_resource),
        (keys::MEMBER_RELATION, &membership.member_relation),
        (keys::MEMBER_OF_RELATION, &membership.member_of_relation),
        (keys::INSERTED_CONTENT_RELATION, &membership.inserted_content_relation),
    ];
    for (key, value) in relations {
        if let Some(value) = value {
            bundle.insert(key, non_empty(id, key, value)?);
        }
    }

    if source.has_acl() {
        bundle.insert(keys::HAS_ACL, "true");
    }

    tracing::trace!(resource = %id, fields = bundle.len(), "extracted metadata bundle");
    Ok(bundle)
}

fn non_empty<'a>(id: &memento_types::ResourceId, key: &str, value: &'a str) -> SnapshotResult<&'a str> {
    if value.is_empty() {
        return Err(SnapshotError::malformed(id, format!("{key} is present but empty")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{BinaryDescriptor, InteractionModel, Membership, Snapshot};
    use crate::statement::{GraphName, Statement, Term};
    use chrono::{TimeZone, Utc};
    use memento_types::ResourceId;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            ResourceId::new("trellis:data/res1").unwrap(),
            Utc.timestamp_opt(100, 0).unwrap(),
            InteractionModel::BasicContainer,
        )
    }

    #[test]
    fn minimal_snapshot_has_only_required_fields() {
        let bundle = extract(&snapshot()).unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.get(keys::INTERACTION_MODEL), Some("http://www.w3.org/ns/ldp#BasicContainer"));
        assert_eq!(bundle.get(keys::MODIFIED), Some("1970-01-01T00:01:40Z"));
        for absent in [
            keys::CONTAINER,
            keys::BINARY_LOCATION,
            keys::BINARY_TYPE,
            keys::BINARY_SIZE,
            keys::BINARY_DATE,
            keys::MEMBERSHIP_RESOURCE,
            keys::MEMBER_RELATION,
            keys::MEMBER_OF_RELATION,
            keys::INSERTED_CONTENT_RELATION,
            keys::HAS_ACL,
        ] {
            assert!(!bundle.contains(absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn every_present_attribute_is_projected() {
        let snap = snapshot()
            .with_container("trellis:data/")
            .with_binary(
                BinaryDescriptor::new("s3://bin/res1")
                    .with_media_type("image/png")
                    .with_size(2048)
                    .with_modified(Utc.timestamp_opt(90, 0).unwrap()),
            )
            .with_membership(Membership {
                membership_resource: Some("trellis:data/members".into()),
                member_relation: Some("http://example.com/member".into()),
                member_of_relation: None,
                inserted_content_relation: Some("http://www.w3.org/ns/ldp#MemberSubject".into()),
            });

        let bundle = extract(&snap).unwrap();
        assert_eq!(bundle.get(keys::CONTAINER), Some("trellis:data/"));
        assert_eq!(bundle.get(keys::BINARY_LOCATION), Some("s3://bin/res1"));
        assert_eq!(bundle.get(keys::BINARY_TYPE), Some("image/png"));
        assert_eq!(bundle.get(keys::BINARY_SIZE), Some("2048"));
        assert_eq!(bundle.get(keys::BINARY_DATE), Some("1970-01-01T00:01:30Z"));
        assert_eq!(bundle.get(keys::MEMBERSHIP_RESOURCE), Some("trellis:data/members"));
        assert_eq!(bundle.get(keys::MEMBER_RELATION), Some("http://example.com/member"));
        assert!(!bundle.contains(keys::MEMBER_OF_RELATION));
        assert!(bundle.contains(keys::INSERTED_CONTENT_RELATION));
    }

    #[test]
    fn acl_statements_set_flag() {
        let snap = snapshot().with_statements(vec![Statement::new(
            GraphName::AccessControl,
            "trellis:data/res1#auth",
            "http://www.w3.org/ns/auth/acl#agentClass",
            Term::iri("http://xmlns.com/foaf/0.1/Agent"),
        )]);
        assert_eq!(extract(&snap).unwrap().get(keys::HAS_ACL), Some("true"));
    }

    #[test]
    fn empty_optional_value_is_malformed() {
        let snap = snapshot().with_container("");
        assert!(matches!(extract(&snap), Err(SnapshotError::Malformed { .. })));

        let snap = snapshot().with_membership(Membership {
            member_relation: Some(String::new()),
            ..Default::default()
        });
        assert!(matches!(extract(&snap), Err(SnapshotError::Malformed { .. })));
    }

    #[test]
    fn bundle_reconstructs_snapshot_facts() {
        let snap = snapshot()
            .with_container("trellis:data/")
            .with_binary(BinaryDescriptor::new("s3://bin/res1").with_size(1));
        let bundle = extract(&snap).unwrap();
        let rebuilt = Snapshot::from_parts(snap.id.clone(), &bundle, vec![]).unwrap();
        assert_eq!(rebuilt, snap);
    }
}
