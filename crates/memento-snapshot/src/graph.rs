//! Builds a typed [`Snapshot`] from a raw statement graph.
//!
//! Producers that hold only a dataset (rather than a typed resource) wrap it in
//! a [`StatementGraph`] and convert once. The graph is scanned a single time;
//! afterwards extraction sees the same typed accessors as any other snapshot.

use chrono::{DateTime, Utc};
use memento_types::ResourceId;
use serde::{Deserialize, Serialize};

use crate::error::{SnapshotError, SnapshotResult};
use crate::snapshot::{BinaryDescriptor, InteractionModel, Membership, Snapshot};
use crate::statement::{vocab, GraphName, Statement};

/// A resource identifier plus the full set of statements describing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementGraph {
    pub id: ResourceId,
    pub statements: Vec<Statement>,
}

impl StatementGraph {
    pub fn new(id: ResourceId, statements: Vec<Statement>) -> Self {
        Self { id, statements }
    }

    /// Read the structural facts out of the graph.
    ///
    /// - server-managed, subject = id: `rdf:type` (required),
    ///   `dc:modified` (required), `dc:isPartOf`, `dc:hasPart`
    /// - server-managed, subject = binary: `dc:extent`, `dc:format`, `dc:modified`
    /// - user-managed, subject = id: the four LDP membership relations
    /// - any access-control statement sets the ACL hint
    pub fn into_snapshot(self) -> SnapshotResult<Snapshot> {
        let id = self.id;
        let mut interaction_model = None;
        let mut modified = None;
        let mut container = None;
        let mut binary_location: Option<String> = None;
        let mut membership = Membership::default();
        let mut acl_present = false;

        for st in &self.statements {
            match st.graph {
                GraphName::ServerManaged if st.subject == id.as_str() => {
                    match st.predicate.as_str() {
                        vocab::RDF_TYPE => {
                            if let Some(iri) = st.object.as_iri() {
                                let model = InteractionModel::from_iri(iri).ok_or_else(|| {
                                    SnapshotError::malformed(&id, format!("unknown interaction model {iri}"))
                                })?;
                                interaction_model = Some(model);
                            }
                        }
                        vocab::DC_MODIFIED => {
                            if let Some(lexical) = st.object.as_literal() {
                                modified = Some(parse_date(&id, lexical)?);
                            }
                        }
                        vocab::DC_IS_PART_OF => {
                            if let Some(iri) = st.object.as_iri() {
                                container = Some(iri.to_string());
                            }
                        }
                        vocab::DC_HAS_PART if binary_location.is_none() => {
                            if let Some(iri) = st.object.as_iri() {
                                binary_location = Some(iri.to_string());
                            }
                        }
                        _ => {}
                    }
                }
                GraphName::UserManaged if st.subject == id.as_str() => {
                    let Some(iri) = st.object.as_iri() else { continue };
                    let slot = match st.predicate.as_str() {
                        vocab::LDP_MEMBERSHIP_RESOURCE => &mut membership.membership_resource,
                        vocab::LDP_HAS_MEMBER_RELATION => &mut membership.member_relation,
                        vocab::LDP_IS_MEMBER_OF_RELATION => &mut membership.member_of_relation,
                        vocab::LDP_INSERTED_CONTENT_RELATION => &mut membership.inserted_content_relation,
                        _ => continue,
                    };
                    *slot = Some(iri.to_string());
                }
                GraphName::AccessControl => acl_present = true,
                _ => {}
            }
        }

        let binary = match binary_location {
            Some(location) => Some(read_binary(&id, location, &self.statements)?),
            None => None,
        };

        let interaction_model = interaction_model
            .ok_or_else(|| SnapshotError::malformed(&id, "no interaction model in server-managed graph"))?;
        let modified =
            modified.ok_or_else(|| SnapshotError::malformed(&id, "no modification date in server-managed graph"))?;

        Ok(Snapshot {
            id,
            modified,
            interaction_model,
            container,
            binary,
            membership,
            acl_present,
            statements: self.statements,
        })
    }
}

impl TryFrom<StatementGraph> for Snapshot {
    type Error = SnapshotError;

    fn try_from(graph: StatementGraph) -> Result<Self, Self::Error> {
        graph.into_snapshot()
    }
}

fn read_binary(id: &ResourceId, location: String, statements: &[Statement]) -> SnapshotResult<BinaryDescriptor> {
    let mut binary = BinaryDescriptor::new(location);
    let facts = statements
        .iter()
        .filter(|st| st.graph == GraphName::ServerManaged && st.subject == binary.location);
    let mut media_type = None;
    let mut size = None;
    let mut modified = None;
    for st in facts {
        let Some(lexical) = st.object.as_literal() else { continue };
        match st.predicate.as_str() {
            vocab::DC_EXTENT => {
                let parsed = lexical
                    .parse::<u64>()
                    .map_err(|_| SnapshotError::malformed(id, format!("binary size {lexical:?} is not an integer")))?;
                size = Some(parsed);
            }
            vocab::DC_FORMAT => media_type = Some(lexical.to_string()),
            vocab::DC_MODIFIED => modified = Some(parse_date(id, lexical)?),
            _ => {}
        }
    }
    binary.media_type = media_type;
    binary.size = size;
    binary.modified = modified;
    Ok(binary)
}

fn parse_date(id: &ResourceId, lexical: &str) -> SnapshotResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(lexical)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SnapshotError::malformed(id, format!("invalid date {lexical:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Term;
    use chrono::TimeZone;

    const ID: &str = "trellis:data/res1";

    fn server(subject: &str, predicate: &str, object: Term) -> Statement {
        Statement::new(GraphName::ServerManaged, subject, predicate, object)
    }

    fn user(predicate: &str, object: Term) -> Statement {
        Statement::new(GraphName::UserManaged, ID, predicate, object)
    }

    fn required() -> Vec<Statement> {
        vec![
            server(ID, vocab::RDF_TYPE, Term::iri("http://www.w3.org/ns/ldp#NonRDFSource")),
            server(ID, vocab::DC_MODIFIED, Term::literal("2020-01-01T00:00:00Z")),
        ]
    }

    fn graph(statements: Vec<Statement>) -> StatementGraph {
        StatementGraph::new(ResourceId::new(ID).unwrap(), statements)
    }

    #[test]
    fn reads_required_facts() {
        let snap = graph(required()).into_snapshot().unwrap();
        assert_eq!(snap.interaction_model, InteractionModel::NonRdfSource);
        assert_eq!(snap.modified, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert!(snap.binary.is_none());
        assert!(snap.membership.is_empty());
        assert!(!snap.acl_present);
        assert_eq!(snap.statements.len(), 2);
    }

    #[test]
    fn reads_binary_descriptor() {
        let mut statements = required();
        statements.push(server(ID, vocab::DC_HAS_PART, Term::iri("s3://bin/res1")));
        statements.push(server("s3://bin/res1", vocab::DC_EXTENT, Term::literal("512")));
        statements.push(server("s3://bin/res1", vocab::DC_FORMAT, Term::literal("text/plain")));
        statements.push(server("s3://bin/res1", vocab::DC_MODIFIED, Term::literal("2019-12-31T23:00:00Z")));

        let binary = graph(statements).into_snapshot().unwrap().binary.unwrap();
        assert_eq!(binary.location, "s3://bin/res1");
        assert_eq!(binary.size, Some(512));
        assert_eq!(binary.media_type.as_deref(), Some("text/plain"));
        assert_eq!(binary.modified, Some(Utc.with_ymd_and_hms(2019, 12, 31, 23, 0, 0).unwrap()));
    }

    #[test]
    fn reads_membership_and_container() {
        let mut statements = required();
        statements.push(server(ID, vocab::DC_IS_PART_OF, Term::iri("trellis:data/")));
        statements.push(user(vocab::LDP_MEMBERSHIP_RESOURCE, Term::iri("trellis:data/m")));
        statements.push(user(vocab::LDP_IS_MEMBER_OF_RELATION, Term::iri("http://example.com/of")));
        // Literal objects are not relations.
        statements.push(user(vocab::LDP_HAS_MEMBER_RELATION, Term::literal("nope")));

        let snap = graph(statements).into_snapshot().unwrap();
        assert_eq!(snap.container.as_deref(), Some("trellis:data/"));
        assert_eq!(snap.membership.membership_resource.as_deref(), Some("trellis:data/m"));
        assert_eq!(snap.membership.member_of_relation.as_deref(), Some("http://example.com/of"));
        assert_eq!(snap.membership.member_relation, None);
    }

    #[test]
    fn statements_about_other_subjects_ignored() {
        let mut statements = required();
        statements.push(Statement::new(
            GraphName::UserManaged,
            "trellis:data/other",
            vocab::LDP_HAS_MEMBER_RELATION,
            Term::iri("urn:x"),
        ));
        let snap = graph(statements).into_snapshot().unwrap();
        assert!(snap.membership.is_empty());
    }

    #[test]
    fn access_control_graph_sets_hint() {
        let mut statements = required();
        statements.push(Statement::new(GraphName::AccessControl, "urn:auth", "urn:p", Term::literal("x")));
        assert!(graph(statements).into_snapshot().unwrap().acl_present);
    }

    #[test]
    fn missing_required_facts_are_malformed() {
        let err = graph(vec![]).into_snapshot().unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed { .. }));

        let only_type = vec![server(ID, vocab::RDF_TYPE, Term::iri("http://www.w3.org/ns/ldp#RDFSource"))];
        assert!(graph(only_type).into_snapshot().is_err());
    }

    #[test]
    fn bad_literals_are_malformed() {
        let mut statements = required();
        statements.push(server(ID, vocab::DC_HAS_PART, Term::iri("s3://bin/res1")));
        statements.push(server("s3://bin/res1", vocab::DC_EXTENT, Term::literal("big")));
        assert!(Snapshot::try_from(graph(statements)).is_err());

        let statements = vec![
            server(ID, vocab::RDF_TYPE, Term::iri("http://www.w3.org/ns/ldp#RDFSource")),
            server(ID, vocab::DC_MODIFIED, Term::literal("last tuesday")),
        ];
        assert!(graph(statements).into_snapshot().is_err());
    }
}
