use ldpc_types::{Graph, Term, Triple};
use ldpc_vocab::{expand_required, rdf, DIRECT_CONTAINER, MEMBER, RESOURCE};

use crate::error::{DatasetError, DatasetResult};
use crate::link::Link;

/// Typed view of an LDP direct container.
///
/// A container with no `ldp:member` statements reads back with an empty
/// `members` list; an absent member field and an empty one are the same.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub uri: String,
    pub membership_resource: String,
    pub relation: Link,
    /// Member URIs in statement order (sorted).
    pub members: Vec<String>,
}

impl Container {
    /// A container without members.
    pub fn new(uri: impl Into<String>, membership_resource: impl Into<String>, relation: Link) -> Self {
        Self {
            uri: uri.into(),
            membership_resource: membership_resource.into(),
            relation,
            members: Vec::new(),
        }
    }

    /// Read a container out of its stored graph.
    pub fn from_graph(uri: &str, graph: &Graph) -> DatasetResult<Self> {
        let subject = Term::iri(uri);
        let not_a_container = |reason: &str| DatasetError::NotAContainer {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let rdf_type = Term::iri(rdf::TYPE);
        let container_type = Term::iri(expand_required(DIRECT_CONTAINER)?);
        if !graph.objects(&subject, &rdf_type).any(|o| *o == container_type) {
            return Err(not_a_container("missing ldp:DirectContainer type"));
        }

        let membership = Term::iri(expand_required(RESOURCE)?);
        let membership_resource = graph
            .objects(&subject, &membership)
            .find_map(Term::as_iri)
            .ok_or_else(|| not_a_container("missing ldp:membershipResource"))?
            .to_string();

        let mut relations = graph
            .matching(Some(&subject), None, None)
            .filter_map(|t| {
                let value = match t.object() {
                    Term::Iri(iri) => iri.to_string(),
                    Term::Literal(lit) => lit.lexical().to_string(),
                    Term::Blank(_) => return None,
                };
                Link::from_predicate(t.predicate_iri(), value)
            });
        let relation = relations
            .next()
            .ok_or_else(|| not_a_container("missing membership relation"))?;
        if relations.next().is_some() {
            return Err(not_a_container("more than one membership relation"));
        }

        let member = Term::iri(expand_required(MEMBER)?);
        let members = graph
            .objects(&subject, &member)
            .filter_map(Term::as_iri)
            .map(str::to_string)
            .collect();

        Ok(Self {
            uri: uri.to_string(),
            membership_resource,
            relation,
            members,
        })
    }

    /// The statements describing the container, members included.
    pub fn to_graph(&self) -> DatasetResult<Graph> {
        let mut graph = self.link_statements()?;
        graph.insert(Triple::iris(
            &self.uri,
            rdf::TYPE,
            expand_required(DIRECT_CONTAINER)?,
        ));
        let member = expand_required(MEMBER)?;
        for m in &self.members {
            graph.insert(Triple::iris(&self.uri, member, m));
        }
        Ok(graph)
    }

    /// The membership-resource and relation statements only.
    ///
    /// These are also recorded on the membership resource so the container
    /// can be found from it.
    pub fn link_statements(&self) -> DatasetResult<Graph> {
        let mut graph = Graph::new();
        graph.insert(Triple::iris(
            &self.uri,
            expand_required(RESOURCE)?,
            &self.membership_resource,
        ));
        graph.insert(Triple::iris(
            &self.uri,
            self.relation.predicate()?,
            self.relation.value(),
        ));
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpc_vocab::ldp;

    const C1: &str = "http://ex/c1";
    const R1: &str = "http://ex/r1";
    const HAS_PART: &str = "http://ex/hasPart";

    #[test]
    fn graph_roundtrip_without_members() {
        let container = Container::new(C1, R1, Link::Rel(HAS_PART.into()));
        let graph = container.to_graph().unwrap();
        assert_eq!(graph.len(), 3);
        assert!(graph.contains(&Triple::iris(C1, rdf::TYPE, ldp::DIRECT_CONTAINER)));
        assert!(graph.contains(&Triple::iris(C1, ldp::MEMBERSHIP_RESOURCE, R1)));
        assert!(graph.contains(&Triple::iris(C1, ldp::HAS_MEMBER_RELATION, HAS_PART)));

        let read = Container::from_graph(C1, &graph).unwrap();
        assert_eq!(read, container);
        assert!(read.members.is_empty());
    }

    #[test]
    fn members_are_read_back() {
        let mut container = Container::new(C1, R1, Link::Rev("http://ex/partOf".into()));
        container.members = vec!["http://ex/m1".into(), "http://ex/m2".into()];
        let read = Container::from_graph(C1, &container.to_graph().unwrap()).unwrap();
        assert_eq!(read.members, container.members);
        assert_eq!(read.relation, Link::Rev("http://ex/partOf".into()));
    }

    #[test]
    fn literal_relation_value_is_accepted() {
        let mut graph = Container::new(C1, R1, Link::Rel(HAS_PART.into()))
            .to_graph()
            .unwrap();
        graph.remove(&Triple::iris(C1, ldp::HAS_MEMBER_RELATION, HAS_PART));
        graph.insert(
            Triple::new(Term::iri(C1), Term::iri(ldp::HAS_MEMBER_RELATION), Term::string(HAS_PART))
                .unwrap(),
        );
        let read = Container::from_graph(C1, &graph).unwrap();
        assert_eq!(read.relation, Link::Rel(HAS_PART.into()));
    }

    #[test]
    fn rejects_plain_resource() {
        let mut graph = Graph::new();
        graph.insert(Triple::iris(R1, "http://ex/p", "http://ex/o"));
        let err = Container::from_graph(R1, &graph).unwrap_err();
        assert!(matches!(err, DatasetError::NotAContainer { .. }));
    }

    #[test]
    fn rejects_two_relations() {
        let mut graph = Container::new(C1, R1, Link::Rel(HAS_PART.into()))
            .to_graph()
            .unwrap();
        graph.insert(Triple::iris(C1, ldp::IS_MEMBER_OF_RELATION, "http://ex/partOf"));
        let err = Container::from_graph(C1, &graph).unwrap_err();
        assert!(matches!(err, DatasetError::NotAContainer { reason, .. } if reason.contains("more than one")));
    }

    #[test]
    fn link_statements_exclude_type_and_members() {
        let mut container = Container::new(C1, R1, Link::Rel(HAS_PART.into()));
        container.members.push("http://ex/m1".into());
        let links = container.link_statements().unwrap();
        assert_eq!(links.len(), 2);
        assert!(!links.contains(&Triple::iris(C1, rdf::TYPE, ldp::DIRECT_CONTAINER)));
    }
}
