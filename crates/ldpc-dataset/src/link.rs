//! Membership link descriptors.
//!
//! Callers describe a container's membership relation with a
//! [`LinkDescriptor`]: an object carrying exactly one of `rel` (forward,
//! `ldp:hasMemberRelation`) or `rev` (inverse, `ldp:isMemberOfRelation`).
//! [`LinkDescriptor::resolve`] validates it into a [`Link`].

use ldpc_types::Term;
use ldpc_vocab::{expand_required, ldp, REL, REV};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

/// Caller-supplied link, as received (e.g. decoded from JSON).
///
/// Keys may be the short aliases or the expanded LDP IRIs. Empty values
/// count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "http://www.w3.org/ns/ldp#hasMemberRelation"
    )]
    pub rel: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "http://www.w3.org/ns/ldp#isMemberOfRelation"
    )]
    pub rev: Option<String>,
}

impl LinkDescriptor {
    /// Descriptor with a forward relation.
    pub fn rel(predicate: impl Into<String>) -> Self {
        Self {
            rel: Some(predicate.into()),
            rev: None,
        }
    }

    /// Descriptor with an inverse relation.
    pub fn rev(predicate: impl Into<String>) -> Self {
        Self {
            rel: None,
            rev: Some(predicate.into()),
        }
    }

    /// Validate: exactly one of `rel` / `rev` must be set.
    pub fn resolve(&self) -> DatasetResult<Link> {
        let rel = self.rel.as_deref().filter(|v| !v.is_empty());
        let rev = self.rev.as_deref().filter(|v| !v.is_empty());
        match (rel, rev) {
            (Some(value), None) => Ok(Link::Rel(value.to_string())),
            (None, Some(value)) => Ok(Link::Rev(value.to_string())),
            (None, None) => Err(DatasetError::InvalidLinkDescriptor(
                "needs rel or rev".into(),
            )),
            (Some(_), Some(_)) => Err(DatasetError::InvalidLinkDescriptor(
                "rel and rev are mutually exclusive".into(),
            )),
        }
    }
}

impl From<Link> for LinkDescriptor {
    fn from(link: Link) -> Self {
        match link {
            Link::Rel(value) => Self::rel(value),
            Link::Rev(value) => Self::rev(value),
        }
    }
}

/// A validated membership relation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Link {
    /// Forward relation: `<membership-resource> <value> <member>`.
    Rel(String),
    /// Inverse relation: `<member> <value> <membership-resource>`.
    Rev(String),
}

impl Link {
    /// The vocabulary alias for this direction.
    pub fn alias(&self) -> &'static str {
        match self {
            Link::Rel(_) => REL,
            Link::Rev(_) => REV,
        }
    }

    /// The expanded LDP predicate that carries this relation.
    pub fn predicate(&self) -> DatasetResult<&'static str> {
        Ok(expand_required(self.alias())?)
    }

    /// The relation value (a predicate IRI).
    pub fn value(&self) -> &str {
        match self {
            Link::Rel(value) | Link::Rev(value) => value,
        }
    }

    /// Recognize an LDP relation predicate.
    pub(crate) fn from_predicate(predicate: &str, value: String) -> Option<Self> {
        match predicate {
            ldp::HAS_MEMBER_RELATION => Some(Link::Rel(value)),
            ldp::IS_MEMBER_OF_RELATION => Some(Link::Rev(value)),
            _ => None,
        }
    }

    /// `true` if `object` carries this link's value, as an IRI or a plain
    /// string literal.
    pub(crate) fn matches_object(&self, object: &Term) -> bool {
        match object {
            Term::Iri(iri) => &**iri == self.value(),
            Term::Literal(lit) => lit.is_plain() && lit.lexical() == self.value(),
            Term::Blank(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAS_PART: &str = "http://ex/hasPart";

    #[test]
    fn resolves_single_relation() {
        assert_eq!(
            LinkDescriptor::rel(HAS_PART).resolve().unwrap(),
            Link::Rel(HAS_PART.into())
        );
        assert_eq!(
            LinkDescriptor::rev(HAS_PART).resolve().unwrap(),
            Link::Rev(HAS_PART.into())
        );
    }

    #[test]
    fn rejects_neither_and_both() {
        let both = LinkDescriptor {
            rel: Some(HAS_PART.into()),
            rev: Some("http://ex/partOf".into()),
        };
        for descriptor in [LinkDescriptor::default(), both] {
            assert!(matches!(
                descriptor.resolve(),
                Err(DatasetError::InvalidLinkDescriptor(_))
            ));
        }
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let descriptor = LinkDescriptor {
            rel: Some(String::new()),
            rev: Some(HAS_PART.into()),
        };
        assert_eq!(descriptor.resolve().unwrap(), Link::Rev(HAS_PART.into()));
    }

    #[test]
    fn json_accepts_aliases_and_iris() {
        let short: LinkDescriptor = serde_json::from_str(r#"{"rel": "http://ex/hasPart"}"#).unwrap();
        let long: LinkDescriptor = serde_json::from_str(
            r#"{"http://www.w3.org/ns/ldp#isMemberOfRelation": "http://ex/partOf"}"#,
        )
        .unwrap();
        assert_eq!(short.resolve().unwrap(), Link::Rel(HAS_PART.into()));
        assert_eq!(long.resolve().unwrap(), Link::Rev("http://ex/partOf".into()));

        let empty: LinkDescriptor = serde_json::from_str("{}").unwrap();
        assert!(empty.resolve().is_err());
        assert_eq!(serde_json::to_string(&short).unwrap(), r#"{"rel":"http://ex/hasPart"}"#);
    }

    #[test]
    fn predicates_expand() {
        assert_eq!(Link::Rel(HAS_PART.into()).predicate().unwrap(), ldp::HAS_MEMBER_RELATION);
        assert_eq!(Link::Rev(HAS_PART.into()).predicate().unwrap(), ldp::IS_MEMBER_OF_RELATION);
    }

    #[test]
    fn object_matching() {
        let link = Link::Rel(HAS_PART.into());
        assert!(link.matches_object(&Term::iri(HAS_PART)));
        assert!(link.matches_object(&Term::string(HAS_PART)));
        assert!(!link.matches_object(&Term::lang_string(HAS_PART, "en")));
        assert!(!link.matches_object(&Term::iri("http://ex/other")));
        assert!(!link.matches_object(&Term::blank("b0")));
    }
}
