//! Vocabulary constants and alias expansion for LDPC.
//!
//! Constants are grouped by vocabulary:
//! - [`ldp`] - Linked Data Platform (http://www.w3.org/ns/ldp#)
//! - [`rdf`] - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - [`xsd`] - XSD datatypes (http://www.w3.org/2001/XMLSchema#)
//!
//! The resolver maps the short aliases used by the container protocol
//! (`rel`, `rev`, `resource`, `ldp:member`, `ldp:DirectContainer`) to full
//! IRIs. The table is a constant; expansion has no side effects.

use thiserror::Error;

/// LDP vocabulary constants
pub mod ldp {
    /// LDP namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/ldp#";

    /// ldp:hasMemberRelation IRI (forward membership relation)
    pub const HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";

    /// ldp:isMemberOfRelation IRI (inverse membership relation)
    pub const IS_MEMBER_OF_RELATION: &str = "http://www.w3.org/ns/ldp#isMemberOfRelation";

    /// ldp:membershipResource IRI
    pub const MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";

    /// ldp:member IRI
    pub const MEMBER: &str = "http://www.w3.org/ns/ldp#member";

    /// ldp:DirectContainer IRI
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";
}

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XSD vocabulary constants
pub mod xsd {
    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// Alias for the forward membership relation.
pub const REL: &str = "rel";
/// Alias for the inverse membership relation.
pub const REV: &str = "rev";
/// Alias for the membership resource reference.
pub const RESOURCE: &str = "resource";
/// Alias for container member references.
pub const MEMBER: &str = "ldp:member";
/// Alias for the direct container type.
pub const DIRECT_CONTAINER: &str = "ldp:DirectContainer";

const ALIASES: &[(&str, &str)] = &[
    (REL, ldp::HAS_MEMBER_RELATION),
    (REV, ldp::IS_MEMBER_OF_RELATION),
    (RESOURCE, ldp::MEMBERSHIP_RESOURCE),
    (MEMBER, ldp::MEMBER),
    (DIRECT_CONTAINER, ldp::DIRECT_CONTAINER),
];

/// Errors from vocabulary lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabError {
    /// A required alias has no expansion.
    #[error("unknown vocabulary alias: {0}")]
    UnknownAlias(String),
}

/// Expand a short alias to its full IRI.
///
/// Returns `None` for aliases outside the recognized set.
pub fn expand(alias: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(name, _)| *name == alias)
        .map(|(_, iri)| *iri)
}

/// Expand an alias the caller cannot proceed without.
pub fn expand_required(alias: &str) -> Result<&'static str, VocabError> {
    expand(alias).ok_or_else(|| VocabError::UnknownAlias(alias.to_string()))
}

/// The full alias table, in declaration order.
pub fn aliases() -> &'static [(&'static str, &'static str)] {
    ALIASES
}
