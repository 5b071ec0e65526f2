//! RDF term types: IRI, blank node, and literal.
//!
//! - An IRI is always expanded, never prefixed.
//! - A blank node label is local to the graph that holds it.
//! - A literal carries its lexical form, a datatype IRI, and an optional
//!   language tag (datatype is then `rdf:langString`).

use std::fmt;
use std::sync::Arc;

use ldpc_vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Blank node identifier.
///
/// Labels never include the `_:` prefix. Two graphs never share blank-node
/// identity, even when their labels are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Create a blank node id without validating the label.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Create a blank node id, rejecting labels N-Triples cannot carry.
    pub fn try_new(label: impl AsRef<str>) -> Result<Self, TypeError> {
        let label = label.as_ref();
        if is_valid_label(label) {
            Ok(Self::new(label))
        } else {
            Err(TypeError::InvalidBlankLabel(label.to_string()))
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_label(&self.0)
    }

    /// The label (without `_:` prefix).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.ends_with('.')
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// `[a-z]+(-[a-z0-9]+)*`, the lowercased BCP 47 shape N-Triples accepts.
fn is_valid_lang_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary_ok = subtags
        .next()
        .is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_lowercase()));
    primary_ok
        && subtags.all(|s| {
            !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An RDF literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Arc<str>,
    language: Option<Arc<str>>,
}

impl Literal {
    /// Plain string literal (`xsd:string`).
    pub fn string(value: impl AsRef<str>) -> Self {
        Self::typed(value, xsd::STRING)
    }

    /// Literal with an explicit datatype IRI.
    pub fn typed(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(value.as_ref()),
            datatype: Arc::from(datatype.as_ref()),
            language: None,
        }
    }

    /// Language-tagged string (`rdf:langString`). Tags are lowercased.
    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(value.as_ref()),
            datatype: Arc::from(rdf::LANG_STRING),
            language: Some(Arc::from(lang.as_ref().to_ascii_lowercase())),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// `true` for `xsd:string` literals without a language tag.
    pub fn is_plain(&self) -> bool {
        self.language.is_none() && &*self.datatype == xsd::STRING
    }
}

/// An RDF term (subject, predicate, or object position).
///
/// Ordering is IRIs, then blank nodes, then literals.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Full expanded IRI (e.g. "http://xmlns.com/foaf/0.1/name")
    Iri(Arc<str>),
    /// Graph-local blank node
    Blank(BlankId),
    /// Literal value
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(BlankId::new(label))
    }

    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::string(value))
    }

    pub fn typed(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal(Literal::typed(value, datatype))
    }

    pub fn lang_string(value: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal(Literal::lang_string(value, lang))
    }

    pub fn integer(value: i64) -> Self {
        Term::Literal(Literal::typed(value.to_string(), xsd::INTEGER))
    }

    pub fn boolean(value: bool) -> Self {
        Term::Literal(Literal::typed(value.to_string(), xsd::BOOLEAN))
    }

    /// Check that the term has an N-Triples form that parses back to it.
    ///
    /// IRIs and datatypes must be non-empty, blank labels must pass
    /// [`BlankId::try_new`], and a language tag must be well formed and
    /// paired with `rdf:langString`.
    pub fn check(&self) -> Result<(), TypeError> {
        let reason = match self {
            Term::Iri(iri) if iri.is_empty() => Some("empty IRI"),
            Term::Iri(_) => None,
            Term::Blank(id) if !id.is_valid() => Some("invalid blank node label"),
            Term::Blank(_) => None,
            Term::Literal(lit) => match lit.language() {
                _ if lit.datatype().is_empty() => Some("empty datatype IRI"),
                Some(tag) if !is_valid_lang_tag(tag) => Some("invalid language tag"),
                Some(_) if lit.datatype() != rdf::LANG_STRING => {
                    Some("language tag on a literal that is not rdf:langString")
                }
                _ => None,
            },
        };
        match reason {
            Some(reason) => Err(TypeError::InvalidTerm {
                term: self.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankId> {
        match self {
            Term::Blank(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl From<BlankId> for Term {
    fn from(id: BlankId) -> Self {
        Term::Blank(id)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

/// Human-readable form close to N-Triples (no escaping).
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(id) => write!(f, "{id}"),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", lit.lexical())?;
                if let Some(lang) = lit.language() {
                    write!(f, "@{lang}")
                } else if !lit.is_plain() {
                    write!(f, "^^<{}>", lit.datatype())
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_label_validation() {
        assert!(BlankId::try_new("b0").is_ok());
        assert!(BlankId::try_new("node-1.a").is_ok());
        assert!(BlankId::try_new("").is_err());
        assert!(BlankId::try_new("trailing.").is_err());
        assert!(BlankId::try_new("has space").is_err());
    }

    #[test]
    fn well_formed_terms_pass_check() {
        assert!(Term::iri("http://ex/a").check().is_ok());
        assert!(Term::blank("b0").check().is_ok());
        assert!(Term::string("").check().is_ok());
        assert!(Term::lang_string("colour", "en-GB").check().is_ok());
        assert!(Term::lang_string("x", "de-1996").check().is_ok());
        assert!(Term::integer(7).check().is_ok());
    }

    #[test]
    fn malformed_terms_fail_check() {
        let reason = |term: Term| match term.check() {
            Err(TypeError::InvalidTerm { reason, .. }) => reason,
            other => panic!("expected InvalidTerm, got {other:?}"),
        };
        assert_eq!(reason(Term::iri("")), "empty IRI");
        assert_eq!(reason(Term::typed("x", "")), "empty datatype IRI");
        assert_eq!(reason(Term::lang_string("x", "")), "invalid language tag");
        assert_eq!(reason(Term::lang_string("x", "en-")), "invalid language tag");
        assert_eq!(reason(Term::lang_string("x", "1en")), "invalid language tag");
        assert_eq!(reason(Term::lang_string("x", "en us")), "invalid language tag");
        assert_eq!(reason(Term::blank("has space")), "invalid blank node label");
    }

    #[test]
    fn plain_and_typed_literals() {
        let plain = Literal::string("Alice");
        assert!(plain.is_plain());
        assert_eq!(plain.datatype(), xsd::STRING);

        let typed = Literal::typed("42", xsd::INTEGER);
        assert!(!typed.is_plain());
        assert_eq!(Term::integer(42), Term::Literal(typed));
    }

    #[test]
    fn lang_tag_is_lowercased() {
        let lit = Literal::lang_string("Bonjour", "FR");
        assert_eq!(lit.language(), Some("fr"));
        assert_eq!(lit.datatype(), rdf::LANG_STRING);
    }

    #[test]
    fn iri_orders_before_blank_and_literal() {
        let mut terms = vec![Term::string("z"), Term::blank("b"), Term::iri("http://a")];
        terms.sort();
        assert!(terms[0].is_iri());
        assert!(terms[1].is_blank());
        assert!(terms[2].is_literal());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Term::iri("http://ex/a").to_string(), "<http://ex/a>");
        assert_eq!(Term::blank("b1").to_string(), "_:b1");
        assert_eq!(Term::string("x").to_string(), "\"x\"");
        assert_eq!(Term::lang_string("x", "en").to_string(), "\"x\"@en");
        assert_eq!(
            Term::boolean(true).to_string(),
            format!("\"true\"^^<{}>", xsd::BOOLEAN)
        );
    }
}
