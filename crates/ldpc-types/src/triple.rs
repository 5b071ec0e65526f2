use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::term::Term;

/// A single RDF statement.
///
/// Subjects are IRIs or blank nodes, predicates are IRIs. Fields are private
/// so every triple in a [`Graph`](crate::Graph) has passed these checks.
/// Deserialization goes through [`Triple::new`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTriple")]
pub struct Triple {
    subject: Term,
    predicate: Term,
    object: Term,
}

#[derive(Deserialize)]
struct RawTriple {
    subject: Term,
    predicate: Term,
    object: Term,
}

impl TryFrom<RawTriple> for Triple {
    type Error = TypeError;

    fn try_from(raw: RawTriple) -> Result<Self, Self::Error> {
        Triple::new(raw.subject, raw.predicate, raw.object)
    }
}

impl Triple {
    /// Build a triple, validating term positions and term syntax
    /// (see [`Term::check`]).
    pub fn new(subject: Term, predicate: Term, object: Term) -> Result<Self, TypeError> {
        for term in [&subject, &predicate, &object] {
            term.check()?;
        }
        if subject.is_literal() {
            return Err(TypeError::InvalidPosition {
                position: "subject",
                term: subject.to_string(),
            });
        }
        if !predicate.is_iri() {
            return Err(TypeError::InvalidPosition {
                position: "predicate",
                term: predicate.to_string(),
            });
        }
        Ok(Self {
            subject,
            predicate,
            object,
        })
    }

    /// Build an all-IRI triple. IRIs are valid in every position.
    ///
    /// Emptiness is not checked here; the codec refuses to canonicalize a
    /// graph holding an empty IRI.
    pub fn iris(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            subject: Term::iri(subject),
            predicate: Term::iri(predicate),
            object: Term::iri(object),
        }
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn predicate(&self) -> &Term {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    /// The predicate IRI. Always present by construction.
    pub fn predicate_iri(&self) -> &str {
        self.predicate.as_iri().unwrap_or_default()
    }

    /// Rebuild the triple with every term passed through `f`.
    ///
    /// `f` must preserve term kinds (it is used for blank-node relabeling).
    pub(crate) fn map_terms(&self, mut f: impl FnMut(&Term) -> Term) -> Self {
        Self {
            subject: f(&self.subject),
            predicate: f(&self.predicate),
            object: f(&self.object),
        }
    }

    pub fn into_parts(self) -> (Term, Term, Term) {
        (self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_subject_rejected() {
        let err = Triple::new(Term::string("x"), Term::iri("http://p"), Term::iri("http://o"))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidPosition { position: "subject", .. }));
    }

    #[test]
    fn blank_predicate_rejected() {
        let err = Triple::new(Term::iri("http://s"), Term::blank("p"), Term::iri("http://o"))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidPosition { position: "predicate", .. }));
    }

    #[test]
    fn malformed_terms_rejected() {
        let err = Triple::new(Term::iri("http://s"), Term::iri("http://p"), Term::iri(""))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidTerm { reason: "empty IRI", .. }));

        let err = Triple::new(
            Term::iri("http://s"),
            Term::iri("http://p"),
            Term::lang_string("x", ""),
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::InvalidTerm { .. }));
    }

    // --- serde ---

    #[test]
    fn serde_roundtrip() {
        let t = Triple::new(Term::blank("b0"), Term::iri("http://p"), Term::integer(3)).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(serde_json::from_str::<Triple>(&json).unwrap(), t);
    }

    #[test]
    fn deserialize_checks_positions() {
        let forged = serde_json::json!({
            "subject": Term::string("x"),
            "predicate": Term::iri("http://p"),
            "object": Term::iri("http://o"),
        });
        let err = serde_json::from_value::<Triple>(forged).unwrap_err();
        assert!(err.to_string().contains("cannot be used as subject"));

        let forged = serde_json::json!({
            "subject": Term::iri("http://s"),
            "predicate": Term::iri(""),
            "object": Term::iri("http://o"),
        });
        assert!(serde_json::from_value::<Triple>(forged).is_err());
    }

    #[test]
    fn blank_subject_and_literal_object_accepted() {
        let t = Triple::new(Term::blank("b0"), Term::iri("http://p"), Term::string("v")).unwrap();
        assert!(t.subject().is_blank());
        assert_eq!(t.predicate_iri(), "http://p");
        assert_eq!(t.to_string(), "_:b0 <http://p> \"v\" .");
    }
}
