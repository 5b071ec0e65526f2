//! RDF graph: an unordered set of triples.
//!
//! Backed by a `BTreeSet`, so duplicates collapse and iteration order is
//! the total order of [`Triple`]. That order depends on blank-node labels
//! and is therefore NOT canonical; canonical output is the codec's job.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::term::{BlankId, Term};
use crate::triple::Triple;

/// A set of RDF triples with graph-local blank nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Blank nodes used anywhere in the graph.
    pub fn blank_nodes(&self) -> BTreeSet<BlankId> {
        self.triples
            .iter()
            .flat_map(|t| [t.subject(), t.object()])
            .filter_map(Term::as_blank)
            .cloned()
            .collect()
    }

    /// Triples matching a pattern; `None` matches anything.
    pub fn matching<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a Term>,
        object: Option<&'a Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| {
            subject.map_or(true, |s| t.subject() == s)
                && predicate.map_or(true, |p| t.predicate() == p)
                && object.map_or(true, |o| t.object() == o)
        })
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(Some(subject), Some(predicate), None)
            .map(Triple::object)
    }

    /// Subjects of `(?, predicate, object)`.
    pub fn subjects<'a>(
        &'a self,
        predicate: &'a Term,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(None, Some(predicate), Some(object))
            .map(Triple::subject)
    }

    /// Statement-set union over shared labels.
    ///
    /// An equal blank label in both graphs is treated as one node. Use
    /// [`Graph::merge_apart`] when the two graphs come from different
    /// sources.
    pub fn merge(&mut self, other: &Graph) {
        self.triples.extend(other.triples.iter().cloned());
    }

    /// Union with `other`, whose blank nodes are first renamed so that none
    /// of them coincides with a blank node of `self`.
    pub fn merge_apart(&mut self, other: &Graph) {
        let renamed = other.renamed_apart(self);
        self.triples.extend(renamed.triples);
    }

    /// Union of two graphs as a new graph (shared labels, see [`Graph::merge`]).
    pub fn union(&self, other: &Graph) -> Graph {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Copy of the graph with blank nodes renamed `{prefix}0`, `{prefix}1`, ...
    /// in label order. The result is isomorphic to `self`.
    pub fn relabel_blank_nodes(&self, prefix: &str) -> Graph {
        let mapping: BTreeMap<BlankId, BlankId> = self
            .blank_nodes()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, BlankId::new(format!("{prefix}{i}"))))
            .collect();
        self.rename(&mapping)
    }

    /// Isomorphic copy whose blank labels are all absent from `other`.
    pub fn renamed_apart(&self, other: &Graph) -> Graph {
        let taken = other.blank_nodes();
        let mut next = 0usize;
        let mut fresh = || loop {
            let candidate = BlankId::new(format!("b{next}"));
            next += 1;
            if !taken.contains(&candidate) {
                return candidate;
            }
        };
        let mapping: BTreeMap<BlankId, BlankId> = self
            .blank_nodes()
            .into_iter()
            .map(|id| (id, fresh()))
            .collect();
        self.rename(&mapping)
    }

    fn rename(&self, mapping: &BTreeMap<BlankId, BlankId>) -> Graph {
        self.triples
            .iter()
            .map(|t| {
                t.map_terms(|term| match term {
                    Term::Blank(id) => mapping
                        .get(id)
                        .map_or_else(|| term.clone(), |new| Term::Blank(new.clone())),
                    other => other.clone(),
                })
            })
            .collect()
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples.into_iter().collect()
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}
