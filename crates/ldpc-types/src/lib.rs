//! Foundation types for LDPC, the canonical Linked-Data resource store.
//!
//! Every other LDPC crate depends on `ldpc-types`. It holds the in-memory
//! RDF data model and the content hash used to address stored payloads.
//!
//! # Key Types
//!
//! - [`Term`] -- IRI, blank node, or literal
//! - [`Triple`] -- a validated `(subject, predicate, object)` statement
//! - [`Graph`] -- an unordered set of triples with graph-local blank nodes
//! - [`ContentHash`] -- BLAKE3 digest of a canonical serialization

pub mod error;
pub mod graph;
pub mod hash;
pub mod term;
pub mod triple;

pub use error::TypeError;
pub use graph::Graph;
pub use hash::ContentHash;
pub use term::{BlankId, Literal, Term};
pub use triple::Triple;
