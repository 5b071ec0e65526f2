//! Canonical codec for LDPC resource payloads.
//!
//! A codec turns stored bytes into a [`Graph`] and a graph into canonical
//! bytes. Canonical bytes are equal exactly when the graphs are isomorphic:
//! statement order and blank-node labels never leak into the output, so a
//! content hash over them is stable.
//!
//! # Modules
//!
//! - [`ntriples`] -- N-Triples reader and writer
//! - [`canon`] -- canonical blank-node labeling
//! - [`error`] -- [`CodecError`] and [`CanonicalizationError`]

pub mod canon;
pub mod error;
pub mod ntriples;

pub use canon::{canonical_ntriples, CanonConfig, CANONICAL_PREFIX};
pub use error::{CanonicalizationError, CodecError, CodecResult};

use ldpc_types::Graph;

/// Parse and canonicalize graphs.
///
/// Implementations must satisfy:
/// - `canonicalize(g1) == canonicalize(g2)` iff `g1` and `g2` are isomorphic.
/// - `parse(canonicalize(g))` is isomorphic to `g`.
pub trait Codec: Send + Sync {
    /// Deserialize a storage payload.
    fn parse(&self, raw: &[u8]) -> CodecResult<Graph>;

    /// Produce the canonical byte form of a graph.
    fn canonicalize(&self, graph: &Graph) -> CodecResult<Vec<u8>>;

    /// `true` if the graphs are isomorphic.
    fn isomorphic(&self, a: &Graph, b: &Graph) -> CodecResult<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        Ok(self.canonicalize(a)? == self.canonicalize(b)?)
    }
}

/// N-Triples codec with canonical blank-node labeling.
#[derive(Clone, Debug, Default)]
pub struct NTriplesCodec {
    config: CanonConfig,
}

impl NTriplesCodec {
    pub fn new(config: CanonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanonConfig {
        &self.config
    }
}

impl Codec for NTriplesCodec {
    fn parse(&self, raw: &[u8]) -> CodecResult<Graph> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| CodecError::parse(0, format!("payload is not UTF-8: {e}")))?;
        ntriples::parse(text)
    }

    fn canonicalize(&self, graph: &Graph) -> CodecResult<Vec<u8>> {
        Ok(canonical_ntriples(graph, &self.config)?.into_bytes())
    }
}
