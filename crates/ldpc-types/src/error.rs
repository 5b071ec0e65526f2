use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A term was used in a triple position it cannot occupy.
    #[error("{term} cannot be used as {position}")]
    InvalidPosition {
        position: &'static str,
        term: String,
    },

    /// A term that N-Triples cannot represent.
    #[error("malformed term {term}: {reason}")]
    InvalidTerm { term: String, reason: &'static str },

    #[error("invalid blank node label: {0:?}")]
    InvalidBlankLabel(String),
}
