use ldpc_types::TypeError;

/// Errors from canonical labeling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// The graph is too symmetric to label within the configured budget.
    #[error("canonical labeling of {blank_nodes} blank nodes exceeded {limit} search leaves")]
    SearchLimitExceeded { limit: usize, blank_nodes: usize },

    /// A term has no N-Triples form that parses back to it.
    #[error(transparent)]
    InvalidTerm(#[from] TypeError),
}

/// Errors from codec operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The payload is not valid N-Triples.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The graph could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl CodecError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
