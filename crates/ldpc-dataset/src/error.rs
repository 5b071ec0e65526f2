use ldpc_codec::{CanonicalizationError, CodecError};
use ldpc_store::StoreError;
use ldpc_vocab::VocabError;
use thiserror::Error;

/// Errors surfaced by [`Dataset`](crate::Dataset) operations.
///
/// Nothing is retried or defaulted at this layer. After a failed write the
/// stored state is unknown to the caller; re-read before retrying.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No stored graph for the URI, or no statement matched a link lookup.
    #[error("not found: {0}")]
    NotFound(String),

    /// A link descriptor named neither or both of `rel` / `rev`.
    #[error("invalid link descriptor: {0}")]
    InvalidLinkDescriptor(String),

    /// Stored bytes could not be parsed into a graph.
    #[error("cannot parse stored resource {uri}: {source}")]
    Parse {
        uri: String,
        #[source]
        source: CodecError,
    },

    /// A graph could not be canonicalized.
    #[error("cannot canonicalize {uri}: {source}")]
    Canonicalization {
        uri: String,
        #[source]
        source: CanonicalizationError,
    },

    /// Opaque failure from the storage backend.
    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),

    /// An optimistic write lost a race with another writer.
    #[error("concurrent modification of {0}")]
    Conflict(String),

    /// Strict link resolution found more than one container.
    #[error("{count} containers match the link from {resource}")]
    AmbiguousLink { resource: String, count: usize },

    /// The stored graph is not a well-formed direct container.
    #[error("{uri} is not a direct container: {reason}")]
    NotAContainer { uri: String, reason: String },

    /// A required vocabulary alias has no expansion.
    #[error("vocabulary error: {0}")]
    Vocab(#[from] VocabError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<StoreError> for DatasetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(uri) => Self::NotFound(uri),
            StoreError::Conflict { uri, .. } => Self::Conflict(uri),
            other => Self::Storage(other),
        }
    }
}

impl DatasetError {
    /// Attach the resource URI to a codec failure.
    pub(crate) fn codec(uri: &str, err: CodecError) -> Self {
        match err {
            CodecError::Canonicalization(source) => Self::Canonicalization {
                uri: uri.to_string(),
                source,
            },
            source => Self::Parse {
                uri: uri.to_string(),
                source,
            },
        }
    }
}

/// Result alias for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;
