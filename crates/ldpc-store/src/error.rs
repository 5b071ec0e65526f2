use ldpc_types::ContentHash;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No payload is stored under the URI.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A conditional write saw a different current hash.
    #[error("conflicting write to {uri}: expected {expected:?}, found {actual:?}")]
    Conflict {
        uri: String,
        expected: Option<ContentHash>,
        actual: Option<ContentHash>,
    },

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {uri}: expected {expected}, computed {computed}")]
    HashMismatch {
        uri: String,
        expected: String,
        computed: String,
    },

    /// Serialization or deserialization failure of backend metadata.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The URI cannot be used as a storage key.
    #[error("invalid resource URI: {0:?}")]
    InvalidUri(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reject keys no backend can store.
pub(crate) fn check_uri(uri: &str) -> StoreResult<()> {
    if uri.trim().is_empty() {
        return Err(StoreError::InvalidUri(uri.to_string()));
    }
    Ok(())
}
