use std::sync::Arc;

use async_trait::async_trait;
use ldpc_types::ContentHash;

use crate::error::{StoreError, StoreResult};

/// URI-keyed byte store with content hashing.
///
/// All implementations must satisfy these invariants:
/// - `put` upserts and returns the content hash of the stored bytes.
/// - Writing the same bytes under the same URI twice returns the same hash.
/// - A failed write leaves the previous payload untouched.
/// - The store never interprets payloads.
///
/// The hash function is the backend's choice. Callers only compare a hash
/// with other hashes from the same backend (`put_if_match` takes a hash
/// that `put`, `hash_of` or `get_with_hash` returned) and never recompute
/// one themselves.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the payload stored under `uri`.
    ///
    /// Returns `Err(StoreError::NotFound)` if nothing is stored.
    async fn get(&self, uri: &str) -> StoreResult<Vec<u8>>;

    /// Store `bytes` under `uri`, replacing any previous payload.
    async fn put(&self, uri: &str, bytes: &[u8]) -> StoreResult<ContentHash>;

    /// Store `bytes` only if the current hash equals `expected`.
    ///
    /// `None` means the URI must be absent. A mismatch fails with
    /// `StoreError::Conflict` and writes nothing.
    async fn put_if_match(
        &self,
        uri: &str,
        bytes: &[u8],
        expected: Option<ContentHash>,
    ) -> StoreResult<ContentHash>;

    /// The content hash currently stored under `uri`, if any.
    async fn hash_of(&self, uri: &str) -> StoreResult<Option<ContentHash>>;

    /// Read the payload together with the hash it is stored under.
    ///
    /// The default brackets `get` with two `hash_of` calls and reports
    /// `StoreError::Conflict` if the entry changed in between. Backends that
    /// can read both under one lock should override it.
    async fn get_with_hash(&self, uri: &str) -> StoreResult<(Vec<u8>, ContentHash)> {
        let before = self
            .hash_of(uri)
            .await?
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))?;
        let bytes = self.get(uri).await?;
        let after = self.hash_of(uri).await?;
        if after != Some(before) {
            return Err(StoreError::Conflict {
                uri: uri.to_string(),
                expected: Some(before),
                actual: after,
            });
        }
        Ok((bytes, before))
    }

    /// Remove the payload under `uri`. Returns `true` if it existed.
    async fn delete(&self, uri: &str) -> StoreResult<bool>;

    /// All stored URIs, sorted.
    async fn list(&self) -> StoreResult<Vec<String>>;

    /// Check whether a payload is stored under `uri`.
    async fn exists(&self, uri: &str) -> StoreResult<bool> {
        Ok(self.hash_of(uri).await?.is_some())
    }
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get(&self, uri: &str) -> StoreResult<Vec<u8>> {
        (**self).get(uri).await
    }

    async fn put(&self, uri: &str, bytes: &[u8]) -> StoreResult<ContentHash> {
        (**self).put(uri, bytes).await
    }

    async fn put_if_match(
        &self,
        uri: &str,
        bytes: &[u8],
        expected: Option<ContentHash>,
    ) -> StoreResult<ContentHash> {
        (**self).put_if_match(uri, bytes, expected).await
    }

    async fn hash_of(&self, uri: &str) -> StoreResult<Option<ContentHash>> {
        (**self).hash_of(uri).await
    }

    async fn get_with_hash(&self, uri: &str) -> StoreResult<(Vec<u8>, ContentHash)> {
        (**self).get_with_hash(uri).await
    }

    async fn delete(&self, uri: &str) -> StoreResult<bool> {
        (**self).delete(uri).await
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        (**self).list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStorage;

    /// Delegates everything except `get_with_hash`, which keeps the default.
    struct Plain(InMemoryStorage);

    #[async_trait]
    impl Storage for Plain {
        async fn get(&self, uri: &str) -> StoreResult<Vec<u8>> {
            self.0.get(uri).await
        }

        async fn put(&self, uri: &str, bytes: &[u8]) -> StoreResult<ContentHash> {
            self.0.put(uri, bytes).await
        }

        async fn put_if_match(
            &self,
            uri: &str,
            bytes: &[u8],
            expected: Option<ContentHash>,
        ) -> StoreResult<ContentHash> {
            self.0.put_if_match(uri, bytes, expected).await
        }

        async fn hash_of(&self, uri: &str) -> StoreResult<Option<ContentHash>> {
            self.0.hash_of(uri).await
        }

        async fn delete(&self, uri: &str) -> StoreResult<bool> {
            self.0.delete(uri).await
        }

        async fn list(&self) -> StoreResult<Vec<String>> {
            self.0.list().await
        }
    }

    #[tokio::test]
    async fn default_get_with_hash() {
        let store = Plain(InMemoryStorage::new());
        let hash = store.put("http://ex/r1", b"bytes").await.unwrap();
        assert_eq!(
            store.get_with_hash("http://ex/r1").await.unwrap(),
            (b"bytes".to_vec(), hash)
        );
        assert!(matches!(
            store.get_with_hash("http://ex/r2").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(Arc::new(store).exists("http://ex/r1").await.unwrap());
    }
}
