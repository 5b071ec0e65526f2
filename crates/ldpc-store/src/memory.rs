use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use ldpc_crypto::ContentHasher;
use ldpc_types::ContentHash;
use tracing::debug;

use crate::error::{check_uri, StoreError, StoreResult};
use crate::traits::Storage;

/// A stored payload: bytes + content hash + cached size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEntry {
    /// The payload bytes.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
    /// `ContentHasher::RESOURCE` over `data`.
    pub hash: ContentHash,
}

impl StoredEntry {
    pub fn new(data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        let hash = ContentHasher::RESOURCE.hash(&data);
        Self { data, size, hash }
    }
}

/// In-memory, HashMap-based storage.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock`;
/// each call takes the lock once, so `put_if_match` is atomic.
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of resources currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored payloads.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(|entry| entry.size)
            .sum()
    }

    /// Remove all entries from the store.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    /// Snapshot of the entry stored under `uri`.
    pub fn entry(&self, uri: &str) -> Option<StoredEntry> {
        self.entries.read().expect("lock poisoned").get(uri).cloned()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, uri: &str) -> StoreResult<Vec<u8>> {
        let map = self.entries.read().expect("lock poisoned");
        map.get(uri)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))
    }

    async fn put(&self, uri: &str, bytes: &[u8]) -> StoreResult<ContentHash> {
        check_uri(uri)?;
        let entry = StoredEntry::new(bytes.to_vec());
        let hash = entry.hash;
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(uri.to_string(), entry);
        debug!(uri, hash = %hash.short_hex(), "stored resource");
        Ok(hash)
    }

    async fn put_if_match(
        &self,
        uri: &str,
        bytes: &[u8],
        expected: Option<ContentHash>,
    ) -> StoreResult<ContentHash> {
        check_uri(uri)?;
        let mut map = self.entries.write().expect("lock poisoned");
        let actual = map.get(uri).map(|entry| entry.hash);
        if actual != expected {
            return Err(StoreError::Conflict {
                uri: uri.to_string(),
                expected,
                actual,
            });
        }
        let entry = StoredEntry::new(bytes.to_vec());
        let hash = entry.hash;
        map.insert(uri.to_string(), entry);
        debug!(uri, hash = %hash.short_hex(), "stored resource (conditional)");
        Ok(hash)
    }

    async fn hash_of(&self, uri: &str) -> StoreResult<Option<ContentHash>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(uri).map(|entry| entry.hash))
    }

    async fn get_with_hash(&self, uri: &str) -> StoreResult<(Vec<u8>, ContentHash)> {
        let map = self.entries.read().expect("lock poisoned");
        map.get(uri)
            .map(|entry| (entry.data.clone(), entry.hash))
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))
    }

    async fn delete(&self, uri: &str) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(uri).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().expect("lock poisoned");
        let mut uris: Vec<String> = map.keys().cloned().collect();
        uris.sort();
        Ok(uris)
    }
}

impl std::fmt::Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryStorage")
            .field("resource_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R1: &str = "http://ex/r1";
    const R2: &str = "http://ex/r2";

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryStorage::new();
        let hash = store.put(R1, b"<a> <b> <c> .\n").await.unwrap();
        assert_eq!(hash, ContentHasher::RESOURCE.hash(b"<a> <b> <c> .\n"));
        assert_eq!(store.get(R1).await.unwrap(), b"<a> <b> <c> .\n");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryStorage::new();
        let err = store.get(R1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(uri) if uri == R1));
    }

    #[tokio::test]
    async fn put_replaces_previous_payload() {
        let store = InMemoryStorage::new();
        let first = store.put(R1, b"one").await.unwrap();
        let second = store.put(R1, b"two").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.get(R1).await.unwrap(), b"two");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn empty_uri_is_rejected() {
        let store = InMemoryStorage::new();
        let err = store.put("  ", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidUri(_)));
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Content hashing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_is_idempotent() {
        let store = InMemoryStorage::new();
        let h1 = store.put(R1, b"same").await.unwrap();
        let h2 = store.put(R1, b"same").await.unwrap();
        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn hash_is_independent_of_uri() {
        let store = InMemoryStorage::new();
        let h1 = store.put(R1, b"shared").await.unwrap();
        let h2 = store.put(R2, b"shared").await.unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1, ContentHasher::RESOURCE.hash(b"shared"));
        assert_eq!(store.hash_of(R2).await.unwrap(), Some(h2));
    }

    #[tokio::test]
    async fn get_with_hash_pairs_bytes_and_hash() {
        let store = InMemoryStorage::new();
        let hash = store.put(R1, b"paired").await.unwrap();
        assert_eq!(store.get_with_hash(R1).await.unwrap(), (b"paired".to_vec(), hash));
        assert!(matches!(
            store.get_with_hash(R2).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    // -----------------------------------------------------------------------
    // Conditional writes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_if_match_requires_absence_for_none() {
        let store = InMemoryStorage::new();
        let hash = store.put_if_match(R1, b"v1", None).await.unwrap();
        let err = store.put_if_match(R1, b"v2", None).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict { expected: None, actual: Some(h), .. } if h == hash
        ));
        assert_eq!(store.get(R1).await.unwrap(), b"v1");
    }

    #[tokio::test]
    async fn put_if_match_rejects_stale_hash() {
        let store = InMemoryStorage::new();
        let v1 = store.put(R1, b"v1").await.unwrap();
        let v2 = store.put_if_match(R1, b"v2", Some(v1)).await.unwrap();
        assert!(store.put_if_match(R1, b"v3", Some(v1)).await.is_err());
        assert_eq!(store.hash_of(R1).await.unwrap(), Some(v2));
    }

    // -----------------------------------------------------------------------
    // Exists / Delete / List
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn exists_and_delete() {
        let store = InMemoryStorage::new();
        assert!(!store.exists(R1).await.unwrap());
        store.put(R1, b"x").await.unwrap();
        assert!(store.exists(R1).await.unwrap());
        assert!(store.delete(R1).await.unwrap());
        assert!(!store.delete(R1).await.unwrap());
        assert!(!store.exists(R1).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let store = InMemoryStorage::new();
        store.put(R2, b"b").await.unwrap();
        store.put(R1, b"a").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![R1.to_string(), R2.to_string()]);
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn total_bytes_and_clear() {
        let store = InMemoryStorage::new();
        store.put(R1, b"12345").await.unwrap();
        store.put(R2, b"123456789").await.unwrap();
        assert_eq!(store.total_bytes(), 14);
        assert_eq!(store.entry(R1).unwrap().size, 5);
        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn shared_through_arc() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStorage::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let uri = format!("http://ex/r{i}");
                    store.put(&uri, uri.as_bytes()).await.unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.expect("task should not panic");
        }
        assert_eq!(store.len(), 8);
        assert_eq!(Storage::list(&store).await.unwrap().len(), 8);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryStorage::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryStorage"));
        assert!(debug.contains("resource_count"));
    }
}
