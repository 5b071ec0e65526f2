//! Directory-backed storage.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/index.json                 URI -> { file, hash, size }
//! <root>/<uri-hash>-<hash>.nt       payload bytes
//! ```
//!
//! A payload file is named after its URI and its content, so a write never
//! touches the file the index currently points at. The new payload is
//! written first, then the index is replaced; only after that commits is
//! the previous payload removed. Both files are replaced atomically (temp
//! file + rename). The index is the source of truth for which URIs exist;
//! payload hashes are re-verified on every read.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ldpc_crypto::ContentHasher;
use ldpc_types::ContentHash;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{check_uri, StoreError, StoreResult};
use crate::traits::Storage;

const INDEX_FILE: &str = "index.json";
const PAYLOAD_EXT: &str = ".nt";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct IndexEntry {
    file: String,
    hash: ContentHash,
    size: u64,
}

/// One file per resource under a root directory.
pub struct FileStorage {
    root: PathBuf,
    index: Mutex<BTreeMap<String, IndexEntry>>,
}

impl FileStorage {
    /// Open (or create) a store rooted at `root`.
    ///
    /// Index entries whose payload file is missing are dropped with a warning.
    /// Payload files the index does not reference are left over from an
    /// interrupted write and are removed.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;

        let index_path = root.join(INDEX_FILE);
        let mut index: BTreeMap<String, IndexEntry> = match tokio::fs::read(&index_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        let mut missing = Vec::new();
        for (uri, entry) in &index {
            if !tokio::fs::try_exists(root.join(&entry.file)).await? {
                warn!(uri = %uri, file = %entry.file, "payload file missing; dropping index entry");
                missing.push(uri.clone());
            }
        }
        for uri in missing {
            index.remove(&uri);
        }

        let referenced: BTreeSet<&str> = index.values().map(|e| e.file.as_str()).collect();
        let mut dir = tokio::fs::read_dir(&root).await?;
        while let Some(item) = dir.next_entry().await? {
            let name = item.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.ends_with(PAYLOAD_EXT) && !referenced.contains(name) {
                debug!(file = name, "removing unreferenced payload file");
                tokio::fs::remove_file(item.path()).await?;
            }
        }

        info!(root = %root.display(), resources = index.len(), "file storage opened");
        Ok(Self {
            root,
            index: Mutex::new(index),
        })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(uri: &str, hash: &ContentHash) -> String {
        format!(
            "{}-{}{PAYLOAD_EXT}",
            ContentHasher::URI.hash(uri.as_bytes()).to_hex(),
            hash.to_hex()
        )
    }

    /// Write payload and index while the index lock is held.
    ///
    /// On error the index, on disk and in memory, still names the previous
    /// payload, which is left in place.
    async fn write_locked(
        &self,
        index: &mut BTreeMap<String, IndexEntry>,
        uri: &str,
        bytes: &[u8],
    ) -> StoreResult<ContentHash> {
        let hash = ContentHasher::RESOURCE.hash(bytes);
        let entry = IndexEntry {
            file: Self::file_name(uri, &hash),
            hash,
            size: bytes.len() as u64,
        };
        let previous = index.get(uri).map(|old| old.file.clone());
        let replaced = previous.filter(|old| *old != entry.file);
        let fresh_file = replaced.is_some() || !index.contains_key(uri);

        let mut next = index.clone();
        next.insert(uri.to_string(), entry.clone());
        let index_bytes = serde_json::to_vec_pretty(&next)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let root = self.root.clone();
        let payload = bytes.to_vec();
        let file = entry.file.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let target = root.join(&file);
            atomic_write(&root, &target, &payload)?;
            if let Err(e) = atomic_write(&root, &root.join(INDEX_FILE), &index_bytes) {
                if fresh_file {
                    remove_quietly(&target);
                }
                return Err(e);
            }
            if let Some(old) = replaced {
                remove_quietly(&root.join(old));
            }
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        *index = next;
        debug!(uri, hash = %hash.short_hex(), size = entry.size, "stored resource file");
        Ok(hash)
    }
}

fn atomic_write(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Best-effort removal of a payload the index no longer names. A leftover
/// file is harmless and is cleaned up by the next `open`.
fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(file = %path.display(), error = %e, "could not remove payload file"),
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, uri: &str) -> StoreResult<Vec<u8>> {
        self.get_with_hash(uri).await.map(|(bytes, _)| bytes)
    }

    async fn get_with_hash(&self, uri: &str) -> StoreResult<(Vec<u8>, ContentHash)> {
        // Held across the read so a concurrent write cannot remove the file.
        let index = self.index.lock().await;
        let entry = index
            .get(uri)
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))?;
        let bytes = match tokio::fs::read(self.root.join(&entry.file)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(uri.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let computed = ContentHasher::RESOURCE.hash(&bytes);
        if computed != entry.hash {
            warn!(uri, expected = %entry.hash.short_hex(), computed = %computed.short_hex(), "payload hash mismatch");
            return Err(StoreError::HashMismatch {
                uri: uri.to_string(),
                expected: entry.hash.to_hex(),
                computed: computed.to_hex(),
            });
        }
        Ok((bytes, entry.hash))
    }

    async fn put(&self, uri: &str, bytes: &[u8]) -> StoreResult<ContentHash> {
        check_uri(uri)?;
        let mut index = self.index.lock().await;
        self.write_locked(&mut index, uri, bytes).await
    }

    async fn put_if_match(
        &self,
        uri: &str,
        bytes: &[u8],
        expected: Option<ContentHash>,
    ) -> StoreResult<ContentHash> {
        check_uri(uri)?;
        let mut index = self.index.lock().await;
        let actual = index.get(uri).map(|entry| entry.hash);
        if actual != expected {
            return Err(StoreError::Conflict {
                uri: uri.to_string(),
                expected,
                actual,
            });
        }
        self.write_locked(&mut index, uri, bytes).await
    }

    async fn hash_of(&self, uri: &str) -> StoreResult<Option<ContentHash>> {
        Ok(self.index.lock().await.get(uri).map(|entry| entry.hash))
    }

    async fn delete(&self, uri: &str) -> StoreResult<bool> {
        let mut index = self.index.lock().await;
        let Some(entry) = index.get(uri).cloned() else {
            return Ok(false);
        };
        let mut next = index.clone();
        next.remove(uri);
        let index_bytes = serde_json::to_vec_pretty(&next)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || atomic_write(&root, &root.join(INDEX_FILE), &index_bytes))
            .await
            .map_err(std::io::Error::other)??;
        *index = next;

        match tokio::fs::remove_file(self.root.join(&entry.file)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        debug!(uri, "deleted resource file");
        Ok(true)
    }

    async fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.index.lock().await.keys().cloned().collect())
    }
}

impl std::fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStorage")
            .field("root", &self.root)
            .finish()
    }
}
