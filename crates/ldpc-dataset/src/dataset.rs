use ldpc_codec::{Codec, NTriplesCodec};
use ldpc_store::{Storage, StoreError};
use ldpc_types::{ContentHash, Graph, Term, Triple};
use ldpc_vocab::{expand_required, MEMBER};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::config::{DatasetConfig, WriteGuard};
use crate::container::Container;
use crate::error::{DatasetError, DatasetResult};
use crate::link::LinkDescriptor;
use crate::locks::UriLocks;

/// What a read-merge-write does when the target resource is absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OnMissing {
    Fail,
    Create,
}

/// LDP resource store over a [`Storage`] backend.
///
/// Every write goes through the codec's canonical form, so the content hash
/// returned by storage depends only on the statement set.
pub struct Dataset<S, C = NTriplesCodec> {
    storage: S,
    codec: C,
    config: DatasetConfig,
    locks: UriLocks,
}

impl<S: Storage> Dataset<S> {
    /// A dataset with the default configuration and N-Triples codec.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, DatasetConfig::default())
    }

    pub fn with_config(storage: S, config: DatasetConfig) -> Self {
        let codec = NTriplesCodec::new(config.canon.clone());
        Self::with_codec(storage, codec, config)
    }
}

impl<S: Storage, C: Codec> Dataset<S, C> {
    pub fn with_codec(storage: S, codec: C, config: DatasetConfig) -> Self {
        Self {
            storage,
            codec,
            config,
            locks: UriLocks::default(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load and parse the graph stored under `uri`.
    pub async fn get_resource(&self, uri: &str) -> DatasetResult<Graph> {
        let raw = self.storage.get(uri).await?;
        let graph = self.parse(uri, &raw)?;
        debug!(uri, statements = graph.len(), "loaded resource");
        Ok(graph)
    }

    /// Find the container linked from `resource_uri` by `link`.
    ///
    /// Scans the resource's statements whose predicate is the link's LDP
    /// relation and whose object is the link's value, and returns the
    /// subject of the first match in sorted statement order. With
    /// `strict_links`, more than one matching container is an error.
    pub async fn get_linked_container_uri(
        &self,
        resource_uri: &str,
        link: &LinkDescriptor,
    ) -> DatasetResult<String> {
        let link = link.resolve()?;
        let graph = self.get_resource(resource_uri).await?;
        let predicate = Term::iri(link.predicate()?);

        let mut matches: Vec<&str> = graph
            .matching(None, Some(&predicate), None)
            .filter(|t| link.matches_object(t.object()))
            .filter_map(|t| t.subject().as_iri())
            .collect();
        matches.dedup();

        match matches.as_slice() {
            [] => Err(DatasetError::NotFound(format!(
                "no container linked from {resource_uri} by {} {}",
                link.alias(),
                link.value()
            ))),
            [_, _, ..] if self.config.strict_links => Err(DatasetError::AmbiguousLink {
                resource: resource_uri.to_string(),
                count: matches.len(),
            }),
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    debug!(resource_uri, count = matches.len(), "several containers match; using the first");
                }
                Ok((*first).to_string())
            }
        }
    }

    /// Typed view of a stored direct container.
    pub async fn get_container(&self, container_uri: &str) -> DatasetResult<Container> {
        let graph = self.get_resource(container_uri).await?;
        Container::from_graph(container_uri, &graph)
    }

    /// Content hash of the bytes currently stored under `uri`.
    pub async fn content_hash(&self, uri: &str) -> DatasetResult<ContentHash> {
        self.storage
            .hash_of(uri)
            .await?
            .ok_or_else(|| DatasetError::NotFound(uri.to_string()))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store a new resource. Behaves exactly like [`Dataset::update_resource`];
    /// an existing resource is overwritten.
    pub async fn create_resource(&self, uri: &str, graph: &Graph) -> DatasetResult<String> {
        self.update_resource(uri, graph).await
    }

    /// Replace the resource at `uri` with the canonical form of `graph`.
    pub async fn update_resource(&self, uri: &str, graph: &Graph) -> DatasetResult<String> {
        let (uri, _) = self.update_resource_with_hash(uri, graph).await?;
        Ok(uri)
    }

    /// Like [`Dataset::update_resource`], also returning the content hash
    /// reported by storage.
    pub async fn update_resource_with_hash(
        &self,
        uri: &str,
        graph: &Graph,
    ) -> DatasetResult<(String, ContentHash)> {
        let _guard = self.guard(uri).await;
        let bytes = self.canonical_bytes(uri, graph)?;
        let hash = self.storage.put(uri, &bytes).await?;
        debug!(uri, hash = %hash.short_hex(), statements = graph.len(), "updated resource");
        Ok((uri.to_string(), hash))
    }

    /// Create a direct container whose membership resource is
    /// `resource_uri`.
    ///
    /// The container's membership-resource and relation statements are also
    /// appended to the membership resource (created if absent), which is what
    /// [`Dataset::get_linked_container_uri`] reads.
    pub async fn create_linked_container(
        &self,
        container_uri: &str,
        resource_uri: &str,
        link: &LinkDescriptor,
    ) -> DatasetResult<String> {
        let link = link.resolve()?;
        let container = Container::new(container_uri, resource_uri, link);
        let uri = self
            .create_resource(container_uri, &container.to_graph()?)
            .await?;

        let back_link = container.link_statements()?;
        self.read_merge_write(resource_uri, OnMissing::Create, |graph| {
            graph.merge(&back_link);
            Ok(())
        })
        .await?;

        info!(
            container = container_uri,
            resource = resource_uri,
            relation = container.relation.alias(),
            value = container.relation.value(),
            "created linked container"
        );
        Ok(uri)
    }

    /// Add an `ldp:member` statement to a container.
    ///
    /// Always writes; no membership check is made. Re-adding a member leaves
    /// the statement set unchanged.
    pub async fn add_member_to_container(
        &self,
        container_uri: &str,
        member_uri: &str,
    ) -> DatasetResult<String> {
        let member = expand_required(MEMBER)?;
        let (uri, hash) = self
            .read_merge_write(container_uri, OnMissing::Fail, |graph| {
                graph.insert(Triple::iris(container_uri, member, member_uri));
                Ok(())
            })
            .await?;
        debug!(container = container_uri, member = member_uri, hash = %hash.short_hex(), "added member");
        Ok(uri)
    }

    /// Union `graph` into the stored resource.
    ///
    /// Blank nodes in `graph` are renamed apart from the stored ones first,
    /// so an appended `_:b` never joins a stored node that happens to carry
    /// the same label.
    pub async fn append_to_resource(&self, resource_uri: &str, graph: &Graph) -> DatasetResult<String> {
        let (uri, hash) = self
            .read_merge_write(resource_uri, OnMissing::Fail, |stored| {
                stored.merge_apart(graph);
                Ok(())
            })
            .await?;
        debug!(uri = resource_uri, appended = graph.len(), hash = %hash.short_hex(), "appended to resource");
        Ok(uri)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn parse(&self, uri: &str, raw: &[u8]) -> DatasetResult<Graph> {
        self.codec.parse(raw).map_err(|e| DatasetError::codec(uri, e))
    }

    fn canonical_bytes(&self, uri: &str, graph: &Graph) -> DatasetResult<Vec<u8>> {
        self.codec
            .canonicalize(graph)
            .map_err(|e| DatasetError::codec(uri, e))
    }

    async fn guard(&self, uri: &str) -> Option<OwnedMutexGuard<()>> {
        match self.config.write_guard {
            WriteGuard::Serialized => Some(self.locks.lock(uri).await),
            WriteGuard::Unguarded | WriteGuard::Optimistic => None,
        }
    }

    /// Read the stored graph, apply `merge`, write the result back under the
    /// configured [`WriteGuard`].
    async fn read_merge_write<F>(
        &self,
        uri: &str,
        on_missing: OnMissing,
        merge: F,
    ) -> DatasetResult<(String, ContentHash)>
    where
        F: FnOnce(&mut Graph) -> DatasetResult<()> + Send,
    {
        let _guard = self.guard(uri).await;

        // The optimistic guard needs the hash the storage holds for exactly
        // the bytes read.
        let read = match self.config.write_guard {
            WriteGuard::Optimistic => self
                .storage
                .get_with_hash(uri)
                .await
                .map(|(raw, hash)| (raw, Some(hash))),
            WriteGuard::Unguarded | WriteGuard::Serialized => {
                self.storage.get(uri).await.map(|raw| (raw, None))
            }
        };
        let (mut graph, read_hash) = match read {
            Ok((raw, hash)) => (self.parse(uri, &raw)?, hash),
            Err(StoreError::NotFound(_)) if on_missing == OnMissing::Create => (Graph::new(), None),
            Err(e) => return Err(e.into()),
        };
        merge(&mut graph)?;
        let bytes = self.canonical_bytes(uri, &graph)?;

        let written = match self.config.write_guard {
            WriteGuard::Optimistic => self.storage.put_if_match(uri, &bytes, read_hash).await,
            WriteGuard::Unguarded | WriteGuard::Serialized => self.storage.put(uri, &bytes).await,
        };
        let hash = written.map_err(|e| {
            if let StoreError::Conflict { .. } = e {
                warn!(uri, "resource changed since it was read; write rejected");
            }
            DatasetError::from(e)
        })?;
        Ok((uri.to_string(), hash))
    }
}

impl<S: std::fmt::Debug, C> std::fmt::Debug for Dataset<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("storage", &self.storage)
            .field("config", &self.config)
            .finish()
    }
}
