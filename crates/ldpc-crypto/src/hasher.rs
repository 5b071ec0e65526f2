use ldpc_types::ContentHash;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"ldpc-resource-v1"`) that is
/// prepended to every hash computation, so a resource payload and a
/// blank-node signature with identical bytes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored canonical resource payloads.
    pub const RESOURCE: Self = Self {
        domain: "ldpc-resource-v1",
    };
    /// Hasher for blank-node signatures during canonical labeling.
    pub const BNODE: Self = Self {
        domain: "ldpc-bnode-v1",
    };
    /// Hasher for deriving storage keys from resource URIs.
    pub const URI: Self = Self {
        domain: "ldpc-uri-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        self.hash_parts(&[data])
    }

    /// Hash a sequence of byte strings with domain separation.
    ///
    /// Parts are length-prefixed, so `["ab", "c"]` and `["a", "bc"]` differ.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        ContentHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ContentHash) -> bool {
        self.hash(data) == *expected
    }

    /// Raw BLAKE3 hash without domain separation (for low-level use).
    pub fn raw_hash(data: &[u8]) -> [u8; 32] {
        *blake3::hash(data).as_bytes()
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"<http://ex/a> <http://ex/b> <http://ex/c> .\n";
        assert_eq!(
            ContentHasher::RESOURCE.hash(data),
            ContentHasher::RESOURCE.hash(data)
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let resource = ContentHasher::RESOURCE.hash(data);
        let bnode = ContentHasher::BNODE.hash(data);
        let uri = ContentHasher::URI.hash(data);
        assert_ne!(resource, bnode);
        assert_ne!(resource, uri);
        assert_ne!(bnode, uri);
    }

    #[test]
    fn parts_are_length_prefixed() {
        let a = ContentHasher::BNODE.hash_parts(&[b"ab", b"c"]);
        let b = ContentHasher::BNODE.hash_parts(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::RESOURCE.hash(b"original");
        assert!(ContentHasher::RESOURCE.verify(b"original", &id));
        assert!(!ContentHasher::RESOURCE.verify(b"tampered", &id));
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), ContentHasher::RESOURCE.hash(b"data"));
    }

    #[test]
    fn raw_hash_no_domain() {
        let raw = ContentHasher::raw_hash(b"test");
        assert_eq!(raw, ContentHasher::raw_hash(b"test"));
        assert_ne!(raw, *ContentHasher::RESOURCE.hash(b"test").as_bytes());
    }
}
