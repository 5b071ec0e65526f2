//! Resource byte storage for LDPC.
//!
//! Storage is a URI-keyed byte store that reports the content hash of every
//! payload it accepts. It never interprets payloads: the resource layer
//! hands it canonical bytes and gets back a [`ContentHash`] that confirms
//! the write.
//!
//! # Storage Backends
//!
//! All backends implement the [`Storage`] trait:
//!
//! - [`InMemoryStorage`] -- `HashMap`-based store for tests and embedding
//! - [`FileStorage`] -- one file per resource under a root directory
//!
//! # Design Rules
//!
//! 1. `put` is an upsert; writing identical bytes twice yields the same hash.
//! 2. Each backend picks its content hash; the bundled ones use
//!    `ContentHasher::RESOURCE` over the stored bytes. Callers read hashes
//!    from the store (`hash_of`, `get_with_hash`) instead of computing them.
//! 3. `put_if_match` is the only conditional write; there are no locks,
//!    transactions, or retries.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileStorage;
pub use memory::{InMemoryStorage, StoredEntry};
pub use traits::Storage;

pub use ldpc_types::ContentHash;
