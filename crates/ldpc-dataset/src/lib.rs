//! LDP resource store for LDPC.
//!
//! A [`Dataset`] stores each resource as the canonical serialization of its
//! graph, keyed by URI, in a [`Storage`](ldpc_store::Storage) backend. On top
//! of plain reads and writes it maintains LDP direct containers: creating a
//! container linked to a membership resource, resolving that link back, and
//! adding members.
//!
//! # Operations
//!
//! | Operation | Kind |
//! |-----------|------|
//! | [`Dataset::get_resource`] | read |
//! | [`Dataset::get_linked_container_uri`] | read |
//! | [`Dataset::get_container`] | read |
//! | [`Dataset::content_hash`] | read |
//! | [`Dataset::create_resource`] / [`Dataset::update_resource`] | write |
//! | [`Dataset::create_linked_container`] | write + read-merge-write |
//! | [`Dataset::add_member_to_container`] | read-merge-write |
//! | [`Dataset::append_to_resource`] | read-merge-write |
//!
//! Read-merge-writes are unguarded by default; see [`WriteGuard`].

pub mod config;
pub mod container;
pub mod dataset;
pub mod error;
pub mod link;

mod locks;

pub use config::{DatasetConfig, WriteGuard};
pub use container::Container;
pub use dataset::Dataset;
pub use error::{DatasetError, DatasetResult};
pub use link::{Link, LinkDescriptor};
