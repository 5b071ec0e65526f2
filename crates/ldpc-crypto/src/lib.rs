//! Hashing primitives for LDPC.
//!
//! Provides domain-separated BLAKE3 hashing. All crypto operations wrap
//! established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
