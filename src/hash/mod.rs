//! Hash kernel.
//!
//! Maps a key to the two 32-bit halves the double-hashing probe sequence is
//! built from, using one 64-bit digest per key.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs  - Hasher64 trait, FNV-1 and FNV-1a
//! ├── pool.rs    - HasherPool and the scoped PooledHasher guard
//! ├── xxhash.rs  - XXH3-64 accumulator (feature = "xxhash")
//! └── mod.rs     - This file
//! ```
//!
//! # Choosing a Hash Function
//!
//! | Hasher | Speed | Quality | Use Case |
//! |---|---|---|---|
//! | [`Fnv64`] | Fast on short keys | Fair | Default |
//! | [`Fnv64a`] | Fast on short keys | Good | Short keys with shared prefixes |
//! | `XxHash3` | Fast on all sizes | Excellent | Long keys (feature `xxhash`) |
//!
//! The hasher is part of a filter's identity: a filter decoded from bytes
//! must be queried with the same algorithm (and seed) that populated it.
//! Matching FNV digests do not make frames portable to other Bloom filter
//! implementations, since probe positions depend on how the digest is split.

pub mod hasher;
pub mod pool;

#[cfg(feature = "xxhash")]
pub mod xxhash;

pub use hasher::{split_digest, Fnv64, Fnv64a, Hasher64};
pub use pool::{HasherPool, PooledHasher};

#[cfg(feature = "xxhash")]
pub use xxhash::XxHash3;

/// Hasher used when none is configured.
pub type DefaultHasher = Fnv64;
