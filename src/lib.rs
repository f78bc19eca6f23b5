//! fastbloom: concurrent Bloom filters for Rust.
//!
//! A Bloom filter is a space-efficient probabilistic set. It answers
//! membership queries with:
//! - **False positives**: may report a key that was never added
//! - **Zero false negatives**: a key that was added is always reported
//!
//! Filters here are grow-only, shared by reference across threads, and
//! serializable to a compact binary envelope.
//!
//! # Quick Start
//!
//! ```
//! use fastbloom::BloomFilter;
//!
//! // 100 expected keys at a 1% false positive rate
//! let filter = BloomFilter::new(100, 0.01).unwrap();
//! assert_eq!(filter.capacity(), 959);
//! assert_eq!(filter.num_hash_functions(), 7);
//!
//! filter.add("a");
//! assert!(filter.test("a"));
//!
//! assert!(!filter.test_and_add("b")); // not seen before
//! assert!(filter.test("b"));
//! assert!(!filter.test("c"));
//! ```
//!
//! # Two Concurrency Models
//!
//! ## 1. Lock-Free ([`BloomFilter`])
//!
//! Every bit is set with an atomic compare-and-swap. `add` and `test` never
//! block, so throughput scales with cores. Two threads racing
//! `test_and_add` on the same new key may both see `false`.
//!
//! ```
//! use fastbloom::BloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(BloomFilter::new(10_000, 0.01).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 filter.add(&format!("{}-{}", t, i));
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(filter.test("3-99"));
//! assert_eq!(filter.count(), 400);
//! ```
//!
//! ## 2. Single Lock ([`MutexBloomFilter`])
//!
//! One reader-writer lock covers each whole operation, so exactly one of
//! several concurrent `test_and_add` calls on a new key reports `false`.
//!
//! ```
//! use fastbloom::MutexBloomFilter;
//!
//! let filter = MutexBloomFilter::new(100, 0.01).unwrap();
//! assert!(!filter.test_and_add("job"));
//! assert!(filter.test_and_add("job"));
//! ```
//!
//! # Storage Strategies
//!
//! | Strategy | Unit | Synchronization |
//! |---|---|---|
//! | [`StorageStrategy::Atomic32`] (default) | 32-bit word | CAS per bit |
//! | [`StorageStrategy::Atomic64`] | 64-bit word | CAS per bit |
//! | [`StorageStrategy::MutexBytes`] | byte | reader-writer lock |
//!
//! # Using the Builder
//!
//! ```
//! use fastbloom::{FilterBuilder, StorageStrategy};
//!
//! let filter = FilterBuilder::new()
//!     .expected_items(1_000)
//!     .false_positive_rate(0.001)
//!     .storage(StorageStrategy::Atomic64)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.storage_strategy(), StorageStrategy::Atomic64);
//! ```
//!
//! # Serialization
//!
//! ```
//! use fastbloom::BloomFilter;
//!
//! let filter = BloomFilter::new(100, 0.01).unwrap();
//! filter.add("kept");
//!
//! let bytes = filter.encode();
//! let restored = BloomFilter::decode(&bytes).unwrap();
//! assert!(restored.test("kept"));
//! ```
//!
//! With the `serde` feature (on by default) both filter types also implement
//! `Serialize` and `Deserialize`.
//!
//! # Features
//!
//! - `serde` (default): serde support for filters, strategies and builder metadata
//! - `xxhash`: [`hash::XxHash3`] as an alternative hasher
//! - `trace`: per-operation `tracing::trace!` events on the hot paths
//!
//! # Logging
//!
//! Construction, encoding and decoding emit [`tracing`] events at `debug`
//! level; rejected inputs are reported at `warn`. Install any subscriber to
//! see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::bool_assert_comparison)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Core storage, sizing and the shared filter trait
pub mod core;

/// Error types and result aliases
pub mod error;

/// Lock-free and single-lock filters
pub mod filters;

/// Hash functions and the hasher pool
pub mod hash;

/// Binary envelope and serde support
pub mod codec;

/// Type-safe filter builder
pub mod builder;

pub use builder::{FilterBuilder, FilterMetadata};
pub use codec::{FilterEnvelope, FrameError};
pub use core::filter::SharedBloomFilter;
pub use core::storage::{BitStorage, StorageStrategy};
pub use error::{BloomError, Result};
pub use filters::{BloomFilter, MutexBloomFilter};
pub use hash::Hasher64;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use fastbloom::prelude::*;
///
/// let filter = BloomFilter::new(1000, 0.01).unwrap();
/// filter.insert(b"hello");
/// assert!(filter.contains(b"hello"));
/// ```
pub mod prelude {
    pub use crate::builder::{FilterBuilder, FilterMetadata};
    pub use crate::core::filter::SharedBloomFilter;
    pub use crate::core::storage::{BitStorage, StorageStrategy};
    pub use crate::error::{BloomError, Result};
    pub use crate::filters::{BloomFilter, MutexBloomFilter};
    pub use crate::hash::{Fnv64, Fnv64a, Hasher64};

    #[cfg(feature = "xxhash")]
    pub use crate::hash::XxHash3;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        filter.add("test");
        assert!(filter.test("test"));
    }

    #[test]
    fn test_trait_usage() {
        fn exercise<F: SharedBloomFilter>(filter: &F) {
            filter.insert(b"item");
            assert!(filter.contains(b"item"));
            assert!(filter.check_and_insert(b"item"));
        }

        exercise(&BloomFilter::new(100, 0.01).unwrap());
        exercise(&MutexBloomFilter::new(100, 0.01).unwrap());
    }

    #[test]
    fn test_trait_objects() {
        let filters: Vec<Box<dyn SharedBloomFilter>> = vec![
            Box::new(BloomFilter::new(100, 0.01).unwrap()),
            Box::new(MutexBloomFilter::new(100, 0.01).unwrap()),
        ];

        for filter in &filters {
            filter.insert(b"dyn");
            assert!(filter.contains(b"dyn"));
            assert_eq!(filter.bit_count(), 959);
            assert_eq!(filter.hash_count(), 7);
            assert_eq!(filter.insert_count(), 1);
            assert_eq!(filter.storage_strategy(), StorageStrategy::Atomic32);
        }
    }

    #[test]
    fn test_batch_helpers() {
        let filter = MutexBloomFilter::new(100, 0.01).unwrap();
        let keys: [&[u8]; 2] = [b"a", b"b"];
        filter.insert_batch(keys);

        assert!(filter.contains_all(keys));
        assert!(filter.contains_any([&b"c"[..], &b"a"[..]]));
        assert!(!filter.contains_all([&b"a"[..], &b"c"[..]]));
    }

    #[test]
    fn test_shared_across_threads() {
        let filter = Arc::new(BloomFilter::new(1000, 0.01).unwrap());

        let filter_clone = Arc::clone(&filter);
        let handle = std::thread::spawn(move || {
            filter_clone.add("thread_item");
        });
        handle.join().unwrap();

        assert!(filter.test("thread_item"));
    }

    #[test]
    fn test_builder_through_root() {
        let filter = FilterBuilder::new()
            .expected_items(100)
            .false_positive_rate(0.01)
            .build_mutex()
            .unwrap();
        assert_eq!(filter.capacity(), 959);
    }

    #[test]
    fn test_decode_error_kind() {
        let err = BloomFilter::decode(b"foo").unwrap_err();
        assert!(err.is_decode());
        assert!(matches!(
            err,
            BloomError::Decode(crate::FrameError::TruncatedFrame { .. })
        ));
    }
}
