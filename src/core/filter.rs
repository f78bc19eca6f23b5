//! Common interface of the filter flavors.
//!
//! Both [`BloomFilter`](crate::BloomFilter) and
//! [`MutexBloomFilter`](crate::MutexBloomFilter) take `&self` for every
//! operation, so they can be shared through an `Arc` without extra locking.
//! [`SharedBloomFilter`] names that shared surface over raw byte keys, which
//! lets callers hold either flavor behind `Box<dyn SharedBloomFilter>` and
//! pick one at runtime.
//!
//! The inherent methods (`add`, `test`, `test_and_add`) accept any
//! `AsRef<[u8]>` key and are what most code should call.
//!
//! # Guarantees
//!
//! 1. **No false negatives**: a key whose insert happened-before a lookup is
//!    always reported present.
//! 2. **Monotonic**: once a lookup reports a key present, it stays present.
//! 3. **Thread safety**: implementations are `Send + Sync`.
//!
//! # Examples
//!
//! ```
//! use fastbloom::core::SharedBloomFilter;
//! use fastbloom::{BloomFilter, MutexBloomFilter};
//!
//! let filters: Vec<Box<dyn SharedBloomFilter>> = vec![
//!     Box::new(BloomFilter::new(100, 0.01).unwrap()),
//!     Box::new(MutexBloomFilter::new(100, 0.01).unwrap()),
//! ];
//!
//! for filter in &filters {
//!     assert!(!filter.check_and_insert(b"a"));
//!     assert!(filter.contains(b"a"));
//! }
//! ```

use crate::core::storage::StorageStrategy;

/// Shared-reference Bloom filter over byte keys.
pub trait SharedBloomFilter: Send + Sync {
    /// Insert `key`.
    fn insert(&self, key: &[u8]);

    /// Returns `true` if `key` may be present, `false` if it definitely is not.
    fn contains(&self, key: &[u8]) -> bool;

    /// Insert `key` and report whether it was already present.
    fn check_and_insert(&self, key: &[u8]) -> bool;

    /// Bit array size `m`.
    fn bit_count(&self) -> usize;

    /// Probes per key `k`.
    fn hash_count(&self) -> usize;

    /// Insert calls so far (advisory).
    fn insert_count(&self) -> u64;

    /// Storage backing the filter.
    fn storage_strategy(&self) -> StorageStrategy;

    /// Insert every key in `keys`.
    fn insert_batch<'a, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        for key in keys {
            self.insert(key);
        }
    }

    /// Returns `true` if every key may be present.
    fn contains_all<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        keys.into_iter().all(|key| self.contains(key))
    }

    /// Returns `true` if at least one key may be present.
    fn contains_any<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        keys.into_iter().any(|key| self.contains(key))
    }
}
