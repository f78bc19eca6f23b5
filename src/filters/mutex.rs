//! Single-lock Bloom filter.
//!
//! [`MutexBloomFilter`] wraps a [`BloomFilter`] in one `parking_lot::RwLock`.
//! `test` takes the shared lock; `add` and `test_and_add` take the exclusive
//! lock for the whole `k`-offset sequence. That makes every operation atomic
//! with respect to every other:
//!
//! - a `test` never observes a half-applied `add`
//! - when several threads `test_and_add` the same new key, exactly one of them
//!   sees `false`
//!
//! The price is that writers serialize against each other and against
//! readers. Prefer the lock-free [`BloomFilter`] unless you need those
//! guarantees.
//!
//! # Examples
//!
//! ```
//! use fastbloom::MutexBloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(MutexBloomFilter::new(1_000, 0.01).unwrap());
//!
//! let first_seen: usize = (0..8)
//!     .map(|_| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || usize::from(!filter.test_and_add("job-42")))
//!     })
//!     .collect::<Vec<_>>()
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .sum();
//!
//! assert_eq!(first_seen, 1);
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::core::filter::SharedBloomFilter;
use crate::core::storage::{BitStorage, Buckets, StorageStrategy};
use crate::error::Result;
use crate::filters::lockfree::BloomFilter;
use crate::hash::{Fnv64, Hasher64};

/// Bloom filter whose operations are serialized by one reader-writer lock.
pub struct MutexBloomFilter<S: BitStorage = Buckets, H: Hasher64 = Fnv64> {
    inner: BloomFilter<S, H>,
    lock: RwLock<()>,
}

impl MutexBloomFilter {
    /// Create a filter sized for `expected_items` at `fp_rate`.
    ///
    /// # Errors
    ///
    /// See [`BloomFilter::new`].
    pub fn new(expected_items: usize, fp_rate: f64) -> Result<Self> {
        BloomFilter::new(expected_items, fp_rate).map(Self::from)
    }

    /// Decode an envelope produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// See [`BloomFilter::decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        BloomFilter::decode(bytes).map(Self::from)
    }
}

impl<H: Hasher64> MutexBloomFilter<Buckets, H> {
    /// Create a filter with explicit dimensions, storage and hasher.
    ///
    /// # Errors
    ///
    /// See [`BloomFilter::explicit`].
    pub fn explicit(m: usize, k: usize, storage: StorageStrategy, hasher: H) -> Result<Self> {
        BloomFilter::explicit(m, k, storage, hasher).map(Self::from)
    }
}

impl<S: BitStorage, H: Hasher64> MutexBloomFilter<S, H> {
    /// Create a filter over a statically chosen storage type.
    ///
    /// # Errors
    ///
    /// See [`BloomFilter::with_params`].
    pub fn with_params(m: usize, k: usize, hasher: H) -> Result<Self> {
        BloomFilter::with_params(m, k, hasher).map(Self::from)
    }

    /// Decode an envelope, querying the result with `hasher`.
    ///
    /// # Errors
    ///
    /// See [`BloomFilter::decode_with`].
    pub fn decode_with(bytes: &[u8], hasher: H) -> Result<Self> {
        BloomFilter::decode_with(bytes, hasher).map(Self::from)
    }

    /// Add `key` under the exclusive lock. Returns `self` for chaining.
    pub fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> &Self {
        let _guard = self.lock.write();
        self.inner.add(key);
        self
    }

    /// Test `key` under the shared lock.
    #[must_use]
    pub fn test<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        let _guard = self.lock.read();
        self.inner.test(key)
    }

    /// Add `key` and return whether it was present, atomically.
    ///
    /// Membership is decided exactly as [`test`](Self::test) would decide it
    /// on the state before this call, then every offset is set.
    pub fn test_and_add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        let probes = self.inner.probes(key.as_ref());
        let bits = self.inner.storage();

        let _guard = self.lock.write();
        let mut present = true;
        for offset in probes {
            if !bits.get_bit(offset) {
                present = false;
                bits.set_bit(offset);
            }
        }
        self.inner.record_insert();
        present
    }

    /// Bit array size `m`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Probes per key `k`.
    #[must_use]
    pub fn num_hash_functions(&self) -> usize {
        self.inner.num_hash_functions()
    }

    /// Number of `add` and `test_and_add` calls so far (advisory).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.count()
    }

    /// Storage strategy backing this filter.
    #[must_use]
    pub fn storage_strategy(&self) -> StorageStrategy {
        self.inner.storage_strategy()
    }

    /// Name of the configured hash algorithm.
    #[must_use]
    pub fn hasher_name(&self) -> &'static str {
        self.inner.hasher_name()
    }

    /// Seed of the configured hash algorithm.
    #[must_use]
    pub fn hasher_seed(&self) -> u64 {
        self.inner.hasher_seed()
    }

    /// Number of bits currently set.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        let _guard = self.lock.read();
        self.inner.count_ones()
    }

    /// Fraction of the `m` bits currently set.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        let _guard = self.lock.read();
        self.inner.fill_ratio()
    }

    /// False positive rate implied by the current fill ratio.
    #[must_use]
    pub fn estimated_fp_rate(&self) -> f64 {
        let _guard = self.lock.read();
        self.inner.estimated_fp_rate()
    }

    /// Approximate memory held by the filter, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<RwLock<()>>() + self.inner.memory_usage()
    }

    /// Serialize as an envelope.
    ///
    /// Holds the shared lock, so the snapshot is consistent across all words.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let _guard = self.lock.read();
        self.inner.encode()
    }

    /// Serialize the bit array only.
    #[must_use]
    pub fn encode_frame(&self) -> Vec<u8> {
        let _guard = self.lock.read();
        self.inner.encode_frame()
    }

    /// Unwrap into the lock-free filter.
    #[must_use]
    pub fn into_inner(self) -> BloomFilter<S, H> {
        self.inner
    }
}

impl<S: BitStorage, H: Hasher64> From<BloomFilter<S, H>> for MutexBloomFilter<S, H> {
    fn from(inner: BloomFilter<S, H>) -> Self {
        Self {
            inner,
            lock: RwLock::new(()),
        }
    }
}

impl<S: BitStorage, H: Hasher64> SharedBloomFilter for MutexBloomFilter<S, H> {
    fn insert(&self, key: &[u8]) {
        self.add(key);
    }

    fn contains(&self, key: &[u8]) -> bool {
        self.test(key)
    }

    fn check_and_insert(&self, key: &[u8]) -> bool {
        self.test_and_add(key)
    }

    fn bit_count(&self) -> usize {
        self.capacity()
    }

    fn hash_count(&self) -> usize {
        self.num_hash_functions()
    }

    fn insert_count(&self) -> u64 {
        self.count()
    }

    fn storage_strategy(&self) -> StorageStrategy {
        self.inner.storage_strategy()
    }
}

impl<S: BitStorage, H: Hasher64> fmt::Debug for MutexBloomFilter<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexBloomFilter")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atomic::Buckets64;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sizing_matches_lock_free() {
        let filter = MutexBloomFilter::new(100, 0.1).unwrap();
        assert_eq!(filter.capacity(), 480);
        assert_eq!(filter.num_hash_functions(), 4);
    }

    #[test]
    fn test_membership_scenario() {
        let filter = MutexBloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.test("a"));

        let returned = filter.add("a");
        assert!(std::ptr::eq(returned, &filter));
        assert!(filter.test("a"));

        assert!(filter.test_and_add("a"));
        assert!(!filter.test_and_add("b"));
        assert!(filter.test("b"));
        assert!(!filter.test("c"));
        assert_eq!(filter.count(), 3);
    }

    #[test]
    fn test_test_and_add_sets_every_offset() {
        let filter = MutexBloomFilter::explicit(4096, 6, StorageStrategy::MutexBytes, Fnv64::new())
            .unwrap();
        assert!(!filter.test_and_add("k"));
        let ones = filter.count_ones();
        assert!(ones >= 1 && ones <= 6);
        assert!(filter.test("k"));
    }

    #[test]
    fn test_test_and_add_has_single_winner() {
        for round in 0..20 {
            let filter = Arc::new(MutexBloomFilter::new(1000, 0.01).unwrap());
            let key = format!("contended-{}", round);

            let winners: usize = (0..8)
                .map(|_| {
                    let filter = Arc::clone(&filter);
                    let key = key.clone();
                    thread::spawn(move || usize::from(!filter.test_and_add(&key)))
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().unwrap())
                .sum();

            assert_eq!(winners, 1, "round {}", round);
        }
    }

    #[test]
    fn test_round_trip_through_lock_free_encoding() {
        let filter = MutexBloomFilter::<Buckets64, _>::with_params(2048, 4, Fnv64::new()).unwrap();
        filter.add("x").add("y");

        let bytes = filter.encode();
        let restored = MutexBloomFilter::decode(&bytes).unwrap();
        assert!(restored.test("x") && restored.test("y"));
        assert_eq!(restored.storage_strategy(), StorageStrategy::Atomic64);

        let lock_free = BloomFilter::decode(&bytes).unwrap();
        assert!(lock_free.test("x"));
    }

    #[test]
    fn test_into_inner_keeps_state() {
        let filter = MutexBloomFilter::new(100, 0.01).unwrap();
        filter.add("kept");
        let inner = filter.into_inner();
        assert!(inner.test("kept"));
        assert_eq!(inner.count(), 1);
    }

    #[test]
    fn test_decode_error_leaves_nothing_behind() {
        assert!(MutexBloomFilter::decode(b"foo").is_err());
        assert!(MutexBloomFilter::decode(&[]).is_err());
    }
}
