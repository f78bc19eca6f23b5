//! Lock-free Bloom filter.
//!
//! The default flavor. Every operation takes `&self`; share it with `Arc`
//! and call it from any number of threads without further locking.
//!
//! # Algorithm
//!
//! For a key `K` with digest halves `(upper, lower)` the filter probes
//!
//! ```text
//! offset_i = (lower + upper × i) mod m        for i in 0..k
//! ```
//!
//! - `add` sets all `k` offsets
//! - `test` reports present only if all `k` offsets are set, stopping at the first clear one
//! - `test_and_add` atomically fetch-and-sets each offset, and reports present
//!   only if every offset was already set before its own update
//!
//! # Concurrency Model
//!
//! Each bit update is atomic, but an `add` touches `k` words independently.
//! A concurrent reader may observe some of its bits and not others:
//!
//! ```text
//! Thread A (add "x"):          Thread B (test "x"):
//! ───────────────────          ────────────────────
//! set offset_0
//!                              get offset_0 -> 1
//!                              get offset_1 -> 0  => false
//! set offset_1
//! ```
//!
//! Once `add("x")` has returned, every later `test("x")` returns `true`. Two
//! threads calling `test_and_add` on the same new key may both see `false`.
//! Callers that need `test_and_add` to be atomic as a whole should use
//! [`MutexBloomFilter`](crate::MutexBloomFilter).
//!
//! # Examples
//!
//! ```
//! use fastbloom::BloomFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let filter = Arc::new(BloomFilter::new(10_000, 0.01)?);
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..1000 {
//!                 filter.add(&format!("item-{}-{}", t, i));
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert!(filter.test("item-0-42"));
//! assert_eq!(filter.count(), 4000);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::codec::{FilterEnvelope, FrameError};
use crate::core::filter::SharedBloomFilter;
use crate::core::params::{fp_rate_from_fill, optimal_params, validate_params};
use crate::core::storage::{BitStorage, Buckets, StorageStrategy};
use crate::error::{BloomError, Result};
use crate::filters::probe::ProbeSequence;
use crate::hash::{Fnv64, Hasher64, HasherPool};

/// Concurrent Bloom filter with lock-free bit updates.
///
/// # Type Parameters
///
/// * `S` - bit storage, [`Buckets`] (runtime-selected) by default
/// * `H` - hash accumulator, [`Fnv64`] by default
pub struct BloomFilter<S: BitStorage = Buckets, H: Hasher64 = Fnv64> {
    bits: S,
    m: usize,
    k: usize,
    count: AtomicU64,
    hashers: HasherPool<H>,
}

impl BloomFilter {
    /// Create a filter sized for `expected_items` at `fp_rate`.
    ///
    /// Uses 32-bit atomic words and FNV-1 hashing.
    ///
    /// # Errors
    ///
    /// [`BloomError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(100, 0.1).unwrap();
    /// assert_eq!(filter.capacity(), 480);
    /// assert_eq!(filter.num_hash_functions(), 4);
    ///
    /// assert!(BloomFilter::new(100, 1.0).is_err());
    /// ```
    pub fn new(expected_items: usize, fp_rate: f64) -> Result<Self> {
        let (m, k) = optimal_params(expected_items, fp_rate)?;
        Self::explicit(m, k, StorageStrategy::default(), Fnv64::new())
    }

    /// Decode an envelope produced by [`encode`](Self::encode).
    ///
    /// The filter is queried with FNV-1; use [`decode_with`](Self::decode_with)
    /// for filters populated with another hasher.
    ///
    /// # Errors
    ///
    /// [`BloomError::Decode`] if `bytes` is not a valid envelope.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with(bytes, Fnv64::new())
    }
}

impl<H: Hasher64> BloomFilter<Buckets, H> {
    /// Create a filter with explicit dimensions, storage and hasher.
    ///
    /// # Errors
    ///
    /// - [`BloomError::InvalidFilterSize`] if `m == 0`
    /// - [`BloomError::InvalidHashCount`] if `k == 0`
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::core::storage::StorageStrategy;
    /// use fastbloom::hash::Fnv64a;
    /// use fastbloom::BloomFilter;
    ///
    /// let filter = BloomFilter::explicit(1024, 3, StorageStrategy::Atomic64, Fnv64a::new()).unwrap();
    /// assert_eq!(filter.storage_strategy(), StorageStrategy::Atomic64);
    /// assert_eq!(filter.hasher_name(), "fnv1a_64");
    /// ```
    pub fn explicit(m: usize, k: usize, storage: StorageStrategy, hasher: H) -> Result<Self> {
        validate_params(m, k)?;
        Ok(Self::from_parts(Buckets::new(storage, m), m, k, hasher))
    }
}

impl<S: BitStorage, H: Hasher64> BloomFilter<S, H> {
    /// Create a filter over a statically chosen storage type.
    ///
    /// # Errors
    ///
    /// See [`validate_params`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::core::atomic::Buckets64;
    /// use fastbloom::hash::Fnv64;
    /// use fastbloom::BloomFilter;
    ///
    /// let filter = BloomFilter::<Buckets64, _>::with_params(4096, 5, Fnv64::new()).unwrap();
    /// filter.add("key");
    /// assert!(filter.test("key"));
    /// ```
    pub fn with_params(m: usize, k: usize, hasher: H) -> Result<Self> {
        validate_params(m, k)?;
        Ok(Self::from_parts(S::with_bits(m), m, k, hasher))
    }

    /// Decode an envelope, querying the result with `hasher`.
    ///
    /// Nothing is shared with any existing filter, and nothing is modified on
    /// failure.
    ///
    /// # Errors
    ///
    /// [`BloomError::Decode`] for a malformed envelope or a payload the
    /// storage type `S` cannot hold.
    pub fn decode_with(bytes: &[u8], hasher: H) -> Result<Self> {
        let envelope = match FilterEnvelope::parse(bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(len = bytes.len(), error = %err, "rejected Bloom filter envelope");
                return Err(err.into());
            }
        };

        let bits = S::decode_as(envelope.storage, envelope.payload).map_err(|err| {
            tracing::warn!(storage = %envelope.storage, error = %err, "rejected Bloom filter payload");
            err
        })?;

        tracing::debug!(
            m = envelope.m,
            k = envelope.k,
            storage = %envelope.storage,
            bytes = bytes.len(),
            "decoded Bloom filter"
        );

        Ok(Self::with_storage(bits, envelope.m, envelope.k, hasher))
    }

    pub(crate) fn from_parts(bits: S, m: usize, k: usize, hasher: H) -> Self {
        tracing::debug!(
            m,
            k,
            storage = %bits.strategy(),
            hasher = hasher.name(),
            bytes = bits.memory_usage(),
            "created Bloom filter"
        );
        Self::with_storage(bits, m, k, hasher)
    }

    fn with_storage(bits: S, m: usize, k: usize, hasher: H) -> Self {
        debug_assert!(bits.len_bits() > m);
        Self {
            bits,
            m,
            k,
            count: AtomicU64::new(0),
            hashers: HasherPool::new(hasher),
        }
    }

    #[inline]
    pub(crate) fn probes(&self, key: &[u8]) -> ProbeSequence {
        let (upper, lower) = self.hashers.hash_pair(key);
        ProbeSequence::new(upper, lower, self.k, self.m)
    }

    #[inline]
    pub(crate) fn storage(&self) -> &S {
        &self.bits
    }

    #[inline]
    pub(crate) fn record_insert(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `key` to the filter.
    ///
    /// Returns `self` so calls can be chained.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.add("a").add(b"b").add(&String::from("c"));
    /// assert!(filter.test("b"));
    /// ```
    #[inline]
    pub fn add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> &Self {
        let key = key.as_ref();
        for offset in self.probes(key) {
            self.bits.set_bit(offset);
        }
        self.record_insert();

        #[cfg(feature = "trace")]
        tracing::trace!(len = key.len(), "add");

        self
    }

    /// Returns `true` if `key` may be in the filter, `false` if it definitely is not.
    #[must_use]
    #[inline]
    pub fn test<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        let key = key.as_ref();
        let present = self.probes(key).all(|offset| self.bits.get_bit(offset));

        #[cfg(feature = "trace")]
        tracing::trace!(len = key.len(), present, "test");

        present
    }

    /// Add `key` and return whether it appeared to be present beforehand.
    ///
    /// Each offset is read and set in a single atomic step. All `k` offsets
    /// are set whatever the verdict.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::BloomFilter;
    ///
    /// let filter = BloomFilter::new(100, 0.01).unwrap();
    /// assert!(!filter.test_and_add("b"));
    /// assert!(filter.test_and_add("b"));
    /// ```
    #[inline]
    pub fn test_and_add<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        let key = key.as_ref();
        let present = self
            .probes(key)
            .fold(true, |present, offset| self.bits.test_and_set_bit(offset) & present);
        self.record_insert();

        #[cfg(feature = "trace")]
        tracing::trace!(len = key.len(), present, "test_and_add");

        present
    }

    /// Bit array size `m`.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.m
    }

    /// Probes per key `k`.
    #[must_use]
    #[inline]
    pub fn num_hash_functions(&self) -> usize {
        self.k
    }

    /// Number of `add` and `test_and_add` calls so far.
    ///
    /// Advisory only: duplicates are counted every time and membership never
    /// depends on it.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Storage strategy backing this filter.
    #[must_use]
    pub fn storage_strategy(&self) -> StorageStrategy {
        self.bits.strategy()
    }

    /// Name of the configured hash algorithm.
    #[must_use]
    pub fn hasher_name(&self) -> &'static str {
        self.hashers.prototype().name()
    }

    /// Seed of the configured hash algorithm, 0 for unseeded ones.
    #[must_use]
    pub fn hasher_seed(&self) -> u64 {
        self.hashers.prototype().seed()
    }

    /// Number of bits currently set.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of the `m` bits currently set.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        (self.count_ones() as f64 / self.m as f64).min(1.0)
    }

    /// False positive rate implied by the current fill ratio.
    ///
    /// Tracks the configured rate while the filter is under capacity and rises
    /// past it once more than the expected number of keys has been added.
    #[must_use]
    pub fn estimated_fp_rate(&self) -> f64 {
        fp_rate_from_fill(self.fill_ratio(), self.k)
    }

    /// Approximate memory held by the filter, in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.bits.memory_usage()
    }

    /// Serialize the filter as an envelope carrying `m`, `k` and the storage kind.
    ///
    /// Safe to call while other threads are adding keys; see the
    /// [`codec`](crate::codec) module for what the snapshot guarantees.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let bytes = FilterEnvelope::encode(self.m, self.k, &self.bits);
        tracing::debug!(
            m = self.m,
            k = self.k,
            storage = %self.bits.strategy(),
            bytes = bytes.len(),
            "encoded Bloom filter"
        );
        bytes
    }

    /// Serialize the bit array only, without `m` or `k`.
    #[must_use]
    pub fn encode_frame(&self) -> Vec<u8> {
        self.bits.encode()
    }

    /// Rebuild a filter from a raw frame and externally stored dimensions.
    ///
    /// # Errors
    ///
    /// - configuration errors as for [`with_params`](Self::with_params)
    /// - [`BloomError::Decode`] if the frame is malformed, or its length does
    ///   not match `(m, storage)`
    pub fn from_frame(
        frame: &[u8],
        m: usize,
        k: usize,
        storage: StorageStrategy,
        hasher: H,
    ) -> Result<Self> {
        validate_params(m, k)?;
        let expected = storage.frame_len(m);
        let actual = frame.len();
        if actual < expected {
            return Err(BloomError::Decode(FrameError::TruncatedFrame {
                expected,
                actual,
            }));
        }
        if actual > expected {
            return Err(BloomError::Decode(FrameError::TrailingBytes {
                expected,
                actual,
            }));
        }
        let bits = S::decode_as(storage, frame)?;
        Ok(Self::with_storage(bits, m, k, hasher))
    }
}

impl<S: BitStorage, H: Hasher64> SharedBloomFilter for BloomFilter<S, H> {
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
        self.m
    }

    fn hash_count(&self) -> usize {
        self.k
    }

    fn insert_count(&self) -> u64 {
        self.count()
    }

    fn storage_strategy(&self) -> StorageStrategy {
        self.bits.strategy()
    }
}

impl<S: BitStorage, H: Hasher64> fmt::Debug for BloomFilter<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("m", &self.m)
            .field("k", &self.k)
            .field("storage", &self.bits.strategy())
            .field("hasher", &self.hasher_name())
            .field("count", &self.count())
            .finish()
    }
}
