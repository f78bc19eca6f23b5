//! Builder for both filter flavors.
//!
//! # Type-State Pattern
//!
//! ```text
//! Initial → WithItems → Complete → BloomFilter / MutexBloomFilter
//!     ↓         ↓           ↓
//!   .expected_items()  .false_positive_rate()  .build() / .build_mutex()
//!
//! Initial ──────────────→ Complete
//!           .dimensions()
//! ```
//!
//! # Examples
//!
//! ## Minimal Configuration
//!
//! ```
//! use fastbloom::builder::FilterBuilder;
//!
//! let filter = FilterBuilder::new()
//!     .expected_items(100)
//!     .false_positive_rate(0.1)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(filter.capacity(), 480);
//! assert_eq!(filter.num_hash_functions(), 4);
//! ```
//!
//! ## Full Configuration
//!
//! ```
//! use fastbloom::builder::FilterBuilder;
//! use fastbloom::hash::Fnv64a;
//! use fastbloom::StorageStrategy;
//!
//! let filter = FilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.001)
//!     .storage(StorageStrategy::MutexBytes)
//!     .hasher(Fnv64a::new())
//!     .build_mutex()
//!     .unwrap();
//!
//! assert_eq!(filter.hasher_name(), "fnv1a_64");
//! ```
//!
//! ## Error Handling
//!
//! ```
//! use fastbloom::builder::FilterBuilder;
//!
//! let result = FilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(1.5)
//!     .build();
//!
//! assert!(result.is_err());
//! ```

#![allow(clippy::cast_precision_loss)]

use std::marker::PhantomData;

use crate::core::params;
use crate::core::storage::{Buckets, StorageStrategy};
use crate::error::{BloomError, Result};
use crate::filters::{BloomFilter, MutexBloomFilter};
use crate::hash::{DefaultHasher, Hasher64};

/// Type-state marker: no sizing parameters set.
pub struct Initial;

/// Type-state marker: expected item count is set.
pub struct WithItems;

/// Type-state marker: sizing is fully determined.
pub struct Complete;

/// Builder for Bloom filters with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: current builder state ([`Initial`], [`WithItems`], [`Complete`])
/// - `H`: hash function type (defaults to [`DefaultHasher`])
pub struct FilterBuilder<State, H = DefaultHasher> {
    expected_items: Option<usize>,
    fp_rate: Option<f64>,
    dimensions: Option<(usize, usize)>,
    storage: StorageStrategy,
    hasher: H,
    _state: PhantomData<State>,
}

impl FilterBuilder<Initial, DefaultHasher> {
    /// Create a new builder with default storage and hasher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expected_items: None,
            fp_rate: None,
            dimensions: None,
            storage: StorageStrategy::default(),
            hasher: DefaultHasher::new(),
            _state: PhantomData,
        }
    }

    /// Shorthand for `FilterBuilder::new().dimensions(m, k)`.
    #[must_use]
    pub fn with_dimensions(m: usize, k: usize) -> FilterBuilder<Complete, DefaultHasher> {
        Self::new().dimensions(m, k)
    }
}

impl<H> FilterBuilder<Initial, H> {
    /// Set the number of keys the filter should hold at its target rate.
    ///
    /// Transitions the builder to the `WithItems` state. Zero is accepted and
    /// yields the minimum filter size.
    #[must_use]
    pub fn expected_items(self, items: usize) -> FilterBuilder<WithItems, H> {
        FilterBuilder {
            expected_items: Some(items),
            fp_rate: self.fp_rate,
            dimensions: None,
            storage: self.storage,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }

    /// Skip sizing and use explicit `m` bits and `k` probes.
    ///
    /// Transitions the builder directly to the `Complete` state.
    #[must_use]
    pub fn dimensions(self, m: usize, k: usize) -> FilterBuilder<Complete, H> {
        FilterBuilder {
            expected_items: None,
            fp_rate: None,
            dimensions: Some((m, k)),
            storage: self.storage,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<H> FilterBuilder<WithItems, H> {
    /// Set the target false positive rate, in (0, 1).
    ///
    /// Transitions the builder to the `Complete` state. The value is checked
    /// when the filter is built.
    #[must_use]
    pub fn false_positive_rate(self, fp_rate: f64) -> FilterBuilder<Complete, H> {
        FilterBuilder {
            expected_items: self.expected_items,
            fp_rate: Some(fp_rate),
            dimensions: None,
            storage: self.storage,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }
}

impl<State, H> FilterBuilder<State, H> {
    /// Choose the bit storage (optional, defaults to `Atomic32`).
    #[must_use]
    pub fn storage(mut self, storage: StorageStrategy) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the hash function (optional, defaults to FNV-1).
    #[must_use]
    pub fn hasher<H2: Hasher64>(self, hasher: H2) -> FilterBuilder<State, H2> {
        FilterBuilder {
            expected_items: self.expected_items,
            fp_rate: self.fp_rate,
            dimensions: self.dimensions,
            storage: self.storage,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H: Hasher64> FilterBuilder<Complete, H> {
    /// Resolve `(m, k)` from whichever sizing path was taken.
    fn resolve(&self) -> Result<(usize, usize)> {
        match (self.dimensions, self.expected_items, self.fp_rate) {
            (Some((m, k)), _, _) => {
                super::validation::validate_dimensions(m, k)?;
                Ok((m, k))
            }
            (None, Some(items), Some(fp_rate)) => {
                super::validation::validate_fp_rate(fp_rate)?;
                params::optimal_params(items, fp_rate)
            }
            _ => Err(BloomError::invalid_parameters(
                "builder has neither dimensions nor a capacity target",
            )),
        }
    }

    /// Build the lock-free filter.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `fp_rate` not in (0, 1)
    /// - explicit `m` or `k` is zero
    /// - the derived size overflows
    pub fn build(self) -> Result<BloomFilter<Buckets, H>> {
        let (m, k) = self.resolve()?;
        BloomFilter::explicit(m, k, self.storage, self.hasher)
    }

    /// Build the single-lock filter.
    ///
    /// # Errors
    ///
    /// As for [`build`](Self::build).
    pub fn build_mutex(self) -> Result<MutexBloomFilter<Buckets, H>> {
        let (m, k) = self.resolve()?;
        MutexBloomFilter::explicit(m, k, self.storage, self.hasher)
    }

    /// Build the lock-free filter and report the parameters it was given.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastbloom::builder::FilterBuilder;
    ///
    /// let (filter, metadata) = FilterBuilder::new()
    ///     .expected_items(100)
    ///     .false_positive_rate(0.01)
    ///     .build_with_metadata()
    ///     .unwrap();
    ///
    /// assert_eq!(metadata.m, 959);
    /// assert_eq!(metadata.k, 7);
    /// assert_eq!(metadata.m, filter.capacity());
    /// ```
    ///
    /// # Errors
    ///
    /// As for [`build`](Self::build).
    pub fn build_with_metadata(self) -> Result<(BloomFilter<Buckets, H>, FilterMetadata)> {
        let (m, k) = self.resolve()?;
        let metadata = FilterMetadata {
            expected_items: self.expected_items,
            fp_rate: self.fp_rate,
            m,
            k,
            storage: self.storage,
            frame_bytes: self.storage.frame_len(m),
        };
        let filter = BloomFilter::explicit(m, k, self.storage, self.hasher)?;
        Ok((filter, metadata))
    }
}

impl Default for FilterBuilder<Initial, DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters a filter was built with.
///
/// Capacity fields are `None` when the builder was given explicit dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterMetadata {
    /// Expected number of items.
    pub expected_items: Option<usize>,
    /// Target false positive rate.
    pub fp_rate: Option<f64>,
    /// Bit array size.
    pub m: usize,
    /// Probes per key.
    pub k: usize,
    /// Storage strategy.
    pub storage: StorageStrategy,
    /// Size of the encoded bit array.
    pub frame_bytes: usize,
}

impl FilterMetadata {
    /// Bits of storage per expected item.
    #[must_use]
    pub fn bits_per_item(&self) -> Option<f64> {
        self.expected_items
            .filter(|n| *n > 0)
            .map(|n| self.m as f64 / n as f64)
    }

    /// False positive rate predicted once `expected_items` keys are added.
    #[must_use]
    pub fn predicted_fp_rate(&self) -> Option<f64> {
        let items = self.expected_items?;
        params::expected_fp_rate(self.m, items, self.k).ok()
    }

    /// Encoded size in kilobytes.
    #[must_use]
    pub fn frame_kb(&self) -> f64 {
        self.frame_bytes as f64 / 1024.0
    }
}
