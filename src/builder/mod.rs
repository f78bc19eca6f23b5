//! Builder pattern for Bloom filter construction.
//!
//! [`FilterBuilder`] collects sizing, storage and hasher choices and produces
//! either filter flavor. Required parameters are enforced at compile time;
//! out-of-range values are reported when the filter is built.
//!
//! # Design Philosophy
//!
//! ## Type-State Pattern
//!
//! The builder moves through `Initial → WithItems → Complete`. Only a
//! `Complete` builder has `build` methods, so forgetting the target false
//! positive rate is a type error rather than a runtime one.
//!
//! ## Error Handling
//!
//! - **Compile-time errors**: missing required parameters
//! - **Runtime errors**: invalid parameter values (out of range)
//!
//! # Examples
//!
//! ## Sized From Capacity
//!
//! ```
//! use fastbloom::builder::FilterBuilder;
//!
//! let filter = FilterBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .unwrap();
//!
//! filter.add("hello");
//! assert!(filter.test("hello"));
//! ```
//!
//! ## Explicit Dimensions
//!
//! ```
//! use fastbloom::builder::FilterBuilder;
//! use fastbloom::StorageStrategy;
//!
//! let filter = FilterBuilder::with_dimensions(4096, 5)
//!     .storage(StorageStrategy::Atomic64)
//!     .build_mutex()
//!     .unwrap();
//!
//! assert_eq!(filter.capacity(), 4096);
//! assert_eq!(filter.storage_strategy(), StorageStrategy::Atomic64);
//! ```
//!
//! # Builder Options
//!
//! | Method | Required | Default |
//! |--------|----------|---------|
//! | `expected_items` + `false_positive_rate` | yes, or `with_dimensions` | - |
//! | `storage` | no | [`StorageStrategy::Atomic32`](crate::StorageStrategy) |
//! | `hasher` | no | [`Fnv64`](crate::hash::Fnv64) |

#![allow(clippy::module_name_repetitions)]

pub mod filter;

pub use filter::{Complete, FilterBuilder, FilterMetadata, Initial, WithItems};

/// Common validation functions for the builder.
mod validation {
    use crate::core::params;
    use crate::error::Result;

    /// Validate a target false positive rate.
    ///
    /// # Errors
    ///
    /// Returns error if `fp_rate` is not in (0, 1).
    #[inline]
    pub fn validate_fp_rate(fp_rate: f64) -> Result<()> {
        params::validate_fp_rate(fp_rate)
    }

    /// Validate explicit dimensions.
    ///
    /// # Errors
    ///
    /// Returns error if `m == 0`, `k == 0` or `k` overflows the envelope field.
    #[inline]
    pub fn validate_dimensions(m: usize, k: usize) -> Result<()> {
        params::validate_params(m, k)
    }
}

/// Prelude for convenient builder imports.
pub mod prelude {
    pub use super::{FilterBuilder, FilterMetadata};
}

#[cfg(test)]
mod tests {
    use super::validation::*;

    #[test]
    fn test_validate_fp_rate() {
        assert!(validate_fp_rate(0.01).is_ok());
        assert!(validate_fp_rate(0.5).is_ok());
        assert!(validate_fp_rate(0.0).is_err());
        assert!(validate_fp_rate(1.0).is_err());
        assert!(validate_fp_rate(-0.1).is_err());
        assert!(validate_fp_rate(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(1, 1).is_ok());
        assert!(validate_dimensions(4096, 7).is_ok());
        assert!(validate_dimensions(0, 7).is_err());
        assert!(validate_dimensions(4096, 0).is_err());
    }
}
