//! Error types for fastbloom operations.
//!
//! Only two things can go wrong in this crate: a filter is configured with
//! parameters that cannot describe a working filter, or a serialized frame
//! cannot be decoded. Membership operations never fail, and false positives
//! are a statistical property of the structure, not an error.
//!
//! # Error Propagation
//!
//! ```
//! use fastbloom::{BloomError, Result};
//! use fastbloom::core::params::{optimal_k, optimal_m};
//!
//! fn dimensions(n: usize, fp: f64) -> Result<(usize, usize)> {
//!     let m = optimal_m(n, fp)?;
//!     let k = optimal_k(fp)?;
//!     Ok((m, k))
//! }
//!
//! assert_eq!(dimensions(100, 0.1).unwrap(), (480, 4));
//! assert!(matches!(
//!     dimensions(100, 1.5),
//!     Err(BloomError::FalsePositiveRateOutOfBounds { .. })
//! ));
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use crate::codec::FrameError;

/// Result type alias for fastbloom operations.
pub type Result<T> = std::result::Result<T, BloomError>;

/// Errors that can occur while building or decoding a Bloom filter.
///
/// Configuration variants are reported synchronously by constructors and the
/// builder; no partially constructed filter is ever returned. [`BloomError::Decode`]
/// is reported by the codec and never touches any existing filter.
#[derive(Debug, Clone, PartialEq)]
pub enum BloomError {
    /// Filter parameters are individually valid but do not describe a
    /// usable filter (for example a bit count that overflows memory).
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// False positive rate outside the open interval (0, 1).
    ///
    /// NaN is rejected through this variant as well.
    FalsePositiveRateOutOfBounds {
        /// The rejected rate.
        fp_rate: f64,
    },

    /// Bit array size is zero.
    InvalidFilterSize {
        /// The rejected size in bits.
        size: usize,
    },

    /// Number of hash probes is zero.
    InvalidHashCount {
        /// The rejected probe count.
        count: usize,
    },

    /// A serialized frame or envelope could not be decoded.
    Decode(FrameError),
}

impl fmt::Display for BloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid Bloom filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be greater than 0.",
                    size
                )
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "Invalid hash function count: {}. At least one probe is required.",
                    count
                )
            }
            Self::Decode(err) => write!(f, "Failed to decode Bloom filter: {}.", err),
        }
    }
}

impl std::error::Error for BloomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FrameError> for BloomError {
    fn from(err: FrameError) -> Self {
        Self::Decode(err)
    }
}

impl BloomError {
    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Returns `true` for errors raised while configuring a filter.
    #[must_use]
    pub fn is_config(&self) -> bool {
        !self.is_decode()
    }

    /// Returns `true` for errors raised while decoding a serialized filter.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = BloomError::invalid_parameters("m overflows usize");
        let display = format!("{err}");
        assert!(display.contains("Invalid Bloom filter parameters"));
        assert!(display.contains("m overflows usize"));
        assert!(display.ends_with('.'));
    }

    #[test]
    fn test_error_display_fp_rate_out_of_bounds() {
        let err = BloomError::fp_rate_out_of_bounds(1.5);
        let display = format!("{err}");
        assert!(display.contains("1.5"));
        assert!(display.contains("(0, 1)"));
    }

    #[test]
    fn test_error_display_invalid_filter_size() {
        let display = format!("{}", BloomError::invalid_filter_size(0));
        assert!(display.contains("0 bits"));
    }

    #[test]
    fn test_error_display_invalid_hash_count() {
        let display = format!("{}", BloomError::invalid_hash_count(0));
        assert!(display.contains("hash function count: 0"));
    }

    #[test]
    fn test_decode_error_wraps_frame_error() {
        let err: BloomError = FrameError::TruncatedFrame {
            expected: 18,
            actual: 3,
        }
        .into();
        assert!(err.is_decode());
        assert!(!err.is_config());

        let source = std::error::Error::source(&err).expect("decode errors carry a source");
        assert!(source.to_string().contains("expected at least 18 bytes"));
    }

    #[test]
    fn test_config_errors_have_no_source() {
        let err = BloomError::fp_rate_out_of_bounds(0.0);
        assert!(err.is_config());
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(BloomError::invalid_filter_size(0))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert_eq!(outer(), Err(BloomError::InvalidFilterSize { size: 0 }));
    }
}
