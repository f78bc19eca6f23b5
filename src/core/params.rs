//! Filter sizing policy.
//!
//! Pure functions that derive the bit-array size `m` and probe count `k` from
//! an expected item count `n` and a target false positive rate `ε`.
//!
//! # Mathematical Background
//!
//! Sizing assumes the filter should be half full when it holds `n` items
//! (fill ratio `f = 0.5`), which is the point where the false positive rate is
//! minimised for a given `m`:
//!
//! - `m = ⌈n / ((ln f × ln(1 - f)) / |ln ε|)⌉`
//! - `k = ⌈log₂(1 / ε)⌉`
//!
//! With `f = 0.5` the denominator is `(ln 2)² / |ln ε|`, so `m` agrees with the
//! classic `-n × ln ε / (ln 2)²` bound, and `k` is the number of half-full
//! probes needed to push the false positive probability under `ε`.
//!
//! Once more than `n` items are added the false positive rate rises smoothly;
//! nothing here tries to bound it past the configured capacity.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Kirsch & Mitzenmacher (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{BloomError, Result};

/// Fraction of bits expected to be set once the filter holds its design capacity.
pub const FILL_RATIO: f64 = 0.5;

/// Bit array size [`optimal_m`] hands out when the formula yields zero (`n = 0`).
pub const MIN_FILTER_SIZE: usize = 8;

/// Validate that a false positive rate lies in the open interval (0, 1).
///
/// # Errors
///
/// [`BloomError::FalsePositiveRateOutOfBounds`] for `fp_rate <= 0`, `fp_rate >= 1` or NaN.
#[inline]
pub fn validate_fp_rate(fp_rate: f64) -> Result<()> {
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(BloomError::fp_rate_out_of_bounds(fp_rate));
    }
    Ok(())
}

/// Validate explicit filter dimensions.
///
/// # Errors
///
/// - [`BloomError::InvalidFilterSize`] if `m == 0`
/// - [`BloomError::InvalidHashCount`] if `k == 0` or `k` does not fit in a `u32`
#[inline]
pub fn validate_params(m: usize, k: usize) -> Result<()> {
    if m == 0 {
        return Err(BloomError::invalid_filter_size(m));
    }
    if k == 0 || u32::try_from(k).is_err() {
        return Err(BloomError::invalid_hash_count(k));
    }
    Ok(())
}

/// Calculate the optimal number of bits for `n` items at rate `fp_rate`.
///
/// `n = 0` is legal and yields [`MIN_FILTER_SIZE`]. Any `n > 0` gets the
/// formula's result unchanged, however small.
///
/// # Errors
///
/// - [`BloomError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1)
/// - [`BloomError::InvalidParameters`] if the result does not fit in memory
///
/// # Examples
///
/// ```
/// use fastbloom::core::params::optimal_m;
///
/// assert_eq!(optimal_m(100, 0.1).unwrap(), 480);
/// assert_eq!(optimal_m(100, 0.01).unwrap(), 959);
/// assert!(optimal_m(100, 0.0).is_err());
/// ```
pub fn optimal_m(n: usize, fp_rate: f64) -> Result<usize> {
    validate_fp_rate(fp_rate)?;

    let bits_per_item_inv = (FILL_RATIO.ln() * (1.0 - FILL_RATIO).ln()) / fp_rate.ln().abs();
    let m = (n as f64 / bits_per_item_inv).ceil();

    // Bound the allocation well below usize::MAX so word counts cannot overflow.
    if !m.is_finite() || m > (usize::MAX / 2) as f64 {
        return Err(BloomError::invalid_parameters(format!(
            "calculated filter size {:.0} bits for n={} and fp_rate={} exceeds system limits",
            m, n, fp_rate
        )));
    }

    match m as usize {
        0 => Ok(MIN_FILTER_SIZE),
        m => Ok(m),
    }
}

/// Calculate the optimal number of probes for `fp_rate`.
///
/// Always at least 1.
///
/// # Errors
///
/// [`BloomError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in (0, 1).
///
/// # Examples
///
/// ```
/// use fastbloom::core::params::optimal_k;
///
/// assert_eq!(optimal_k(0.1).unwrap(), 4);
/// assert_eq!(optimal_k(0.01).unwrap(), 7);
/// assert_eq!(optimal_k(0.9).unwrap(), 1);
/// ```
pub fn optimal_k(fp_rate: f64) -> Result<usize> {
    validate_fp_rate(fp_rate)?;
    let k = (1.0 / fp_rate).log2().ceil() as usize;
    Ok(k.max(1))
}

/// Calculate `(m, k)` in one call.
///
/// # Errors
///
/// See [`optimal_m`].
pub fn optimal_params(n: usize, fp_rate: f64) -> Result<(usize, usize)> {
    Ok((optimal_m(n, fp_rate)?, optimal_k(fp_rate)?))
}

/// Theoretical false positive probability after `n` insertions.
///
/// Implements `p = (1 - e^(-kn/m))^k`, clamped to `[0, 1]`.
///
/// # Errors
///
/// See [`validate_params`].
///
/// # Examples
///
/// ```
/// use fastbloom::core::params::expected_fp_rate;
///
/// let p = expected_fp_rate(9586, 1000, 7).unwrap();
/// assert!((p - 0.01).abs() < 0.001);
/// ```
pub fn expected_fp_rate(m: usize, n: usize, k: usize) -> Result<f64> {
    validate_params(m, k)?;
    if n == 0 {
        return Ok(0.0);
    }

    let k_f64 = k as f64;
    let exponent = -(k_f64 * n as f64) / m as f64;
    let fp_rate = (1.0 - exponent.exp()).powf(k_f64);
    Ok(fp_rate.clamp(0.0, 1.0))
}

/// False positive probability implied by an observed fill ratio.
///
/// Each probe hits a set bit with probability `fill`, so `p = fill^k`.
#[must_use]
pub fn fp_rate_from_fill(fill: f64, k: usize) -> f64 {
    fill.clamp(0.0, 1.0).powi(k as i32)
}
