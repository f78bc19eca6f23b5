//! Double-hashing probe sequence.
//!
//! Given the `(upper, lower)` halves of a key's digest, the `i`-th probe is
//!
//! ```text
//! offset_i = (lower + upper × i) mod m        for i in 0..k
//! ```
//!
//! computed in 64-bit wrapping arithmetic, so every offset is in `0..m`.
//! Both filter flavors walk the same sequence; only the way each offset is
//! read or written differs.

#![allow(clippy::cast_possible_truncation)]

/// Iterator over the `k` bit offsets of one key.
///
/// # Examples
///
/// ```
/// use fastbloom::filters::ProbeSequence;
///
/// let offsets: Vec<usize> = ProbeSequence::new(3, 5, 4, 10).collect();
/// assert_eq!(offsets, vec![5, 8, 1, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    upper: u64,
    lower: u64,
    m: u64,
    i: u64,
    k: u64,
}

impl ProbeSequence {
    /// Probe sequence for digest halves `(upper, lower)` over `m` bits.
    ///
    /// `m` must be non-zero; filters guarantee this at construction.
    #[must_use]
    #[inline]
    pub fn new(upper: u32, lower: u32, k: usize, m: usize) -> Self {
        debug_assert!(m > 0, "probe sequence over an empty bit array");
        Self {
            upper: u64::from(upper),
            lower: u64::from(lower),
            m: m as u64,
            i: 0,
            k: k as u64,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.i >= self.k {
            return None;
        }
        let offset = self
            .lower
            .wrapping_add(self.upper.wrapping_mul(self.i))
            % self.m;
        self.i += 1;
        Some(offset as usize)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.k - self.i) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}

impl std::iter::FusedIterator for ProbeSequence {}
