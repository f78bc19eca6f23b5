//! Streaming 64-bit hash accumulators.
//!
//! A Bloom filter needs one 64-bit digest per key. [`Hasher64`] is the
//! minimal streaming interface for that: feed bytes, read the sum, reset.
//! Accumulators are reused through [`HasherPool`](crate::hash::pool::HasherPool),
//! so `reset` must return them to exactly their freshly constructed state.
//!
//! # Provided Hashers
//!
//! | Hasher | Algorithm | Notes |
//! |---|---|---|
//! | [`Fnv64`] | FNV-1, 64-bit | default, bit-compatible with Go's `hash/fnv.New64` |
//! | [`Fnv64a`] | FNV-1a, 64-bit | better avalanche on short keys |
//! | `XxHash3` | XXH3-64 | feature `xxhash` |
//!
//! None of these are cryptographic. Filters built from untrusted keys can be
//! flooded deliberately.
//!
//! # Examples
//!
//! ```
//! use fastbloom::hash::hasher::{Fnv64, Hasher64};
//!
//! let mut hasher = Fnv64::new();
//! hasher.write(b"a");
//! assert_eq!(hasher.sum64(), 0xaf63_bd4c_8601_b7be);
//!
//! hasher.reset();
//! assert_eq!(hasher.sum64(), Fnv64::new().sum64());
//! ```

#![allow(clippy::module_name_repetitions)]

/// FNV 64-bit offset basis.
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV 64-bit prime.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Reusable streaming 64-bit hash state.
///
/// # Requirements
///
/// - **Deterministic**: the same bytes always produce the same sum, across
///   processes, so encoded filters stay queryable after a restart.
/// - **Resettable**: after [`reset`](Self::reset) the state is indistinguishable
///   from a new instance.
/// - **Cloneable**: the pool clones a prototype when it runs dry.
pub trait Hasher64: Clone + Send + Sync + 'static {
    /// Feed bytes into the accumulator.
    fn write(&mut self, bytes: &[u8]);

    /// Current 64-bit digest. Does not consume or reset the state.
    fn sum64(&self) -> u64;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Algorithm name, used in logs and checked when deserializing a filter.
    fn name(&self) -> &'static str;

    /// Seed mixed into every digest. Unseeded algorithms report 0.
    #[inline]
    fn seed(&self) -> u64 {
        0
    }

    /// Switch to `seed`. Returns `false` if the algorithm cannot take it,
    /// leaving the accumulator unchanged.
    #[inline]
    fn set_seed(&mut self, seed: u64) -> bool {
        seed == 0
    }

    /// Hash `bytes` from a clean state, leaving the accumulator reset.
    #[inline]
    fn hash_once(&mut self, bytes: &[u8]) -> u64 {
        self.reset();
        self.write(bytes);
        let sum = self.sum64();
        self.reset();
        sum
    }
}

/// 64-bit FNV-1 (multiply, then xor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv64 {
    state: u64,
}

impl Fnv64 {
    /// Create an accumulator at the offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher64 for Fnv64 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(FNV_PRIME);
            self.state ^= u64::from(byte);
        }
    }

    #[inline]
    fn sum64(&self) -> u64 {
        self.state
    }

    #[inline]
    fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }

    fn name(&self) -> &'static str {
        "fnv1_64"
    }
}

/// 64-bit FNV-1a (xor, then multiply).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv64a {
    state: u64,
}

impl Fnv64a {
    /// Create an accumulator at the offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for Fnv64a {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher64 for Fnv64a {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn sum64(&self) -> u64 {
        self.state
    }

    #[inline]
    fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }

    fn name(&self) -> &'static str {
        "fnv1a_64"
    }
}

/// Split a 64-bit digest into `(upper, lower)` 32-bit halves.
#[must_use]
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub const fn split_digest(sum: u64) -> (u32, u32) {
    ((sum >> 32) as u32, sum as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest<H: Hasher64 + Default>(bytes: &[u8]) -> u64 {
        let mut hasher = H::default();
        hasher.write(bytes);
        hasher.sum64()
    }

    #[test]
    fn test_fnv1_known_vectors() {
        assert_eq!(digest::<Fnv64>(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(digest::<Fnv64>(b"a"), 0xaf63_bd4c_8601_b7be);
        assert_eq!(digest::<Fnv64>(b"foobar"), 0x340d_8765_a4dd_a9c2);
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(digest::<Fnv64a>(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(digest::<Fnv64a>(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(digest::<Fnv64a>(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let mut hasher = Fnv64::new();
        hasher.write(b"foo");
        hasher.write(b"bar");
        assert_eq!(hasher.sum64(), digest::<Fnv64>(b"foobar"));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut hasher = Fnv64a::new();
        hasher.write(b"some key");
        hasher.reset();
        assert_eq!(hasher, Fnv64a::new());
    }

    #[test]
    fn test_hash_once_leaves_state_clean() {
        let mut hasher = Fnv64::new();
        hasher.write(b"stale");
        assert_eq!(hasher.hash_once(b"hello"), 0x7b49_5389_bdbd_d4c7);
        assert_eq!(hasher, Fnv64::new());
    }

    #[test]
    fn test_split_digest() {
        assert_eq!(
            split_digest(0xaf63_bd4c_8601_b7be),
            (0xaf63_bd4c, 0x8601_b7be)
        );
        assert_eq!(split_digest(0), (0, 0));
    }

    #[test]
    fn test_names() {
        assert_eq!(Fnv64::new().name(), "fnv1_64");
        assert_eq!(Fnv64a::new().name(), "fnv1a_64");
    }

    #[test]
    fn test_fnv_is_unseeded() {
        let mut hasher = Fnv64::new();
        assert_eq!(hasher.seed(), 0);
        assert!(hasher.set_seed(0));
        assert!(!hasher.set_seed(42));
        assert_eq!(hasher, Fnv64::new());
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Fnv64>();
        assert_send::<Fnv64a>();
    }
}
