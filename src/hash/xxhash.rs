//! XXH3-64 accumulator (feature `xxhash`).
//!
//! Wraps the one-shot `xxh3_64_with_seed` from the `xxhash-rust` crate behind
//! the streaming [`Hasher64`] interface. Written bytes are buffered and hashed
//! when [`sum64`](Hasher64::sum64) is called; `reset` clears the buffer but
//! keeps its allocation, which is what makes pooled instances cheap to reuse.
//!
//! XXH3 has much better distribution than FNV on long keys and is the better
//! choice when keys are URLs, paths or serialized records.
//!
//! # Examples
//!
//! ```
//! use fastbloom::hash::{Hasher64, XxHash3};
//!
//! let mut hasher = XxHash3::new();
//! hasher.write(b"hello ");
//! hasher.write(b"world");
//! let streamed = hasher.sum64();
//!
//! hasher.reset();
//! hasher.write(b"hello world");
//! assert_eq!(hasher.sum64(), streamed);
//! ```

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::hash::hasher::Hasher64;

/// Buffered XXH3-64 accumulator.
#[derive(Debug, Clone, Default)]
pub struct XxHash3 {
    seed: u64,
    buf: Vec<u8>,
}

impl XxHash3 {
    /// Create an accumulator with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create an accumulator with an explicit seed.
    ///
    /// Filters must be queried with the same seed they were populated with.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            buf: Vec::new(),
        }
    }

    /// Seed in use.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Hasher64 for XxHash3 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    fn sum64(&self) -> u64 {
        xxh3_64_with_seed(&self.buf, self.seed)
    }

    #[inline]
    fn reset(&mut self) {
        self.buf.clear();
    }

    fn name(&self) -> &'static str {
        "xxh3_64"
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn set_seed(&mut self, seed: u64) -> bool {
        self.seed = seed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xxhash_rust::xxh3::xxh3_64;

    #[test]
    fn test_matches_one_shot_digest() {
        let mut hasher = XxHash3::new();
        hasher.write(b"hello world");
        assert_eq!(hasher.sum64(), xxh3_64(b"hello world"));
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut hasher = XxHash3::new();
        hasher.write(&[7u8; 256]);
        hasher.reset();
        assert!(hasher.buf.is_empty());
        assert!(hasher.buf.capacity() >= 256);
        assert_eq!(hasher.sum64(), xxh3_64(b""));
    }

    #[test]
    fn test_seed_changes_digest() {
        let mut a = XxHash3::with_seed(1);
        let mut b = XxHash3::with_seed(2);
        a.write(b"key");
        b.write(b"key");
        assert_ne!(a.sum64(), b.sum64());
        assert_eq!(a.seed(), 1);
    }

    #[test]
    fn test_set_seed_matches_constructor() {
        let mut reseeded = XxHash3::new();
        assert!(reseeded.set_seed(42));
        reseeded.write(b"key");

        let mut seeded = XxHash3::with_seed(42);
        seeded.write(b"key");
        assert_eq!(reseeded.sum64(), seeded.sum64());
        assert_eq!(Hasher64::seed(&reseeded), 42);
    }
}
