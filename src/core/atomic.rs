//! Lock-free word storage.
//!
//! [`AtomicBuckets`] keeps the bit array in a boxed slice of atomic words and
//! sets bits with a compare-and-swap retry loop:
//!
//! 1. load the current word
//! 2. if the bit is already set, stop
//! 3. try to swap in `word | mask`
//! 4. on failure, retry with the value the CAS observed
//!
//! Every retry either succeeds or sees a word another writer has already
//! changed, so the loop terminates. Bits are never cleared, so two writers
//! racing on the same word always converge on the union of their bits.
//!
//! # Memory Ordering
//!
//! - successful CAS uses `AcqRel`, failed CAS and loads use `Acquire`
//! - a reader that observes a bit therefore also observes everything the
//!   writer did before setting it
//!
//! There is no ordering between different words. A reader can see some of the
//! bits written by an in-flight `add` and not others.
//!
//! # Examples
//!
//! ```
//! use fastbloom::core::atomic::Buckets32;
//! use fastbloom::core::storage::BitStorage;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let storage = Arc::new(Buckets32::with_bits(1000));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let storage = Arc::clone(&storage);
//!         thread::spawn(move || {
//!             for i in 0..250 {
//!                 storage.set_bit(t * 250 + i);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert_eq!(storage.count_ones(), 1000);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::codec::check_frame;
use crate::core::storage::{ensure_strategy, BitStorage, StorageStrategy};
use crate::error::Result;

mod sealed {
    pub trait Sealed {}
    impl Sealed for std::sync::atomic::AtomicU32 {}
    impl Sealed for std::sync::atomic::AtomicU64 {}
}

/// Atomic integer usable as a storage word.
///
/// Values are widened to `u64` so the CAS loop is written once.
pub trait AtomicWord: sealed::Sealed + Send + Sync + Sized {
    /// Bits per word.
    const BITS: usize;
    /// Bytes per word in the encoded frame.
    const BYTES: usize;
    /// Matching storage strategy.
    const STRATEGY: StorageStrategy;

    /// A zeroed word.
    fn zero() -> Self;
    /// Atomic load with `Acquire` ordering.
    fn load_word(&self) -> u64;
    /// Weak CAS with `AcqRel` / `Acquire` ordering.
    fn cas_word(&self, current: u64, new: u64) -> std::result::Result<u64, u64>;
    /// Append the word to `out` in big-endian order.
    fn write_be(&self, out: &mut Vec<u8>);
    /// Build a word from exactly [`Self::BYTES`] big-endian bytes.
    fn read_be(chunk: &[u8]) -> Self;
}

macro_rules! impl_atomic_word {
    ($atomic:ty, $int:ty, $strategy:expr) => {
        impl AtomicWord for $atomic {
            const BITS: usize = <$int>::BITS as usize;
            const BYTES: usize = std::mem::size_of::<$int>();
            const STRATEGY: StorageStrategy = $strategy;

            #[inline]
            fn zero() -> Self {
                <$atomic>::new(0)
            }

            #[inline]
            fn load_word(&self) -> u64 {
                u64::from(self.load(Ordering::Acquire))
            }

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn cas_word(&self, current: u64, new: u64) -> std::result::Result<u64, u64> {
                self.compare_exchange_weak(
                    current as $int,
                    new as $int,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .map(u64::from)
                .map_err(u64::from)
            }

            #[inline]
            fn write_be(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.load(Ordering::Acquire).to_be_bytes());
            }

            #[inline]
            fn read_be(chunk: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$int>()];
                buf.copy_from_slice(chunk);
                <$atomic>::new(<$int>::from_be_bytes(buf))
            }
        }
    };
}

impl_atomic_word!(AtomicU32, u32, StorageStrategy::Atomic32);
impl_atomic_word!(AtomicU64, u64, StorageStrategy::Atomic64);

/// Lock-free bit array over atomic words.
pub struct AtomicBuckets<W: AtomicWord> {
    words: Box<[W]>,
}

/// 32-bit word storage.
pub type Buckets32 = AtomicBuckets<AtomicU32>;

/// 64-bit word storage.
pub type Buckets64 = AtomicBuckets<AtomicU64>;

impl<W: AtomicWord> AtomicBuckets<W> {
    /// Number of words held.
    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    #[inline]
    fn locate(&self, offset: usize) -> (&W, u64) {
        assert!(
            offset < self.len_bits(),
            "bit offset out of bounds: offset={} len={}",
            offset,
            self.len_bits()
        );
        (&self.words[offset / W::BITS], 1u64 << (offset % W::BITS))
    }
}

impl<W: AtomicWord> BitStorage for AtomicBuckets<W> {
    fn with_bits(m: usize) -> Self {
        let words = (0..W::STRATEGY.units_for(m))
            .map(|_| W::zero())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { words }
    }

    #[inline]
    fn len_bits(&self) -> usize {
        self.words.len() * W::BITS
    }

    #[inline]
    fn set_bit(&self, offset: usize) {
        self.test_and_set_bit(offset);
    }

    #[inline]
    fn get_bit(&self, offset: usize) -> bool {
        let (word, mask) = self.locate(offset);
        word.load_word() & mask != 0
    }

    #[inline]
    fn test_and_set_bit(&self, offset: usize) -> bool {
        let (word, mask) = self.locate(offset);
        let mut current = word.load_word();
        loop {
            if current & mask != 0 {
                return true;
            }
            match word.cas_word(current, current | mask) {
                Ok(_) => return false,
                Err(observed) => current = observed,
            }
        }
    }

    fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load_word().count_ones() as usize)
            .sum()
    }

    fn memory_usage(&self) -> usize {
        self.words.len() * W::BYTES
    }

    fn strategy(&self) -> StorageStrategy {
        W::STRATEGY
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.reserve(self.words.len() * W::BYTES);
        for word in self.words.iter() {
            word.write_be(out);
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_frame(bytes, W::BYTES)?;
        let words = bytes
            .chunks_exact(W::BYTES)
            .map(W::read_be)
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(Self { words })
    }

    fn decode_as(strategy: StorageStrategy, bytes: &[u8]) -> Result<Self> {
        ensure_strategy(W::STRATEGY, strategy)?;
        Self::decode(bytes)
    }
}

impl<W: AtomicWord> fmt::Debug for AtomicBuckets<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicBuckets")
            .field("strategy", &W::STRATEGY)
            .field("words", &self.words.len())
            .field("ones", &self.count_ones())
            .finish()
    }
}
