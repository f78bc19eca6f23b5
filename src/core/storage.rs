//! Bit storage abstraction.
//!
//! A Bloom filter only ever needs four things from its bit array: set a bit,
//! read a bit, snapshot the whole array to bytes, and rebuild an array from
//! such a snapshot. [`BitStorage`] captures exactly that, and the filter
//! flavors in [`crate::filters`] are generic over it.
//!
//! # Strategies
//!
//! | Strategy | Type | Unit | Synchronization |
//! |---|---|---|---|
//! | [`StorageStrategy::Atomic32`] | [`Buckets32`] | `u32` word | lock-free CAS |
//! | [`StorageStrategy::Atomic64`] | [`Buckets64`] | `u64` word | lock-free CAS |
//! | [`StorageStrategy::MutexBytes`] | [`MutexBuckets`] | byte | reader-writer lock |
//!
//! Every strategy allocates `m / width + 1` units for an `m`-bit filter, so
//! all offsets in `0..m` are addressable and the encoded frame is exactly
//! [`StorageStrategy::frame_len`] bytes long.
//!
//! [`Buckets`] wraps the three concrete storages in an enum so the strategy
//! can be picked at runtime from configuration.
//!
//! # Monotonicity
//!
//! Bits only transition from 0 to 1. No storage exposes a way to clear a bit,
//! which is what lets concurrent writers race on the same word without losing
//! updates.
//!
//! # Examples
//!
//! ```
//! use fastbloom::core::storage::{BitStorage, Buckets, StorageStrategy};
//!
//! let storage = Buckets::new(StorageStrategy::Atomic64, 100);
//! storage.set_bit(42);
//! assert!(storage.get_bit(42));
//! assert!(!storage.get_bit(43));
//!
//! let frame = storage.encode();
//! assert_eq!(frame.len(), StorageStrategy::Atomic64.frame_len(100));
//!
//! let restored = Buckets::decode_as(StorageStrategy::Atomic64, &frame).unwrap();
//! assert!(restored.get_bit(42));
//! ```

use std::fmt;

use crate::codec::FrameError;
use crate::core::atomic::{Buckets32, Buckets64};
use crate::core::locked::MutexBuckets;
use crate::error::Result;

/// Bit storage selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageStrategy {
    /// Lock-free array of 32-bit words.
    #[default]
    Atomic32,
    /// Lock-free array of 64-bit words.
    Atomic64,
    /// Byte array behind a reader-writer lock.
    MutexBytes,
}

impl StorageStrategy {
    /// All strategies, in tag order.
    pub const ALL: [Self; 3] = [Self::Atomic32, Self::Atomic64, Self::MutexBytes];

    /// Envelope tag for this strategy.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Atomic32 => 0,
            Self::Atomic64 => 1,
            Self::MutexBytes => 2,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Atomic32),
            1 => Some(Self::Atomic64),
            2 => Some(Self::MutexBytes),
            _ => None,
        }
    }

    /// Size of one storage unit in bytes.
    #[must_use]
    pub const fn word_bytes(self) -> usize {
        match self {
            Self::Atomic32 => 4,
            Self::Atomic64 => 8,
            Self::MutexBytes => 1,
        }
    }

    /// Size of one storage unit in bits.
    #[must_use]
    pub const fn word_bits(self) -> usize {
        self.word_bytes() * 8
    }

    /// Number of units allocated for an `m`-bit filter.
    #[must_use]
    pub const fn units_for(self, m: usize) -> usize {
        m / self.word_bits() + 1
    }

    /// Length in bytes of the raw frame for an `m`-bit filter.
    #[must_use]
    pub const fn frame_len(self, m: usize) -> usize {
        self.units_for(m) * self.word_bytes()
    }

    /// Short lowercase name, used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Atomic32 => "atomic32",
            Self::Atomic64 => "atomic64",
            Self::MutexBytes => "mutex_bytes",
        }
    }
}

impl fmt::Display for StorageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size, grow-only bit array shared between threads.
///
/// Offsets past [`len_bits`](Self::len_bits) are a programming error and
/// panic, like slice indexing.
pub trait BitStorage: Send + Sync + Sized {
    /// Allocate zeroed storage able to address every offset in `0..m`.
    fn with_bits(m: usize) -> Self;

    /// Number of addressable bits (a whole number of units, at least `m + 1`).
    fn len_bits(&self) -> usize;

    /// Set the bit at `offset` to 1.
    fn set_bit(&self, offset: usize);

    /// Read the bit at `offset`.
    fn get_bit(&self, offset: usize) -> bool;

    /// Set the bit at `offset` and return its previous value.
    ///
    /// The default reads then writes. Implementations override it with a
    /// single atomic step.
    fn test_and_set_bit(&self, offset: usize) -> bool {
        let was_set = self.get_bit(offset);
        if !was_set {
            self.set_bit(offset);
        }
        was_set
    }

    /// Number of bits currently set.
    fn count_ones(&self) -> usize;

    /// Heap bytes held by the storage.
    fn memory_usage(&self) -> usize;

    /// Strategy this storage implements.
    fn strategy(&self) -> StorageStrategy;

    /// Append the raw big-endian frame to `out`.
    fn encode_into(&self, out: &mut Vec<u8>);

    /// Snapshot the storage as a raw big-endian frame.
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len_bits() / 8);
        self.encode_into(&mut out);
        out
    }

    /// Rebuild storage from a raw frame.
    ///
    /// The unit count is taken from the frame length.
    ///
    /// # Errors
    ///
    /// [`BloomError::Decode`](crate::BloomError::Decode) if `bytes` is empty
    /// or not a whole number of units.
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// Rebuild storage from a raw frame written by `strategy` storage.
    ///
    /// # Errors
    ///
    /// As [`decode`](Self::decode), plus
    /// [`FrameError::StorageMismatch`] if this type cannot hold `strategy` frames.
    fn decode_as(strategy: StorageStrategy, bytes: &[u8]) -> Result<Self> {
        let storage = Self::decode(bytes)?;
        ensure_strategy(storage.strategy(), strategy)?;
        Ok(storage)
    }
}

/// Fail with [`FrameError::StorageMismatch`] unless `frame` is `own`.
pub(crate) fn ensure_strategy(own: StorageStrategy, frame: StorageStrategy) -> Result<()> {
    if own != frame {
        return Err(FrameError::StorageMismatch {
            expected: own.tag(),
            actual: frame.tag(),
        }
        .into());
    }
    Ok(())
}

/// Runtime-selected storage.
#[derive(Debug)]
pub enum Buckets {
    /// 32-bit CAS words.
    Atomic32(Buckets32),
    /// 64-bit CAS words.
    Atomic64(Buckets64),
    /// Locked bytes.
    MutexBytes(MutexBuckets),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Buckets::Atomic32($inner) => $body,
            Buckets::Atomic64($inner) => $body,
            Buckets::MutexBytes($inner) => $body,
        }
    };
}

impl Buckets {
    /// Allocate storage of the given strategy for an `m`-bit filter.
    #[must_use]
    pub fn new(strategy: StorageStrategy, m: usize) -> Self {
        match strategy {
            StorageStrategy::Atomic32 => Self::Atomic32(Buckets32::with_bits(m)),
            StorageStrategy::Atomic64 => Self::Atomic64(Buckets64::with_bits(m)),
            StorageStrategy::MutexBytes => Self::MutexBytes(MutexBuckets::with_bits(m)),
        }
    }
}

impl BitStorage for Buckets {
    fn with_bits(m: usize) -> Self {
        Self::new(StorageStrategy::default(), m)
    }

    #[inline]
    fn len_bits(&self) -> usize {
        dispatch!(self, s => s.len_bits())
    }

    #[inline]
    fn set_bit(&self, offset: usize) {
        dispatch!(self, s => s.set_bit(offset))
    }

    #[inline]
    fn get_bit(&self, offset: usize) -> bool {
        dispatch!(self, s => s.get_bit(offset))
    }

    #[inline]
    fn test_and_set_bit(&self, offset: usize) -> bool {
        dispatch!(self, s => s.test_and_set_bit(offset))
    }

    fn count_ones(&self) -> usize {
        dispatch!(self, s => s.count_ones())
    }

    fn memory_usage(&self) -> usize {
        dispatch!(self, s => s.memory_usage())
    }

    fn strategy(&self) -> StorageStrategy {
        dispatch!(self, s => s.strategy())
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        dispatch!(self, s => s.encode_into(out))
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_as(StorageStrategy::default(), bytes)
    }

    fn decode_as(strategy: StorageStrategy, bytes: &[u8]) -> Result<Self> {
        Ok(match strategy {
            StorageStrategy::Atomic32 => Self::Atomic32(Buckets32::decode(bytes)?),
            StorageStrategy::Atomic64 => Self::Atomic64(Buckets64::decode(bytes)?),
            StorageStrategy::MutexBytes => Self::MutexBytes(MutexBuckets::decode(bytes)?),
        })
    }
}
