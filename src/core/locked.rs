//! Lock-guarded byte storage.
//!
//! [`MutexBuckets`] keeps the bit array as plain bytes behind a single
//! `parking_lot::RwLock`. Reads take the shared lock, writes take the
//! exclusive lock and do an ordinary read-modify-write. Encoding copies the
//! bytes under the shared lock, so unlike the atomic storages its frames are a
//! consistent snapshot of the whole array.
//!
//! `parking_lot::RwLock` is used for its writer fairness and lack of poisoning.

use parking_lot::RwLock;

use crate::codec::check_frame;
use crate::core::storage::{ensure_strategy, BitStorage, StorageStrategy};
use crate::error::Result;

/// Byte array behind one reader-writer lock.
#[derive(Debug)]
pub struct MutexBuckets {
    bytes: RwLock<Box<[u8]>>,
}

#[inline]
fn split(offset: usize) -> (usize, u8) {
    (offset / 8, 1u8 << (offset % 8))
}

impl MutexBuckets {
    /// Number of bytes held.
    #[must_use]
    pub fn num_bytes(&self) -> usize {
        self.bytes.read().len()
    }

    #[inline]
    fn check(offset: usize, len: usize) {
        assert!(
            offset < len * 8,
            "bit offset out of bounds: offset={} len={}",
            offset,
            len * 8
        );
    }
}

impl BitStorage for MutexBuckets {
    fn with_bits(m: usize) -> Self {
        let len = StorageStrategy::MutexBytes.units_for(m);
        Self {
            bytes: RwLock::new(vec![0u8; len].into_boxed_slice()),
        }
    }

    fn len_bits(&self) -> usize {
        self.bytes.read().len() * 8
    }

    fn set_bit(&self, offset: usize) {
        let mut bytes = self.bytes.write();
        Self::check(offset, bytes.len());
        let (index, mask) = split(offset);
        bytes[index] |= mask;
    }

    fn get_bit(&self, offset: usize) -> bool {
        let bytes = self.bytes.read();
        Self::check(offset, bytes.len());
        let (index, mask) = split(offset);
        bytes[index] & mask != 0
    }

    fn test_and_set_bit(&self, offset: usize) -> bool {
        let mut bytes = self.bytes.write();
        Self::check(offset, bytes.len());
        let (index, mask) = split(offset);
        let was_set = bytes[index] & mask != 0;
        bytes[index] |= mask;
        was_set
    }

    fn count_ones(&self) -> usize {
        self.bytes
            .read()
            .iter()
            .map(|b| b.count_ones() as usize)
            .sum()
    }

    fn memory_usage(&self) -> usize {
        self.bytes.read().len()
    }

    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::MutexBytes
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytes.read());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        check_frame(bytes, 1)?;
        Ok(Self {
            bytes: RwLock::new(bytes.to_vec().into_boxed_slice()),
        })
    }

    fn decode_as(strategy: StorageStrategy, bytes: &[u8]) -> Result<Self> {
        ensure_strategy(StorageStrategy::MutexBytes, strategy)?;
        Self::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_set_get_single_threaded() {
        let storage = MutexBuckets::with_bits(100);
        assert_eq!(storage.num_bytes(), 13);
        for offset in 0..100 {
            storage.set_bit(offset);
            assert!(storage.get_bit(offset));
        }
        assert!(!storage.get_bit(100));
        assert_eq!(storage.count_ones(), 100);
    }

    #[test]
    fn test_byte_layout_is_lsb_first() {
        let storage = MutexBuckets::with_bits(16);
        storage.set_bit(0);
        storage.set_bit(9);
        assert_eq!(storage.encode(), vec![0b0000_0001, 0b0000_0010, 0]);
    }

    #[test]
    fn test_test_and_set_is_atomic_per_bit() {
        let storage = Arc::new(MutexBuckets::with_bits(8));
        let winners: usize = (0..8)
            .map(|_| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || usize::from(!storage.test_and_set_bit(5)))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .sum();

        assert_eq!(winners, 1, "exactly one thread observes the bit unset");
    }

    #[test]
    fn test_decode_copies_bytes() {
        let storage = MutexBuckets::decode(&[0xff, 0x00]).unwrap();
        assert_eq!(storage.len_bits(), 16);
        assert_eq!(storage.count_ones(), 8);
        assert!(storage.get_bit(7));
        assert!(!storage.get_bit(8));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(MutexBuckets::decode(&[]).is_err());
    }

    #[test]
    fn test_concurrent_read_write() {
        let storage = Arc::new(MutexBuckets::with_bits(1000));

        let handles: Vec<_> = (0..10)
            .map(|t| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for i in 0..100 {
                        let offset = t * 100 + i;
                        storage.set_bit(offset);
                        assert!(storage.get_bit(offset));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(storage.count_ones(), 1000);
    }
}
