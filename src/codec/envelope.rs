//! Fixed-layout envelope around a raw storage frame.
//!
//! All multi-byte fields are big-endian and parsed by hand, with no unsafe
//! code and no alignment requirements on the input buffer.

#![allow(clippy::cast_possible_truncation)]

use crate::codec::{FrameError, HEADER_SIZE, MAGIC, VERSION};
use crate::core::storage::{BitStorage, StorageStrategy};

/// Parsed envelope header plus a borrowed payload.
///
/// # Examples
///
/// ```
/// use fastbloom::codec::FilterEnvelope;
/// use fastbloom::core::storage::StorageStrategy;
/// use fastbloom::BloomFilter;
///
/// let filter = BloomFilter::new(100, 0.1).unwrap();
/// let bytes = filter.encode();
///
/// let envelope = FilterEnvelope::parse(&bytes).unwrap();
/// assert_eq!(envelope.m, 480);
/// assert_eq!(envelope.k, 4);
/// assert_eq!(envelope.storage, StorageStrategy::Atomic32);
/// assert_eq!(envelope.payload.len(), StorageStrategy::Atomic32.frame_len(480));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEnvelope<'a> {
    /// Bit array size.
    pub m: usize,
    /// Probes per key.
    pub k: usize,
    /// Storage the payload was written by.
    pub storage: StorageStrategy,
    /// Raw storage frame.
    pub payload: &'a [u8],
}

impl<'a> FilterEnvelope<'a> {
    /// Serialize `m`, `k` and a snapshot of `bits`.
    ///
    /// `k` must fit in a `u32`; filter constructors enforce this.
    #[must_use]
    pub fn encode<S: BitStorage>(m: usize, k: usize, bits: &S) -> Vec<u8> {
        let strategy = bits.strategy();
        let mut bytes = Vec::with_capacity(HEADER_SIZE + strategy.frame_len(m));

        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.push(strategy.tag());
        bytes.extend_from_slice(&(m as u64).to_be_bytes());
        bytes.extend_from_slice(&(k as u32).to_be_bytes());
        bits.encode_into(&mut bytes);

        bytes
    }

    /// Validate the header and split off the payload.
    ///
    /// # Errors
    ///
    /// - [`FrameError::Empty`] for zero-length input
    /// - [`FrameError::TruncatedFrame`] if the header or payload is cut short
    /// - [`FrameError::InvalidMagic`], [`FrameError::UnsupportedVersion`],
    ///   [`FrameError::UnknownStorage`] for a foreign or newer header
    /// - [`FrameError::InvalidSize`] for `m = 0` or an unaddressable `m`
    /// - [`FrameError::InvalidHashCount`] for `k = 0`
    /// - [`FrameError::TrailingBytes`] if the payload is longer than `(m, storage)` allows
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FrameError> {
        if bytes.is_empty() {
            return Err(FrameError::Empty);
        }
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::TruncatedFrame {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let (header, payload) = bytes.split_at(HEADER_SIZE);

        if &header[0..4] != MAGIC {
            return Err(FrameError::InvalidMagic);
        }
        if header[4] != VERSION {
            return Err(FrameError::UnsupportedVersion(header[4]));
        }
        let storage =
            StorageStrategy::from_tag(header[5]).ok_or(FrameError::UnknownStorage(header[5]))?;

        let mut m_buf = [0u8; 8];
        m_buf.copy_from_slice(&header[6..14]);
        let raw_m = u64::from_be_bytes(m_buf);

        let mut k_buf = [0u8; 4];
        k_buf.copy_from_slice(&header[14..18]);
        let raw_k = u32::from_be_bytes(k_buf);

        let m = usize::try_from(raw_m)
            .ok()
            .filter(|m| *m > 0 && *m < usize::MAX / 2)
            .ok_or(FrameError::InvalidSize(raw_m))?;
        if raw_k == 0 {
            return Err(FrameError::InvalidHashCount(raw_k));
        }

        let frame_len = storage.frame_len(m);
        if payload.len() < frame_len {
            return Err(FrameError::TruncatedFrame {
                expected: HEADER_SIZE + frame_len,
                actual: bytes.len(),
            });
        }
        if payload.len() > frame_len {
            return Err(FrameError::TrailingBytes {
                expected: HEADER_SIZE + frame_len,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            m,
            k: raw_k as usize,
            storage,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::Buckets;

    fn header(tag: u8, m: u64, k: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.push(tag);
        bytes.extend_from_slice(&m.to_be_bytes());
        bytes.extend_from_slice(&k.to_be_bytes());
        bytes
    }

    #[test]
    fn test_header_layout() {
        let bits = Buckets::new(StorageStrategy::Atomic64, 100);
        bits.set_bit(0);
        let bytes = FilterEnvelope::encode(100, 7, &bits);

        assert_eq!(&bytes[0..4], b"FBLM");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 1);
        assert_eq!(&bytes[6..14], &100u64.to_be_bytes());
        assert_eq!(&bytes[14..18], &7u32.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE + 16);
        assert_eq!(&bytes[18..26], &1u64.to_be_bytes());
    }

    #[test]
    fn test_parse_round_trip() {
        let bits = Buckets::new(StorageStrategy::MutexBytes, 30);
        let bytes = FilterEnvelope::encode(30, 3, &bits);
        let envelope = FilterEnvelope::parse(&bytes).unwrap();
        assert_eq!(envelope.m, 30);
        assert_eq!(envelope.k, 3);
        assert_eq!(envelope.storage, StorageStrategy::MutexBytes);
        assert_eq!(envelope.payload, &[0u8; 4][..]);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert_eq!(FilterEnvelope::parse(&[]), Err(FrameError::Empty));
        assert_eq!(
            FilterEnvelope::parse(b"foo"),
            Err(FrameError::TruncatedFrame {
                expected: 18,
                actual: 3
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_magic_and_version() {
        let mut bytes = header(0, 8, 1);
        bytes.extend_from_slice(&[0u8; 4]);

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert_eq!(FilterEnvelope::parse(&bad_magic), Err(FrameError::InvalidMagic));

        let mut bad_version = bytes;
        bad_version[4] = 2;
        assert_eq!(
            FilterEnvelope::parse(&bad_version),
            Err(FrameError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_storage() {
        let bytes = header(7, 8, 1);
        assert_eq!(FilterEnvelope::parse(&bytes), Err(FrameError::UnknownStorage(7)));
    }

    #[test]
    fn test_parse_rejects_degenerate_dimensions() {
        assert_eq!(
            FilterEnvelope::parse(&header(0, 0, 1)),
            Err(FrameError::InvalidSize(0))
        );
        assert_eq!(
            FilterEnvelope::parse(&header(0, u64::MAX, 1)),
            Err(FrameError::InvalidSize(u64::MAX))
        );
        assert_eq!(
            FilterEnvelope::parse(&header(0, 8, 0)),
            Err(FrameError::InvalidHashCount(0))
        );
    }

    #[test]
    fn test_parse_rejects_wrong_payload_length() {
        let mut short = header(0, 64, 2);
        short.extend_from_slice(&[0u8; 8]);
        assert_eq!(
            FilterEnvelope::parse(&short),
            Err(FrameError::TruncatedFrame {
                expected: 18 + 12,
                actual: 18 + 8
            })
        );

        let mut long = header(0, 64, 2);
        long.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            FilterEnvelope::parse(&long),
            Err(FrameError::TrailingBytes {
                expected: 18 + 12,
                actual: 18 + 16
            })
        );
    }
}
