//! Binary encoding of filter state.
//!
//! Two layers are provided:
//!
//! - **Raw frames**, produced by [`BitStorage::encode`](crate::core::storage::BitStorage::encode):
//!   the bit array only, as big-endian words (4 bytes for `Atomic32`, 8 bytes
//!   for `Atomic64`, 1 byte for `MutexBytes`). No header, length or checksum.
//! - **Envelopes**, produced by [`FilterEnvelope`]: a fixed 18-byte header
//!   carrying `m`, `k` and the storage kind, followed by the raw frame.
//!
//! # Envelope Format
//!
//! ```text
//! [Header: 18 bytes]
//!   Magic:    4 bytes  ("FBLM")
//!   Version:  1 byte   (1)
//!   Storage:  1 byte   (0=Atomic32, 1=Atomic64, 2=MutexBytes)
//!   m:        8 bytes  (bit count, u64 big-endian)
//!   k:        4 bytes  (probe count, u32 big-endian)
//!
//! [Payload: (m / width + 1) * width_bytes]
//!   Raw storage frame (big-endian words)
//! ```
//!
//! Encoding a filter while other threads keep writing to it is allowed. Each
//! word is read atomically, so the frame never contains a torn word, but
//! different words may reflect different moments.
//!
//! # Examples
//!
//! ```
//! use fastbloom::BloomFilter;
//!
//! let filter = BloomFilter::new(1_000, 0.01).unwrap();
//! filter.add("hello");
//!
//! let bytes = filter.encode();
//! let restored = BloomFilter::decode(&bytes).unwrap();
//! assert!(restored.test("hello"));
//!
//! assert!(BloomFilter::decode(b"foo").is_err());
//! ```

pub mod envelope;

#[cfg(feature = "serde")]
pub mod serde_support;

pub use envelope::FilterEnvelope;

/// Magic bytes identifying an envelope.
pub const MAGIC: &[u8; 4] = b"FBLM";

/// Current envelope version.
pub const VERSION: u8 = 1;

/// Envelope header size in bytes.
pub const HEADER_SIZE: usize = 18;

/// Errors produced while decoding raw frames or envelopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Zero-length input.
    #[error("empty frame")]
    Empty,

    /// Input shorter than the layout requires.
    #[error("truncated frame: expected at least {expected} bytes, got {actual}")]
    TruncatedFrame {
        /// Minimum number of bytes the layout requires.
        expected: usize,
        /// Number of bytes provided.
        actual: usize,
    },

    /// Raw frame length is not a whole number of words.
    #[error("frame length {len} is not a multiple of the {word_bytes}-byte word size")]
    MisalignedFrame {
        /// Length of the rejected frame.
        len: usize,
        /// Word width of the target storage.
        word_bytes: usize,
    },

    /// Envelope does not start with `FBLM`.
    #[error("invalid magic bytes (expected 'FBLM')")]
    InvalidMagic,

    /// Envelope version this build does not understand.
    #[error("unsupported envelope version: {0} (expected {})", VERSION)]
    UnsupportedVersion(u8),

    /// Storage tag outside the known set.
    #[error("unknown storage tag: {0}")]
    UnknownStorage(u8),

    /// Envelope declares `m = 0` or an `m` this platform cannot address.
    #[error("invalid filter size: {0}")]
    InvalidSize(u64),

    /// Envelope declares `k = 0`.
    #[error("invalid hash count: {0}")]
    InvalidHashCount(u32),

    /// Storage type cannot hold frames of the tagged strategy.
    #[error("storage mismatch: frame is tag {actual}, storage expects tag {expected}")]
    StorageMismatch {
        /// Tag of the decoding storage.
        expected: u8,
        /// Tag the frame was written with.
        actual: u8,
    },

    /// Payload longer than `(m, storage)` allows.
    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingBytes {
        /// Exact number of bytes the layout requires.
        expected: usize,
        /// Number of bytes provided.
        actual: usize,
    },
}

/// Split `bytes` into `word_bytes`-sized chunks, rejecting empty or ragged input.
pub(crate) fn check_frame(bytes: &[u8], word_bytes: usize) -> Result<usize, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::Empty);
    }
    if bytes.len() % word_bytes != 0 {
        return Err(FrameError::MisalignedFrame {
            len: bytes.len(),
            word_bytes,
        });
    }
    Ok(bytes.len() / word_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_frame_counts_words() {
        assert_eq!(check_frame(&[0u8; 16], 4), Ok(4));
        assert_eq!(check_frame(&[0u8; 16], 8), Ok(2));
        assert_eq!(check_frame(&[0u8; 3], 1), Ok(3));
    }

    #[test]
    fn test_check_frame_rejects_empty() {
        assert_eq!(check_frame(&[], 4), Err(FrameError::Empty));
        assert_eq!(check_frame(&[], 1), Err(FrameError::Empty));
    }

    #[test]
    fn test_check_frame_rejects_ragged_length() {
        assert_eq!(
            check_frame(b"foo", 4),
            Err(FrameError::MisalignedFrame {
                len: 3,
                word_bytes: 4
            })
        );
    }

    #[test]
    fn test_frame_error_messages() {
        assert_eq!(
            FrameError::UnsupportedVersion(9).to_string(),
            "unsupported envelope version: 9 (expected 1)"
        );
        assert!(FrameError::InvalidMagic.to_string().contains("FBLM"));
    }
}
