//! Serde support for both filter flavors.
//!
//! Filters serialize to a small record rather than the binary envelope, so
//! they can be embedded in any serde format (JSON, bincode, ...). The bit
//! array itself is the same big-endian frame [`encode_frame`] produces.
//!
//! # Format
//!
//! - format version
//! - `m`, `k` and the storage strategy
//! - hasher name, checked on the way back in
//! - hasher seed, restored on the way back in
//! - raw frame bytes
//!
//! Deserializing with a different hasher type than the one that populated
//! the filter fails, since every lookup would otherwise miss. Seeded hashers
//! get their seed back; a nonzero seed cannot be read by an unseeded hasher.
//!
//! # Examples
//!
//! ```
//! use fastbloom::BloomFilter;
//!
//! let filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.add("hello").add("world");
//!
//! let json = serde_json::to_string(&filter).unwrap();
//! let restored: BloomFilter = serde_json::from_str(&json).unwrap();
//! assert!(restored.test("hello"));
//! assert!(restored.test("world"));
//! ```
//!
//! [`encode_frame`]: crate::BloomFilter::encode_frame

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::storage::{BitStorage, StorageStrategy};
use crate::filters::{BloomFilter, MutexBloomFilter};
use crate::hash::Hasher64;

/// Serialization format version.
const FORMAT_VERSION: u16 = 1;

/// Serializable snapshot of a filter.
#[derive(Serialize, Deserialize)]
struct FilterSnapshot {
    version: u16,
    m: usize,
    k: usize,
    storage: StorageStrategy,
    hasher: String,
    #[serde(default)]
    seed: u64,
    #[serde(with = "frame_bytes")]
    bits: Vec<u8>,
}

impl FilterSnapshot {
    fn into_filter<S, H, E>(self) -> Result<BloomFilter<S, H>, E>
    where
        S: BitStorage,
        H: Hasher64 + Default,
        E: de::Error,
    {
        if self.version != FORMAT_VERSION {
            return Err(E::custom(format!(
                "unsupported filter format version {}, expected {}",
                self.version, FORMAT_VERSION
            )));
        }

        let mut hasher = H::default();
        if self.hasher != hasher.name() {
            return Err(E::custom(format!(
                "filter was populated with '{}' but is being read with '{}'",
                self.hasher,
                hasher.name()
            )));
        }
        if !hasher.set_seed(self.seed) {
            return Err(E::custom(format!(
                "hasher '{}' cannot take seed {}",
                self.hasher, self.seed
            )));
        }

        BloomFilter::from_frame(&self.bits, self.m, self.k, self.storage, hasher)
            .map_err(E::custom)
    }
}

/// Frames go through `serialize_bytes` so binary formats store them compactly.
mod frame_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bits: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bits)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Vec::<u8>::deserialize(deserializer)
    }
}

impl<S: BitStorage, H: Hasher64> Serialize for BloomFilter<S, H> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        FilterSnapshot {
            version: FORMAT_VERSION,
            m: self.capacity(),
            k: self.num_hash_functions(),
            storage: self.storage_strategy(),
            hasher: self.hasher_name().to_string(),
            seed: self.hasher_seed(),
            bits: self.encode_frame(),
        }
        .serialize(serializer)
    }
}

impl<'de, S: BitStorage, H: Hasher64 + Default> Deserialize<'de> for BloomFilter<S, H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FilterSnapshot::deserialize(deserializer)?.into_filter()
    }
}

impl<S: BitStorage, H: Hasher64> Serialize for MutexBloomFilter<S, H> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        FilterSnapshot {
            version: FORMAT_VERSION,
            m: self.capacity(),
            k: self.num_hash_functions(),
            storage: self.storage_strategy(),
            hasher: self.hasher_name().to_string(),
            seed: self.hasher_seed(),
            bits: self.encode_frame(),
        }
        .serialize(serializer)
    }
}

impl<'de, S: BitStorage, H: Hasher64 + Default> Deserialize<'de> for MutexBloomFilter<S, H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        FilterSnapshot::deserialize(deserializer)?
            .into_filter::<S, H, D::Error>()
            .map(Self::from)
    }
}
