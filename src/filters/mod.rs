//! Bloom filter flavors.
//!
//! Both flavors share one membership kernel (hash, then walk a
//! [`ProbeSequence`] over a [`BitStorage`](crate::core::storage::BitStorage))
//! and differ only in how the `k` bit operations of a call are synchronized.
//!
//! # Choosing a Flavor
//!
//! | Filter | `add` / `test` | `test_and_add` | Contention |
//! |---|---|---|---|
//! | [`BloomFilter`] | lock-free, per-bit atomic | per-bit atomic, may race on the same key | scales with cores |
//! | [`MutexBloomFilter`] | shared / exclusive lock | atomic as a whole | writers serialize |
//!
//! Either flavor can sit on any storage strategy. The mutex flavor over
//! lock-free storage is the common choice when exactly-once `test_and_add`
//! matters; lock-free over `MutexBytes` mostly exists for comparison.
//!
//! # Examples
//!
//! ```
//! use fastbloom::filters::{BloomFilter, MutexBloomFilter};
//!
//! let fast = BloomFilter::new(10_000, 0.01).unwrap();
//! let strict = MutexBloomFilter::new(10_000, 0.01).unwrap();
//!
//! fast.add("hello");
//! strict.add("hello");
//! assert!(fast.test("hello") && strict.test("hello"));
//! ```

pub mod lockfree;
pub mod mutex;
pub mod probe;

pub use lockfree::BloomFilter;
pub use mutex::MutexBloomFilter;
pub use probe::ProbeSequence;
