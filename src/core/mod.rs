//! Core building blocks shared by both filter flavors.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── params.rs   - Sizing policy (optimal m and k)
//! ├── storage.rs  - BitStorage trait, StorageStrategy, runtime Buckets
//! ├── atomic.rs   - Lock-free 32/64-bit word storage
//! ├── locked.rs   - Reader-writer locked byte storage
//! ├── filter.rs   - SharedBloomFilter trait
//! └── mod.rs      - This file
//! ```
//!
//! # Design Principles
//!
//! 1. **Grow-only bits**: storage can set bits but never clear them
//! 2. **Shared references**: every operation takes `&self`
//! 3. **Storage chosen once**: strategy is fixed at construction and recorded in encodings

pub mod atomic;
pub mod filter;
pub mod locked;
pub mod params;
pub mod storage;

pub use atomic::{AtomicBuckets, AtomicWord, Buckets32, Buckets64};
pub use filter::SharedBloomFilter;
pub use locked::MutexBuckets;
pub use params::{
    expected_fp_rate, optimal_k, optimal_m, optimal_params, validate_fp_rate, validate_params,
    FILL_RATIO, MIN_FILTER_SIZE,
};
pub use storage::{BitStorage, Buckets, StorageStrategy};
