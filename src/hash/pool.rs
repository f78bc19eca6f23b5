//! Pooled hash accumulators.
//!
//! Every `add` and `test` needs a hash accumulator. Creating one per call is
//! cheap for FNV but not for buffered hashers, and a single shared accumulator
//! would need a lock held for the whole hash. [`HasherPool`] keeps a small
//! stack of idle accumulators instead:
//!
//! - [`acquire`](HasherPool::acquire) pops an idle accumulator, or clones the
//!   prototype if none is idle or another thread holds the stack
//! - the returned [`PooledHasher`] guard resets the accumulator on checkout and
//!   again on drop, then pushes it back if the stack has room
//!
//! The stack is only ever touched with `try_lock`, so hashing never blocks on
//! another thread. Under contention the pool degrades to one clone per call.
//!
//! # Examples
//!
//! ```
//! use fastbloom::hash::{Fnv64, Hasher64, HasherPool};
//!
//! let pool = HasherPool::new(Fnv64::new());
//!
//! {
//!     let mut hasher = pool.acquire();
//!     hasher.write(b"a");
//!     assert_eq!(hasher.sum64(), 0xaf63_bd4c_8601_b7be);
//! } // reset and returned here
//!
//! assert_eq!(pool.idle(), 1);
//! assert_eq!(pool.hash_pair(b"a"), (0xaf63_bd4c, 0x8601_b7be));
//! ```

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

use crate::hash::hasher::{split_digest, Hasher64};

/// Idle accumulators kept per pool unless configured otherwise.
pub const DEFAULT_MAX_IDLE: usize = 64;

/// Stack of reusable hash accumulators.
pub struct HasherPool<H: Hasher64> {
    prototype: H,
    idle: Mutex<Vec<H>>,
    max_idle: usize,
}

impl<H: Hasher64> HasherPool<H> {
    /// Create a pool that clones `prototype` on demand.
    #[must_use]
    pub fn new(prototype: H) -> Self {
        Self::with_max_idle(prototype, DEFAULT_MAX_IDLE)
    }

    /// Create a pool retaining at most `max_idle` accumulators.
    #[must_use]
    pub fn with_max_idle(mut prototype: H, max_idle: usize) -> Self {
        prototype.reset();
        Self {
            prototype,
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Check out an accumulator in its initial state.
    #[inline]
    pub fn acquire(&self) -> PooledHasher<'_, H> {
        let mut hasher = self
            .idle
            .try_lock()
            .and_then(|mut idle| idle.pop())
            .unwrap_or_else(|| self.prototype.clone());
        hasher.reset();
        PooledHasher {
            pool: self,
            hasher: Some(hasher),
        }
    }

    /// Hash `key` and split the digest into `(upper, lower)` halves.
    #[inline]
    pub fn hash_pair(&self, key: &[u8]) -> (u32, u32) {
        let mut hasher = self.acquire();
        hasher.write(key);
        split_digest(hasher.sum64())
    }

    /// Accumulators currently idle in the pool.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    /// Accumulator every checkout starts from.
    #[must_use]
    pub fn prototype(&self) -> &H {
        &self.prototype
    }

    #[inline]
    fn release(&self, mut hasher: H) {
        hasher.reset();
        if let Some(mut idle) = self.idle.try_lock() {
            if idle.len() < self.max_idle {
                idle.push(hasher);
            }
        }
    }
}

impl<H: Hasher64 + Default> Default for HasherPool<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<H: Hasher64> fmt::Debug for HasherPool<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasherPool")
            .field("hasher", &self.prototype.name())
            .field("max_idle", &self.max_idle)
            .finish_non_exhaustive()
    }
}

/// Scoped checkout from a [`HasherPool`].
///
/// Dereferences to the accumulator. Dropping the guard resets the
/// accumulator and hands it back, on every exit path including unwinding.
pub struct PooledHasher<'a, H: Hasher64> {
    pool: &'a HasherPool<H>,
    hasher: Option<H>,
}

impl<H: Hasher64> Deref for PooledHasher<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        // Only `drop` takes the hasher out.
        self.hasher.as_ref().unwrap_or(&self.pool.prototype)
    }
}

impl<H: Hasher64> DerefMut for PooledHasher<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        let pool = self.pool;
        self.hasher.get_or_insert_with(|| pool.prototype.clone())
    }
}

impl<H: Hasher64> Drop for PooledHasher<'_, H> {
    fn drop(&mut self) {
        if let Some(hasher) = self.hasher.take() {
            self.pool.release(hasher);
        }
    }
}
