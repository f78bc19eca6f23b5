//! Shared data generators for the benchmarks.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Filter capacities exercised by the size sweeps.
pub const SIZES: [usize; 3] = [1_000, 100_000, 1_000_000];

/// Target false positive rates exercised by the rate sweeps.
pub const FP_RATES: [f64; 3] = [0.1, 0.01, 0.001];

/// Random alphanumeric string of `len` bytes.
#[inline]
pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `count` independent random strings.
pub fn generate_strings(count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| random_string(len)).collect()
}

/// Predictable keys: "item_00000000", "item_00000001", ...
pub fn generate_sequential_strings(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("item_{:08}", i)).collect()
}
