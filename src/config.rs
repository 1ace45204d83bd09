// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::core::ThreadCount;

/// Number of elements of each vector in a default run.
pub const DEFAULT_LEN: usize = 50_000_000;

/// Explicit chunk sizes exercised in a default run, for each policy.
pub const DEFAULT_CHUNK_SIZES: &[i64] = &[100, 10_000];

/// Parameters of a benchmark run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of elements of each vector.
    pub len: usize,
    /// Explicit chunk sizes to exercise. Non-positive sizes fall back to the
    /// default granularity.
    pub chunk_sizes: Vec<i64>,
    /// Number of worker threads.
    pub num_threads: ThreadCount,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            len: DEFAULT_LEN,
            chunk_sizes: DEFAULT_CHUNK_SIZES.to_vec(),
            num_threads: ThreadCount::AvailableParallelism,
        }
    }
}
