// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Partitioning of an iteration space into chunks handed out to workers.

#[cfg(feature = "log_parallelism")]
use crate::macros::log_info;
use crossbeam_utils::CachePadded;
use std::num::NonZeroUsize;
#[cfg(feature = "log_parallelism")]
use std::sync::atomic::AtomicU64;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Policy used to split the iterations of a parallel region among workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// One contiguous block per worker, of (almost) equal size, decided before
    /// the region starts.
    StaticBlocks,
    /// Blocks of exactly the given size, dealt round-robin to the workers
    /// before the region starts.
    StaticChunks(NonZeroUsize),
    /// Blocks of exactly the given size, claimed from a shared cursor by
    /// whichever worker is idle.
    Dynamic(NonZeroUsize),
}

/// A plan that hands out chunks of `0..num_elements` to each worker.
///
/// # Safety
///
/// Implementers must guarantee that, for a partition created for
/// `num_threads` workers and `num_elements` elements, the union of the chunks
/// yielded by `chunks(0)`, ..., `chunks(num_threads - 1)` (each called once)
/// covers `0..num_elements`, that every chunk is non-empty and included in
/// `0..num_elements`, and that no two chunks overlap.
pub unsafe trait Partition: Sync {
    /// Iterator over the chunks of one worker.
    type Chunks<'a>: Iterator<Item = std::ops::Range<usize>>
    where
        Self: 'a;

    /// Returns the chunks to process on the given worker.
    fn chunks(&self, worker_id: usize) -> Self::Chunks<'_>;

    /// Hook to display scheduling statistics at the end of a region.
    #[cfg(feature = "log_parallelism")]
    fn print_statistics(&self) {}
}

/// Splits `0..num_elements` into one contiguous block per worker.
pub struct BlockPartition {
    num_threads: usize,
    num_elements: usize,
}

impl BlockPartition {
    pub fn new(num_threads: usize, num_elements: usize) -> Self {
        assert!(num_threads > 0);
        Self {
            num_threads,
            num_elements,
        }
    }

    fn block(&self, worker_id: usize) -> std::ops::Range<usize> {
        let start = (worker_id * self.num_elements) / self.num_threads;
        let end = ((worker_id + 1) * self.num_elements) / self.num_threads;
        start..end
    }
}

// Worker `t` gets `t*N/T..(t+1)*N/T`. These bounds are non-decreasing in `t`,
// start at 0 for `t = 0` and end at `N` for `t = T - 1`, so the blocks tile
// `0..N` without overlap. Empty blocks are filtered out.
unsafe impl Partition for BlockPartition {
    type Chunks<'a> = std::option::IntoIter<std::ops::Range<usize>>;

    fn chunks(&self, worker_id: usize) -> Self::Chunks<'_> {
        let block = self.block(worker_id);
        (!block.is_empty()).then_some(block).into_iter()
    }
}

/// Deals fixed-size chunks to the workers in round-robin order.
pub struct RoundRobinPartition {
    num_threads: usize,
    num_elements: usize,
    chunk_size: usize,
}

impl RoundRobinPartition {
    pub fn new(num_threads: usize, num_elements: usize, chunk_size: NonZeroUsize) -> Self {
        assert!(num_threads > 0);
        Self {
            num_threads,
            num_elements,
            // Clamping keeps `start + stride` from overflowing in the iterator.
            chunk_size: chunk_size.get().min(num_elements.max(1)),
        }
    }
}

// Chunk `k` is `k*C..min((k+1)*C, N)` and is assigned to worker `k % T`. Each
// worker walks its own chunks `t, t+T, t+2T, ...` until the start reaches `N`.
unsafe impl Partition for RoundRobinPartition {
    type Chunks<'a> = RoundRobinChunks;

    fn chunks(&self, worker_id: usize) -> RoundRobinChunks {
        RoundRobinChunks {
            next_start: worker_id.checked_mul(self.chunk_size),
            stride: self.num_threads.checked_mul(self.chunk_size),
            chunk_size: self.chunk_size,
            num_elements: self.num_elements,
        }
    }
}

/// Chunks of one worker under a [`RoundRobinPartition`].
pub struct RoundRobinChunks {
    /// Start of the next chunk, or [`None`] once past `usize::MAX`.
    next_start: Option<usize>,
    stride: Option<usize>,
    chunk_size: usize,
    num_elements: usize,
}

impl Iterator for RoundRobinChunks {
    type Item = std::ops::Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start.filter(|&start| start < self.num_elements)?;
        let end = start + self.chunk_size.min(self.num_elements - start);
        self.next_start = self.stride.and_then(|stride| start.checked_add(stride));
        Some(start..end)
    }
}

/// Lets idle workers claim the next fixed-size chunk from a shared cursor.
pub struct CursorPartition {
    num_elements: usize,
    chunk_size: usize,
    cursor: CachePadded<AtomicUsize>,
    /// Number of successful claims, per worker.
    #[cfg(feature = "log_parallelism")]
    claims: Box<[CachePadded<AtomicU64>]>,
}

impl CursorPartition {
    pub fn new(
        #[cfg(feature = "log_parallelism")] num_threads: usize,
        num_elements: usize,
        chunk_size: NonZeroUsize,
    ) -> Self {
        Self {
            num_elements,
            // The cursor overshoots `num_elements` by at most one chunk per worker,
            // so keeping chunks no larger than the input rules out overflow for
            // any realistic thread count.
            chunk_size: chunk_size.get().min(num_elements.max(1)),
            cursor: CachePadded::new(AtomicUsize::new(0)),
            #[cfg(feature = "log_parallelism")]
            claims: (0..num_threads)
                .map(|_| CachePadded::new(AtomicU64::new(0)))
                .collect(),
        }
    }
}

// Each claim is a `fetch_add(C)` on the cursor, so claims return distinct,
// increasing multiples of `C` and the claimed chunks `k..min(k+C, N)` are
// disjoint. Workers keep claiming until they observe `k >= N`, so every chunk
// below `N` is claimed by some worker before all of them stop.
unsafe impl Partition for CursorPartition {
    type Chunks<'a> = CursorChunks<'a>;

    fn chunks(&self, _worker_id: usize) -> CursorChunks<'_> {
        CursorChunks {
            partition: self,
            #[cfg(feature = "log_parallelism")]
            worker_id: _worker_id,
        }
    }

    #[cfg(feature = "log_parallelism")]
    fn print_statistics(&self) {
        log_info!(
            "Dynamic scheduling statistics (chunk size {}):",
            self.chunk_size
        );
        for (id, claims) in self.claims.iter().enumerate() {
            log_info!("- worker #{id}: {} claims", claims.load(Ordering::Relaxed));
        }
    }
}

/// Chunks of one worker under a [`CursorPartition`].
pub struct CursorChunks<'a> {
    partition: &'a CursorPartition,
    #[cfg(feature = "log_parallelism")]
    worker_id: usize,
}

impl Iterator for CursorChunks<'_> {
    type Item = std::ops::Range<usize>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let partition = self.partition;
        let start = partition
            .cursor
            .fetch_add(partition.chunk_size, Ordering::Relaxed);
        if start >= partition.num_elements {
            return None;
        }
        #[cfg(feature = "log_parallelism")]
        partition.claims[self.worker_id].fetch_add(1, Ordering::Relaxed);
        let end = start + partition.chunk_size.min(partition.num_elements - start);
        Some(start..end)
    }
}
