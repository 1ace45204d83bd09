// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Jobs executed by the worker threads during a parallel region.

use super::partition::Partition;
use super::util::LifetimeParameterized;
use std::marker::PhantomData;

/// A job is run once by every worker of the pool in a region.
pub trait Job {
    /// Runs the share of this job that belongs to the given worker.
    fn run(&self, worker_id: usize);
}

/// Stand-in for `dyn Job + Sync + 'a` with an arbitrary `'a`, via
/// [`LifetimeParameterized`].
pub struct DynLifetimeSyncJob;

impl LifetimeParameterized for DynLifetimeSyncJob {
    type T<'a> = dyn Job + Sync + 'a;
}

/// Applies `body` to the chunks of `output` that the partition assigns to
/// each worker. The body receives the offset of the chunk within `output`.
pub struct ChunkJob<'data, P: Partition, T, F: Fn(usize, &mut [T])> {
    pub partition: P,
    pub output: SharedMutSlice<'data, T>,
    pub body: F,
}

impl<P, T, F> Job for ChunkJob<'_, P, T, F>
where
    P: Partition,
    T: Send,
    F: Fn(usize, &mut [T]),
{
    fn run(&self, worker_id: usize) {
        for range in self.partition.chunks(worker_id) {
            let start = range.start;
            // SAFETY: The safety contract of `Partition` guarantees that the chunks
            // handed out in this region are in bounds and pairwise disjoint, and each
            // chunk reference is dropped at the end of this iteration.
            let chunk = unsafe { self.output.chunk_mut(range) };
            (self.body)(start, chunk);
        }
    }
}

/// A mutable slice that can be split into disjoint chunks from several
/// threads at once.
pub struct SharedMutSlice<'data, T> {
    ptr: *mut T,
    len: usize,
    _phantom: PhantomData<&'data mut [T]>,
}

impl<'data, T> SharedMutSlice<'data, T> {
    /// Takes exclusive ownership of the slice for `'data`.
    pub fn new(slice: &'data mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _phantom: PhantomData,
        }
    }

    /// Returns the sub-slice at the given range.
    ///
    /// # Safety
    ///
    /// The range must not overlap any other range for which a returned
    /// reference is still alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn chunk_mut(&self, range: std::ops::Range<usize>) -> &mut [T] {
        assert!(range.start <= range.end && range.end <= self.len);
        // SAFETY:
        // - The pointer is derived from a well-formed slice of length `self.len`, and
        //   the assertion keeps `range` within it, so the offset stays in bounds of
        //   the same allocation.
        // - The resulting slice is properly aligned and initialized, being part of
        //   the original slice.
        // - No other reference aliases this sub-slice: the original slice is
        //   exclusively borrowed for `'data`, and the caller guarantees that live
        //   chunks don't overlap.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.add(range.start), range.end - range.start)
        }
    }
}

/// SAFETY:
///
/// A [`SharedMutSlice`] is shared among workers to send disjoint
/// [`&mut [T]`](slice) chunks to other threads. Therefore it is [`Sync`] if and
/// only if [`&mut [T]`](slice) is [`Send`], which is when `T` is [`Send`].
unsafe impl<T: Send> Sync for SharedMutSlice<'_, T> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::partition::BlockPartition;

    #[test]
    fn test_chunk_job_writes_offsets() {
        let mut output = vec![0usize; 10];
        let job = ChunkJob {
            partition: BlockPartition::new(3, 10),
            output: SharedMutSlice::new(&mut output),
            body: |start: usize, chunk: &mut [usize]| {
                for (i, x) in chunk.iter_mut().enumerate() {
                    *x = start + i;
                }
            },
        };
        for worker_id in 0..3 {
            job.run(worker_id);
        }
        drop(job);
        assert_eq!(output, (0..10).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_chunk_out_of_bounds() {
        let mut output = [0.0f32; 4];
        let shared = SharedMutSlice::new(&mut output);
        unsafe {
            shared.chunk_mut(2..5);
        }
    }
}
