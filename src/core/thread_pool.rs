// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A fork-join thread pool that runs loops under a chosen [`Schedule`].

use super::job::{ChunkJob, DynLifetimeSyncJob, Job, SharedMutSlice};
use super::partition::{BlockPartition, CursorPartition, Partition, RoundRobinPartition, Schedule};
use super::sync::{make_region_group, RegionGuest, RegionHost, WorkerState};
use crate::error::Error;
use crate::macros::{log_debug, log_error};
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::JoinHandle;

/// Number of threads to spawn in a thread pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadCount {
    /// Spawn the number of threads returned by
    /// [`std::thread::available_parallelism()`].
    AvailableParallelism,
    /// Spawn the given number of threads.
    Count(NonZeroUsize),
}

impl ThreadCount {
    /// Resolves the number of threads to spawn.
    pub fn count(self) -> Result<NonZeroUsize, Error> {
        match self {
            ThreadCount::AvailableParallelism => {
                std::thread::available_parallelism().map_err(Error::AvailableParallelism)
            }
            ThreadCount::Count(count) => Ok(count),
        }
    }
}

impl TryFrom<usize> for ThreadCount {
    type Error = <NonZeroUsize as TryFrom<usize>>::Error;

    fn try_from(thread_count: usize) -> Result<Self, Self::Error> {
        let count = NonZeroUsize::try_from(thread_count)?;
        Ok(ThreadCount::Count(count))
    }
}

/// A builder for [`ThreadPool`].
pub struct ThreadPoolBuilder {
    /// Number of worker threads to spawn in the pool.
    pub num_threads: ThreadCount,
}

impl ThreadPoolBuilder {
    /// Spawns a thread pool.
    ///
    /// ```
    /// # use loopsched::{Schedule, ThreadCount, ThreadPoolBuilder};
    /// # use std::num::NonZeroUsize;
    /// let mut thread_pool = ThreadPoolBuilder {
    ///     num_threads: ThreadCount::try_from(4).unwrap(),
    /// }
    /// .build()
    /// .unwrap();
    ///
    /// let mut squares = vec![0; 10];
    /// thread_pool
    ///     .for_each_chunk_mut(
    ///         Schedule::Dynamic(NonZeroUsize::new(3).unwrap()),
    ///         &mut squares,
    ///         |start, chunk| {
    ///             for (i, x) in chunk.iter_mut().enumerate() {
    ///                 *x = (start + i) * (start + i);
    ///             }
    ///         },
    ///     )
    ///     .unwrap();
    /// assert_eq!(squares, [0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    /// ```
    pub fn build(&self) -> Result<ThreadPool, Error> {
        ThreadPool::new(self.num_threads.count()?)
    }
}

/// A pool of worker threads executing fork-join parallel regions.
///
/// The workers are spawned once and reused by every region. Dropping the
/// pool joins them.
pub struct ThreadPool {
    /// Number of worker threads.
    num_threads: NonZeroUsize,
    /// Handles to all the worker threads in the pool.
    threads: Vec<JoinHandle<()>>,
    /// Main-thread side of the region synchronization.
    host: RegionHost<DynLifetimeSyncJob>,
}

impl ThreadPool {
    fn new(count: NonZeroUsize) -> Result<Self, Error> {
        let num_threads = count.get();
        let (host, guests) = make_region_group(num_threads);

        let mut pool = Self {
            num_threads: count,
            threads: Vec::with_capacity(num_threads),
            host,
        };
        for (id, guest) in guests.into_iter().enumerate() {
            let context = WorkerContext { id, guest };
            // On error, dropping `pool` shuts down the workers spawned so far.
            let handle = std::thread::Builder::new()
                .name(format!("loopsched-worker-{id}"))
                .spawn(move || context.run())
                .map_err(|source| Error::Spawn { id, source })?;
            pool.threads.push(handle);
        }
        log_debug!("[main thread] Spawned {num_threads} threads");

        Ok(pool)
    }

    /// Returns the number of worker threads in this pool.
    pub fn num_threads(&self) -> NonZeroUsize {
        self.num_threads
    }

    /// Runs `body` over `output` in parallel, split according to `schedule`.
    ///
    /// Every index of `output` belongs to exactly one chunk, and every chunk
    /// is passed exactly once to `body` along with its offset in `output`.
    /// This returns once all chunks have been processed.
    pub fn for_each_chunk_mut<T: Send>(
        &mut self,
        schedule: Schedule,
        output: &mut [T],
        body: impl Fn(usize, &mut [T]) + Sync,
    ) -> Result<(), Error> {
        let num_threads = self.num_threads.get();
        let num_elements = output.len();
        match schedule {
            Schedule::StaticBlocks => {
                self.fork_join(BlockPartition::new(num_threads, num_elements), output, body)
            }
            Schedule::StaticChunks(chunk_size) => self.fork_join(
                RoundRobinPartition::new(num_threads, num_elements, chunk_size),
                output,
                body,
            ),
            Schedule::Dynamic(chunk_size) => self.fork_join(
                CursorPartition::new(
                    #[cfg(feature = "log_parallelism")]
                    num_threads,
                    num_elements,
                    chunk_size,
                ),
                output,
                body,
            ),
        }
    }

    fn fork_join<P: Partition, T: Send>(
        &mut self,
        partition: P,
        output: &mut [T],
        body: impl Fn(usize, &mut [T]) + Sync,
    ) -> Result<(), Error> {
        let job = ChunkJob {
            partition,
            output: SharedMutSlice::new(output),
            body,
        };
        let outcome = self.host.run_region(&job as &(dyn Job + Sync));

        #[cfg(feature = "log_parallelism")]
        job.partition.print_statistics();

        outcome.map_err(|count| Error::WorkerPanicked { count })
    }
}

impl Drop for ThreadPool {
    /// Joins all the threads in the pool.
    #[allow(clippy::unused_enumerate_index)]
    fn drop(&mut self) {
        self.host.shutdown();

        log_debug!("[main thread] Joining threads in the pool...");
        for (_i, t) in self.threads.drain(..).enumerate() {
            let result = t.join();
            match result {
                Ok(_) => log_debug!("[main thread] Thread {_i} joined with result: {result:?}"),
                Err(_) => log_error!("[main thread] Thread {_i} joined with result: {result:?}"),
            }
        }
        log_debug!("[main thread] Joined threads.");
    }
}

/// Context object owned by a worker thread.
struct WorkerContext {
    /// Thread index.
    id: usize,
    /// Worker side of the region synchronization.
    guest: RegionGuest<DynLifetimeSyncJob>,
}

impl WorkerContext {
    /// Main function run by this thread.
    fn run(mut self) {
        let id = self.id;
        loop {
            // A panicking job has already been reported to the main thread by the
            // time it unwinds here, so the worker can wait for the next region.
            let state = catch_unwind(AssertUnwindSafe(|| {
                self.guest.participate(|job| job.run(id))
            }));
            match state {
                Ok(WorkerState::Finished) => break,
                Ok(WorkerState::Ready) | Err(_) => continue,
            }
        }
    }
}
