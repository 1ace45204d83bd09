// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fork-join synchronization between the main thread and the workers.
//!
//! The main thread publishes a job with [`RegionHost::run_region()`], which
//! blocks until every [`RegionGuest`] has run it. This is the implicit barrier
//! at the end of each parallel region.

use super::util::{ErasedRef, LifetimeParameterized, Signal};
use crate::macros::{log_debug, log_error};
use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// What a worker should do after returning from
/// [`RegionGuest::participate()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Wait for the next region.
    Ready,
    /// The pool is shutting down.
    Finished,
}

/// Parity of the current region. Consecutive regions alternate, so that a
/// worker never runs the same region twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Parity {
    Even,
    Odd,
}

impl Parity {
    fn flip(&mut self) {
        *self = match self {
            Parity::Even => Parity::Odd,
            Parity::Odd => Parity::Even,
        }
    }
}

/// Instruction broadcast to the workers.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Command {
    Run(Parity),
    Exit,
}

/// Whether the main thread is blocked on the current region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HostStatus {
    Joining,
    Joined,
}

/// State shared by the host and all the guests.
struct Shared<T: LifetimeParameterized> {
    /// Workers that haven't finished the current region yet.
    pending: CachePadded<AtomicUsize>,
    /// Workers that panicked during the current region.
    panicked: CachePadded<AtomicUsize>,
    command: Signal<Command>,
    host_status: Signal<HostStatus>,
    job: RwLock<ErasedRef<T>>,
}

/// Creates a [`RegionHost`] and `num_workers` matching [`RegionGuest`]s.
pub fn make_region_group<T: LifetimeParameterized>(
    num_workers: usize,
) -> (RegionHost<T>, Vec<RegionGuest<T>>) {
    let parity = Parity::Even;
    let shared = Arc::new(Shared {
        pending: CachePadded::new(AtomicUsize::new(0)),
        panicked: CachePadded::new(AtomicUsize::new(0)),
        command: Signal::new(Command::Run(parity)),
        host_status: Signal::new(HostStatus::Joining),
        job: RwLock::new(ErasedRef::empty()),
    });

    let guests = (0..num_workers)
        .map(|_id| RegionGuest {
            #[cfg(feature = "log")]
            id: _id,
            parity,
            shared: shared.clone(),
        })
        .collect();

    let host = RegionHost {
        num_workers,
        parity,
        shared,
    };

    (host, guests)
}

/// Main-thread side of a region group.
pub struct RegionHost<T: LifetimeParameterized> {
    num_workers: usize,
    parity: Parity,
    shared: Arc<Shared<T>>,
}

impl<T: LifetimeParameterized> RegionHost<T> {
    /// Runs `job` on every worker and waits for all of them to be done.
    ///
    /// Returns the number of workers that panicked, if any did.
    pub fn run_region(&mut self, job: &T::T<'_>) -> Result<(), usize> {
        self.shared
            .pending
            .store(self.num_workers, Ordering::SeqCst);
        self.shared.panicked.store(0, Ordering::SeqCst);

        self.parity.flip();
        let parity = self.parity;

        // The job reference stays valid until `clear()` below, which happens after
        // every worker has reported completion through `host_status`.
        self.shared.job.write().unwrap().set(job);
        log_debug!("[main thread, {parity:?}] Starting a parallel region.");

        self.shared.command.broadcast(Command::Run(parity));

        let mut status = self
            .shared
            .host_status
            .wait_while(|status| *status == HostStatus::Joining);
        assert_eq!(*status, HostStatus::Joined);
        *status = HostStatus::Joining;
        drop(status);

        self.shared.job.write().unwrap().clear();
        log_debug!("[main thread, {parity:?}] All workers joined.");

        match self.shared.panicked.load(Ordering::SeqCst) {
            0 => Ok(()),
            count => {
                log_error!("[main thread, {parity:?}] {count} worker(s) panicked!");
                Err(count)
            }
        }
    }

    /// Tells the workers to exit once they are idle.
    pub fn shutdown(&mut self) {
        log_debug!("[main thread] Asking workers to exit.");
        self.shared.command.broadcast(Command::Exit);
    }
}

/// Worker side of a region group.
pub struct RegionGuest<T: LifetimeParameterized> {
    #[cfg(feature = "log")]
    id: usize,
    parity: Parity,
    shared: Arc<Shared<T>>,
}

impl<T: LifetimeParameterized> RegionGuest<T> {
    /// Waits for the next region and runs `f` on its job.
    ///
    /// Returns [`WorkerState::Finished`] without calling `f` if the host shut
    /// down the group.
    pub fn participate(&mut self, f: impl FnOnce(&T::T<'_>)) -> WorkerState {
        self.parity.flip();
        let parity = self.parity;

        log_debug!("[worker {}, {parity:?}] Waiting for a region.", self.id);
        let command: Command = *self.shared.command.wait_while(|command| match command {
            Command::Exit => false,
            Command::Run(p) => *p != parity,
        });

        match command {
            Command::Exit => {
                log_debug!("[worker {}, {parity:?}] Exiting.", self.id);
                WorkerState::Finished
            }
            Command::Run(p) => {
                assert_eq!(p, parity);

                // Reports completion when dropped, including while unwinding from a
                // panic in `f`.
                let _completion = Completion {
                    #[cfg(feature = "log")]
                    id: self.id,
                    shared: &self.shared,
                };

                let guard = self.shared.job.read().unwrap();
                // SAFETY:
                // - The host keeps the job alive until all `Completion`s are dropped.
                // - Workers only get shared references, so the job isn't mutated.
                let job = unsafe { guard.get().unwrap() };
                f(job);
                drop(guard);

                WorkerState::Ready
            }
        }
    }
}

/// Decrements the pending count on drop, and wakes the host when the last
/// worker of a region is done.
struct Completion<'a, T: LifetimeParameterized> {
    #[cfg(feature = "log")]
    id: usize,
    shared: &'a Shared<T>,
}

impl<T: LifetimeParameterized> Drop for Completion<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log_error!("[worker {}] Panicked during a region.", self.id);
            self.shared.panicked.fetch_add(1, Ordering::SeqCst);
        }

        let pending = self.shared.pending.fetch_sub(1, Ordering::SeqCst);
        assert!(pending > 0);

        if pending == 1 {
            log_debug!("[worker {}] Last one done, waking the host.", self.id);
            if let Err(e) = self.shared.host_status.try_wake_one(HostStatus::Joined) {
                log_error!("[worker {}] Host status mutex poisoned: {e:?}", self.id);
                panic!("Failed to wake the main thread, the mutex was poisoned: {e:?}");
            }
        }
    }
}
