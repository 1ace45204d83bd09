// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Low-level helpers shared by the region synchronization code.

use std::ptr::NonNull;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A value guarded by a [`Mutex`], paired with a [`Condvar`] to wait for
/// changes to it.
pub struct Signal<T> {
    value: Mutex<T>,
    changed: Condvar,
}

impl<T> Signal<T> {
    /// Creates a new signal holding the given value.
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Condvar::new(),
        }
    }

    /// Replaces the value and wakes up all the waiting threads.
    pub fn broadcast(&self, value: T) {
        *self.value.lock().unwrap() = value;
        self.changed.notify_all();
    }

    /// Replaces the value and wakes up one waiting thread.
    ///
    /// Fails if the [`Mutex`] is poisoned.
    pub fn try_wake_one(&self, value: T) -> Result<(), PoisonError<MutexGuard<'_, T>>> {
        *self.value.lock()? = value;
        self.changed.notify_one();
        Ok(())
    }

    /// Blocks while the predicate holds, then returns the locked value.
    pub fn wait_while(&self, predicate: impl FnMut(&mut T) -> bool) -> MutexGuard<'_, T> {
        self.changed
            .wait_while(self.value.lock().unwrap(), predicate)
            .unwrap()
    }
}

/// A proxy for types that carry a lifetime parameter.
///
/// Rust doesn't have higher-kinded types, so a generic associated type stands
/// in for "`T<'a>` for any `'a`".
pub trait LifetimeParameterized {
    type T<'a>: ?Sized;
}

/// A reference whose lifetime has been erased, so that the main thread can
/// publish a job borrowed from its stack to long-lived worker threads.
///
/// The main thread is responsible for clearing the reference before the
/// referent goes out of scope.
pub struct ErasedRef<T: LifetimeParameterized> {
    ptr: Option<NonNull<T::T<'static>>>,
}

impl<T: LifetimeParameterized> ErasedRef<T> {
    /// Creates an empty reference.
    pub fn empty() -> Self {
        Self { ptr: None }
    }

    /// Publishes the given reference. It must stay valid until the next call
    /// to [`clear()`](Self::clear) or [`set()`](Self::set).
    // The cast is necessary because the lifetime is coerced to 'static.
    #[allow(clippy::unnecessary_cast)]
    pub fn set(&mut self, value: &T::T<'_>) {
        self.ptr = NonNull::new(NonNull::from(value).as_ptr() as *mut T::T<'static>);
    }

    /// Withdraws the published reference.
    pub fn clear(&mut self) {
        self.ptr = None;
    }

    /// Returns the published reference, if any.
    ///
    /// # Safety
    ///
    /// The referent must remain valid and unmutated for the whole output
    /// lifetime `'a`.
    // The cast is necessary because the lifetime is coerced to 'a.
    #[allow(clippy::unnecessary_cast)]
    pub unsafe fn get<'a>(&self) -> Option<&'a T::T<'a>> {
        self.ptr.map(|static_ptr| {
            let ptr = static_ptr.as_ptr() as *mut T::T<'a>;
            // SAFETY:
            // - The pointer was obtained from a valid reference in `set()`.
            // - The caller guarantees that the referent outlives `'a` and isn't mutated
            //   during `'a`.
            unsafe { &*ptr }
        })
    }
}

/// SAFETY:
///
/// An [`ErasedRef`] behaves like a `&'a T<'a>`, which is [`Send`] if and only
/// if `T<'a>` is [`Sync`].
unsafe impl<T: LifetimeParameterized> Send for ErasedRef<T> where for<'a> T::T<'a>: Sync {}
/// SAFETY:
///
/// An [`ErasedRef`] behaves like a `&'a T<'a>`, which is [`Sync`] if and only
/// if `T<'a>` is [`Sync`].
unsafe impl<T: LifetimeParameterized> Sync for ErasedRef<T> where for<'a> T::T<'a>: Sync {}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Barrier, RwLock};

    /// Stand-in for `[f32]`, which can't implement the trait itself as it
    /// isn't `Sized`.
    struct F32Slice;

    impl LifetimeParameterized for F32Slice {
        type T<'a> = [f32];
    }

    #[test]
    fn test_erased_ref_follows_set_and_clear() {
        let mut erased = ErasedRef::<F32Slice>::empty();
        assert!(unsafe { erased.get() }.is_none());

        let first = [1.5f32, 3.0];
        erased.set(&first);
        assert_eq!(unsafe { erased.get().unwrap() }, &[1.5, 3.0]);

        let second = [3.7f32];
        erased.set(&second);
        assert_eq!(unsafe { erased.get().unwrap() }, &[3.7]);

        erased.clear();
        assert!(unsafe { erased.get() }.is_none());
    }

    #[test]
    fn test_erased_ref_shared_with_threads() {
        const NUM_THREADS: usize = 3;

        let erased = Arc::new(RwLock::new(ErasedRef::<F32Slice>::empty()));
        let published = Arc::new(Barrier::new(NUM_THREADS + 1));
        let consumed = Arc::new(Barrier::new(NUM_THREADS + 1));

        let readers: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                let erased = erased.clone();
                let published = published.clone();
                let consumed = consumed.clone();
                std::thread::spawn(move || {
                    published.wait();
                    let guard = erased.read().unwrap();
                    let sum: f32 = unsafe { guard.get().unwrap() }.iter().sum();
                    drop(guard);
                    consumed.wait();
                    sum
                })
            })
            .collect();

        let values = [1.0f32, 2.0, 3.0];
        erased.write().unwrap().set(&values);
        published.wait();
        consumed.wait();
        erased.write().unwrap().clear();

        for reader in readers {
            assert_eq!(reader.join().unwrap(), 6.0);
        }
    }

    #[test]
    fn test_signal_wakes_waiter() {
        let signal = Arc::new(Signal::new(0u32));
        let waiter = std::thread::spawn({
            let signal = signal.clone();
            move || *signal.wait_while(|value| *value < 2)
        });

        signal.broadcast(1);
        signal.try_wake_one(2).unwrap();
        assert_eq!(waiter.join().unwrap(), 2);
    }
}
