// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Fatal conditions that abort a benchmark run.
///
/// None of these are recovered from: a run either completes and produces a
/// full report, or stops with one of these errors and reports nothing.
#[derive(Error, Debug)]
pub enum Error {
    /// A workload-sized vector couldn't be allocated.
    #[error("failed to allocate vector '{what}' of {len} elements")]
    Allocation {
        /// Name of the vector.
        what: &'static str,
        /// Requested number of elements.
        len: usize,
        /// Underlying allocation failure.
        #[source]
        source: TryReserveError,
    },

    /// The number of worker threads couldn't be determined.
    #[error("failed to query the available parallelism")]
    AvailableParallelism(#[source] io::Error),

    /// A worker thread couldn't be spawned.
    #[error("failed to spawn worker thread #{id}")]
    Spawn {
        /// Index of the worker.
        id: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Some worker threads panicked while running a parallel region.
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked {
        /// Number of workers that panicked.
        count: usize,
    },

    /// The output and input vectors don't have the same length.
    #[error("length mismatch: output has {output} elements, inputs have {left} and {right}")]
    LengthMismatch {
        /// Length of the output.
        output: usize,
        /// Length of the left input.
        left: usize,
        /// Length of the right input.
        right: usize,
    },
}
