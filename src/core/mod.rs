// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parallel execution engine: thread pool, partitioning of the iteration
//! space and fork-join synchronization.

mod job;
mod partition;
mod sync;
mod thread_pool;
mod util;

pub use partition::Schedule;
pub use thread_pool::{ThreadCount, ThreadPool, ThreadPoolBuilder};
