// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Single-shot wall-clock measurement.

use std::time::Instant;

/// Runs `work` exactly once and returns the elapsed wall-clock time, in
/// seconds, read from a monotonic clock.
///
/// There is no warm-up and no repetition: the result is one sample.
///
/// ```
/// let mut total = 0u64;
/// let seconds = loopsched::timing::measure(|| total = (0..1000).sum());
/// assert_eq!(total, 499_500);
/// assert!(seconds >= 0.0 && seconds.is_finite());
/// ```
#[inline]
pub fn measure(work: impl FnOnce()) -> f64 {
    let start = Instant::now();
    work();
    start.elapsed().as_secs_f64()
}
