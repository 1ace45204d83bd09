// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The benchmark itself: generate, measure the serial baseline, then reset
//! and measure each scheduling configuration.

use crate::config::BenchConfig;
use crate::core::{ThreadPool, ThreadPoolBuilder};
use crate::error::Error;
use crate::macros::log_debug;
use crate::report::{Report, TimingResult};
use crate::table::{ScheduleConfig, ScheduleTable};
use crate::timing::measure;
use crate::workload::{alloc_output, Workload};

/// Resets the output to the sentinel value `0.0`.
pub fn reset(output: &mut [f32]) {
    output.fill(0.0);
}

/// Computes `output[i] = a[i] + b[i]` sequentially on the calling thread.
pub fn run_serial(a: &[f32], b: &[f32], output: &mut [f32]) -> Result<(), Error> {
    check_lengths(a, b, output)?;
    add_into(a, b, output);
    Ok(())
}

/// Computes `output[i] = a[i] + b[i]` on the thread pool, scheduled
/// according to `config`.
///
/// `a` and `b` are shared read-only by all the workers, and each worker
/// writes a disjoint part of `output`.
pub fn run(
    thread_pool: &mut ThreadPool,
    config: &ScheduleConfig,
    a: &[f32],
    b: &[f32],
    output: &mut [f32],
) -> Result<(), Error> {
    check_lengths(a, b, output)?;
    thread_pool.for_each_chunk_mut(config.schedule(), output, |start, chunk| {
        let end = start + chunk.len();
        add_into(&a[start..end], &b[start..end], chunk);
    })
}

#[inline(always)]
fn add_into(a: &[f32], b: &[f32], output: &mut [f32]) {
    output
        .iter_mut()
        .zip(a.iter().zip(b))
        .for_each(|(out, (&x, &y))| *out = x + y);
}

fn check_lengths(a: &[f32], b: &[f32], output: &[f32]) -> Result<(), Error> {
    if a.len() != output.len() || b.len() != output.len() {
        return Err(Error::LengthMismatch {
            output: output.len(),
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Runs the whole benchmark on a dedicated thread pool.
pub struct Harness {
    config: BenchConfig,
    thread_pool: ThreadPool,
}

impl Harness {
    /// Spawns the thread pool for the given configuration.
    pub fn new(config: BenchConfig) -> Result<Self, Error> {
        let thread_pool = ThreadPoolBuilder {
            num_threads: config.num_threads,
        }
        .build()?;
        Ok(Self {
            config,
            thread_pool,
        })
    }

    /// Number of worker threads used for the parallel runs.
    pub fn num_threads(&self) -> usize {
        self.thread_pool.num_threads().get()
    }

    /// Runs every measurement and returns the report.
    pub fn run(&mut self) -> Result<Report, Error> {
        self.run_inspected(|_, _| ())
    }

    /// Same as [`run()`](Self::run), but passes the output of each parallel
    /// configuration to `inspect` right after it was measured.
    pub fn run_inspected(
        &mut self,
        mut inspect: impl FnMut(&ScheduleConfig, &[f32]),
    ) -> Result<Report, Error> {
        let len = self.config.len;
        log_debug!("Generating a workload of {len} elements");
        let workload = Workload::generate(len)?;
        let mut c_serial = alloc_output(len, "c_serial")?;
        let mut c_parallel = alloc_output(len, "c_parallel")?;
        let table = ScheduleTable::from_chunk_sizes(&self.config.chunk_sizes);

        log_debug!("Measuring the serial baseline");
        let mut outcome = Ok(());
        let serial_seconds =
            measure(|| outcome = run_serial(workload.a(), workload.b(), &mut c_serial));
        outcome?;

        let mut timings = Vec::with_capacity(table.len());
        for config in &table {
            reset(&mut c_parallel);
            log_debug!("Measuring {config}");
            let mut outcome = Ok(());
            let seconds = measure(|| {
                outcome = run(
                    &mut self.thread_pool,
                    config,
                    workload.a(),
                    workload.b(),
                    &mut c_parallel,
                )
            });
            outcome?;
            inspect(config, &c_parallel);
            timings.push(TimingResult::new(config, seconds));
        }

        Ok(Report::new(&workload, &c_serial, serial_seconds, timings))
    }
}
