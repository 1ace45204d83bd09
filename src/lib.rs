// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![doc = include_str!("../README.md")]
#![forbid(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

mod config;
mod core;
mod error;
pub mod harness;
mod macros;
mod report;
mod table;
pub mod timing;
mod workload;

pub use crate::config::{BenchConfig, DEFAULT_CHUNK_SIZES, DEFAULT_LEN};
pub use crate::core::{Schedule, ThreadCount, ThreadPool, ThreadPoolBuilder};
pub use crate::error::Error;
pub use crate::harness::Harness;
pub use crate::report::{Report, TimingResult, SAMPLE_LEN};
pub use crate::table::{Chunk, Policy, ScheduleConfig, ScheduleTable, DEFAULT_DYNAMIC_CHUNK};
pub use crate::workload::{alloc_output, Workload};

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! expand_tests {
        ( $config:expr, ) => {};
        ( $config:expr, $case:ident, $( $others:tt )* ) => {
            #[test]
            fn $case() {
                $crate::test::$case($config);
            }

            expand_tests!($config, $($others)*);
        };
    }

    macro_rules! schedule_tests {
        ( $mod:ident, $config:expr, $( $tests:tt )* ) => {
            mod $mod {
                use super::*;

                expand_tests!($config, $($tests)*);
            }
        };
    }

    macro_rules! all_schedule_tests {
        ( $mod:ident, $config:expr ) => {
            schedule_tests!(
                $mod,
                $config,
                test_small_scenario,
                test_matches_serial,
                test_matches_serial_one_thread,
                test_fewer_elements_than_threads,
                test_leftovers_are_overwritten,
                test_repeated_runs,
            );
        };
    }

    all_schedule_tests!(
        static_default,
        ScheduleConfig::with_default_chunk(Policy::Static)
    );
    all_schedule_tests!(
        dynamic_default,
        ScheduleConfig::with_default_chunk(Policy::Dynamic)
    );
    all_schedule_tests!(static_1, ScheduleConfig::with_chunk(Policy::Static, 1));
    all_schedule_tests!(static_2, ScheduleConfig::with_chunk(Policy::Static, 2));
    all_schedule_tests!(static_100, ScheduleConfig::with_chunk(Policy::Static, 100));
    all_schedule_tests!(
        static_10000,
        ScheduleConfig::with_chunk(Policy::Static, 10_000)
    );
    all_schedule_tests!(static_zero, ScheduleConfig::with_chunk(Policy::Static, 0));
    all_schedule_tests!(dynamic_2, ScheduleConfig::with_chunk(Policy::Dynamic, 2));
    all_schedule_tests!(
        dynamic_100,
        ScheduleConfig::with_chunk(Policy::Dynamic, 100)
    );
    all_schedule_tests!(
        dynamic_10000,
        ScheduleConfig::with_chunk(Policy::Dynamic, 10_000)
    );
    all_schedule_tests!(
        dynamic_negative,
        ScheduleConfig::with_chunk(Policy::Dynamic, -4)
    );

    const EXPECTED_SUMS: [f32; 8] = [3.7, 6.2, 8.7, 11.2, 13.7, 16.2, 18.7, 21.2];

    fn thread_pool(num_threads: usize) -> ThreadPool {
        ThreadPoolBuilder {
            num_threads: ThreadCount::try_from(num_threads).unwrap(),
        }
        .build()
        .unwrap()
    }

    fn serial_output(workload: &Workload) -> Vec<f32> {
        let mut output = alloc_output(workload.len(), "c_serial").unwrap();
        harness::run_serial(workload.a(), workload.b(), &mut output).unwrap();
        output
    }

    fn parallel_output(
        thread_pool: &mut ThreadPool,
        config: &ScheduleConfig,
        workload: &Workload,
    ) -> Vec<f32> {
        let mut output = alloc_output(workload.len(), "c_parallel").unwrap();
        harness::run(thread_pool, config, workload.a(), workload.b(), &mut output).unwrap();
        output
    }

    fn test_small_scenario(config: ScheduleConfig) {
        let workload = Workload::generate(8).unwrap();
        let serial = serial_output(&workload);
        let parallel = parallel_output(&mut thread_pool(4), &config, &workload);

        assert_eq!(parallel, serial);
        for (x, y) in parallel.iter().zip(EXPECTED_SUMS) {
            assert!((x - y).abs() < 1e-5, "{parallel:?}");
        }
    }

    fn test_matches_serial(config: ScheduleConfig) {
        let workload = Workload::generate(1_000_003).unwrap();
        let serial = serial_output(&workload);
        let parallel = parallel_output(&mut thread_pool(4), &config, &workload);
        assert!(parallel == serial);
    }

    fn test_matches_serial_one_thread(config: ScheduleConfig) {
        let workload = Workload::generate(10_007).unwrap();
        let serial = serial_output(&workload);
        let parallel = parallel_output(&mut thread_pool(1), &config, &workload);
        assert!(parallel == serial);
    }

    fn test_fewer_elements_than_threads(config: ScheduleConfig) {
        let workload = Workload::generate(3).unwrap();
        let serial = serial_output(&workload);
        let parallel = parallel_output(&mut thread_pool(8), &config, &workload);
        assert_eq!(parallel, serial);
    }

    fn test_leftovers_are_overwritten(config: ScheduleConfig) {
        let workload = Workload::generate(5_000).unwrap();
        let serial = serial_output(&workload);
        let mut thread_pool = thread_pool(4);

        let mut output = vec![-1.0; 5_000];
        harness::reset(&mut output);
        harness::run(
            &mut thread_pool,
            &config,
            workload.a(),
            workload.b(),
            &mut output,
        )
        .unwrap();
        assert!(output == serial);
    }

    fn test_repeated_runs(config: ScheduleConfig) {
        let workload = Workload::generate(20_000).unwrap();
        let serial = serial_output(&workload);
        let mut thread_pool = thread_pool(4);

        // The same pool serves many regions in a row.
        let mut output = alloc_output(workload.len(), "c_parallel").unwrap();
        for _ in 0..10 {
            harness::reset(&mut output);
            harness::run(
                &mut thread_pool,
                &config,
                workload.a(),
                workload.b(),
                &mut output,
            )
            .unwrap();
            assert!(output == serial);
        }
    }

    #[test]
    fn test_custom_table() {
        let table = ScheduleTable::from_entries(vec![
            ScheduleConfig::with_chunk(Policy::Dynamic, 3),
            ScheduleConfig::with_default_chunk(Policy::Static),
        ]);
        let workload = Workload::generate(100).unwrap();
        let serial = serial_output(&workload);
        let mut thread_pool = thread_pool(2);
        for config in &table {
            assert_eq!(parallel_output(&mut thread_pool, config, &workload), serial);
        }
    }
}
