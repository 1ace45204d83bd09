// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs the default benchmark and prints the report.

use loopsched::{BenchConfig, Error, Harness, Report};
use std::process::ExitCode;

fn main() -> ExitCode {
    #[cfg(feature = "log")]
    env_logger::init();

    // The report is only printed once every measurement succeeded.
    match run() {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            #[cfg(feature = "log")]
            log::error!("Benchmark aborted: {e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Report, Error> {
    let config = BenchConfig::default();
    let mut harness = Harness::new(config)?;
    #[cfg(feature = "log")]
    log::info!(
        "Running the benchmark on {} threads",
        harness.num_threads()
    );
    harness.run()
}
