// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plain-text presentation of the measurements.

use crate::table::{Policy, ScheduleConfig};
use crate::workload::Workload;
use std::fmt;

/// Number of leading elements of each vector shown in the report.
pub const SAMPLE_LEN: usize = 5;

/// Elapsed time of one parallel configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingResult {
    label: String,
    policy: Policy,
    seconds: f64,
}

impl TimingResult {
    /// Records the time measured for the given configuration.
    pub fn new(config: &ScheduleConfig, seconds: f64) -> Self {
        Self {
            label: config.label().to_owned(),
            policy: config.policy(),
            seconds,
        }
    }

    /// Label of the configuration.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Policy of the configuration.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Elapsed wall-clock time, in seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

/// All the measurements of a run, ready to be printed with [`Display`](fmt::Display).
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    a_head: Vec<f32>,
    b_head: Vec<f32>,
    serial_head: Vec<f32>,
    serial_seconds: f64,
    parallel: Vec<TimingResult>,
}

impl Report {
    /// Collects the samples and timings of a run. `parallel` must be in
    /// table order.
    pub fn new(
        workload: &Workload,
        c_serial: &[f32],
        serial_seconds: f64,
        parallel: Vec<TimingResult>,
    ) -> Self {
        let head = |v: &[f32]| v[..v.len().min(SAMPLE_LEN)].to_vec();
        Self {
            a_head: head(workload.a()),
            b_head: head(workload.b()),
            serial_head: head(c_serial),
            serial_seconds,
            parallel,
        }
    }

    /// First elements of `a`.
    pub fn a_head(&self) -> &[f32] {
        &self.a_head
    }

    /// First elements of `b`.
    pub fn b_head(&self) -> &[f32] {
        &self.b_head
    }

    /// First elements of the serial output.
    pub fn serial_head(&self) -> &[f32] {
        &self.serial_head
    }

    /// Elapsed time of the serial baseline, in seconds.
    pub fn serial_seconds(&self) -> f64 {
        self.serial_seconds
    }

    /// Timings of the parallel configurations, in table order.
    pub fn parallel(&self) -> &[TimingResult] {
        &self.parallel
    }
}

struct Samples<'a>(&'a [f32]);

impl fmt::Display for Samples<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, x) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{x}")?;
        }
        Ok(())
    }
}

/// Elapsed time printed with 6 significant digits, switching to scientific
/// notation below `1e-4` or from `1e6` on.
struct Seconds(f64);

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = self.0;
        if x == 0.0 || !x.is_finite() {
            return write!(f, "{x}");
        }

        // Rounding to 6 significant digits may bump the exponent, so it is read
        // back from the rounded scientific form.
        let scientific = format!("{x:.5e}");
        let Some((mantissa, exponent)) = scientific
            .split_once('e')
            .and_then(|(m, e)| e.parse::<i32>().ok().map(|e| (m, e)))
        else {
            return f.write_str(&scientific);
        };

        if !(-4..6).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{sign}{:02}",
                trim_zeros(mantissa),
                exponent.unsigned_abs()
            )
        } else {
            let precision = (5 - exponent) as usize;
            f.write_str(trim_zeros(&format!("{x:.precision$}")))
        }
    }
}

fn trim_zeros(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "BENCHMARK RESULTS")?;
        writeln!(f, "-----------------")?;
        writeln!(f)?;
        writeln!(f, "First {SAMPLE_LEN} values of 'a': {}", Samples(&self.a_head))?;
        writeln!(f, "First {SAMPLE_LEN} values of 'b': {}", Samples(&self.b_head))?;
        writeln!(
            f,
            "First {SAMPLE_LEN} values of 'c_serial' (serial run): {}",
            Samples(&self.serial_head)
        )?;
        writeln!(f)?;
        writeln!(f, "Time (serial add): {} s", Seconds(self.serial_seconds))?;
        writeln!(f)?;

        for policy in [Policy::Static, Policy::Dynamic] {
            for timing in self.parallel.iter().filter(|t| t.policy == policy) {
                writeln!(
                    f,
                    "[parallel] {} -> {} s",
                    timing.label,
                    Seconds(timing.seconds)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::table::ScheduleTable;

    #[test]
    fn test_report_layout() {
        let workload = Workload::generate(8).unwrap();
        let c_serial: Vec<f32> = workload
            .a()
            .iter()
            .zip(workload.b())
            .map(|(x, y)| x + y)
            .collect();
        let table = ScheduleTable::from_chunk_sizes(&[2, 0]);
        let parallel = table
            .iter()
            .enumerate()
            .map(|(i, config)| TimingResult::new(config, i as f64 * 0.25))
            .collect();

        let report = Report::new(&workload, &c_serial, 1.5, parallel);
        assert_eq!(
            report.to_string(),
            "
BENCHMARK RESULTS
-----------------

First 5 values of 'a': 0 1.5 3 4.5 6
First 5 values of 'b': 3.7 4.7 5.7 6.7 7.7
First 5 values of 'c_serial' (serial run): 3.7 6.2 8.7 11.2 13.7

Time (serial add): 1.5 s

[parallel] schedule(static) default -> 0 s
[parallel] schedule(static, 2) -> 0.5 s
[parallel] schedule(static, default) -> 0.75 s

[parallel] schedule(dynamic) default -> 0.25 s
[parallel] schedule(dynamic, 2) -> 1 s
[parallel] schedule(dynamic, default) -> 1.25 s

"
        );
    }

    #[test]
    fn test_seconds_keep_significant_digits() {
        let cases = [
            (0.0, "0"),
            (1.5, "1.5"),
            (0.0123456789, "0.0123457"),
            (0.000123456, "0.000123456"),
            (3.2e-7, "3.2e-07"),
            (0.0000999999, "9.99999e-05"),
            (0.00009999999, "0.0001"),
            (12.3456789, "12.3457"),
            (999999.7, "1e+06"),
            (123456.0, "123456"),
        ];
        for (seconds, expected) in cases {
            assert_eq!(Seconds(seconds).to_string(), expected, "{seconds:e}");
        }
    }

    #[test]
    fn test_report_short_region_is_not_zero() {
        let workload = Workload::generate(1).unwrap();
        let config = ScheduleConfig::with_default_chunk(Policy::Dynamic);
        let report = Report::new(
            &workload,
            &[3.7],
            4.2e-7,
            vec![TimingResult::new(&config, 1.25e-7)],
        );
        let text = report.to_string();
        assert!(text.contains("Time (serial add): 4.2e-07 s\n"), "{text}");
        assert!(
            text.contains("[parallel] schedule(dynamic) default -> 1.25e-07 s\n"),
            "{text}"
        );
    }

    #[test]
    fn test_report_short_vectors() {
        let workload = Workload::generate(2).unwrap();
        let report = Report::new(&workload, &[3.7, 6.2], 0.0, Vec::new());
        assert_eq!(report.a_head(), &[0.0, 1.5]);
        assert_eq!(report.b_head().len(), 2);
        assert!(report
            .to_string()
            .contains("First 5 values of 'c_serial' (serial run): 3.7 6.2\n"));
    }
}
