// Copyright 2024-2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Internal logging macros, which compile to nothing unless the `log` feature
//! is enabled.

#[cfg(feature = "log")]
macro_rules! log_at {
    ( $level:ident, $($args:tt)* ) => {
        log::log!(log::Level::$level, $($args)*)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! log_at {
    ( $level:ident, $($args:tt)* ) => {
        ()
    };
}

macro_rules! log_debug {
    ( $($args:tt)* ) => {
        $crate::macros::log_at!(Debug, $($args)*)
    };
}

macro_rules! log_error {
    ( $($args:tt)* ) => {
        $crate::macros::log_at!(Error, $($args)*)
    };
}

macro_rules! log_warn {
    ( $($args:tt)* ) => {
        $crate::macros::log_at!(Warn, $($args)*)
    };
}

/// Per-region statistics are only logged with `log_parallelism`, as they are
/// gathered on the hot path.
#[cfg(feature = "log_parallelism")]
macro_rules! log_info {
    ( $($args:tt)* ) => {
        $crate::macros::log_at!(Info, $($args)*)
    };
}

pub(crate) use log_at;
pub(crate) use log_debug;
pub(crate) use log_error;
#[cfg(feature = "log_parallelism")]
pub(crate) use log_info;
pub(crate) use log_warn;
