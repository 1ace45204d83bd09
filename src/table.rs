// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The list of scheduling configurations exercised by the benchmark.
//!
//! This is pure data: the loop body and the timing logic don't depend on
//! which entries the table contains.

use crate::core::Schedule;
use crate::macros::log_warn;
use std::fmt;
use std::num::NonZeroUsize;

/// Chunk size used by [`Policy::Dynamic`] when none is given, i.e. one
/// iteration per claim.
pub const DEFAULT_DYNAMIC_CHUNK: NonZeroUsize = NonZeroUsize::MIN;

/// How loop iterations are assigned to workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// Assignment is decided once, before the loop starts.
    Static,
    /// Idle workers claim the next chunk while the loop runs.
    Dynamic,
}

impl Policy {
    /// Name of the policy, as it appears in labels.
    pub fn name(self) -> &'static str {
        match self {
            Policy::Static => "static",
            Policy::Dynamic => "dynamic",
        }
    }
}

/// Granularity of the work units handed to workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// The engine picks the granularity.
    Default,
    /// Units of exactly this many iterations.
    Size(NonZeroUsize),
}

/// One scheduling experiment: a policy, a chunk size and a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    policy: Policy,
    chunk: Chunk,
    label: String,
}

impl ScheduleConfig {
    /// Configuration with the engine's default granularity, labeled e.g.
    /// `schedule(static) default`.
    pub fn with_default_chunk(policy: Policy) -> Self {
        Self {
            policy,
            chunk: Chunk::Default,
            label: format!("schedule({}) default", policy.name()),
        }
    }

    /// Configuration with an explicit chunk size, labeled e.g.
    /// `schedule(dynamic, 100)`.
    ///
    /// A non-positive size falls back to the default granularity, and the
    /// label reads `default` instead of the requested number.
    pub fn with_chunk(policy: Policy, requested: i64) -> Self {
        let chunk = usize::try_from(requested)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(Chunk::Default, Chunk::Size);
        let label = match chunk {
            Chunk::Size(size) => format!("schedule({}, {size})", policy.name()),
            Chunk::Default => {
                log_warn!(
                    "Chunk size {requested} is not positive, using the default granularity for schedule({})",
                    policy.name()
                );
                format!("schedule({}, default)", policy.name())
            }
        };
        Self {
            policy,
            chunk,
            label,
        }
    }

    /// Scheduling policy.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Chunk size.
    pub fn chunk(&self) -> Chunk {
        self.chunk
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Partitioning requested from the engine.
    pub fn schedule(&self) -> Schedule {
        match (self.policy, self.chunk) {
            (Policy::Static, Chunk::Default) => Schedule::StaticBlocks,
            (Policy::Static, Chunk::Size(size)) => Schedule::StaticChunks(size),
            (Policy::Dynamic, Chunk::Default) => Schedule::Dynamic(DEFAULT_DYNAMIC_CHUNK),
            (Policy::Dynamic, Chunk::Size(size)) => Schedule::Dynamic(size),
        }
    }
}

impl fmt::Display for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Ordered list of [`ScheduleConfig`]s. The order is the measurement order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleTable {
    entries: Vec<ScheduleConfig>,
}

impl ScheduleTable {
    /// Builds the table for the given chunk sizes: `static` and `dynamic`
    /// with default granularity, then `static` with each chunk size, then
    /// `dynamic` with each chunk size.
    pub fn from_chunk_sizes(chunk_sizes: &[i64]) -> Self {
        let policies = [Policy::Static, Policy::Dynamic];
        let defaults = policies.map(ScheduleConfig::with_default_chunk);
        let chunked = policies.into_iter().flat_map(|policy| {
            chunk_sizes
                .iter()
                .map(move |&size| ScheduleConfig::with_chunk(policy, size))
        });
        Self {
            entries: defaults.into_iter().chain(chunked).collect(),
        }
    }

    /// Builds a table from arbitrary entries.
    pub fn from_entries(entries: Vec<ScheduleConfig>) -> Self {
        Self { entries }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleConfig> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ScheduleTable {
    type Item = &'a ScheduleConfig;
    type IntoIter = std::slice::Iter<'a, ScheduleConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
