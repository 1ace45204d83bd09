// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Input vectors of the elementwise addition.

use crate::error::Error;

/// The two read-only inputs `a` and `b` of the benchmark.
pub struct Workload {
    a: Vec<f32>,
    b: Vec<f32>,
}

impl Workload {
    /// Allocates and fills the inputs, with `a[i] = i * 1.5` and
    /// `b[i] = i + 3.7` (computed in `f32`).
    pub fn generate(len: usize) -> Result<Self, Error> {
        let mut a = reserve(len, "a")?;
        let mut b = reserve(len, "b")?;
        a.extend((0..len).map(|i| i as f32 * 1.5));
        b.extend((0..len).map(|i| i as f32 + 3.7));
        Ok(Self { a, b })
    }

    /// Number of elements in each input.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Whether the inputs are empty.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Left input.
    pub fn a(&self) -> &[f32] {
        &self.a
    }

    /// Right input.
    pub fn b(&self) -> &[f32] {
        &self.b
    }
}

/// Allocates a zero-filled output vector of `len` elements.
pub fn alloc_output(len: usize, what: &'static str) -> Result<Vec<f32>, Error> {
    let mut output = reserve(len, what)?;
    output.resize(len, 0.0);
    Ok(output)
}

fn reserve(len: usize, what: &'static str) -> Result<Vec<f32>, Error> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|source| Error::Allocation { what, len, source })?;
    Ok(vec)
}
