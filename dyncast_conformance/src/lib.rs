// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers shared by the conformance tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use dynobj::{Object, Runtime, ScopeKind, TraceMask, TraceSink};

/// A trace sink that records every scope it sees.
#[derive(Debug, Default)]
pub struct CountingSink {
    entered: Vec<(ScopeKind, String)>,
    failed: usize,
    depth: usize,
    max_depth: usize,
}

impl CountingSink {
    /// Number of scopes of `kind` entered so far.
    #[must_use]
    pub fn count(&self, kind: ScopeKind) -> usize {
        self.entered.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Labels of the scopes of `kind`, in order.
    #[must_use]
    pub fn labels(&self, kind: ScopeKind) -> Vec<&str> {
        self.entered
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, label)| label.as_str())
            .collect()
    }

    /// Number of scopes that exited with an error.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Deepest nesting observed.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl TraceSink for CountingSink {
    fn mask(&self) -> TraceMask {
        TraceMask::ALL
    }

    fn scope_enter(&mut self, kind: ScopeKind, label: &dyn fmt::Display, depth: usize) {
        self.entered.push((kind, label.to_string()));
        self.depth = depth + 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn scope_exit(&mut self, _kind: ScopeKind, depth: usize, ok: bool) {
        self.depth = depth;
        if !ok {
            self.failed += 1;
        }
    }
}

/// Installs a fresh [`CountingSink`] on `rt` and returns it.
pub fn count_scopes(rt: &Runtime) -> Rc<RefCell<CountingSink>> {
    let sink = Rc::new(RefCell::new(CountingSink::default()));
    rt.set_trace_sink(sink.clone());
    sink
}

/// Builds a runtime list of ints.
///
/// # Panics
///
/// Panics if the runtime refuses to allocate.
#[must_use]
pub fn int_list(rt: &Runtime, values: &[i64]) -> Object {
    let items: Vec<Object> = values
        .iter()
        .map(|&v| rt.new_int(v).expect("allocate int"))
        .collect();
    rt.new_list(items).expect("allocate list")
}

/// Builds a runtime tuple from already allocated items.
///
/// # Panics
///
/// Panics if an item belongs to another runtime or the runtime refuses to allocate.
#[must_use]
pub fn tuple_of(rt: &Runtime, items: Vec<Object>) -> Object {
    rt.new_tuple(items).expect("allocate tuple")
}
