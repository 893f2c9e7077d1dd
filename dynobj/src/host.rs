// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-implemented object protocols.
//!
//! Host code can expose behavior to the runtime without the runtime knowing the host's types:
//!
//! - [`HostIter`] backs an `Iterator` object whose `next` is answered by host code.
//! - [`SequenceSource`] backs a `Sequence` object answering `len` and indexed item lookup.
//!
//! The runtime never holds its heap borrow while calling into these traits, so implementations
//! may freely allocate or inspect runtime objects.

use crate::error::ObjError;
use crate::object::Object;
use crate::runtime::Runtime;

/// Host-side state of a runtime iterator object.
pub trait HostIter {
    /// Produces the next element, or `Ok(None)` once exhausted.
    ///
    /// The returned [`Object`] is a new reference owned by the caller.
    fn next(&mut self, rt: &Runtime) -> Result<Option<Object>, ObjError>;
}

/// Host-side backing of a protocol sequence (length + indexed lookup).
pub trait SequenceSource {
    /// Returns the number of items.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence has no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns item `index` as a new reference.
    ///
    /// Implementations report [`ObjError::OutOfBounds`] for `index >= len()`.
    fn item(&self, rt: &Runtime, index: usize) -> Result<Object, ObjError>;
}
