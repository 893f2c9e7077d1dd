// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::resolver::{DefaultLabelResolver, LabelResolver};
use dynobj::{ScopeKind, TraceMask, TraceSink};
use std::fmt;
use std::string::{String, ToString};
use std::vec::Vec;

type BackendGuard = tracy_client::Span;

struct ScopeEntry {
    kind: ScopeKind,
    depth: usize,
    // Keep the label alive for backends that may borrow it.
    label: String,
    guard: Option<BackendGuard>,
}

/// A `TraceSink` that emits Tracy zones via `tracy-client`.
pub struct ProfilingTraceSink<R = DefaultLabelResolver> {
    resolver: R,
    mask: TraceMask,
    stack: Vec<ScopeEntry>,
}

impl ProfilingTraceSink<DefaultLabelResolver> {
    /// Create a new sink that keeps the runtime's labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: LabelResolver> ProfilingTraceSink<R> {
    /// Create a new sink with a custom label resolver.
    #[must_use]
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            mask: TraceMask::ALL,
            stack: Vec::new(),
        }
    }

    /// Restrict the scope kinds this sink receives. Defaults to [`TraceMask::ALL`].
    #[must_use]
    pub fn with_mask(mut self, mask: TraceMask) -> Self {
        self.mask = mask;
        self
    }

    /// Number of zones currently open.
    #[must_use]
    pub fn open_scopes(&self) -> usize {
        self.stack.len()
    }

    fn on_scope_enter(&mut self, kind: ScopeKind, label: &dyn fmt::Display, depth: usize) {
        let label = self.resolve_label(kind, label);
        let guard = start_scope(kind, &label, depth);
        self.stack.push(ScopeEntry {
            kind,
            depth,
            label,
            guard,
        });
    }

    fn on_scope_exit(&mut self, kind: ScopeKind, depth: usize) {
        if let Some(top) = self.stack.last()
            && top.kind == kind
            && top.depth == depth
        {
            if let Some(entry) = self.stack.pop() {
                let ScopeEntry {
                    label: _label,
                    guard: _guard,
                    ..
                } = entry;
            }
            return;
        }
        // If the stack got out of sync, drop any active zones to avoid leaking.
        self.drop_active_scopes();
    }

    fn resolve_label(&mut self, kind: ScopeKind, label: &dyn fmt::Display) -> String {
        let label = label.to_string();
        let resolved = match kind {
            ScopeKind::Convert => self.resolver.convert_label(&label),
            ScopeKind::IterStep => self.resolver.iter_step_label(&label),
            ScopeKind::HostCall => self.resolver.host_call_label(&label),
        };
        resolved.unwrap_or(label)
    }

    // Drop in LIFO order so nested spans close inner-to-outer.
    fn drop_active_scopes(&mut self) {
        while let Some(entry) = self.stack.pop() {
            let ScopeEntry {
                label: _label,
                guard: _guard,
                ..
            } = entry;
        }
    }
}

fn start_scope(kind: ScopeKind, label: &str, depth: usize) -> Option<BackendGuard> {
    let function_name = match kind {
        ScopeKind::Convert => "dyncast.convert",
        ScopeKind::IterStep => "dynobj.iter_step",
        ScopeKind::HostCall => "dynobj.host_call",
    };
    let line = u32::try_from(depth).unwrap_or(u32::MAX);
    let client = tracy_client::Client::running()?;
    Some(client.span_alloc(Some(label), function_name, "dyncast", line, 0))
}

impl<R: LabelResolver> TraceSink for ProfilingTraceSink<R> {
    fn mask(&self) -> TraceMask {
        self.mask
    }

    fn scope_enter(&mut self, kind: ScopeKind, label: &dyn fmt::Display, depth: usize) {
        self.on_scope_enter(kind, label, depth);
    }

    fn scope_exit(&mut self, kind: ScopeKind, depth: usize, _ok: bool) {
        self.on_scope_exit(kind, depth);
    }
}

impl<R> Default for ProfilingTraceSink<R>
where
    R: LabelResolver + Default,
{
    fn default() -> Self {
        Self::with_resolver(R::default())
    }
}

impl<R> fmt::Debug for ProfilingTraceSink<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilingTraceSink")
            .field("mask", &self.mask)
            .field("stack_depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}
