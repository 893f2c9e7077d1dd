// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope tracing hooks.
//!
//! A [`TraceSink`] installed with [`Runtime::set_trace_sink`](crate::Runtime::set_trace_sink)
//! receives matched `scope_enter`/`scope_exit` calls for the scope kinds selected by its
//! [`TraceMask`]. Scopes nest; `depth` is the number of enclosing traced scopes.
//!
//! Sinks are invoked without the heap borrow held. Labels are passed as `&dyn Display` so sinks
//! that do not need them pay nothing for formatting.

use core::fmt;

/// Bitmask selecting which [`ScopeKind`]s a sink receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceMask(u8);

impl TraceMask {
    /// No scopes.
    pub const NONE: Self = Self(0);
    /// Conversions of runtime values into typed host values.
    pub const CONVERT: Self = Self(1 << 0);
    /// Steps of the runtime iteration protocol.
    pub const ITER: Self = Self(1 << 1);
    /// Calls into host iterator state.
    pub const HOST: Self = Self(1 << 2);
    /// Every scope kind.
    pub const ALL: Self = Self(Self::CONVERT.0 | Self::ITER.0 | Self::HOST.0);

    /// Returns `true` if this mask contains every bit in `other`.
    #[must_use]
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl core::ops::BitOr for TraceMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The kind of a traced scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// A checked conversion into a typed host value.
    Convert,
    /// One `next` step of the runtime iteration protocol.
    IterStep,
    /// One call into a host iterator's `next`.
    HostCall,
}

impl ScopeKind {
    /// Returns the mask bit that selects this kind.
    #[must_use]
    #[inline]
    pub const fn mask(self) -> TraceMask {
        match self {
            Self::Convert => TraceMask::CONVERT,
            Self::IterStep => TraceMask::ITER,
            Self::HostCall => TraceMask::HOST,
        }
    }
}

/// Receiver of traced scopes.
pub trait TraceSink {
    /// Scope kinds this sink wants to receive.
    fn mask(&self) -> TraceMask;

    /// Called when a scope starts.
    fn scope_enter(&mut self, kind: ScopeKind, label: &dyn fmt::Display, depth: usize);

    /// Called when a scope ends. `ok` is `false` if the scoped operation failed.
    fn scope_exit(&mut self, kind: ScopeKind, depth: usize, ok: bool);
}
