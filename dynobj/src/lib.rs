// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `dynobj`: a small, reference-counted, dynamically-typed object runtime.
//!
//! Values live in a slot heap owned by a [`Runtime`](runtime::Runtime). Host code refers to them
//! through two kinds of reference:
//!
//! - [`Handle`](value::Handle): an opaque, `Copy`, generation-checked raw reference. Holding a
//!   handle does not keep a value alive.
//! - [`Object`](object::Object): an owned reference. It holds exactly one reference count and
//!   releases it exactly once when dropped.
//!
//! Acquiring an [`Object`](object::Object) from a handle is always explicit:
//! [`Object::borrowed`](object::Object::borrowed) increments the count,
//! [`Object::stolen`](object::Object::stolen) takes over a count the caller already owns.
//!
//! The runtime is single-threaded. Its heap sits behind a `RefCell` that plays the role of a
//! global interpreter lock; no operation holds that borrow while running host code (host
//! iterators, protocol sequences, trace sinks, or destructors of host payloads).
//!
//! This crate is `no_std + alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
mod heap;
pub mod host;
pub mod object;
pub mod runtime;
pub mod trace;
pub mod value;

pub use error::ObjError;
pub use host::{HostIter, SequenceSource};
pub use object::Object;
pub use runtime::{Limits, Runtime};
pub use trace::{ScopeKind, TraceMask, TraceSink};
pub use value::{Handle, HostTypeId, ObjKind};
