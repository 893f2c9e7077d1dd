// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime errors.

use alloc::boxed::Box;
use core::fmt;

use crate::value::ObjKind;

/// An error reported by the object runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjError {
    /// Handle was stale or out of bounds.
    BadHandle,
    /// Operation is not supported by the object's kind.
    WrongKind {
        /// What the operation required.
        expected: &'static str,
        /// What the object actually is.
        found: ObjKind,
    },
    /// Index out of bounds.
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Length at the time of the request.
        len: usize,
    },
    /// Mapping lookup found no entry.
    MissingKey,
    /// Value cannot be used as a mapping key.
    Unhashable(ObjKind),
    /// Object does not support the iteration protocol.
    NotIterable(ObjKind),
    /// Allocation would exceed [`Limits::max_objects`](crate::Limits::max_objects).
    HeapExhausted {
        /// Configured limit.
        limit: usize,
    },
    /// Host type was used before [`Runtime::register_host_type`](crate::Runtime::register_host_type).
    UnregisteredHostType {
        /// Rust type name of the host value.
        type_name: &'static str,
    },
    /// Object belongs to a different [`Runtime`](crate::Runtime).
    ForeignObject,
    /// The runtime (or a host iterator) was re-entered while already in use.
    Reentrant,
    /// Host code reported a failure.
    Host(Box<str>),
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadHandle => write!(f, "stale or invalid object handle"),
            Self::WrongKind { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "index out of range: index={index} len={len}")
            }
            Self::MissingKey => write!(f, "key not found"),
            Self::Unhashable(kind) => write!(f, "unhashable type: {kind}"),
            Self::NotIterable(kind) => write!(f, "object is not iterable: {kind}"),
            Self::HeapExhausted { limit } => {
                write!(f, "object heap exhausted: limit={limit}")
            }
            Self::UnregisteredHostType { type_name } => {
                write!(f, "host type not registered: {type_name}")
            }
            Self::ForeignObject => write!(f, "object belongs to another runtime"),
            Self::Reentrant => write!(f, "runtime re-entered while in use"),
            Self::Host(msg) => write!(f, "host error: {msg}"),
        }
    }
}

impl core::error::Error for ObjError {}
