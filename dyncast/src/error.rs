// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion errors.

use core::fmt;

use dynobj::{ObjError, ObjKind};

use crate::descr::TypeDescr;

/// An error reported while viewing or converting runtime values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastError {
    /// A value failed the structural check of a typed view.
    TypeMismatch {
        /// Descriptor of the requested view.
        expected: TypeDescr,
        /// Kind of the offending value.
        found: ObjKind,
    },
    /// Native extraction of a host scalar failed (wrong kind or out of range).
    Conversion {
        /// Descriptor of the requested host type.
        target: TypeDescr,
        /// Kind of the offending value.
        found: ObjKind,
    },
    /// Index out of range.
    Index {
        /// Requested index.
        index: usize,
        /// Length of the container.
        len: usize,
    },
    /// Mapping has no entry for the key.
    Key,
    /// An empty optional was dereferenced.
    BadOptionalAccess,
    /// A union alternative other than the held one was requested.
    BadVariantAccess {
        /// Requested alternative.
        requested: usize,
        /// Alternative the value actually matches.
        held: usize,
    },
    /// The runtime iteration protocol reported a fault.
    RuntimeIteration(ObjError),
    /// A tuple had the wrong number of elements.
    LengthMismatch {
        /// Arity of the requested tuple view.
        expected: usize,
        /// Length of the value.
        found: usize,
    },
    /// `make_iterator` was called for an iterator type that was never declared.
    IteratorNotDeclared {
        /// Rust type name of the iterator.
        type_name: &'static str,
    },
    /// A casting iterator was dereferenced past its end.
    Exhausted,
    /// Any other runtime failure.
    Runtime(ObjError),
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "cannot view {found} as {expected}")
            }
            Self::Conversion { target, found } => {
                write!(f, "cannot convert {found} to {target}")
            }
            Self::Index { index, len } => {
                write!(f, "index out of range: index={index} len={len}")
            }
            Self::Key => write!(f, "key not found"),
            Self::BadOptionalAccess => write!(f, "accessing empty optional"),
            Self::BadVariantAccess { requested, held } => {
                write!(
                    f,
                    "accessing invalid value in union: requested={requested} held={held}"
                )
            }
            Self::RuntimeIteration(err) => write!(f, "iteration failed: {err}"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "tuple length mismatch: expected={expected} found={found}")
            }
            Self::IteratorNotDeclared { type_name } => {
                write!(f, "iterator type not declared: {type_name}")
            }
            Self::Exhausted => write!(f, "iterator dereferenced past the end"),
            Self::Runtime(err) => write!(f, "runtime error: {err}"),
        }
    }
}

impl core::error::Error for CastError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::RuntimeIteration(err) | Self::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ObjError> for CastError {
    fn from(err: ObjError) -> Self {
        Self::Runtime(err)
    }
}
