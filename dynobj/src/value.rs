// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw references and object kinds.

use core::fmt;

/// An opaque, generation-checked reference to a heap slot.
///
/// A handle does not own a reference count. Using a handle after its value was freed is detected
/// (the slot generation no longer matches) and reported as
/// [`ObjError::BadHandle`](crate::ObjError::BadHandle).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was issued for.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Identifier of a registered host type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct HostTypeId(pub u32);

/// The runtime kind of an object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjKind {
    /// The "no value" singleton.
    None,
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// Mutable list.
    List,
    /// Immutable tuple.
    Tuple,
    /// Insertion-ordered mapping.
    Dict,
    /// Iterator object (sequence, dict-key, or host iterator).
    Iterator,
    /// Host-provided sequence implementing [`SequenceSource`](crate::SequenceSource).
    Sequence,
    /// Opaque host object of a registered type.
    Host(HostTypeId),
}

impl ObjKind {
    /// Returns the kind name as the runtime reports it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Iterator => "iterator",
            Self::Sequence => "sequence",
            Self::Host(_) => "object",
        }
    }
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(id) => write!(f, "object(host_type={})", id.0),
            other => f.write_str(other.name()),
        }
    }
}
