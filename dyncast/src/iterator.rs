// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Iterator[T]`: a typed view of a runtime iterator object.

use core::marker::PhantomData;

use dynobj::{Handle, ObjKind, Object, Runtime};

use crate::cast::{FromObject, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::iter::{CastIter, IterCursor};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime iterator whose items convert to `T`.
///
/// Runtime iterators are stateful: every [`CastIter`] obtained from the same view pulls from the
/// same underlying iterator.
pub struct Iter<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(Iter<T>);

/// Host iterator over the items of an [`Iter`].
pub type IterIter<T> = CastIter<IterCursor<T>>;

impl<T: FromObject> Iter<T> {
    /// Starts pulling items, converting each to `T`.
    pub fn iter(&self) -> IterIter<T> {
        CastIter::new(IterCursor::new(self.obj.clone()))
    }
}

impl<T: TypeName> TypeName for Iter<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Iterator",
        args: &[T::DESCR],
    };
}

impl<T: TypeName> FromObject for Iter<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::Iterator)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}

impl<T: FromObject> IntoIterator for Iter<T> {
    type Item = Result<T, CastError>;
    type IntoIter = IterIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        CastIter::new(IterCursor::new(self.obj))
    }
}

impl<T: FromObject> IntoIterator for &Iter<T> {
    type Item = Result<T, CastError>;
    type IntoIter = IterIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
