// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Iterable[T]`: anything supporting the runtime iteration protocol.

use core::marker::PhantomData;

use dynobj::{Handle, Object, Runtime};

use crate::cast::{FromObject, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::iter::{CastIter, IterCursor};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of an iterable runtime value (list, tuple, string, dict, sequence or iterator) whose
/// items convert to `T`.
pub struct Iterable<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(Iterable<T>);

/// Host iterator over the items of an [`Iterable`].
pub type IterableIter<T> = CastIter<IterCursor<T>>;

impl<T: FromObject> Iterable<T> {
    /// Requests a fresh runtime iterator and walks it.
    ///
    /// Iterating a container twice yields its items twice; iterating a viewed iterator resumes it.
    pub fn iter(&self) -> Result<IterableIter<T>, CastError> {
        let iter = self.runtime().get_iter(self.handle())?;
        Ok(CastIter::new(IterCursor::new(iter)))
    }
}

impl<T: TypeName> TypeName for Iterable<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Iterable",
        args: &[T::DESCR],
    };
}

impl<T: TypeName> FromObject for Iterable<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.has_iter(h)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}
