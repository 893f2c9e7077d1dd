// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Optional[T]`: `None` or a value viewable as `T`.

use core::marker::PhantomData;

use dynobj::{Handle, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::into::IntoObject;
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime value that is either `None` or accepted by `T`.
pub struct Optional<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(Optional<T>);

impl<T> Optional<T> {
    /// Returns an empty optional.
    #[must_use]
    pub fn none(rt: &Runtime) -> Self {
        Self::from_object(rt.none())
    }

    /// Returns `true` unless the value is `None`.
    #[must_use]
    pub fn has_value(&self) -> bool {
        !self.obj.is_none()
    }
}

impl<T: FromObject> Optional<T> {
    /// Wraps a host value.
    pub fn some(rt: &Runtime, value: T) -> Result<Self, CastError>
    where
        T: IntoObject,
    {
        Ok(Self::from_object(value.into_runtime(rt)?))
    }

    /// Converts the held value.
    ///
    /// Fails with [`CastError::BadOptionalAccess`] when empty.
    pub fn value(&self) -> Result<T, CastError> {
        if !self.has_value() {
            return Err(CastError::BadOptionalAccess);
        }
        cast_from_handle(self.runtime(), self.handle())
    }

    /// Converts into a host `Option`.
    pub fn into_option(self) -> Result<Option<T>, CastError> {
        if !self.has_value() {
            return Ok(None);
        }
        self.value().map(Some)
    }
}

impl<T: TypeName> TypeName for Optional<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Optional",
        args: &[T::DESCR],
    };
}

impl<T: FromObject> FromObject for Optional<T> {
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool {
        rt.is_none(h) || T::accepts(rt, h, convert)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}
