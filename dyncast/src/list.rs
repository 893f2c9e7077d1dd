// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `List[T]`: a typed view of a runtime list.

use alloc::vec::Vec;
use core::marker::PhantomData;

use dynobj::{Handle, ObjKind, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, mismatch, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::into::{IntoObject, owned_by};
use crate::iter::{CastIter, IndexCursor, Indexed};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime list whose elements are expected to convert to `T`.
///
/// Only the list kind is checked up front; each element is converted when it is read.
pub struct List<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(List<T>);

/// Iterator over the elements of a [`List`].
pub type ListIter<T> = CastIter<IndexCursor<T>>;

impl<T> List<T> {
    /// Creates an empty list.
    pub fn new(rt: &Runtime) -> Result<Self, CastError> {
        Ok(Self::from_object(rt.new_list(Vec::<Object>::new())?))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runtime().list_len(self.handle()).unwrap_or(0)
    }

    /// Returns `true` if the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, index: usize) -> Result<Handle, CastError> {
        let len = self.len();
        if index >= len {
            return Err(CastError::Index { index, len });
        }
        Ok(self.runtime().list_get(self.handle(), index)?)
    }
}

impl<T: FromObject> List<T> {
    /// Builds a list from host values.
    pub fn from_values<I>(rt: &Runtime, values: I) -> Result<Self, CastError>
    where
        I: IntoIterator<Item = T>,
        T: IntoObject,
    {
        let items = values
            .into_iter()
            .map(|v| v.into_runtime(rt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_object(rt.new_list(items)?))
    }

    /// Converts element `index`.
    pub fn get(&self, index: usize) -> Result<T, CastError> {
        cast_from_handle(self.runtime(), self.element(index)?)
    }

    /// Replaces element `index`.
    pub fn set(&self, index: usize, value: T) -> Result<(), CastError>
    where
        T: IntoObject,
    {
        let len = self.len();
        if index >= len {
            return Err(CastError::Index { index, len });
        }
        let obj = value.into_runtime(self.runtime())?;
        Ok(self.runtime().list_set(self.handle(), index, obj)?)
    }

    /// Appends a host value. Views hand over their reference; scalars are allocated on the fly.
    pub fn append(&self, value: T) -> Result<(), CastError>
    where
        T: IntoObject,
    {
        let obj = value.into_runtime(self.runtime())?;
        Ok(self.runtime().list_append(self.handle(), obj)?)
    }

    /// Appends an arbitrary runtime value after checking it against `T`.
    pub fn append_object(&self, obj: Object) -> Result<(), CastError> {
        let rt = self.runtime();
        let obj = owned_by(rt, obj)?;
        if !T::accepts(rt, obj.handle(), true) {
            return Err(mismatch::<T>(rt, obj.handle()));
        }
        Ok(rt.list_append(self.handle(), obj)?)
    }

    /// Returns an iterator positioned at the first element.
    pub fn iter(&self) -> ListIter<T> {
        CastIter::new(IndexCursor::new(self.obj.clone(), Indexed::List, 0))
    }

    /// Returns an iterator positioned past the last element.
    pub fn end(&self) -> ListIter<T> {
        CastIter::at_end(IndexCursor::new(self.obj.clone(), Indexed::List, self.len()))
    }

    /// Converts every element into a `Vec`.
    pub fn to_vec(&self) -> Result<Vec<T>, CastError> {
        self.iter().collect()
    }
}

impl<T: TypeName> TypeName for List<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "List",
        args: &[T::DESCR],
    };
}

impl<T: TypeName> FromObject for List<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::List)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}

impl<T: FromObject> IntoIterator for &List<T> {
    type Item = Result<T, CastError>;
    type IntoIter = ListIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
