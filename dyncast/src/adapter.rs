// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exposing host iterators to the runtime.
//!
//! A host iterator type is declared once per runtime with [`declare_iterator`]; afterwards
//! [`make_iterator`] / [`make_iterator_with`] wrap instances of it in runtime `Iterator` objects.
//! Each `next` on the runtime side pulls one host item and turns it into a runtime value
//! according to a [`ReturnPolicy`].

use alloc::boxed::Box;
use alloc::string::ToString;
use core::any::type_name;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use dynobj::{Handle, HostIter, HostTypeId, ObjError, Object, Runtime};

use crate::error::CastError;
use crate::into::IntoObject;

/// How a host item becomes a runtime value.
pub trait ReturnPolicy<Item> {
    /// Produces a new reference for `item`.
    fn to_object(rt: &Runtime, item: Item) -> Result<Object, CastError>;
}

/// Owned items are consumed and converted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByMove;

/// Items behind a pointer are cloned into a fresh runtime value.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByCopy;

/// Items are raw runtime handles; the existing value is shared.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByReference;

impl<T: IntoObject> ReturnPolicy<T> for ByMove {
    fn to_object(rt: &Runtime, item: T) -> Result<Object, CastError> {
        item.into_runtime(rt)
    }
}

impl<P> ReturnPolicy<P> for ByCopy
where
    P: Deref,
    P::Target: Clone + IntoObject,
{
    fn to_object(rt: &Runtime, item: P) -> Result<Object, CastError> {
        item.deref().clone().into_runtime(rt)
    }
}

impl ReturnPolicy<Handle> for ByReference {
    fn to_object(rt: &Runtime, item: Handle) -> Result<Object, CastError> {
        Ok(Object::borrowed(rt, item)?)
    }
}

/// Host-type key of the iterator state for `I`.
type Declared<I> = PhantomData<fn() -> I>;

/// Registers the iterator-state host kind for `I`.
///
/// Idempotent: later calls return the id of the first declaration.
pub fn declare_iterator<I: Iterator + 'static>(rt: &Runtime) -> Result<HostTypeId, CastError> {
    Ok(rt.register_host_type::<Declared<I>>(type_name::<I>())?)
}

/// Wraps `iter` in a runtime iterator whose items are moved into the runtime.
pub fn make_iterator<I>(rt: &Runtime, iter: I) -> Result<Object, CastError>
where
    I: Iterator + 'static,
    I::Item: IntoObject,
{
    make_iterator_with::<ByMove, I>(rt, iter)
}

/// Wraps `iter` in a runtime iterator converting items with policy `P`.
///
/// Fails with [`CastError::IteratorNotDeclared`] unless [`declare_iterator`] was called for `I`
/// on this runtime.
pub fn make_iterator_with<P, I>(rt: &Runtime, iter: I) -> Result<Object, CastError>
where
    I: Iterator + 'static,
    P: ReturnPolicy<I::Item> + 'static,
{
    let host_type = rt
        .host_type::<Declared<I>>()
        .ok_or(CastError::IteratorNotDeclared {
            type_name: type_name::<I>(),
        })?;
    let state = IterState::<I, P> {
        iter,
        _policy: PhantomData,
    };
    Ok(rt.new_host_iter(host_type, state)?)
}

struct IterState<I, P> {
    iter: I,
    _policy: PhantomData<fn() -> P>,
}

impl<I, P> HostIter for IterState<I, P>
where
    I: Iterator,
    P: ReturnPolicy<I::Item>,
{
    fn next(&mut self, rt: &Runtime) -> Result<Option<Object>, ObjError> {
        let Some(item) = self.iter.next() else {
            return Ok(None);
        };
        P::to_object(rt, item).map(Some).map_err(into_obj_error)
    }
}

impl<I, P> fmt::Debug for IterState<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterState")
            .field("iter", &type_name::<I>())
            .finish_non_exhaustive()
    }
}

fn into_obj_error(err: CastError) -> ObjError {
    match err {
        CastError::Runtime(err) => err,
        other => ObjError::Host(Box::from(other.to_string())),
    }
}
