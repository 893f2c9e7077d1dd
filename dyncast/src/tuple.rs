// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Tuple[T0, T1, ...]`: a typed view of a fixed-arity runtime tuple.
//!
//! The element types are given as a Rust tuple type: `Tuple<(i64, f64)>` views `Tuple[int,
//! float]`, `Tuple<()>` views the empty tuple.

use alloc::vec::Vec;
use core::marker::PhantomData;

use dynobj::{Handle, ObjKind, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, mismatch};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::into::IntoObject;
use crate::iter::{CastIter, IndexCursor, Indexed};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A list of element types, implemented for Rust tuples of up to eight elements.
pub trait TupleSpec {
    /// Number of elements.
    const ARITY: usize;
    /// Element descriptors in order.
    const ARGS: &'static [TypeDescr];
}

/// Element `I` of a [`TupleSpec`].
pub trait TupleIndex<const I: usize>: TupleSpec {
    /// The element type at index `I`.
    type Output;
}

/// A view of a runtime tuple whose elements convert to the types listed in `S`.
pub struct Tuple<S> {
    obj: Object,
    _marker: PhantomData<fn() -> (S,)>,
}

view_common!(Tuple<S>);

/// Iterator over the elements of a homogeneous [`Tuple`], converting each to `T`.
pub type TupleIter<T> = CastIter<IndexCursor<T>>;

impl<S: TupleSpec> Tuple<S> {
    /// Builds a tuple from host values.
    pub fn from_values(rt: &Runtime, values: S) -> Result<Self, CastError>
    where
        S: IntoObject,
    {
        // `()` converts to `None` on its own.
        if S::ARITY == 0 {
            return Ok(Self::from_object(rt.new_tuple(Vec::<Object>::new())?));
        }
        Ok(Self::from_object(values.into_runtime(rt)?))
    }

    /// Coerces any iterable runtime value (list, string, protocol sequence, ...) to a tuple and
    /// checks its length.
    pub fn from_sequence(obj: &Object) -> Result<Self, CastError> {
        let rt = obj.runtime();
        if !rt.has_iter(obj.handle()) {
            return Err(mismatch::<Self>(rt, obj.handle()));
        }
        let tuple = rt.to_tuple(obj.handle())?;
        check_len::<S>(rt, tuple.handle())?;
        Ok(Self::from_object(tuple))
    }

    /// Returns the number of elements (always `S::ARITY`).
    #[must_use]
    pub fn len(&self) -> usize {
        S::ARITY
    }

    /// Returns `true` for the empty tuple.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        S::ARITY == 0
    }

    /// Converts element `I`.
    pub fn get<const I: usize>(&self) -> Result<<S as TupleIndex<I>>::Output, CastError>
    where
        S: TupleIndex<I>,
        <S as TupleIndex<I>>::Output: FromObject,
    {
        let rt = self.runtime();
        let h = rt.tuple_get(self.handle(), I)?;
        cast_from_handle(rt, h)
    }

    /// Iterates the elements, converting each to `T`.
    ///
    /// Useful for homogeneous tuples and for `T = Object`.
    pub fn iter_as<T: FromObject>(&self) -> TupleIter<T> {
        CastIter::new(IndexCursor::new(self.obj.clone(), Indexed::Tuple, 0))
    }
}

fn check_len<S: TupleSpec>(rt: &Runtime, h: Handle) -> Result<(), CastError> {
    let found = rt.tuple_len(h)?;
    if found != S::ARITY {
        return Err(CastError::LengthMismatch {
            expected: S::ARITY,
            found,
        });
    }
    Ok(())
}

impl<S: TupleSpec> TypeName for Tuple<S> {
    const DESCR: TypeDescr = if S::ARITY == 0 {
        TypeDescr::EmptyTuple
    } else {
        TypeDescr::Generic {
            head: "Tuple",
            args: S::ARGS,
        }
    };
}

impl<S: TupleSpec> FromObject for Tuple<S> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::Tuple) && rt.tuple_len(h) == Ok(S::ARITY)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        let checked = if rt.kind(h) == Ok(ObjKind::Tuple) {
            check_len::<S>(rt, h)
        } else {
            Err(mismatch::<Self>(rt, h))
        };
        if let Err(err) = checked {
            own.release(rt, h);
            return Err(err);
        }
        Ok(Self::from_object(own.acquire(rt, h)?))
    }
}

impl TupleSpec for () {
    const ARITY: usize = 0;
    const ARGS: &'static [TypeDescr] = &[];
}

macro_rules! tuple_index {
    (($($T:ident),+) $idx:literal $Out:ident) => {
        impl<$($T: TypeName),+> TupleIndex<$idx> for ($($T,)+) {
            type Output = $Out;
        }
    };
}

macro_rules! tuple_spec {
    (@spec $len:literal; ($($T:ident),+)) => {
        impl<$($T: TypeName),+> TupleSpec for ($($T,)+) {
            const ARITY: usize = $len;
            const ARGS: &'static [TypeDescr] = &[$($T::DESCR),+];
        }
    };
    ($len:literal; $tys:tt; $($idx:literal => $Out:ident),+) => {
        tuple_spec!(@spec $len; $tys);
        $(tuple_index!($tys $idx $Out);)+
    };
}

tuple_spec!(1; (A); 0 => A);
tuple_spec!(2; (A, B); 0 => A, 1 => B);
tuple_spec!(3; (A, B, C); 0 => A, 1 => B, 2 => C);
tuple_spec!(4; (A, B, C, D); 0 => A, 1 => B, 2 => C, 3 => D);
tuple_spec!(5; (A, B, C, D, E); 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
tuple_spec!(6; (A, B, C, D, E, F); 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
tuple_spec!(7; (A, B, C, D, E, F, G); 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
tuple_spec!(8; (A, B, C, D, E, F, G, H);
    0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
