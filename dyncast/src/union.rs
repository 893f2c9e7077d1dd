// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Union[T0, T1, ...]`: a value viewable as one of several alternatives.
//!
//! The held alternative is found in two passes over the declared alternatives: first without
//! conversions, then with them. Within a pass the first accepting alternative wins, so
//! `Union<(f64, i64)>` over the runtime value `1` selects `i64` (exact in the first pass) even
//! though `f64` is declared first.

use core::cell::Cell;
use core::fmt;
use core::marker::PhantomData;

use dynobj::{Handle, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, mismatch};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::into::{IntoObject, owned_by};
use crate::ownership::Ownership;
use crate::tuple::TupleIndex;

/// The alternatives of a [`Union`], implemented for Rust tuples of one to eight types.
pub trait UnionSpec {
    /// Alternative descriptors in declaration order.
    const ARGS: &'static [TypeDescr];

    /// Returns the first alternative accepting `h` under `convert`.
    fn find(rt: &Runtime, h: Handle, convert: bool) -> Option<usize>;

    /// Two-pass lookup: exact matches first, then conversions.
    fn find_index(rt: &Runtime, h: Handle) -> Option<usize> {
        Self::find(rt, h, false).or_else(|| Self::find(rt, h, true))
    }
}

/// A view of a runtime value accepted by at least one alternative of `S`.
pub struct Union<S> {
    obj: Object,
    index: Cell<Option<usize>>,
    _marker: PhantomData<fn() -> (S,)>,
}

impl<S> Union<S> {
    fn from_object(obj: Object) -> Self {
        Self {
            obj,
            index: Cell::new(None),
            _marker: PhantomData,
        }
    }

    /// Returns the underlying runtime reference.
    #[must_use]
    #[inline]
    pub fn as_object(&self) -> &Object {
        &self.obj
    }

    /// Gives up the view, returning the underlying runtime reference.
    #[must_use]
    #[inline]
    pub fn into_object(self) -> Object {
        self.obj
    }

    /// Returns the raw handle of the viewed value.
    #[must_use]
    #[inline]
    pub fn handle(&self) -> Handle {
        self.obj.handle()
    }

    /// Returns the runtime the viewed value lives in.
    #[must_use]
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        self.obj.runtime()
    }
}

impl<S: UnionSpec> Union<S> {
    /// Stores a host value and views it as a union.
    pub fn from_value<V: IntoObject>(rt: &Runtime, value: V) -> Result<Self, CastError>
    where
        Self: TypeName,
    {
        let obj = value.into_runtime(rt)?;
        if S::find_index(rt, obj.handle()).is_none() {
            return Err(mismatch::<Self>(rt, obj.handle()));
        }
        Ok(Self::from_object(obj))
    }

    /// Returns the index of the held alternative.
    ///
    /// Computed on first use and memoized. A value no alternative accepts reports
    /// [`CastError::BadVariantAccess`] with `held` set to the number of alternatives.
    pub fn index(&self) -> Result<usize, CastError>
    where
        Self: TypeName,
    {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let index = S::find_index(self.runtime(), self.handle()).ok_or(
            CastError::BadVariantAccess {
                requested: 0,
                held: S::ARGS.len(),
            },
        )?;
        self.index.set(Some(index));
        Ok(index)
    }

    /// Returns `true` if alternative `I` is held.
    pub fn holds<const I: usize>(&self) -> bool
    where
        Self: TypeName,
    {
        self.index() == Ok(I)
    }

    /// Converts the value as alternative `I`.
    ///
    /// Fails with [`CastError::BadVariantAccess`] if another alternative is held.
    pub fn get<const I: usize>(&self) -> Result<<S as TupleIndex<I>>::Output, CastError>
    where
        Self: TypeName,
        S: TupleIndex<I>,
        <S as TupleIndex<I>>::Output: FromObject,
    {
        let held = self.index()?;
        if held != I {
            return Err(CastError::BadVariantAccess { requested: I, held });
        }
        cast_from_handle(self.runtime(), self.handle())
    }
}

impl<S: UnionSpec> TypeName for Union<S> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Union",
        args: S::ARGS,
    };
}

impl<S: UnionSpec> FromObject for Union<S> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        S::find_index(rt, h).is_some()
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        let Some(index) = S::find_index(rt, h) else {
            let err = mismatch::<Self>(rt, h);
            own.release(rt, h);
            return Err(err);
        };
        let view = Self::from_object(own.acquire(rt, h)?);
        view.index.set(Some(index));
        Ok(view)
    }
}

impl<S> Clone for Union<S> {
    fn clone(&self) -> Self {
        Self {
            obj: self.obj.clone(),
            index: self.index.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S> IntoObject for Union<S> {
    #[inline]
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        owned_by(rt, self.obj)
    }
}

impl<S> fmt::Debug for Union<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Union")
            .field("value", &self.obj)
            .field("index", &self.index.get())
            .finish()
    }
}

macro_rules! union_spec {
    ($($T:ident),+) => {
        impl<$($T: FromObject),+> UnionSpec for ($($T,)+) {
            const ARGS: &'static [TypeDescr] = &[$($T::DESCR),+];

            fn find(rt: &Runtime, h: Handle, convert: bool) -> Option<usize> {
                let checks: &[fn(&Runtime, Handle, bool) -> bool] = &[$($T::accepts),+];
                checks.iter().position(|accepts| accepts(rt, h, convert))
            }
        }
    };
}

union_spec!(A);
union_spec!(A, B);
union_spec!(A, B, C);
union_spec!(A, B, C, D);
union_spec!(A, B, C, D, E);
union_spec!(A, B, C, D, E, F);
union_spec!(A, B, C, D, E, F, G);
union_spec!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::List;
    use crate::descr::descriptor;
    use alloc::string::String;

    type Scalar = Union<(String, i64, f64)>;

    #[test]
    fn descriptor_lists_alternatives() {
        assert_eq!(descriptor::<Scalar>(), "Union[str, int, float]");
        assert_eq!(
            descriptor::<Union<(List<i64>, ())>>(),
            "Union[List[int], None]"
        );
    }

    #[test]
    fn index_follows_runtime_kind() {
        let rt = Runtime::new();
        let n = rt.new_int(13).unwrap();
        let f = rt.new_float(17.624).unwrap();
        let s = rt.new_str("").unwrap();
        assert_eq!(cast_from_handle::<Scalar>(&rt, n.handle()).unwrap().index(), Ok(1));
        assert_eq!(cast_from_handle::<Scalar>(&rt, f.handle()).unwrap().index(), Ok(2));
        assert_eq!(cast_from_handle::<Scalar>(&rt, s.handle()).unwrap().index(), Ok(0));
    }

    #[test]
    fn exact_match_beats_earlier_conversion() {
        let rt = Runtime::new();
        let n = rt.new_int(1).unwrap();
        let u: Union<(f64, i64)> = cast_from_handle(&rt, n.handle()).unwrap();
        assert_eq!(u.index(), Ok(1));
        assert_eq!(u.get::<1>().unwrap(), 1);
        assert_eq!(
            u.get::<0>().unwrap_err(),
            CastError::BadVariantAccess {
                requested: 0,
                held: 1
            }
        );
    }

    #[test]
    fn conversion_is_the_fallback() {
        let rt = Runtime::new();
        let n = rt.new_int(2).unwrap();
        let u: Union<(String, f64)> = cast_from_handle(&rt, n.handle()).unwrap();
        assert!(u.holds::<1>());
        assert_eq!(u.get::<1>().unwrap(), 2.0);
    }

    #[test]
    fn no_alternative_is_a_mismatch() {
        let rt = Runtime::new();
        let l = rt.new_list(alloc::vec::Vec::<Object>::new()).unwrap();
        assert!(cast_from_handle::<Union<(i64, String)>>(&rt, l.handle()).is_err());
        assert_eq!(l.ref_count().unwrap(), 1);
    }

    #[test]
    fn unmatched_value_has_no_valid_index() {
        let rt = Runtime::new();
        let l = rt.new_list(alloc::vec::Vec::<Object>::new()).unwrap();
        let u = Union::<(i64, String)>::from_object(l);
        let err = CastError::BadVariantAccess {
            requested: 0,
            held: 2,
        };
        assert_eq!(u.index(), Err(err.clone()));
        assert!(!u.holds::<0>());
        assert_eq!(u.get::<1>().unwrap_err(), err);
        assert_eq!(u.index.get(), None);
    }

    #[test]
    fn foreign_union_is_refused() {
        let a = Runtime::new();
        let b = Runtime::new();
        let u = Scalar::from_value(&b, 3_i64).unwrap();
        assert_eq!(
            u.into_runtime(&a).unwrap_err(),
            CastError::Runtime(dynobj::ObjError::ForeignObject)
        );
    }

    #[test]
    fn from_value_memoizes_lazily() {
        let rt = Runtime::new();
        let u = Scalar::from_value(&rt, "hi").unwrap();
        assert_eq!(u.index.get(), None);
        assert_eq!(u.index(), Ok(0));
        assert_eq!(u.index.get(), Some(0));
        assert_eq!(u.get::<0>().unwrap(), "hi");
    }
}
