// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The conversion primitive.
//!
//! [`cast_from_handle`] and [`cast_from_handle_steal`] turn a runtime value into a typed host
//! value. What happens depends on the target type:
//!
//! - [`Object`] (alias [`Any`](crate::Any)): identity, no check.
//! - Typed views such as [`List`](crate::List): the view's structural check runs and, on success,
//!   the view takes a reference to the same runtime value. Elements are not inspected.
//! - Host scalars (`i64`, `f64`, `bool`, `String`, `()` ...): native extraction.
//! - Host composites (`Vec<T>`, `Option<T>`, `(A, B, ...)`, `BTreeMap<K, V>`): eager, recursive
//!   extraction into a fresh host value.
//!
//! Every conversion runs inside a [`ScopeKind::Convert`] trace scope labelled with the target
//! descriptor.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use dynobj::{Handle, ObjKind, Object, Runtime, ScopeKind};

use crate::descr::TypeName;
use crate::error::CastError;
use crate::ownership::{Borrowed, Ownership, Stolen};

/// Types that can be produced from a runtime value.
///
/// Implementations must honor the ownership contract of `own`: a [`Stolen`] handle is either kept
/// in the result or released, whether or not the conversion succeeds.
pub trait FromObject: TypeName + Sized {
    /// Returns `true` if `h` would convert.
    ///
    /// `convert = false` restricts host scalars to exact kinds (`int` for integers, `float` for
    /// floats, `bool` for booleans); typed views ignore the flag.
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool;

    /// Converts `h`, taking ownership as described by `own`.
    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError>;
}

/// Converts a borrowed handle into `T`.
///
/// On failure the reference count of `h` is unchanged.
pub fn cast_from_handle<T: FromObject>(rt: &Runtime, h: Handle) -> Result<T, CastError> {
    rt.scoped(ScopeKind::Convert, &T::DESCR, || T::from_handle(rt, h, Borrowed))
}

/// Converts an owned reference into `T`, consuming its count.
///
/// On failure the count is released.
pub fn cast_from_handle_steal<T: FromObject>(obj: Object) -> Result<T, CastError> {
    let rt = obj.runtime().clone();
    let h = obj.into_raw();
    rt.scoped(ScopeKind::Convert, &T::DESCR, || T::from_handle(&rt, h, Stolen))
}

pub(crate) fn mismatch<T: TypeName>(rt: &Runtime, h: Handle) -> CastError {
    match rt.kind(h) {
        Ok(found) => CastError::TypeMismatch {
            expected: T::DESCR,
            found,
        },
        Err(err) => err.into(),
    }
}

fn conversion<T: TypeName>(rt: &Runtime, h: Handle) -> CastError {
    match rt.kind(h) {
        Ok(found) => CastError::Conversion {
            target: T::DESCR,
            found,
        },
        Err(err) => err.into(),
    }
}

/// Checks `h` against `T` and wraps an owned reference with `wrap`.
pub(crate) fn view<T, O>(
    rt: &Runtime,
    h: Handle,
    own: O,
    wrap: impl FnOnce(Object) -> T,
) -> Result<T, CastError>
where
    T: FromObject,
    O: Ownership,
{
    if !T::accepts(rt, h, true) {
        let err = mismatch::<T>(rt, h);
        own.release(rt, h);
        return Err(err);
    }
    Ok(wrap(own.acquire(rt, h)?))
}

/// Finishes an extraction that does not keep the runtime value.
fn extracted<T, O>(rt: &Runtime, h: Handle, own: O, value: Option<T>) -> Result<T, CastError>
where
    T: TypeName,
    O: Ownership,
{
    let result = value.ok_or_else(|| conversion::<T>(rt, h));
    own.release(rt, h);
    result
}

/// Finishes an eager extraction whose result was computed by `f`.
fn eager<T, O>(
    rt: &Runtime,
    h: Handle,
    own: O,
    f: impl FnOnce() -> Result<T, CastError>,
) -> Result<T, CastError>
where
    O: Ownership,
{
    let result = f();
    own.release(rt, h);
    result
}

enum Scalar {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Other,
}

fn scalar(rt: &Runtime, h: Handle) -> Scalar {
    let value = match rt.kind(h) {
        Ok(ObjKind::None) => return Scalar::None,
        Ok(ObjKind::Bool) => rt.bool_value(h).map(Scalar::Bool),
        Ok(ObjKind::Int) => rt.int_value(h).map(Scalar::Int),
        Ok(ObjKind::Float) => rt.float_value(h).map(Scalar::Float),
        _ => return Scalar::Other,
    };
    value.unwrap_or(Scalar::Other)
}

fn extract_int(rt: &Runtime, h: Handle) -> Option<i64> {
    match scalar(rt, h) {
        Scalar::Int(v) => Some(v),
        Scalar::Bool(v) => Some(i64::from(v)),
        _ => None,
    }
}

fn extract_float(rt: &Runtime, h: Handle, convert: bool) -> Option<f64> {
    match scalar(rt, h) {
        Scalar::Float(v) => Some(v),
        Scalar::Int(v) if convert => Some(v as f64),
        Scalar::Bool(v) if convert => Some(f64::from(u8::from(v))),
        _ => None,
    }
}

fn extract_bool(rt: &Runtime, h: Handle, convert: bool) -> Option<bool> {
    match scalar(rt, h) {
        Scalar::Bool(v) => Some(v),
        Scalar::None if convert => Some(false),
        Scalar::Int(v) if convert => Some(v != 0),
        Scalar::Float(v) if convert => Some(v != 0.0),
        _ => None,
    }
}

macro_rules! int_from_object {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromObject for $t {
                fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
                    extract_int(rt, h).is_some_and(|v| Self::try_from(v).is_ok())
                }

                fn from_handle<O: Ownership>(
                    rt: &Runtime,
                    h: Handle,
                    own: O,
                ) -> Result<Self, CastError> {
                    let value = extract_int(rt, h).and_then(|v| Self::try_from(v).ok());
                    extracted(rt, h, own, value)
                }
            }
        )+
    };
}

int_from_object!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromObject for f64 {
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool {
        extract_float(rt, h, convert).is_some()
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        extracted(rt, h, own, extract_float(rt, h, true))
    }
}

impl FromObject for f32 {
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool {
        extract_float(rt, h, convert).is_some()
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        #[allow(clippy::cast_possible_truncation, reason = "narrowing to f32 is requested")]
        let value = extract_float(rt, h, true).map(|v| v as Self);
        extracted(rt, h, own, value)
    }
}

impl FromObject for bool {
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool {
        extract_bool(rt, h, convert).is_some()
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        extracted(rt, h, own, extract_bool(rt, h, true))
    }
}

impl FromObject for alloc::string::String {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::Str)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        extracted(rt, h, own, rt.str_value(h).ok())
    }
}

impl FromObject for char {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.str_value(h).is_ok_and(|s| s.chars().count() == 1)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        let value = rt.str_value(h).ok().and_then(|s| {
            let mut chars = s.chars();
            let c = chars.next()?;
            chars.next().is_none().then_some(c)
        });
        extracted(rt, h, own, value)
    }
}

impl FromObject for () {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.is_none(h)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        extracted(rt, h, own, rt.is_none(h).then_some(()))
    }
}

impl FromObject for Object {
    fn accepts(_rt: &Runtime, _h: Handle, _convert: bool) -> bool {
        true
    }

    #[inline]
    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        Ok(own.acquire(rt, h)?)
    }
}

// Eager host composites.

fn is_host_sequence(rt: &Runtime, h: Handle) -> bool {
    rt.is_sequence(h) && rt.kind(h) != Ok(ObjKind::Str)
}

fn item<T: FromObject>(rt: &Runtime, h: Handle, index: usize) -> Result<T, CastError> {
    cast_from_handle_steal(rt.sequence_get_item(h, index)?)
}

impl<T: FromObject> FromObject for Vec<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        is_host_sequence(rt, h)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        if !is_host_sequence(rt, h) {
            let err = mismatch::<Self>(rt, h);
            own.release(rt, h);
            return Err(err);
        }
        eager(rt, h, own, || {
            let len = rt.sequence_len(h)?;
            (0..len).map(|i| item(rt, h, i)).collect()
        })
    }
}

impl<T: FromObject> FromObject for Option<T> {
    fn accepts(rt: &Runtime, h: Handle, convert: bool) -> bool {
        rt.is_none(h) || T::accepts(rt, h, convert)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        if rt.is_none(h) {
            own.release(rt, h);
            return Ok(None);
        }
        T::from_handle(rt, h, own).map(Some)
    }
}

impl<K, V> FromObject for BTreeMap<K, V>
where
    K: FromObject + Ord,
    V: FromObject,
{
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::Dict)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        if !Self::accepts(rt, h, true) {
            let err = mismatch::<Self>(rt, h);
            own.release(rt, h);
            return Err(err);
        }
        eager(rt, h, own, || {
            let mut out = Self::new();
            for i in 0..rt.dict_len(h)? {
                let (key, value) = rt.dict_entry(h, i)?;
                out.insert(cast_from_handle(rt, key)?, cast_from_handle(rt, value)?);
            }
            Ok(out)
        })
    }
}

macro_rules! host_tuple_from_object {
    ($len:literal; $($T:ident $idx:tt),+) => {
        impl<$($T: FromObject),+> FromObject for ($($T,)+) {
            fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
                is_host_sequence(rt, h) && rt.sequence_len(h) == Ok($len)
            }

            fn from_handle<O: Ownership>(
                rt: &Runtime,
                h: Handle,
                own: O,
            ) -> Result<Self, CastError> {
                if !is_host_sequence(rt, h) {
                    let err = mismatch::<Self>(rt, h);
                    own.release(rt, h);
                    return Err(err);
                }
                eager(rt, h, own, || {
                    let found = rt.sequence_len(h)?;
                    if found != $len {
                        return Err(CastError::LengthMismatch {
                            expected: $len,
                            found,
                        });
                    }
                    Ok(($(item::<$T>(rt, h, $idx)?,)+))
                })
            }
        }
    };
}

host_tuple_from_object!(1; A 0);
host_tuple_from_object!(2; A 0, B 1);
host_tuple_from_object!(3; A 0, B 1, C 2);
host_tuple_from_object!(4; A 0, B 1, C 2, D 3);
host_tuple_from_object!(5; A 0, B 1, C 2, D 3, E 4);
host_tuple_from_object!(6; A 0, B 1, C 2, D 3, E 4, F 5);
host_tuple_from_object!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
host_tuple_from_object!(8; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
