// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host values to runtime values.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use dynobj::{ObjError, Object, Runtime};

use crate::error::CastError;

/// Host values that can be stored in the runtime.
///
/// Typed views and [`Object`] hand over their existing reference; host values allocate a fresh
/// runtime value.
pub trait IntoObject {
    /// Produces an owned runtime reference for `self`.
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError>;
}

/// Hands over `obj` if it lives in `rt`.
pub(crate) fn owned_by(rt: &Runtime, obj: Object) -> Result<Object, CastError> {
    if !rt.ptr_eq(obj.runtime()) {
        return Err(ObjError::ForeignObject.into());
    }
    Ok(obj)
}

impl IntoObject for Object {
    #[inline]
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        owned_by(rt, self)
    }
}

impl IntoObject for &Object {
    #[inline]
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        if !rt.ptr_eq(self.runtime()) {
            return Err(ObjError::ForeignObject.into());
        }
        Ok(self.clone())
    }
}

macro_rules! int_into_object {
    ($($t:ty),+ $(,)?) => {
        $(
            impl IntoObject for $t {
                fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
                    Ok(rt.new_int(i64::from(self))?)
                }
            }
        )+
    };
}

int_into_object!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_into_object {
    ($($t:ty),+ $(,)?) => {
        $(
            impl IntoObject for $t {
                fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
                    match i64::try_from(self) {
                        Ok(v) => Ok(rt.new_int(v)?),
                        Err(_) => Err(CastError::Conversion {
                            target: <$t as crate::descr::TypeName>::DESCR,
                            found: dynobj::ObjKind::Int,
                        }),
                    }
                }
            }
        )+
    };
}

wide_int_into_object!(isize, u64, usize);

impl IntoObject for f64 {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_float(self)?)
    }
}

impl IntoObject for f32 {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_float(f64::from(self))?)
    }
}

impl IntoObject for bool {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_bool(self)?)
    }
}

impl IntoObject for () {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.none())
    }
}

impl IntoObject for &str {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_str(self)?)
    }
}

impl IntoObject for String {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_str(&self)?)
    }
}

impl IntoObject for &String {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_str(self)?)
    }
}

impl IntoObject for char {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        Ok(rt.new_str(self.encode_utf8(&mut [0_u8; 4]))?)
    }
}

impl<T: IntoObject> IntoObject for Option<T> {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        match self {
            Some(value) => value.into_runtime(rt),
            None => Ok(rt.none()),
        }
    }
}

impl<T: IntoObject> IntoObject for Vec<T> {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        let items = self
            .into_iter()
            .map(|item| item.into_runtime(rt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rt.new_list(items)?)
    }
}

impl<K: IntoObject, V: IntoObject> IntoObject for BTreeMap<K, V> {
    fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
        let dict = rt.new_dict()?;
        for (key, value) in self {
            rt.dict_set(dict.handle(), key.into_runtime(rt)?, value.into_runtime(rt)?)?;
        }
        Ok(dict)
    }
}

macro_rules! host_tuple_into_object {
    ($($T:ident $idx:tt),+) => {
        impl<$($T: IntoObject),+> IntoObject for ($($T,)+) {
            fn into_runtime(self, rt: &Runtime) -> Result<Object, CastError> {
                let items = [$(self.$idx.into_runtime(rt)?),+];
                Ok(rt.new_tuple(items)?)
            }
        }
    };
}

host_tuple_into_object!(A 0);
host_tuple_into_object!(A 0, B 1);
host_tuple_into_object!(A 0, B 1, C 2);
host_tuple_into_object!(A 0, B 1, C 2, D 3);
host_tuple_into_object!(A 0, B 1, C 2, D 3, E 4);
host_tuple_into_object!(A 0, B 1, C 2, D 3, E 4, F 5);
host_tuple_into_object!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
host_tuple_into_object!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn objects_from_another_runtime_are_refused() {
        let a = Runtime::new();
        let b = Runtime::new();
        let obj = b.new_str("zzz").unwrap();
        assert_eq!(
            (&obj).into_runtime(&a).unwrap_err(),
            CastError::Runtime(ObjError::ForeignObject)
        );
        assert_eq!(
            obj.clone().into_runtime(&a).unwrap_err(),
            CastError::Runtime(ObjError::ForeignObject)
        );
        assert_eq!(obj.ref_count().unwrap(), 1);
        assert!((&obj).into_runtime(&b).is_ok());
    }

    #[test]
    fn nested_host_values_build_runtime_values() {
        let rt = Runtime::new();
        let obj = vec![(1_i64, "a"), (2, "b")].into_runtime(&rt).unwrap();
        assert_eq!(obj.repr().unwrap(), "[(1, 'a'), (2, 'b')]");
    }

    #[test]
    fn option_none_is_the_singleton() {
        let rt = Runtime::new();
        let obj = Option::<i64>::None.into_runtime(&rt).unwrap();
        assert!(obj.is_none());
    }

    #[test]
    fn oversized_unsigned_fails() {
        let rt = Runtime::new();
        assert!(u64::MAX.into_runtime(&rt).is_err());
        assert_eq!(rt.live_objects(), 0);
    }

    #[test]
    fn map_keeps_key_order() {
        let rt = Runtime::new();
        let mut map = BTreeMap::new();
        map.insert("y", 2_i64);
        map.insert("x", 1);
        let obj = map.into_runtime(&rt).unwrap();
        assert_eq!(obj.repr().unwrap(), "{'x': 1, 'y': 2}");
    }
}
