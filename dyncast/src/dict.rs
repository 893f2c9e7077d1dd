// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Dict[K, V]`: a typed view of a runtime dict.

use core::marker::PhantomData;

use dynobj::{Handle, ObjKind, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::into::IntoObject;
use crate::iter::{CastIter, DictCursor, IterCursor};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime dict whose keys convert to `K` and values to `V`.
pub struct Dict<K, V> {
    obj: Object,
    _marker: PhantomData<fn() -> (K, V)>,
}

view_common!(Dict<K, V>);

/// Iterator over the `(key, value)` entries of a [`Dict`].
pub type DictIter<K, V> = CastIter<DictCursor<K, V>>;

/// Iterator over the keys of a [`Dict`].
pub type KeysIter<K> = CastIter<IterCursor<K>>;

impl<K, V> Dict<K, V> {
    /// Creates an empty dict.
    pub fn new(rt: &Runtime) -> Result<Self, CastError> {
        Ok(Self::from_object(rt.new_dict()?))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runtime().dict_len(self.handle()).unwrap_or(0)
    }

    /// Returns `true` if the dict has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the dict has an entry for `key`.
    ///
    /// `key` can be any host value; it is converted to a runtime value for the lookup.
    pub fn contains<Q: IntoObject>(&self, key: Q) -> Result<bool, CastError> {
        let key = key.into_runtime(self.runtime())?;
        Ok(self.runtime().dict_contains(self.handle(), key.handle())?)
    }
}

impl<K: FromObject, V: FromObject> Dict<K, V> {
    /// Builds a dict from host key/value pairs. Later duplicates replace earlier values.
    pub fn from_pairs<I>(rt: &Runtime, pairs: I) -> Result<Self, CastError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoObject,
        V: IntoObject,
    {
        let dict = Self::new(rt)?;
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    /// Converts the value stored under `key`.
    pub fn get<Q: IntoObject>(&self, key: Q) -> Result<V, CastError> {
        let rt = self.runtime();
        let key = key.into_runtime(rt)?;
        let value = rt
            .dict_get(self.handle(), key.handle())?
            .ok_or(CastError::Key)?;
        cast_from_handle(rt, value)
    }

    /// Stores `key -> value`.
    pub fn insert(&self, key: K, value: V) -> Result<(), CastError>
    where
        K: IntoObject,
        V: IntoObject,
    {
        let rt = self.runtime();
        let key = key.into_runtime(rt)?;
        let value = value.into_runtime(rt)?;
        Ok(rt.dict_set(self.handle(), key, value)?)
    }

    /// Returns an iterator over `(key, value)` entries in insertion order.
    pub fn iter(&self) -> DictIter<K, V> {
        CastIter::new(DictCursor::new(self.obj.clone(), 0))
    }

    /// Returns an iterator positioned past the last entry.
    pub fn end(&self) -> DictIter<K, V> {
        CastIter::at_end(DictCursor::new(self.obj.clone(), self.len()))
    }

    /// Returns an iterator over the keys, driven by the runtime iteration protocol.
    pub fn keys(&self) -> Result<KeysIter<K>, CastError> {
        let iter = self.runtime().get_iter(self.handle())?;
        Ok(CastIter::new(IterCursor::new(iter)))
    }
}

impl<K: TypeName, V: TypeName> TypeName for Dict<K, V> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Dict",
        args: &[K::DESCR, V::DESCR],
    };
}

impl<K: TypeName, V: TypeName> FromObject for Dict<K, V> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.kind(h) == Ok(ObjKind::Dict)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}

impl<K: FromObject, V: FromObject> IntoIterator for &Dict<K, V> {
    type Item = Result<(K, V), CastError>;
    type IntoIter = DictIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::List;
    use crate::descr::descriptor;
    use alloc::string::String;
    use alloc::vec::Vec;

    #[test]
    fn descriptor_nests() {
        assert_eq!(descriptor::<Dict<String, i64>>(), "Dict[str, int]");
        assert_eq!(
            descriptor::<Dict<String, List<i64>>>(),
            "Dict[str, List[int]]"
        );
    }

    #[test]
    fn lookup_by_host_key() {
        let rt = Runtime::new();
        let d = Dict::<String, i64>::from_pairs(&rt, [("a".into(), 1), ("b".into(), 2)]).unwrap();
        assert_eq!(d.get("b").unwrap(), 2);
        assert!(d.contains("a").unwrap());
        assert!(!d.contains("z").unwrap());
        assert_eq!(d.get("z").unwrap_err(), CastError::Key);
    }

    #[test]
    fn iterates_pairs_and_keys() {
        let rt = Runtime::new();
        let d = Dict::<String, f64>::from_pairs(&rt, [("x".into(), 1.0), ("y".into(), 2.0)])
            .unwrap();
        let pairs: Vec<(String, f64)> = d.iter().map(Result::unwrap).collect();
        assert_eq!(pairs, [("x".into(), 1.0), ("y".into(), 2.0)]);
        let keys: Vec<String> = d.keys().unwrap().map(Result::unwrap).collect();
        assert_eq!(keys, ["x", "y"]);
    }

    #[test]
    fn insert_replaces_value() {
        let rt = Runtime::new();
        let d = Dict::<i64, String>::new(&rt).unwrap();
        d.insert(1, "one".into()).unwrap();
        d.insert(1, "uno".into()).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.get(1_i64).unwrap(), "uno");
        assert_eq!(rt.live_objects(), 3);
    }

    #[test]
    fn lookup_leaves_no_temporaries() {
        let rt = Runtime::new();
        let d = Dict::<String, i64>::from_pairs(&rt, [("k".into(), 1)]).unwrap();
        let before = rt.live_objects();
        let _ = d.get("missing");
        let _ = d.contains("k");
        assert_eq!(rt.live_objects(), before);
    }
}
