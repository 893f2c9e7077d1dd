// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use dyncast::{
    CastError, Custom, Dict, IntoObject, List, Optional, Tuple, TypeDescr, TypeName, Union,
    cast_from_handle,
};
use dyncast_conformance::{count_scopes, tuple_of};
use dynobj::{Runtime, ScopeKind};

#[test]
fn list_round_trip_preserves_order() {
    let rt = Runtime::new();
    let values = vec![3_i64, 1, 2];
    let list = List::from_values(&rt, values.clone()).unwrap();
    let back: Vec<i64> = cast_from_handle(&rt, list.handle()).unwrap();
    assert_eq!(back, values);
}

#[test]
fn dict_round_trip_preserves_pairs() {
    let rt = Runtime::new();
    let pairs: BTreeMap<String, f64> = [("b".into(), 2.0), ("a".into(), 1.0)].into();
    let obj = pairs.clone().into_runtime(&rt).unwrap();
    let dict: Dict<String, f64> = cast_from_handle(&rt, obj.handle()).unwrap();
    let back: BTreeMap<String, f64> = dict.iter().map(Result::unwrap).collect();
    assert_eq!(back, pairs);
    let eager: BTreeMap<String, f64> = cast_from_handle(&rt, obj.handle()).unwrap();
    assert_eq!(eager, pairs);
}

#[test]
fn nested_views_convert_lazily() {
    let rt = Runtime::new();
    let inner = List::from_values(&rt, [1_i64, 2]).unwrap();
    let dict = Dict::<String, List<i64>>::new(&rt).unwrap();
    dict.insert("xs".into(), inner).unwrap();

    let sink = count_scopes(&rt);
    let xs = dict.get("xs").unwrap();
    assert_eq!(sink.borrow().labels(ScopeKind::Convert), ["List[int]"]);
    assert_eq!(xs.get(1).unwrap(), 2);
    assert_eq!(sink.borrow().count(ScopeKind::Convert), 2);
}

#[test]
fn tuple_access_and_length_mismatch() {
    let rt = Runtime::new();
    let t = Tuple::<(i64, f64)>::from_values(&rt, (4, 2.5)).unwrap();
    assert_eq!(t.get::<0>().unwrap(), 4);
    assert_eq!(t.get::<1>().unwrap(), 2.5);

    let triple = tuple_of(
        &rt,
        vec![
            rt.new_int(1).unwrap(),
            rt.new_int(2).unwrap(),
            rt.new_int(3).unwrap(),
        ],
    );
    assert_eq!(
        cast_from_handle::<Tuple<(i64, f64)>>(&rt, triple.handle()).unwrap_err(),
        CastError::LengthMismatch {
            expected: 2,
            found: 3
        }
    );
    assert_eq!(triple.ref_count().unwrap(), 1);
}

#[test]
fn optional_round_trip() {
    let rt = Runtime::new();
    let some = Optional::some(&rt, 7_i64).unwrap();
    let back: Optional<i64> = cast_from_handle(&rt, some.handle()).unwrap();
    assert_eq!(back.into_option().unwrap(), Some(7));

    let none = Optional::<i64>::none(&rt);
    let back: Optional<i64> = cast_from_handle(&rt, none.handle()).unwrap();
    assert_eq!(back.value().unwrap_err(), CastError::BadOptionalAccess);
}

#[test]
fn union_prefers_exact_matches() {
    let rt = Runtime::new();
    type Scalar = Union<(String, i64, f64)>;
    let cases = [
        (rt.new_int(13).unwrap(), 1),
        (rt.new_float(17.624).unwrap(), 2),
        (rt.new_str("").unwrap(), 0),
    ];
    for (obj, expected) in &cases {
        let u: Scalar = cast_from_handle(&rt, obj.handle()).unwrap();
        assert_eq!(u.index().unwrap(), *expected);
    }

    let n = rt.new_int(3).unwrap();
    let u: Union<(f64, i64)> = cast_from_handle(&rt, n.handle()).unwrap();
    assert_eq!(u.index().unwrap(), 1);
    let u: Union<(String, f64)> = cast_from_handle(&rt, n.handle()).unwrap();
    assert_eq!(u.index().unwrap(), 1);
    assert_eq!(u.get::<1>().unwrap(), 3.0);
    assert_eq!(
        u.get::<0>().unwrap_err(),
        CastError::BadVariantAccess {
            requested: 0,
            held: 1
        }
    );
}

#[derive(Debug, PartialEq)]
struct Celsius(f64);

impl TypeName for Celsius {
    const DESCR: TypeDescr = TypeDescr::Leaf("Celsius");
}

#[test]
fn custom_objects_travel_through_containers() {
    let rt = Runtime::new();
    rt.register_host_type::<Celsius>("Celsius").unwrap();
    let list = List::<Custom<Celsius>>::new(&rt).unwrap();
    list.append(Custom::new(&rt, Celsius(21.5)).unwrap()).unwrap();
    let first = list.get(0).unwrap();
    assert_eq!(*first.get().unwrap(), Celsius(21.5));
    assert!(list.append_object(rt.new_float(1.0).unwrap()).is_err());
}
