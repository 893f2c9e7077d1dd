// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use dyncast::{
    ByReference, CastError, Iter, Iterable, List, Tuple, cast_from_handle_steal,
    declare_iterator, make_iterator, make_iterator_with,
};
use dyncast_conformance::count_scopes;
use dynobj::{Handle, ObjKind, Runtime, ScopeKind};

type Words = std::vec::IntoIter<String>;

#[test]
fn host_iterator_round_trips_through_the_runtime() {
    let rt = Runtime::new();
    declare_iterator::<Words>(&rt).unwrap();
    let words = vec!["a".to_string(), "b".to_string()];
    let obj = make_iterator(&rt, words.into_iter()).unwrap();
    assert_eq!(obj.kind().unwrap(), ObjKind::Iterator);

    let it: Iter<String> = cast_from_handle_steal(obj).unwrap();
    let back: Vec<String> = it.into_iter().map(Result::unwrap).collect();
    assert_eq!(back, ["a", "b"]);
}

#[test]
fn undeclared_types_are_reported_by_name() {
    let rt = Runtime::new();
    let err = make_iterator(&rt, vec![1_i64].into_iter()).unwrap_err();
    let CastError::IteratorNotDeclared { type_name } = err else {
        panic!("unexpected error: {err:?}");
    };
    assert!(type_name.contains("IntoIter"));
}

#[test]
fn runtime_can_coerce_host_iterators() {
    let rt = Runtime::new();
    declare_iterator::<core::ops::Range<i64>>(&rt).unwrap();
    let obj = make_iterator(&rt, 0_i64..3).unwrap();
    let t = Tuple::<(i64, i64, i64)>::from_sequence(&obj).unwrap();
    assert_eq!(t.get::<2>().unwrap(), 2);
}

#[test]
fn host_calls_are_traced() {
    let rt = Runtime::new();
    declare_iterator::<core::ops::Range<i64>>(&rt).unwrap();
    let obj = make_iterator(&rt, 0_i64..2).unwrap();
    let iterable: Iterable<i64> = cast_from_handle_steal(obj).unwrap();
    let sink = count_scopes(&rt);
    assert_eq!(iterable.iter().unwrap().count(), 2);
    let sink = sink.borrow();
    // Two items plus the final exhausted step.
    assert_eq!(sink.count(ScopeKind::IterStep), 3);
    assert_eq!(sink.count(ScopeKind::HostCall), 3);
    assert_eq!(sink.count(ScopeKind::Convert), 2);
}

#[test]
fn referenced_items_keep_identity() {
    let rt = Runtime::new();
    let shared = List::from_values(&rt, [1_i64]).unwrap();
    type Handles = std::vec::IntoIter<Handle>;
    declare_iterator::<Handles>(&rt).unwrap();
    let handles = vec![shared.handle(), shared.handle()];
    let obj = make_iterator_with::<ByReference, Handles>(&rt, handles.into_iter()).unwrap();
    let it: Iter<List<i64>> = cast_from_handle_steal(obj).unwrap();
    for list in it {
        assert_eq!(list.unwrap().handle(), shared.handle());
    }
    assert_eq!(shared.as_object().ref_count().unwrap(), 1);
}
