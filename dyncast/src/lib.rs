// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `dyncast`: checked, lazily converting typed views over [`dynobj`] runtime values.
//!
//! Host code declares the shape it expects as a Rust type, such as `Dict<String, List<i64>>`,
//! and converts a runtime value with [`cast_from_handle`] (the caller keeps its reference) or
//! [`cast_from_handle_steal`] (the caller hands its reference over). Conversion checks only the
//! outermost structure; elements are converted lazily, one at a time, as they are read.
//!
//! ```
//! use dynobj::Runtime;
//! use dyncast::{IntoObject, List, cast_from_handle};
//!
//! let rt = Runtime::new();
//! let obj = vec![1_i64, 2, 3].into_runtime(&rt)?;
//! let list: List<i64> = cast_from_handle(&rt, obj.handle())?;
//! list.append(4)?;
//! let total: i64 = list.iter().map(Result::unwrap).sum();
//! assert_eq!(total, 10);
//! # Ok::<(), dyncast::CastError>(())
//! ```
//!
//! ## Views
//!
//! | type | accepts | descriptor |
//! |---|---|---|
//! | [`List<T>`] | lists | `List[T]` |
//! | [`Dict<K, V>`] | dicts | `Dict[K, V]` |
//! | [`Tuple<(A, B, ...)>`](Tuple) | tuples of matching arity | `Tuple[A, B, ...]` |
//! | [`Optional<T>`] | `None` or `T` | `Optional[T]` |
//! | [`Union<(A, B, ...)>`](Union) | any alternative | `Union[A, B, ...]` |
//! | [`Iter<T>`] | iterators | `Iterator[T]` |
//! | [`Iterable<T>`] | anything iterable | `Iterable[T]` |
//! | [`Sequence<T>`] | lists, tuples, strings, protocol sequences | `Sequence[T]` |
//! | [`Custom<T>`] | host objects holding `T` | `T`'s own name |
//! | [`Any`] | everything | `Any` |
//!
//! Host scalars (`i64`, `f64`, `bool`, `String`, ...) and host composites (`Vec<T>`,
//! `Option<T>`, `BTreeMap<K, V>`, tuples) convert eagerly instead.
//!
//! Every conversion runs in a [`dynobj::ScopeKind::Convert`] trace scope.
//!
//! This crate is `no_std + alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod view;

pub mod adapter;
pub mod cast;
mod custom;
pub mod descr;
mod dict;
pub mod error;
pub mod into;
pub mod iter;
mod iterable;
mod iterator;
mod list;
mod optional;
pub mod ownership;
mod sequence;
pub mod signature;
mod tuple;
mod union;

pub use adapter::{
    ByCopy, ByMove, ByReference, ReturnPolicy, declare_iterator, make_iterator,
    make_iterator_with,
};
pub use cast::{FromObject, cast_from_handle, cast_from_handle_steal};
pub use custom::Custom;
pub use descr::{TypeDescr, TypeName, descriptor};
pub use dict::{Dict, DictIter, KeysIter};
pub use error::CastError;
pub use into::IntoObject;
pub use iter::{CastIter, Cursor, Position};
pub use iterable::{Iterable, IterableIter};
pub use iterator::{Iter, IterIter};
pub use list::{List, ListIter};
pub use optional::Optional;
pub use ownership::{Borrowed, Ownership, Stolen};
pub use sequence::{Sequence, SequenceIter};
pub use signature::Signature;
pub use tuple::{Tuple, TupleIndex, TupleIter, TupleSpec};
pub use union::{Union, UnionSpec};

/// The universal view: any runtime value, unchecked.
pub type Any = dynobj::Object;
