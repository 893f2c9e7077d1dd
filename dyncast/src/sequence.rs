// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Sequence[T]`: anything supporting length and indexed item lookup.

use core::marker::PhantomData;

use dynobj::{Handle, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle_steal, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::iter::{CastIter, SequenceCursor};
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime list, tuple, string or protocol sequence whose items convert to `T`.
///
/// Items are fetched through the sequence protocol, which hands out new references; protocol
/// sequences may compute them on demand.
pub struct Sequence<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(Sequence<T>);

/// Iterator over the items of a [`Sequence`].
pub type SequenceIter<T> = CastIter<SequenceCursor<T>>;

impl<T> Sequence<T> {
    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runtime().sequence_len(self.handle()).unwrap_or(0)
    }

    /// Returns `true` if the sequence has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: FromObject> Sequence<T> {
    /// Fetches and converts item `index`.
    pub fn get(&self, index: usize) -> Result<T, CastError> {
        let len = self.len();
        if index >= len {
            return Err(CastError::Index { index, len });
        }
        cast_from_handle_steal(self.runtime().sequence_get_item(self.handle(), index)?)
    }

    /// Returns an iterator positioned at the first item.
    pub fn iter(&self) -> SequenceIter<T> {
        CastIter::new(SequenceCursor::new(self.obj.clone(), 0))
    }

    /// Returns an iterator positioned past the last item.
    pub fn end(&self) -> SequenceIter<T> {
        CastIter::at_end(SequenceCursor::new(self.obj.clone(), self.len()))
    }
}

impl<T: TypeName> TypeName for Sequence<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Sequence",
        args: &[T::DESCR],
    };
}

impl<T: TypeName> FromObject for Sequence<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.is_sequence(h)
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}

impl<T: FromObject> IntoIterator for &Sequence<T> {
    type Item = Result<T, CastError>;
    type IntoIter = SequenceIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::cast_from_handle;
    use crate::descr::descriptor;
    use alloc::string::String;
    use alloc::vec::Vec;
    use dynobj::{ObjError, SequenceSource};

    struct Squares(usize);

    impl SequenceSource for Squares {
        fn len(&self) -> usize {
            self.0
        }

        fn item(&self, rt: &Runtime, index: usize) -> Result<Object, ObjError> {
            let n = i64::try_from(index).unwrap();
            rt.new_int(n * n)
        }
    }

    #[test]
    fn descriptor_is_sequence() {
        assert_eq!(descriptor::<Sequence<i64>>(), "Sequence[int]");
    }

    #[test]
    fn protocol_sequence_items_are_computed() {
        let rt = Runtime::new();
        let obj = rt.new_sequence(Squares(4)).unwrap();
        let seq: Sequence<i64> = cast_from_handle(&rt, obj.handle()).unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.get(3).unwrap(), 9);
        assert_eq!(seq.get(4).unwrap_err(), CastError::Index { index: 4, len: 4 });
        let all: Vec<i64> = seq.iter().map(Result::unwrap).collect();
        assert_eq!(all, [0, 1, 4, 9]);
        // Computed items are released after conversion.
        assert_eq!(rt.live_objects(), 1);
    }

    #[test]
    fn strings_are_sequences_of_characters() {
        let rt = Runtime::new();
        let obj = rt.new_str("héllo").unwrap();
        let seq: Sequence<String> = cast_from_handle(&rt, obj.handle()).unwrap();
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.get(1).unwrap(), "é");
    }

    #[test]
    fn cursor_style_reaches_end() {
        let rt = Runtime::new();
        let obj = rt.new_sequence(Squares(3)).unwrap();
        let seq: Sequence<i64> = cast_from_handle(&rt, obj.handle()).unwrap();
        let mut it = seq.iter();
        let end = seq.end();
        let mut count = 0;
        while it != end {
            it.advance().unwrap();
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn dicts_are_not_sequences() {
        let rt = Runtime::new();
        let d = rt.new_dict().unwrap();
        assert!(cast_from_handle::<Sequence<i64>>(&rt, d.handle()).is_err());
    }
}
