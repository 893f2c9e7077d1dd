// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily converting iterators.
//!
//! A [`CastIter`] walks a runtime container through a [`Cursor`] and converts each element the
//! first time it is needed. Dereferencing the same position again returns the cached value; an
//! element is converted at most once per position.
//!
//! `CastIter` supports two styles of use:
//!
//! - Cursor style: [`CastIter::get`] / [`CastIter::advance`], compared against an end iterator
//!   with `==` (positions only).
//! - [`Iterator`] style: yields `Result<Item, CastError>` and stops after the first error.

use core::fmt;
use core::marker::PhantomData;

use dynobj::{Handle, ObjError, Object, Runtime};

use crate::cast::{FromObject, cast_from_handle, cast_from_handle_steal};
use crate::error::CastError;

/// Position of a cursor: an index into a source value, or the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    /// At element `index` of `source`.
    At {
        /// The iterated runtime value.
        source: Handle,
        /// Element index.
        index: usize,
    },
    /// Past the last element.
    End,
}

/// A position-tracking walk over a runtime value.
pub trait Cursor {
    /// The converted element type.
    type Item;

    /// Prepares the first position. Called once, before any other method.
    fn start(&mut self) -> Result<(), CastError> {
        Ok(())
    }

    /// Returns `true` if the cursor is past the last element.
    fn is_end(&self) -> bool;

    /// Returns the current position.
    fn position(&self) -> Position;

    /// Converts the element at the current position.
    ///
    /// Called at most once per position.
    fn load(&mut self) -> Result<Self::Item, CastError>;

    /// Moves to the next position.
    fn step(&mut self) -> Result<(), CastError>;
}

enum Slot<T> {
    /// Positioned on an element that has not been converted yet.
    Unloaded,
    Ready(T),
    Failed(CastError),
    End,
}

/// A lazily converting iterator over a [`Cursor`].
pub struct CastIter<C: Cursor> {
    cursor: C,
    slot: Slot<C::Item>,
}

impl<C: Cursor> CastIter<C> {
    /// Starts `cursor` and converts the first element, if any.
    pub fn new(mut cursor: C) -> Self {
        let slot = match cursor.start() {
            Ok(()) if cursor.is_end() => Slot::End,
            Ok(()) => match cursor.load() {
                Ok(value) => Slot::Ready(value),
                Err(err) => Slot::Failed(err),
            },
            Err(err) => Slot::Failed(err),
        };
        Self { cursor, slot }
    }

    /// Returns an iterator positioned at the end of `cursor` without converting anything.
    pub fn at_end(cursor: C) -> Self {
        Self {
            cursor,
            slot: Slot::End,
        }
    }

    /// Returns the current position.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Returns `true` if the iterator is past the last element.
    pub fn is_end(&self) -> bool {
        matches!(self.slot, Slot::End)
    }

    /// Returns the element at the current position, converting it on first access.
    pub fn get(&mut self) -> Result<&C::Item, CastError> {
        if matches!(self.slot, Slot::Unloaded) {
            self.load();
        }
        match &self.slot {
            Slot::Ready(value) => Ok(value),
            Slot::Failed(err) => Err(err.clone()),
            Slot::Unloaded | Slot::End => Err(CastError::Exhausted),
        }
    }

    /// Moves to the next position and converts its element.
    ///
    /// A runtime iteration fault is returned and leaves the iterator at the end.
    pub fn advance(&mut self) -> Result<(), CastError> {
        if matches!(self.slot, Slot::End) {
            return Ok(());
        }
        self.step()?;
        if matches!(self.slot, Slot::Unloaded) {
            self.load();
        }
        Ok(())
    }

    fn load(&mut self) {
        self.slot = match self.cursor.load() {
            Ok(value) => Slot::Ready(value),
            Err(err) => Slot::Failed(err),
        };
    }

    fn step(&mut self) -> Result<(), CastError> {
        match self.cursor.step() {
            Ok(()) => {
                self.slot = if self.cursor.is_end() {
                    Slot::End
                } else {
                    Slot::Unloaded
                };
                Ok(())
            }
            Err(err) => {
                self.slot = Slot::End;
                Err(err)
            }
        }
    }
}

impl<C: Cursor> Iterator for CastIter<C> {
    type Item = Result<C::Item, CastError>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match core::mem::replace(&mut self.slot, Slot::End) {
            Slot::End => return None,
            // Stop after reporting a failure.
            Slot::Failed(err) => return Some(Err(err)),
            Slot::Ready(value) => value,
            Slot::Unloaded => match self.cursor.load() {
                Ok(value) => value,
                Err(err) => return Some(Err(err)),
            },
        };
        if let Err(err) = self.step() {
            self.slot = Slot::Failed(err);
        }
        Some(Ok(current))
    }
}

impl<C: Cursor> core::iter::FusedIterator for CastIter<C> {}

impl<C: Cursor> PartialEq for CastIter<C> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<C: Cursor> fmt::Debug for CastIter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.slot {
            Slot::Unloaded => "unloaded",
            Slot::Ready(_) => "ready",
            Slot::Failed(_) => "failed",
            Slot::End => "end",
        };
        f.debug_struct("CastIter")
            .field("position", &self.position())
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

/// Which indexed container an [`IndexCursor`] walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Indexed {
    List,
    Tuple,
}

/// Cursor over a list or tuple; elements are converted from borrowed handles.
pub struct IndexCursor<T> {
    source: Object,
    indexed: Indexed,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> IndexCursor<T> {
    pub(crate) fn new(source: Object, indexed: Indexed, index: usize) -> Self {
        Self {
            source,
            indexed,
            index,
            _marker: PhantomData,
        }
    }

    fn len(&self) -> usize {
        let rt = self.source.runtime();
        let len = match self.indexed {
            Indexed::List => rt.list_len(self.source.handle()),
            Indexed::Tuple => rt.tuple_len(self.source.handle()),
        };
        len.unwrap_or(0)
    }
}

impl<T: FromObject> Cursor for IndexCursor<T> {
    type Item = T;

    fn is_end(&self) -> bool {
        self.index >= self.len()
    }

    fn position(&self) -> Position {
        if self.is_end() {
            return Position::End;
        }
        Position::At {
            source: self.source.handle(),
            index: self.index,
        }
    }

    fn load(&mut self) -> Result<T, CastError> {
        let rt = self.source.runtime();
        let h = match self.indexed {
            Indexed::List => rt.list_get(self.source.handle(), self.index)?,
            Indexed::Tuple => rt.tuple_get(self.source.handle(), self.index)?,
        };
        cast_from_handle(rt, h)
    }

    fn step(&mut self) -> Result<(), CastError> {
        self.index += 1;
        Ok(())
    }
}

impl<T> fmt::Debug for IndexCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexCursor")
            .field("indexed", &self.indexed)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Cursor over the generic sequence protocol; each item is a new reference that the conversion
/// takes over.
pub struct SequenceCursor<T> {
    source: Object,
    index: usize,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SequenceCursor<T> {
    pub(crate) fn new(source: Object, index: usize) -> Self {
        let len = source
            .runtime()
            .sequence_len(source.handle())
            .unwrap_or(0);
        Self {
            source,
            index,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T: FromObject> Cursor for SequenceCursor<T> {
    type Item = T;

    fn is_end(&self) -> bool {
        self.index >= self.len
    }

    fn position(&self) -> Position {
        if self.is_end() {
            return Position::End;
        }
        Position::At {
            source: self.source.handle(),
            index: self.index,
        }
    }

    fn load(&mut self) -> Result<T, CastError> {
        let rt = self.source.runtime();
        let item = rt.sequence_get_item(self.source.handle(), self.index)?;
        cast_from_handle_steal(item)
    }

    fn step(&mut self) -> Result<(), CastError> {
        self.index += 1;
        Ok(())
    }
}

impl<T> fmt::Debug for SequenceCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCursor")
            .field("index", &self.index)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Cursor over the entries of a dict in insertion order, yielding `(key, value)` pairs.
pub struct DictCursor<K, V> {
    source: Object,
    index: usize,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DictCursor<K, V> {
    pub(crate) fn new(source: Object, index: usize) -> Self {
        Self {
            source,
            index,
            _marker: PhantomData,
        }
    }
}

impl<K: FromObject, V: FromObject> Cursor for DictCursor<K, V> {
    type Item = (K, V);

    fn is_end(&self) -> bool {
        let len = self.source.runtime().dict_len(self.source.handle());
        self.index >= len.unwrap_or(0)
    }

    fn position(&self) -> Position {
        if self.is_end() {
            return Position::End;
        }
        Position::At {
            source: self.source.handle(),
            index: self.index,
        }
    }

    fn load(&mut self) -> Result<(K, V), CastError> {
        let rt = self.source.runtime();
        let (key, value) = rt.dict_entry(self.source.handle(), self.index)?;
        Ok((cast_from_handle(rt, key)?, cast_from_handle(rt, value)?))
    }

    fn step(&mut self) -> Result<(), CastError> {
        self.index += 1;
        Ok(())
    }
}

impl<K, V> fmt::Debug for DictCursor<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictCursor")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Cursor over a runtime iterator object. Items are pulled one step ahead of conversion.
pub struct IterCursor<T> {
    iter: Object,
    current: Option<Object>,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> IterCursor<T> {
    pub(crate) fn new(iter: Object) -> Self {
        Self {
            iter,
            current: None,
            index: 0,
            _marker: PhantomData,
        }
    }

    fn pull(&mut self) -> Result<(), CastError> {
        let rt: &Runtime = self.iter.runtime();
        self.current = rt
            .iter_next(self.iter.handle())
            .map_err(CastError::RuntimeIteration)?;
        Ok(())
    }
}

impl<T: FromObject> Cursor for IterCursor<T> {
    type Item = T;

    fn start(&mut self) -> Result<(), CastError> {
        self.pull()
    }

    fn is_end(&self) -> bool {
        self.current.is_none()
    }

    fn position(&self) -> Position {
        if self.is_end() {
            return Position::End;
        }
        Position::At {
            source: self.iter.handle(),
            index: self.index,
        }
    }

    fn load(&mut self) -> Result<T, CastError> {
        let item = self
            .current
            .take()
            .ok_or(CastError::RuntimeIteration(ObjError::BadHandle))?;
        cast_from_handle_steal(item)
    }

    fn step(&mut self) -> Result<(), CastError> {
        self.index += 1;
        self.pull()
    }
}

impl<T> fmt::Debug for IterCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterCursor")
            .field("index", &self.index)
            .field("exhausted", &self.current.is_none())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn list(rt: &Runtime, values: &[i64]) -> Object {
        let items: Vec<Object> = values.iter().map(|&v| rt.new_int(v).unwrap()).collect();
        rt.new_list(items).unwrap()
    }

    #[test]
    fn index_cursor_walks_to_end() {
        let rt = Runtime::new();
        let l = list(&rt, &[1, 2, 3]);
        let mut it = CastIter::new(IndexCursor::<i64>::new(l.clone(), Indexed::List, 0));
        let end = CastIter::at_end(IndexCursor::<i64>::new(l.clone(), Indexed::List, 3));
        let mut seen = Vec::new();
        while it != end {
            seen.push(*it.get().unwrap());
            it.advance().unwrap();
        }
        assert_eq!(seen, [1, 2, 3]);
        assert_eq!(it.get().unwrap_err(), CastError::Exhausted);
    }

    #[test]
    fn iterator_style_stops_after_error() {
        let rt = Runtime::new();
        let items = [rt.new_int(1).unwrap(), rt.new_str("x").unwrap(), rt.new_int(3).unwrap()];
        let l = rt.new_list(items).unwrap();
        let it = CastIter::new(IndexCursor::<i64>::new(l, Indexed::List, 0));
        let results: Vec<_> = it.collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok(1));
        assert!(results[1].is_err());
    }

    #[test]
    fn iter_cursor_reports_position_and_end() {
        let rt = Runtime::new();
        let l = list(&rt, &[5, 6]);
        let iter = rt.get_iter(l.handle()).unwrap();
        let mut it = CastIter::new(IterCursor::<i64>::new(iter));
        assert!(matches!(it.position(), Position::At { index: 0, .. }));
        assert_eq!(it.next(), Some(Ok(5)));
        assert_eq!(it.next(), Some(Ok(6)));
        assert_eq!(it.next(), None);
        assert_eq!(it.position(), Position::End);
    }

    #[test]
    fn dict_cursor_yields_pairs_in_insertion_order() {
        let rt = Runtime::new();
        let d = rt.new_dict().unwrap();
        rt.dict_set(d.handle(), rt.new_str("z").unwrap(), rt.new_int(1).unwrap())
            .unwrap();
        rt.dict_set(d.handle(), rt.new_str("a").unwrap(), rt.new_int(2).unwrap())
            .unwrap();
        let pairs: Vec<(alloc::string::String, i64)> =
            CastIter::new(DictCursor::<alloc::string::String, i64>::new(d, 0)).map(Result::unwrap).collect();
        assert_eq!(pairs, [("z".into(), 1), ("a".into(), 2)]);
    }
}
