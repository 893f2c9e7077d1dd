// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The runtime: object constructors, accessors and the iteration protocol.
//!
//! Accessors that return a [`Handle`] return a *borrowed* reference: the handle stays valid only
//! while the container that holds it is alive and unmodified. Accessors that return an [`Object`]
//! return a *new* reference owned by the caller.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::{Cell, Ref, RefCell, RefMut};
use core::fmt;

use crate::error::ObjError;
use crate::heap::{DictStore, Heap, IterStep, Payload, wrong_kind};
use crate::host::{HostIter, SequenceSource};
use crate::object::Object;
use crate::trace::{ScopeKind, TraceSink};
use crate::value::{Handle, HostTypeId, ObjKind};

/// Runtime resource limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of live objects (the `None` singleton is not counted).
    pub max_objects: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_objects: usize::MAX,
        }
    }
}

type SharedSink = Rc<RefCell<dyn TraceSink>>;

struct Inner {
    heap: RefCell<Heap>,
    sink: RefCell<Option<SharedSink>>,
    depth: Cell<usize>,
    none: Handle,
}

/// A single-threaded dynamic object runtime.
///
/// `Runtime` is a cheap, clonable reference to shared state; clones observe the same heap.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<Inner>,
}

impl Runtime {
    /// Creates a runtime with default (unbounded) limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Creates a runtime with the given limits.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        let heap = Heap::new(limits);
        let none = heap.none();
        Self {
            inner: Rc::new(Inner {
                heap: RefCell::new(heap),
                sink: RefCell::new(None),
                depth: Cell::new(0),
                none,
            }),
        }
    }

    /// Returns `true` if `self` and `other` refer to the same runtime.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the configured limits.
    pub fn limits(&self) -> Limits {
        self.heap().map_or_else(|_| Limits::default(), |heap| heap.limits())
    }

    fn heap(&self) -> Result<Ref<'_, Heap>, ObjError> {
        self.inner.heap.try_borrow().map_err(|_| ObjError::Reentrant)
    }

    fn heap_mut(&self) -> Result<RefMut<'_, Heap>, ObjError> {
        self.inner
            .heap
            .try_borrow_mut()
            .map_err(|_| ObjError::Reentrant)
    }

    fn alloc(&self, payload: Payload) -> Result<Object, ObjError> {
        let result = self.heap_mut()?.alloc(payload);
        match result {
            Ok(h) => Ok(Object::stolen(self, h)),
            Err((err, payload)) => {
                drop(payload);
                Err(err)
            }
        }
    }

    fn check_owner(&self, obj: &Object) -> Result<(), ObjError> {
        if self.ptr_eq(obj.runtime()) {
            Ok(())
        } else {
            Err(ObjError::ForeignObject)
        }
    }

    fn own_all(&self, items: &[Object]) -> Result<Vec<Handle>, ObjError> {
        items
            .iter()
            .map(|item| self.check_owner(item).map(|()| item.handle()))
            .collect()
    }

    // Construction

    /// Returns a new reference to the `None` singleton.
    #[must_use]
    pub fn none(&self) -> Object {
        Object::stolen(self, self.inner.none)
    }

    /// Returns the handle of the `None` singleton.
    #[must_use]
    #[inline]
    pub fn none_handle(&self) -> Handle {
        self.inner.none
    }

    /// Returns `true` if `h` is the `None` singleton.
    #[must_use]
    #[inline]
    pub fn is_none(&self, h: Handle) -> bool {
        h == self.inner.none
    }

    /// Allocates a `bool`.
    pub fn new_bool(&self, value: bool) -> Result<Object, ObjError> {
        self.alloc(Payload::Bool(value))
    }

    /// Allocates an `int`.
    pub fn new_int(&self, value: i64) -> Result<Object, ObjError> {
        self.alloc(Payload::Int(value))
    }

    /// Allocates a `float`.
    pub fn new_float(&self, value: f64) -> Result<Object, ObjError> {
        self.alloc(Payload::Float(value))
    }

    /// Allocates a `str`.
    pub fn new_str(&self, value: &str) -> Result<Object, ObjError> {
        self.alloc(Payload::Str(Box::from(value)))
    }

    /// Allocates a list, taking over the count of each item.
    pub fn new_list(&self, items: impl IntoIterator<Item = Object>) -> Result<Object, ObjError> {
        let items: Vec<Object> = items.into_iter().collect();
        let handles = self.own_all(&items)?;
        let list = self.alloc(Payload::List(handles))?;
        for item in items {
            let _ = item.into_raw();
        }
        Ok(list)
    }

    /// Allocates a tuple, taking over the count of each item.
    pub fn new_tuple(&self, items: impl IntoIterator<Item = Object>) -> Result<Object, ObjError> {
        let items: Vec<Object> = items.into_iter().collect();
        let handles = self.own_all(&items)?;
        let tuple = self.alloc(Payload::Tuple(handles.into_boxed_slice()))?;
        for item in items {
            let _ = item.into_raw();
        }
        Ok(tuple)
    }

    /// Allocates an empty dict.
    pub fn new_dict(&self) -> Result<Object, ObjError> {
        self.alloc(Payload::Dict(DictStore::default()))
    }

    /// Wraps a host value of a registered type.
    pub fn new_host<T: Any>(&self, value: T) -> Result<Object, ObjError> {
        let host_type = self
            .host_type::<T>()
            .ok_or_else(unregistered::<T>)?;
        self.alloc(Payload::Host {
            host_type,
            value: Rc::new(value),
        })
    }

    /// Allocates an iterator object whose `next` is answered by `state`.
    pub fn new_host_iter<S: HostIter + 'static>(
        &self,
        host_type: HostTypeId,
        state: S,
    ) -> Result<Object, ObjError> {
        if self.heap()?.host_type_name(host_type).is_none() {
            return Err(unregistered::<S>());
        }
        let state: Rc<RefCell<dyn HostIter>> = Rc::new(RefCell::new(state));
        self.alloc(Payload::HostIter { host_type, state })
    }

    /// Allocates a protocol sequence backed by `source`.
    pub fn new_sequence<S: SequenceSource + 'static>(&self, source: S) -> Result<Object, ObjError> {
        self.alloc(Payload::Sequence(Rc::new(source)))
    }

    // Host types

    /// Registers `T` as a host type named `name`.
    ///
    /// Registration is idempotent per Rust type: later calls return the first id and keep the
    /// first name.
    pub fn register_host_type<T: Any>(&self, name: &str) -> Result<HostTypeId, ObjError> {
        Ok(self.heap_mut()?.register_host_type(TypeId::of::<T>(), name))
    }

    /// Returns the id `T` was registered under.
    pub fn host_type<T: Any>(&self) -> Option<HostTypeId> {
        self.heap().ok()?.host_type(TypeId::of::<T>())
    }

    /// Returns the name a host type was registered with.
    pub fn host_type_name(&self, id: HostTypeId) -> Option<String> {
        self.heap().ok()?.host_type_name(id).map(ToString::to_string)
    }

    /// Returns a shared reference to the host value stored in `h`.
    pub fn host_value<T: Any>(&self, h: Handle) -> Result<Rc<T>, ObjError> {
        let value = match self.heap()?.payload(h)? {
            Payload::Host { value, .. } => Rc::clone(value),
            other => return Err(wrong_kind(core::any::type_name::<T>(), other)),
        };
        value.downcast::<T>().map_err(|_| ObjError::WrongKind {
            expected: core::any::type_name::<T>(),
            found: self.kind(h).unwrap_or(ObjKind::None),
        })
    }

    // Reference counts

    /// Returns the kind of `h`.
    pub fn kind(&self, h: Handle) -> Result<ObjKind, ObjError> {
        self.heap()?.kind(h)
    }

    /// Returns the current reference count of `h`.
    pub fn ref_count(&self, h: Handle) -> Result<usize, ObjError> {
        self.heap()?.ref_count(h)
    }

    /// Adds one reference count to `h`.
    ///
    /// The count is owned by the caller; pair it with [`Object::stolen`] or a later release.
    pub fn inc_ref(&self, h: Handle) -> Result<(), ObjError> {
        self.heap_mut()?.inc_ref(h)
    }

    /// Releases one count of `h`. Freed host payloads are dropped after the heap borrow ends.
    pub(crate) fn release(&self, h: Handle) {
        let mut garbage = Vec::new();
        let released = self
            .heap_mut()
            .and_then(|mut heap| heap.dec_ref(h, &mut garbage));
        debug_assert!(
            released.is_ok(),
            "released an invalid count of {h:?}: {released:?}"
        );
        drop(garbage);
    }

    /// Returns the number of live objects (the `None` singleton is not counted).
    pub fn live_objects(&self) -> usize {
        self.heap().map_or(0, |heap| heap.live())
    }

    // Scalars

    /// Reads a `bool`.
    pub fn bool_value(&self, h: Handle) -> Result<bool, ObjError> {
        match self.heap()?.payload(h)? {
            Payload::Bool(v) => Ok(*v),
            other => Err(wrong_kind("bool", other)),
        }
    }

    /// Reads an `int`.
    pub fn int_value(&self, h: Handle) -> Result<i64, ObjError> {
        match self.heap()?.payload(h)? {
            Payload::Int(v) => Ok(*v),
            other => Err(wrong_kind("int", other)),
        }
    }

    /// Reads a `float`.
    pub fn float_value(&self, h: Handle) -> Result<f64, ObjError> {
        match self.heap()?.payload(h)? {
            Payload::Float(v) => Ok(*v),
            other => Err(wrong_kind("float", other)),
        }
    }

    /// Reads a `str`.
    pub fn str_value(&self, h: Handle) -> Result<String, ObjError> {
        match self.heap()?.payload(h)? {
            Payload::Str(s) => Ok(s.to_string()),
            other => Err(wrong_kind("str", other)),
        }
    }

    // Lists and tuples

    /// Returns the length of a list.
    pub fn list_len(&self, list: Handle) -> Result<usize, ObjError> {
        Ok(self.heap()?.list(list)?.len())
    }

    /// Returns a borrowed handle to item `index` of a list.
    pub fn list_get(&self, list: Handle, index: usize) -> Result<Handle, ObjError> {
        let heap = self.heap()?;
        let items = heap.list(list)?;
        items.get(index).copied().ok_or(ObjError::OutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Appends `item` to a list, taking over its count.
    pub fn list_append(&self, list: Handle, item: Object) -> Result<(), ObjError> {
        self.check_owner(&item)?;
        self.heap_mut()?.list_mut(list)?.push(item.handle());
        let _ = item.into_raw();
        Ok(())
    }

    /// Replaces item `index` of a list, taking over the count of `item`.
    pub fn list_set(&self, list: Handle, index: usize, item: Object) -> Result<(), ObjError> {
        self.check_owner(&item)?;
        let old = {
            let mut heap = self.heap_mut()?;
            let items = heap.list_mut(list)?;
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(ObjError::OutOfBounds { index, len })?;
            core::mem::replace(slot, item.handle())
        };
        let _ = item.into_raw();
        self.release(old);
        Ok(())
    }

    /// Returns the length of a tuple.
    pub fn tuple_len(&self, tuple: Handle) -> Result<usize, ObjError> {
        Ok(self.heap()?.tuple(tuple)?.len())
    }

    /// Returns a borrowed handle to item `index` of a tuple.
    pub fn tuple_get(&self, tuple: Handle, index: usize) -> Result<Handle, ObjError> {
        let heap = self.heap()?;
        let items = heap.tuple(tuple)?;
        items.get(index).copied().ok_or(ObjError::OutOfBounds {
            index,
            len: items.len(),
        })
    }

    // Dicts

    /// Returns the number of entries in a dict.
    pub fn dict_len(&self, dict: Handle) -> Result<usize, ObjError> {
        Ok(self.heap()?.dict(dict)?.len())
    }

    /// Looks up `key`, returning a borrowed handle to the value.
    pub fn dict_get(&self, dict: Handle, key: Handle) -> Result<Option<Handle>, ObjError> {
        self.heap()?.dict_lookup(dict, key)
    }

    /// Returns `true` if the dict has an entry for `key`.
    pub fn dict_contains(&self, dict: Handle, key: Handle) -> Result<bool, ObjError> {
        self.dict_get(dict, key).map(|v| v.is_some())
    }

    /// Stores `key -> value`, taking over both counts.
    ///
    /// An existing entry keeps its original key and has its value replaced.
    pub fn dict_set(&self, dict: Handle, key: Object, value: Object) -> Result<(), ObjError> {
        self.check_owner(&key)?;
        self.check_owner(&value)?;
        let displaced = self
            .heap_mut()?
            .dict_insert(dict, key.handle(), value.handle())?;
        let _ = key.into_raw();
        let _ = value.into_raw();
        if let Some((unused_key, old_value)) = displaced {
            self.release(unused_key);
            self.release(old_value);
        }
        Ok(())
    }

    /// Returns borrowed handles to entry `index` in insertion order.
    pub fn dict_entry(&self, dict: Handle, index: usize) -> Result<(Handle, Handle), ObjError> {
        let heap = self.heap()?;
        let store = heap.dict(dict)?;
        store.entry(index).ok_or(ObjError::OutOfBounds {
            index,
            len: store.len(),
        })
    }

    // Sequence protocol

    /// Returns `true` if `h` supports the indexed sequence protocol.
    pub fn is_sequence(&self, h: Handle) -> bool {
        matches!(
            self.kind(h),
            Ok(ObjKind::List | ObjKind::Tuple | ObjKind::Str | ObjKind::Sequence)
        )
    }

    /// Returns the length of a list, tuple, string or protocol sequence.
    pub fn sequence_len(&self, h: Handle) -> Result<usize, ObjError> {
        let source = match self.heap()?.payload(h)? {
            Payload::List(items) => return Ok(items.len()),
            Payload::Tuple(items) => return Ok(items.len()),
            Payload::Str(s) => return Ok(s.chars().count()),
            Payload::Sequence(source) => Rc::clone(source),
            other => return Err(wrong_kind("sequence", other)),
        };
        Ok(source.len())
    }

    /// Returns item `index` of a sequence as a new reference.
    ///
    /// Items of a string are one-character strings.
    pub fn sequence_get_item(&self, h: Handle, index: usize) -> Result<Object, ObjError> {
        enum Found {
            Item(Handle),
            Char(char),
            Source(Rc<dyn SequenceSource>),
        }
        let found = {
            let heap = self.heap()?;
            let found = match heap.payload(h)? {
                Payload::List(items) => items.get(index).map(|&h| Found::Item(h)),
                Payload::Tuple(items) => items.get(index).map(|&h| Found::Item(h)),
                Payload::Str(s) => s.chars().nth(index).map(Found::Char),
                Payload::Sequence(source) => Some(Found::Source(Rc::clone(source))),
                other => return Err(wrong_kind("sequence", other)),
            };
            match found {
                Some(found) => found,
                None => {
                    let len = match heap.payload(h)? {
                        Payload::List(items) => items.len(),
                        Payload::Tuple(items) => items.len(),
                        Payload::Str(s) => s.chars().count(),
                        _ => 0,
                    };
                    return Err(ObjError::OutOfBounds { index, len });
                }
            }
        };
        match found {
            Found::Item(item) => Object::borrowed(self, item),
            Found::Char(c) => self.new_str(c.encode_utf8(&mut [0_u8; 4])),
            Found::Source(source) => {
                let len = source.len();
                if index >= len {
                    return Err(ObjError::OutOfBounds { index, len });
                }
                source.item(self, index)
            }
        }
    }

    /// Coerces any iterable to a tuple. A tuple is returned as a new reference to itself.
    pub fn to_tuple(&self, h: Handle) -> Result<Object, ObjError> {
        if self.kind(h)? == ObjKind::Tuple {
            return Object::borrowed(self, h);
        }
        let iter = self.get_iter(h)?;
        let mut items = Vec::new();
        while let Some(item) = self.iter_next(iter.handle())? {
            items.push(item);
        }
        self.new_tuple(items)
    }

    // Iteration protocol

    /// Returns `true` if `h` supports the iteration protocol.
    pub fn has_iter(&self, h: Handle) -> bool {
        matches!(
            self.kind(h),
            Ok(ObjKind::List
                | ObjKind::Tuple
                | ObjKind::Str
                | ObjKind::Dict
                | ObjKind::Sequence
                | ObjKind::Iterator)
        )
    }

    /// Returns an iterator over `h`. An iterator returns a new reference to itself.
    pub fn get_iter(&self, h: Handle) -> Result<Object, ObjError> {
        let payload = match self.kind(h)? {
            ObjKind::Iterator => return Object::borrowed(self, h),
            ObjKind::List | ObjKind::Tuple | ObjKind::Str | ObjKind::Sequence => {
                Payload::SeqIter { seq: h, index: 0 }
            }
            ObjKind::Dict => Payload::KeyIter { dict: h, index: 0 },
            kind => return Err(ObjError::NotIterable(kind)),
        };
        // The iterator owns a count of what it iterates.
        let source = Object::borrowed(self, h)?;
        let iter = self.alloc(payload)?;
        let _ = source.into_raw();
        Ok(iter)
    }

    /// Advances an iterator, returning the next item as a new reference or `None` at the end.
    pub fn iter_next(&self, iter: Handle) -> Result<Option<Object>, ObjError> {
        self.scoped(ScopeKind::IterStep, &"next", || self.iter_step(iter))
    }

    fn iter_step(&self, iter: Handle) -> Result<Option<Object>, ObjError> {
        let step = self.heap_mut()?.iter_step(iter)?;
        match step {
            IterStep::Done => Ok(None),
            IterStep::Item(h) => Object::borrowed(self, h).map(Some),
            IterStep::Char(c) => self.new_str(c.encode_utf8(&mut [0_u8; 4])).map(Some),
            IterStep::Protocol { source, index } => {
                if index >= source.len() {
                    return Ok(None);
                }
                source.item(self, index).map(Some)
            }
            IterStep::Host { host_type, state } => self.scoped(
                ScopeKind::HostCall,
                &format_args!("host_iter:{}", host_type.0),
                || {
                    let mut state = state.try_borrow_mut().map_err(|_| ObjError::Reentrant)?;
                    state.next(self)
                },
            ),
        }
    }

    /// Returns a runtime-style representation of `h`.
    pub fn repr(&self, h: Handle) -> Result<String, ObjError> {
        let mut out = String::new();
        self.heap()?.repr(h, &mut out, &mut Vec::new())?;
        Ok(out)
    }

    // Tracing

    /// Installs `sink`, returning the previously installed one.
    pub fn set_trace_sink(&self, sink: SharedSink) -> Option<SharedSink> {
        self.inner.sink.replace(Some(sink))
    }

    /// Removes the installed sink, returning it.
    pub fn clear_trace_sink(&self) -> Option<SharedSink> {
        self.inner.sink.replace(None)
    }

    fn sink_for(&self, kind: ScopeKind) -> Option<SharedSink> {
        let sink = self.inner.sink.try_borrow().ok()?;
        let sink = sink.as_ref()?;
        let wanted = sink
            .try_borrow()
            .is_ok_and(|s| s.mask().contains(kind.mask()));
        wanted.then(|| Rc::clone(sink))
    }

    /// Runs `f` inside a traced scope of `kind`.
    ///
    /// If no installed sink selects `kind`, `f` runs untraced. The sink sees `ok = false` when `f`
    /// returns an error.
    pub fn scoped<R, E>(
        &self,
        kind: ScopeKind,
        label: &dyn fmt::Display,
        f: impl FnOnce() -> Result<R, E>,
    ) -> Result<R, E> {
        let Some(sink) = self.sink_for(kind) else {
            return f();
        };
        let depth = self.inner.depth.get();
        if let Ok(mut s) = sink.try_borrow_mut() {
            s.scope_enter(kind, label, depth);
        }
        self.inner.depth.set(depth + 1);
        let result = f();
        self.inner.depth.set(depth);
        if let Ok(mut s) = sink.try_borrow_mut() {
            s.scope_exit(kind, depth, result.is_ok());
        }
        result
    }
}

fn unregistered<T>() -> ObjError {
    ObjError::UnregisteredHostType {
        type_name: core::any::type_name::<T>(),
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("live_objects", &self.live_objects())
            .field("limits", &self.limits())
            .finish_non_exhaustive()
    }
}
