// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted object heap.
//!
//! The heap is a `Vec`-backed slot arena with a free list. Each slot carries a generation
//! counter that is bumped when the slot is freed, so stale [`Handle`]s are rejected instead of
//! aliasing a newer object.
//!
//! Containers store raw child handles and own one reference count per stored handle. Releasing
//! the last count of a container releases its children iteratively (no recursion). Payloads that
//! carry host state are handed back to the caller as garbage so they can be dropped after the
//! heap borrow ends.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt::Write as _;

use hashbrown::HashMap;

use crate::error::ObjError;
use crate::host::{HostIter, SequenceSource};
use crate::runtime::Limits;
use crate::value::{Handle, HostTypeId, ObjKind};

/// Stored object payload.
pub(crate) enum Payload {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Box<str>),
    List(Vec<Handle>),
    Tuple(Box<[Handle]>),
    Dict(DictStore),
    /// Iterator over a list, tuple, string, or protocol sequence.
    SeqIter {
        seq: Handle,
        index: usize,
    },
    /// Iterator over the keys of a dict.
    KeyIter {
        dict: Handle,
        index: usize,
    },
    HostIter {
        host_type: HostTypeId,
        state: Rc<RefCell<dyn HostIter>>,
    },
    Sequence(Rc<dyn SequenceSource>),
    Host {
        host_type: HostTypeId,
        value: Rc<dyn Any>,
    },
}

impl Payload {
    pub(crate) fn kind(&self) -> ObjKind {
        match self {
            Self::None => ObjKind::None,
            Self::Bool(_) => ObjKind::Bool,
            Self::Int(_) => ObjKind::Int,
            Self::Float(_) => ObjKind::Float,
            Self::Str(_) => ObjKind::Str,
            Self::List(_) => ObjKind::List,
            Self::Tuple(_) => ObjKind::Tuple,
            Self::Dict(_) => ObjKind::Dict,
            Self::SeqIter { .. } | Self::KeyIter { .. } | Self::HostIter { .. } => {
                ObjKind::Iterator
            }
            Self::Sequence(_) => ObjKind::Sequence,
            Self::Host { host_type, .. } => ObjKind::Host(*host_type),
        }
    }

    fn push_children(&self, out: &mut Vec<Handle>) {
        match self {
            Self::List(items) => out.extend_from_slice(items),
            Self::Tuple(items) => out.extend_from_slice(items),
            Self::Dict(store) => {
                for &(key, value) in &store.entries {
                    out.push(key);
                    out.push(value);
                }
            }
            Self::SeqIter { seq, .. } => out.push(*seq),
            Self::KeyIter { dict, .. } => out.push(*dict),
            _ => {}
        }
    }
}

/// Structural key used to index dict entries.
///
/// Numerically equal `bool`, `int` and integral `float` values share a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum HashKey {
    None,
    Int(i64),
    Float(u64),
    Str(Box<str>),
    Tuple(Box<[HashKey]>),
}

impl HashKey {
    fn from_float(v: f64) -> Self {
        // 2^63 is exactly representable; every integral float in [-2^63, 2^63) fits in i64.
        const BOUND: f64 = 9_223_372_036_854_775_808.0;
        if v.fract() == 0.0 && (-BOUND..BOUND).contains(&v) {
            #[allow(clippy::cast_possible_truncation, reason = "range checked above")]
            return Self::Int(v as i64);
        }
        Self::Float(v.to_bits())
    }
}

/// Insertion-ordered mapping storage.
#[derive(Debug, Default)]
pub(crate) struct DictStore {
    entries: Vec<(Handle, Handle)>,
    index: HashMap<HashKey, usize>,
}

impl DictStore {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, index: usize) -> Option<(Handle, Handle)> {
        self.entries.get(index).copied()
    }
}

/// Outcome of one iteration-protocol step, computed under the heap borrow.
pub(crate) enum IterStep {
    Done,
    /// Element handle owned by the iterated container (borrowed).
    Item(Handle),
    /// Next character of a string.
    Char(char),
    /// Item `index` of a protocol sequence; the caller resolves it outside the borrow.
    Protocol {
        source: Rc<dyn SequenceSource>,
        index: usize,
    },
    /// Host iterator state; the caller invokes it outside the borrow.
    Host {
        host_type: HostTypeId,
        state: Rc<RefCell<dyn HostIter>>,
    },
}

struct Slot {
    generation: u32,
    refs: usize,
    immortal: bool,
    payload: Option<Payload>,
}

pub(crate) struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    limits: Limits,
    none: Handle,
    host_types: Vec<Box<str>>,
    host_type_ids: HashMap<TypeId, HostTypeId>,
}

impl Heap {
    pub(crate) fn new(limits: Limits) -> Self {
        let none = Slot {
            generation: 0,
            refs: 1,
            immortal: true,
            payload: Some(Payload::None),
        };
        Self {
            slots: vec![none],
            free: Vec::new(),
            live: 0,
            limits,
            none: Handle::new(0, 0),
            host_types: Vec::new(),
            host_type_ids: HashMap::new(),
        }
    }

    pub(crate) fn none(&self) -> Handle {
        self.none
    }

    pub(crate) fn limits(&self) -> Limits {
        self.limits
    }

    /// Number of live mortal objects (the `None` singleton is not counted).
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Allocates `payload` with a reference count of one.
    ///
    /// On failure the payload is handed back so the caller can drop it outside the heap borrow.
    pub(crate) fn alloc(&mut self, payload: Payload) -> Result<Handle, (ObjError, Payload)> {
        if self.live >= self.limits.max_objects {
            let limit = self.limits.max_objects;
            return Err((ObjError::HeapExhausted { limit }, payload));
        }
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.refs = 1;
                slot.payload = Some(payload);
                self.live += 1;
                return Ok(Handle::new(index, slot.generation));
            }
        }
        let Ok(index) = u32::try_from(self.slots.len()) else {
            let limit = self.slots.len();
            return Err((ObjError::HeapExhausted { limit }, payload));
        };
        self.slots.push(Slot {
            generation: 0,
            refs: 1,
            immortal: false,
            payload: Some(payload),
        });
        self.live += 1;
        Ok(Handle::new(index, 0))
    }

    fn slot(&self, h: Handle) -> Result<&Slot, ObjError> {
        match self.slots.get(h.index() as usize) {
            Some(slot) if slot.generation == h.generation() && slot.payload.is_some() => Ok(slot),
            _ => Err(ObjError::BadHandle),
        }
    }

    fn slot_mut(&mut self, h: Handle) -> Result<&mut Slot, ObjError> {
        match self.slots.get_mut(h.index() as usize) {
            Some(slot) if slot.generation == h.generation() && slot.payload.is_some() => Ok(slot),
            _ => Err(ObjError::BadHandle),
        }
    }

    pub(crate) fn payload(&self, h: Handle) -> Result<&Payload, ObjError> {
        self.slot(h)?.payload.as_ref().ok_or(ObjError::BadHandle)
    }

    pub(crate) fn payload_mut(&mut self, h: Handle) -> Result<&mut Payload, ObjError> {
        self.slot_mut(h)?.payload.as_mut().ok_or(ObjError::BadHandle)
    }

    pub(crate) fn kind(&self, h: Handle) -> Result<ObjKind, ObjError> {
        self.payload(h).map(Payload::kind)
    }

    pub(crate) fn ref_count(&self, h: Handle) -> Result<usize, ObjError> {
        self.slot(h).map(|slot| slot.refs)
    }

    pub(crate) fn inc_ref(&mut self, h: Handle) -> Result<(), ObjError> {
        let slot = self.slot_mut(h)?;
        if !slot.immortal {
            slot.refs += 1;
        }
        Ok(())
    }

    /// Releases one count of `h`, freeing it (and transitively its children) at zero.
    ///
    /// Freed payloads are pushed to `garbage`; the caller drops them after the heap borrow ends.
    pub(crate) fn dec_ref(&mut self, h: Handle, garbage: &mut Vec<Payload>) -> Result<(), ObjError> {
        let mut pending = vec![h];
        while let Some(h) = pending.pop() {
            let slot = self.slot_mut(h)?;
            if slot.immortal {
                continue;
            }
            slot.refs -= 1;
            if slot.refs > 0 {
                continue;
            }
            let payload = slot.payload.take();
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(h.index());
            self.live -= 1;
            if let Some(payload) = payload {
                payload.push_children(&mut pending);
                garbage.push(payload);
            }
        }
        Ok(())
    }

    pub(crate) fn register_host_type(&mut self, key: TypeId, name: &str) -> HostTypeId {
        if let Some(&id) = self.host_type_ids.get(&key) {
            return id;
        }
        let id = HostTypeId(u32::try_from(self.host_types.len()).unwrap_or(u32::MAX));
        self.host_types.push(name.into());
        self.host_type_ids.insert(key, id);
        id
    }

    pub(crate) fn host_type(&self, key: TypeId) -> Option<HostTypeId> {
        self.host_type_ids.get(&key).copied()
    }

    pub(crate) fn host_type_name(&self, id: HostTypeId) -> Option<&str> {
        self.host_types.get(id.0 as usize).map(|name| &**name)
    }

    pub(crate) fn list(&self, h: Handle) -> Result<&[Handle], ObjError> {
        match self.payload(h)? {
            Payload::List(items) => Ok(items),
            other => Err(wrong_kind("list", other)),
        }
    }

    pub(crate) fn list_mut(&mut self, h: Handle) -> Result<&mut Vec<Handle>, ObjError> {
        match self.payload_mut(h)? {
            Payload::List(items) => Ok(items),
            other => Err(wrong_kind("list", other)),
        }
    }

    pub(crate) fn tuple(&self, h: Handle) -> Result<&[Handle], ObjError> {
        match self.payload(h)? {
            Payload::Tuple(items) => Ok(items),
            other => Err(wrong_kind("tuple", other)),
        }
    }

    pub(crate) fn dict(&self, h: Handle) -> Result<&DictStore, ObjError> {
        match self.payload(h)? {
            Payload::Dict(store) => Ok(store),
            other => Err(wrong_kind("dict", other)),
        }
    }

    pub(crate) fn hash_key(&self, h: Handle) -> Result<HashKey, ObjError> {
        match self.payload(h)? {
            Payload::None => Ok(HashKey::None),
            Payload::Bool(v) => Ok(HashKey::Int(i64::from(*v))),
            Payload::Int(v) => Ok(HashKey::Int(*v)),
            Payload::Float(v) => Ok(HashKey::from_float(*v)),
            Payload::Str(s) => Ok(HashKey::Str(s.clone())),
            Payload::Tuple(items) => items
                .iter()
                .map(|&item| self.hash_key(item))
                .collect::<Result<Box<[_]>, _>>()
                .map(HashKey::Tuple),
            other => Err(ObjError::Unhashable(other.kind())),
        }
    }

    pub(crate) fn dict_lookup(&self, dict: Handle, key: Handle) -> Result<Option<Handle>, ObjError> {
        let key = self.hash_key(key)?;
        let store = self.dict(dict)?;
        Ok(store
            .index
            .get(&key)
            .and_then(|&i| store.entries.get(i))
            .map(|&(_, value)| value))
    }

    /// Stores `key -> value`, taking ownership of one count of each.
    ///
    /// When the key already exists, the stored key is kept and the value replaced; the unused new
    /// key and the displaced value are returned so the caller can release them.
    pub(crate) fn dict_insert(
        &mut self,
        dict: Handle,
        key: Handle,
        value: Handle,
    ) -> Result<Option<(Handle, Handle)>, ObjError> {
        let hash = self.hash_key(key)?;
        let store = match self.payload_mut(dict)? {
            Payload::Dict(store) => store,
            other => return Err(wrong_kind("dict", other)),
        };
        if let Some(&i) = store.index.get(&hash) {
            if let Some(entry) = store.entries.get_mut(i) {
                let old = core::mem::replace(&mut entry.1, value);
                return Ok(Some((key, old)));
            }
        }
        store.index.insert(hash, store.entries.len());
        store.entries.push((key, value));
        Ok(None)
    }

    /// Advances the iterator `iter` by one position.
    pub(crate) fn iter_step(&mut self, iter: Handle) -> Result<IterStep, ObjError> {
        let (source, index) = match self.payload(iter)? {
            Payload::SeqIter { seq, index } => (*seq, *index),
            Payload::KeyIter { dict, index } => (*dict, *index),
            Payload::HostIter { host_type, state } => {
                return Ok(IterStep::Host {
                    host_type: *host_type,
                    state: Rc::clone(state),
                });
            }
            other => return Err(wrong_kind("iterator", other)),
        };
        let step = match self.payload(source)? {
            Payload::List(items) => items.get(index).map_or(IterStep::Done, |&h| IterStep::Item(h)),
            Payload::Tuple(items) => {
                items.get(index).map_or(IterStep::Done, |&h| IterStep::Item(h))
            }
            Payload::Str(s) => s.chars().nth(index).map_or(IterStep::Done, IterStep::Char),
            Payload::Dict(store) => store
                .entry(index)
                .map_or(IterStep::Done, |(key, _)| IterStep::Item(key)),
            Payload::Sequence(src) => IterStep::Protocol {
                source: Rc::clone(src),
                index,
            },
            other => return Err(wrong_kind("iterable", other)),
        };
        if !matches!(step, IterStep::Done) {
            if let Payload::SeqIter { index, .. } | Payload::KeyIter { index, .. } =
                self.payload_mut(iter)?
            {
                *index += 1;
            }
        }
        Ok(step)
    }

    /// Writes a runtime-style representation of `h` to `out`.
    pub(crate) fn repr(
        &self,
        h: Handle,
        out: &mut String,
        visiting: &mut Vec<Handle>,
    ) -> Result<(), ObjError> {
        if visiting.contains(&h) {
            out.push_str("...");
            return Ok(());
        }
        match self.payload(h)? {
            Payload::None => out.push_str("None"),
            Payload::Bool(true) => out.push_str("True"),
            Payload::Bool(false) => out.push_str("False"),
            Payload::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Payload::Float(v) if v.is_nan() => out.push_str("nan"),
            Payload::Float(v) => {
                let _ = write!(out, "{v:?}");
            }
            Payload::Str(s) => repr_str(s, out),
            Payload::List(items) => {
                visiting.push(h);
                self.repr_items(items, "[", "]", out, visiting)?;
                visiting.pop();
            }
            Payload::Tuple(items) => {
                visiting.push(h);
                let close = if items.len() == 1 { ",)" } else { ")" };
                self.repr_items(items, "(", close, out, visiting)?;
                visiting.pop();
            }
            Payload::Dict(store) => {
                visiting.push(h);
                out.push('{');
                for (i, &(key, value)) in store.entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.repr(key, out, visiting)?;
                    out.push_str(": ");
                    self.repr(value, out, visiting)?;
                }
                out.push('}');
                visiting.pop();
            }
            Payload::SeqIter { .. } | Payload::KeyIter { .. } | Payload::HostIter { .. } => {
                out.push_str("<iterator>");
            }
            Payload::Sequence(_) => out.push_str("<sequence>"),
            Payload::Host { host_type, .. } => {
                let name = self.host_type_name(*host_type).unwrap_or("object");
                let _ = write!(out, "<{name} object>");
            }
        }
        Ok(())
    }

    fn repr_items(
        &self,
        items: &[Handle],
        open: &str,
        close: &str,
        out: &mut String,
        visiting: &mut Vec<Handle>,
    ) -> Result<(), ObjError> {
        out.push_str(open);
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.repr(item, out, visiting)?;
        }
        out.push_str(close);
        Ok(())
    }
}

fn repr_str(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

pub(crate) fn wrong_kind(expected: &'static str, found: &Payload) -> ObjError {
    ObjError::WrongKind {
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap() -> Heap {
        Heap::new(Limits::default())
    }

    #[test]
    fn freed_slot_rejects_stale_handle() {
        let mut h = heap();
        let a = h.alloc(Payload::Int(1)).ok().unwrap();
        let mut garbage = Vec::new();
        h.dec_ref(a, &mut garbage).unwrap();
        assert_eq!(garbage.len(), 1);
        assert_eq!(h.kind(a), Err(ObjError::BadHandle));

        let b = h.alloc(Payload::Int(2)).ok().unwrap();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert_eq!(h.kind(b), Ok(ObjKind::Int));
    }

    #[test]
    fn releasing_container_releases_children() {
        let mut h = heap();
        let x = h.alloc(Payload::Int(1)).ok().unwrap();
        let y = h.alloc(Payload::Int(2)).ok().unwrap();
        let list = h.alloc(Payload::List(vec![x, y])).ok().unwrap();
        assert_eq!(h.live(), 3);

        let mut garbage = Vec::new();
        h.dec_ref(list, &mut garbage).unwrap();
        assert_eq!(h.live(), 0);
        assert_eq!(garbage.len(), 3);
    }

    #[test]
    fn none_singleton_is_immortal() {
        let mut h = heap();
        let none = h.none();
        let mut garbage = Vec::new();
        for _ in 0..4 {
            h.dec_ref(none, &mut garbage).unwrap();
        }
        assert_eq!(h.kind(none), Ok(ObjKind::None));
        assert!(garbage.is_empty());
    }

    #[test]
    fn numerically_equal_keys_collide() {
        let mut h = heap();
        let one = h.alloc(Payload::Int(1)).ok().unwrap();
        let one_f = h.alloc(Payload::Float(1.0)).ok().unwrap();
        let yes = h.alloc(Payload::Bool(true)).ok().unwrap();
        let half = h.alloc(Payload::Float(0.5)).ok().unwrap();
        assert_eq!(h.hash_key(one), h.hash_key(one_f));
        assert_eq!(h.hash_key(one), h.hash_key(yes));
        assert_ne!(h.hash_key(one), h.hash_key(half));
    }

    #[test]
    fn alloc_respects_limit() {
        let mut h = Heap::new(Limits { max_objects: 1 });
        assert!(h.alloc(Payload::Int(1)).is_ok());
        match h.alloc(Payload::Int(2)) {
            Err((err, _)) => assert_eq!(err, ObjError::HeapExhausted { limit: 1 }),
            Ok(_) => panic!("allocation past the limit succeeded"),
        }
    }
}
