// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned references.

use alloc::string::String;
use core::fmt;

use crate::error::ObjError;
use crate::runtime::Runtime;
use crate::value::{Handle, ObjKind};

// Marks an `Object` whose count was handed off by `into_raw`.
const DETACHED: Handle = Handle::new(u32::MAX, u32::MAX);

/// An owned reference to a runtime value.
///
/// An `Object` holds exactly one reference count, released when it is dropped. `Clone` acquires
/// another count.
pub struct Object {
    rt: Runtime,
    handle: Handle,
}

impl Object {
    /// Acquires a new count of `h` (borrowed acquisition).
    pub fn borrowed(rt: &Runtime, h: Handle) -> Result<Self, ObjError> {
        rt.inc_ref(h)?;
        Ok(Self {
            rt: rt.clone(),
            handle: h,
        })
    }

    /// Takes over a count of `h` the caller already owns (stolen acquisition).
    ///
    /// The count is released when the returned `Object` is dropped.
    #[must_use]
    pub fn stolen(rt: &Runtime, h: Handle) -> Self {
        Self {
            rt: rt.clone(),
            handle: h,
        }
    }

    /// Returns the raw handle without affecting the count.
    #[must_use]
    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Returns the runtime this object lives in.
    #[must_use]
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.rt
    }

    /// Gives up ownership of the count, returning the raw handle.
    ///
    /// The caller becomes responsible for the count (for example by passing the handle to
    /// [`Object::stolen`]).
    #[must_use]
    pub fn into_raw(mut self) -> Handle {
        core::mem::replace(&mut self.handle, DETACHED)
    }

    /// Returns the object's kind.
    pub fn kind(&self) -> Result<ObjKind, ObjError> {
        self.rt.kind(self.handle)
    }

    /// Returns the current reference count.
    pub fn ref_count(&self) -> Result<usize, ObjError> {
        self.rt.ref_count(self.handle)
    }

    /// Returns `true` if this is the `None` singleton.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.rt.is_none(self.handle)
    }

    /// Returns `true` if both refer to the same value.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        self.handle == other.handle && self.rt.ptr_eq(&other.rt)
    }

    /// Returns a runtime-style representation.
    pub fn repr(&self) -> Result<String, ObjError> {
        self.rt.repr(self.handle)
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        let counted = self.rt.inc_ref(self.handle);
        debug_assert!(
            counted.is_ok(),
            "cloned an object without a valid count: {counted:?}"
        );
        // In release builds a failed increment leaves a clone that owns no count.
        Self {
            rt: self.rt.clone(),
            handle: if counted.is_ok() {
                self.handle
            } else {
                DETACHED
            },
        }
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        if self.handle != DETACHED {
            self.rt.release(self.handle);
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rt.repr(self.handle) {
            Ok(repr) => f.debug_tuple("Object").field(&format_args!("{repr}")).finish(),
            Err(_) => f
                .debug_struct("Object")
                .field("handle", &self.handle)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_and_drop_balance_counts() {
        let rt = Runtime::new();
        let a = rt.new_int(5).unwrap();
        assert_eq!(a.ref_count().unwrap(), 1);
        let b = a.clone();
        assert_eq!(a.ref_count().unwrap(), 2);
        assert!(a.is(&b));
        drop(b);
        assert_eq!(a.ref_count().unwrap(), 1);
    }

    #[test]
    fn borrowed_increments_and_stolen_takes_over() {
        let rt = Runtime::new();
        let a = rt.new_str("x").unwrap();
        let borrowed = Object::borrowed(&rt, a.handle()).unwrap();
        assert_eq!(a.ref_count().unwrap(), 2);

        let raw = borrowed.into_raw();
        assert_eq!(a.ref_count().unwrap(), 2);
        let stolen = Object::stolen(&rt, raw);
        assert_eq!(a.ref_count().unwrap(), 2);
        drop(stolen);
        assert_eq!(a.ref_count().unwrap(), 1);
    }

    #[test]
    fn borrowing_a_stale_handle_fails() {
        let rt = Runtime::new();
        let a = rt.new_int(1).unwrap();
        let h = a.handle();
        drop(a);
        assert_eq!(Object::borrowed(&rt, h).unwrap_err(), ObjError::BadHandle);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "released an invalid count")]
    fn releasing_a_stale_handle_is_caught() {
        let rt = Runtime::new();
        let a = rt.new_int(1).unwrap();
        let h = a.handle();
        drop(a);
        drop(Object::stolen(&rt, h));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "cloned an object without a valid count")]
    fn cloning_a_stale_object_is_caught() {
        let rt = Runtime::new();
        let a = rt.new_int(1).unwrap();
        let h = a.handle();
        drop(a);
        // Never dropped, so unwinding does not release the stale handle again.
        let stale = core::mem::ManuallyDrop::new(Object::stolen(&rt, h));
        let _copy = core::mem::ManuallyDrop::new((*stale).clone());
    }

    #[test]
    fn debug_shows_repr() {
        let rt = Runtime::new();
        let s = rt.new_str("hi").unwrap();
        assert_eq!(alloc::format!("{s:?}"), "Object('hi')");
    }
}
