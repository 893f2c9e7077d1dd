// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ownership tags for conversions.
//!
//! A conversion receives a raw [`Handle`] together with a tag saying who owns the count:
//!
//! - [`Borrowed`]: the caller keeps its reference. A successful conversion that needs to keep the
//!   value acquires a new count; a failed conversion leaves the count untouched.
//! - [`Stolen`]: the caller hands over one count. The conversion either keeps it (in the returned
//!   view) or releases it, on success and on failure alike.

use dynobj::{Handle, ObjError, Object, Runtime};

/// How a conversion takes ownership of its input handle.
pub trait Ownership: Copy {
    /// Produces an owned [`Object`] for `h`.
    fn acquire(self, rt: &Runtime, h: Handle) -> Result<Object, ObjError>;

    /// Gives up the input without keeping it.
    fn release(self, rt: &Runtime, h: Handle);
}

/// The caller keeps its reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Borrowed;

/// The caller transfers one count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stolen;

impl Ownership for Borrowed {
    #[inline]
    fn acquire(self, rt: &Runtime, h: Handle) -> Result<Object, ObjError> {
        Object::borrowed(rt, h)
    }

    #[inline]
    fn release(self, _rt: &Runtime, _h: Handle) {}
}

impl Ownership for Stolen {
    #[inline]
    fn acquire(self, rt: &Runtime, h: Handle) -> Result<Object, ObjError> {
        Ok(Object::stolen(rt, h))
    }

    #[inline]
    fn release(self, rt: &Runtime, h: Handle) {
        drop(Object::stolen(rt, h));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_acquire_adds_a_count() {
        let rt = Runtime::new();
        let a = rt.new_int(1).unwrap();
        let b = Borrowed.acquire(&rt, a.handle()).unwrap();
        assert_eq!(a.ref_count().unwrap(), 2);
        drop(b);
        Borrowed.release(&rt, a.handle());
        assert_eq!(a.ref_count().unwrap(), 1);
    }

    #[test]
    fn stolen_release_drops_the_transferred_count() {
        let rt = Runtime::new();
        let a = rt.new_int(1).unwrap();
        let extra = a.clone().into_raw();
        assert_eq!(a.ref_count().unwrap(), 2);
        Stolen.release(&rt, extra);
        assert_eq!(a.ref_count().unwrap(), 1);
    }
}
