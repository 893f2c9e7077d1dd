// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Views of host objects wrapping a registered Rust type.

use alloc::rc::Rc;
use core::any::Any;
use core::marker::PhantomData;

use dynobj::{Handle, ObjKind, Object, Runtime};

use crate::cast::{FromObject, view};
use crate::descr::{TypeDescr, TypeName};
use crate::error::CastError;
use crate::ownership::Ownership;
use crate::view::view_common;

/// A view of a runtime host object holding a `T`.
///
/// `T` must have been registered with [`Runtime::register_host_type`]; its descriptor is its
/// own [`TypeName`].
pub struct Custom<T> {
    obj: Object,
    _marker: PhantomData<fn() -> (T,)>,
}

view_common!(Custom<T>);

impl<T: Any> Custom<T> {
    /// Moves `value` into a new host object.
    pub fn new(rt: &Runtime, value: T) -> Result<Self, CastError> {
        Ok(Self::from_object(rt.new_host(value)?))
    }

    /// Returns the wrapped value.
    pub fn get(&self) -> Result<Rc<T>, CastError> {
        Ok(self.runtime().host_value::<T>(self.handle())?)
    }
}

impl<T: TypeName> TypeName for Custom<T> {
    const DESCR: TypeDescr = T::DESCR;
}

impl<T: Any + TypeName> FromObject for Custom<T> {
    fn accepts(rt: &Runtime, h: Handle, _convert: bool) -> bool {
        rt.host_type::<T>()
            .is_some_and(|id| rt.kind(h) == Ok(ObjKind::Host(id)))
    }

    fn from_handle<O: Ownership>(rt: &Runtime, h: Handle, own: O) -> Result<Self, CastError> {
        view(rt, h, own, Self::from_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::List;
    use crate::cast::cast_from_handle;
    use crate::descr::descriptor;
    use dynobj::ObjError;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl TypeName for Point {
        const DESCR: TypeDescr = TypeDescr::Leaf("Point");
    }

    struct Other;

    impl TypeName for Other {
        const DESCR: TypeDescr = TypeDescr::Leaf("Other");
    }

    #[test]
    fn descriptor_is_the_host_name() {
        assert_eq!(descriptor::<Custom<Point>>(), "Point");
        assert_eq!(descriptor::<List<Custom<Point>>>(), "List[Point]");
    }

    #[test]
    fn wraps_and_unwraps() {
        let rt = Runtime::new();
        rt.register_host_type::<Point>("Point").unwrap();
        let p = Custom::new(&rt, Point { x: 1, y: 2 }).unwrap();
        let back: Custom<Point> = cast_from_handle(&rt, p.handle()).unwrap();
        assert_eq!(*back.get().unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn other_host_types_are_rejected() {
        let rt = Runtime::new();
        rt.register_host_type::<Point>("Point").unwrap();
        rt.register_host_type::<Other>("Other").unwrap();
        let o = Custom::new(&rt, Other).unwrap();
        assert!(cast_from_handle::<Custom<Point>>(&rt, o.handle()).is_err());
        let n = rt.new_int(1).unwrap();
        assert!(cast_from_handle::<Custom<Point>>(&rt, n.handle()).is_err());
    }

    #[test]
    fn unregistered_type_cannot_be_wrapped() {
        let rt = Runtime::new();
        assert!(matches!(
            Custom::new(&rt, Point { x: 0, y: 0 }),
            Err(CastError::Runtime(ObjError::UnregisteredHostType { .. }))
        ));
    }
}
