// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared plumbing of the typed views.

/// Implements the accessors, `Clone`, `Debug` and [`IntoObject`](crate::IntoObject) shared by
/// every view holding `obj: Object` and `_marker: PhantomData<fn() -> (P, ...)>`.
macro_rules! view_common {
    ($name:ident < $($p:ident),+ >) => {
        impl<$($p),+> $name<$($p),+> {
            #[inline]
            pub(crate) fn from_object(obj: dynobj::Object) -> Self {
                Self {
                    obj,
                    _marker: core::marker::PhantomData,
                }
            }

            /// Returns the underlying runtime reference.
            #[must_use]
            #[inline]
            pub fn as_object(&self) -> &dynobj::Object {
                &self.obj
            }

            /// Gives up the view, returning the underlying runtime reference.
            #[must_use]
            #[inline]
            pub fn into_object(self) -> dynobj::Object {
                self.obj
            }

            /// Returns the raw handle of the viewed value.
            #[must_use]
            #[inline]
            pub fn handle(&self) -> dynobj::Handle {
                self.obj.handle()
            }

            /// Returns the runtime the viewed value lives in.
            #[must_use]
            #[inline]
            pub fn runtime(&self) -> &dynobj::Runtime {
                self.obj.runtime()
            }
        }

        impl<$($p),+> Clone for $name<$($p),+> {
            fn clone(&self) -> Self {
                Self::from_object(self.obj.clone())
            }
        }

        impl<$($p),+> $crate::into::IntoObject for $name<$($p),+> {
            #[inline]
            fn into_runtime(
                self,
                rt: &dynobj::Runtime,
            ) -> Result<dynobj::Object, $crate::error::CastError> {
                $crate::into::owned_by(rt, self.obj)
            }
        }

        impl<$($p),+> core::fmt::Debug for $name<$($p),+> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self.obj.repr() {
                    Ok(repr) => write!(f, "{}({repr})", stringify!($name)),
                    Err(_) => f
                        .debug_struct(stringify!($name))
                        .field("handle", &self.obj.handle())
                        .finish_non_exhaustive(),
                }
            }
        }
    };
}

pub(crate) use view_common;
