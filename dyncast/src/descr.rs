// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural type descriptors.
//!
//! Every type that can be viewed through this crate names itself with a [`TypeDescr`], built at
//! compile time from the descriptors of its element types:
//!
//! ```
//! use dyncast::{Dict, List, descriptor};
//!
//! assert_eq!(descriptor::<Dict<String, List<i64>>>(), "Dict[str, List[int]]");
//! ```

use alloc::string::String;
use core::fmt;

/// A compile-time type descriptor.
///
/// Rendering is a pure function of the tree:
/// - `Leaf(name)` renders `name`.
/// - `Generic { head, args }` renders `head[arg0, arg1, ...]`.
/// - `EmptyTuple` renders `Tuple[()]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescr {
    /// A named leaf such as `int` or `Any`.
    Leaf(&'static str),
    /// A generic head applied to argument descriptors.
    Generic {
        /// Head name, e.g. `List`.
        head: &'static str,
        /// Argument descriptors in declaration order.
        args: &'static [TypeDescr],
    },
    /// The zero-arity tuple.
    EmptyTuple,
}

impl TypeDescr {
    /// `int`.
    pub const INT: Self = Self::Leaf("int");
    /// `float`.
    pub const FLOAT: Self = Self::Leaf("float");
    /// `str`.
    pub const STR: Self = Self::Leaf("str");
    /// `bool`.
    pub const BOOL: Self = Self::Leaf("bool");
    /// `None`.
    pub const NONE: Self = Self::Leaf("None");
    /// `Any`.
    pub const ANY: Self = Self::Leaf("Any");
}

impl fmt::Display for TypeDescr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(name) => f.write_str(name),
            Self::Generic { head, args } => {
                write!(f, "{head}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(arg, f)?;
                }
                f.write_str("]")
            }
            Self::EmptyTuple => f.write_str("Tuple[()]"),
        }
    }
}

/// Types with a structural descriptor.
pub trait TypeName {
    /// The descriptor of `Self`.
    const DESCR: TypeDescr;
}

/// Renders the descriptor of `T`.
#[must_use]
pub fn descriptor<T: TypeName + ?Sized>() -> String {
    use alloc::string::ToString;
    T::DESCR.to_string()
}

macro_rules! leaf {
    ($descr:expr => $($t:ty),+ $(,)?) => {
        $(
            impl TypeName for $t {
                const DESCR: TypeDescr = $descr;
            }
        )+
    };
}

leaf!(TypeDescr::INT => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
leaf!(TypeDescr::FLOAT => f32, f64);
leaf!(TypeDescr::STR => String, str, char);
leaf!(TypeDescr::BOOL => bool);
leaf!(TypeDescr::NONE => ());
leaf!(TypeDescr::ANY => dynobj::Object);

impl<T: TypeName> TypeName for alloc::vec::Vec<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "List",
        args: &[T::DESCR],
    };
}

impl<T: TypeName> TypeName for Option<T> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Optional",
        args: &[T::DESCR],
    };
}

impl<K: TypeName, V: TypeName> TypeName for alloc::collections::BTreeMap<K, V> {
    const DESCR: TypeDescr = TypeDescr::Generic {
        head: "Dict",
        args: &[K::DESCR, V::DESCR],
    };
}

impl<T: TypeName + ?Sized> TypeName for &T {
    const DESCR: TypeDescr = T::DESCR;
}

macro_rules! host_tuple_name {
    ($($T:ident),+) => {
        impl<$($T: TypeName),+> TypeName for ($($T,)+) {
            const DESCR: TypeDescr = TypeDescr::Generic {
                head: "Tuple",
                args: &[$($T::DESCR),+],
            };
        }
    };
}

host_tuple_name!(A);
host_tuple_name!(A, B);
host_tuple_name!(A, B, C);
host_tuple_name!(A, B, C, D);
host_tuple_name!(A, B, C, D, E);
host_tuple_name!(A, B, C, D, E, F);
host_tuple_name!(A, B, C, D, E, F, G);
host_tuple_name!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;

    #[test]
    fn leaves() {
        assert_eq!(descriptor::<i64>(), "int");
        assert_eq!(descriptor::<u8>(), "int");
        assert_eq!(descriptor::<f32>(), "float");
        assert_eq!(descriptor::<String>(), "str");
        assert_eq!(descriptor::<()>(), "None");
        assert_eq!(descriptor::<dynobj::Object>(), "Any");
    }

    #[test]
    fn host_composites_nest() {
        assert_eq!(descriptor::<Vec<Option<i64>>>(), "List[Optional[int]]");
        assert_eq!(descriptor::<(i64, String)>(), "Tuple[int, str]");
        assert_eq!(
            descriptor::<BTreeMap<String, Vec<f64>>>(),
            "Dict[str, List[float]]"
        );
    }

    #[test]
    fn empty_tuple_renders_unit() {
        assert_eq!(alloc::format!("{}", TypeDescr::EmptyTuple), "Tuple[()]");
    }
}
