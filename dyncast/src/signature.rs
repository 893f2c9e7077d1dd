// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Introspection signatures built from type descriptors.

use alloc::borrow::Cow;
use alloc::vec::Vec;
use core::fmt;

use crate::descr::{TypeDescr, TypeName};

/// A callable's signature, rendered like `__init__(self, arg0: List[int]) -> None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    name: Cow<'static, str>,
    method: bool,
    args: Vec<(Cow<'static, str>, TypeDescr)>,
    returns: TypeDescr,
}

impl Signature {
    fn new(name: impl Into<Cow<'static, str>>, method: bool) -> Self {
        Self {
            name: name.into(),
            method,
            args: Vec::new(),
            returns: TypeDescr::NONE,
        }
    }

    /// Starts the signature of a method; `self` is rendered first.
    pub fn method(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, true)
    }

    /// Starts the signature of a free function.
    pub fn function(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, false)
    }

    /// Appends a parameter.
    #[must_use]
    pub fn arg(mut self, name: impl Into<Cow<'static, str>>, descr: TypeDescr) -> Self {
        self.args.push((name.into(), descr));
        self
    }

    /// Appends a parameter typed by `T`'s descriptor.
    #[must_use]
    pub fn arg_of<T: TypeName + ?Sized>(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.arg(name, T::DESCR)
    }

    /// Sets the return type. Defaults to `None`.
    #[must_use]
    pub fn returns(mut self, descr: TypeDescr) -> Self {
        self.returns = descr;
        self
    }

    /// Sets the return type from `T`'s descriptor.
    #[must_use]
    pub fn returns_of<T: TypeName + ?Sized>(self) -> Self {
        self.returns(T::DESCR)
    }

    /// Returns the callable's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        let mut first = true;
        if self.method {
            f.write_str("self")?;
            first = false;
        }
        for (name, descr) in &self.args {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {descr}")?;
            first = false;
        }
        write!(f, ") -> {}", self.returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dict, List, Optional};
    use alloc::string::{String, ToString};

    #[test]
    fn renders_methods() {
        let init = Signature::method("__init__").arg_of::<List<i64>>("arg0");
        assert_eq!(init.to_string(), "__init__(self, arg0: List[int]) -> None");

        let get = Signature::method("get_data").returns_of::<List<i64>>();
        assert_eq!(get.to_string(), "get_data(self) -> List[int]");
    }

    #[test]
    fn renders_functions() {
        let sig = Signature::function("lookup")
            .arg_of::<Dict<String, List<f64>>>("table")
            .arg("key", TypeDescr::STR)
            .returns_of::<Optional<List<f64>>>();
        assert_eq!(
            sig.to_string(),
            "lookup(table: Dict[str, List[float]], key: str) -> Optional[List[float]]"
        );
        assert_eq!(sig.name(), "lookup");
    }

    #[test]
    fn empty_function() {
        assert_eq!(Signature::function("f").to_string(), "f() -> None");
    }
}
