// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use dynobj::{HostTypeId, Runtime};
use std::collections::HashMap;
use std::string::String;

/// Optional label resolver for profiling zones.
///
/// Each method receives the label reported by the runtime. Return `None` to keep it.
pub trait LabelResolver {
    /// Resolve a label for a conversion scope. `target` is the rendered type descriptor.
    fn convert_label(&mut self, _target: &str) -> Option<String> {
        None
    }

    /// Resolve a label for an iteration step.
    fn iter_step_label(&mut self, _label: &str) -> Option<String> {
        None
    }

    /// Resolve a label for a call into a host iterator. The runtime reports `host_iter:<id>`.
    fn host_call_label(&mut self, _label: &str) -> Option<String> {
        None
    }
}

/// Default resolver that keeps the runtime's labels.
#[derive(Default, Debug)]
pub struct DefaultLabelResolver;

impl LabelResolver for DefaultLabelResolver {}

/// Resolver that replaces host type ids with the names they were registered under.
///
/// Names are captured up front with [`HostTypeNameResolver::capture`] so the resolver does not
/// keep the runtime alive.
#[derive(Default, Debug)]
pub struct HostTypeNameResolver {
    names: HashMap<u32, String>,
}

impl HostTypeNameResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the registered name of `id`. Returns `false` if `id` is unknown to `rt`.
    pub fn capture(&mut self, rt: &Runtime, id: HostTypeId) -> bool {
        let Some(name) = rt.host_type_name(id) else {
            return false;
        };
        self.names.insert(id.0, name);
        true
    }
}

impl LabelResolver for HostTypeNameResolver {
    fn host_call_label(&mut self, label: &str) -> Option<String> {
        let id: u32 = label.strip_prefix("host_iter:")?.parse().ok()?;
        let name = self.names.get(&id)?;
        Some(format!("host_iter:{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_fall_back() {
        let mut resolver = HostTypeNameResolver::new();
        assert_eq!(resolver.host_call_label("host_iter:7"), None);
        assert_eq!(resolver.host_call_label("next"), None);
        assert_eq!(DefaultLabelResolver.convert_label("List[int]"), None);
    }

    #[test]
    fn captured_names_replace_ids() {
        let rt = Runtime::new();
        let id = rt.register_host_type::<u64>("Counter").unwrap();
        let mut resolver = HostTypeNameResolver::new();
        assert!(resolver.capture(&rt, id));
        assert!(!resolver.capture(&rt, HostTypeId(99)));
        let label = format!("host_iter:{}", id.0);
        assert_eq!(
            resolver.host_call_label(&label).as_deref(),
            Some("host_iter:Counter")
        );
    }
}
