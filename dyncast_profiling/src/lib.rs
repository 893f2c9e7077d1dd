// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Profiling adapters for `dynobj` trace scopes (currently Tracy).
//!
//! This crate is `std`-only and keeps `dynobj` and `dyncast` free of profiling dependencies.
//! It listens for scope enter/exit callbacks and emits matching profiling zones.
//!
//! ## Backend
//! This crate currently supports the Tracy backend via `tracy-client`.
//!
//! ## Example
//! ```ignore
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use dyncast_profiling::ProfilingTraceSink;
//!
//! let rt = dynobj::Runtime::new();
//! rt.set_trace_sink(Rc::new(RefCell::new(ProfilingTraceSink::new())));
//! // Conversions and iteration steps now show up as Tracy zones.
//! ```

mod resolver;
mod sink;

pub use resolver::{DefaultLabelResolver, HostTypeNameResolver, LabelResolver};
pub use sink::ProfilingTraceSink;
