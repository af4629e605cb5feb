// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! # graphpack - binary serialization for value graphs
//!
//! A compact, self-describing binary codec for dynamically-typed,
//! graph-shaped values: numbers, text, booleans, an explicit nil, and
//! heterogeneous containers that may share sub-structures, point back
//! at themselves, or carry registered custom types. One encode pass
//! turns a list of values into bytes; one decode pass rebuilds a graph
//! that is structurally *and referentially* equivalent — the same
//! sharing, the same cycles, the same registered singletons.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphpack::{decode, encode, Registry, Table, TableHandle, Value};
//!
//! let registry = Registry::new();
//!
//! // A table that contains itself still round-trips.
//! let node = TableHandle::new(Table::new());
//! node.borrow_mut()
//!     .set(Value::from("cycle"), Value::Table(node.clone()))
//!     .unwrap();
//!
//! let bytes = encode(&registry, &[Value::Table(node.clone()), Value::Table(node)]).unwrap();
//! let values = decode(&registry, &bytes).unwrap();
//!
//! // Both decoded values are one identity, pointing back at itself.
//! let a = values[0].as_table().unwrap();
//! let b = values[1].as_table().unwrap();
//! assert!(TableHandle::ptr_eq(a, b));
//! let cycle = a.borrow().get(&Value::from("cycle"));
//! assert!(TableHandle::ptr_eq(cycle.as_table().unwrap(), a));
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Value`] | Tagged union over every supported value kind |
//! | [`Table`] / [`TableHandle`] | Container with array part + keyed part, shared by handle |
//! | [`Registry`] | Type descriptors, resource singletons, function codec |
//! | [`TypeDescriptor`] | Name + encoding strategy for a custom type |
//! | [`Template`] | Ordered field keys for positional, key-omitting encoding |
//! | [`HookPair`] | Custom serialize/deserialize transform pair |
//!
//! ## Custom types
//!
//! A table tagged with a registered name encodes through one of three
//! strategies: *fields* (container verbatim, name-prefixed), *hooks*
//! (a substitute constructor value built and consumed by host
//! transforms), or *template* (positional values for a fixed field
//! set — keys never hit the wire). Resources go the other way around:
//! only the name is written, and decode resolves it against whatever
//! object is registered at that moment.
//!
//! ## Concurrency
//!
//! None. A pass is a single synchronous traversal; values are
//! `Rc`-based and thread-affine. The registry is a plain owned value —
//! Rust's borrow rules are the external synchronization the design
//! asks for (no `&mut Registry` mutation can overlap a running pass
//! holding `&Registry`).

/// Pluggable function serialization (codec trait + erroring default).
pub mod func;
/// Type and resource registry.
pub mod registry;
/// Encode/decode passes and their error types.
pub mod ser;
/// Positional field templates for registered types.
pub mod template;
/// The dynamically-typed value model.
pub mod value;

pub use func::{CodecError, FunctionCodec, NoFunctionCodec};
pub use registry::{HookPair, Registry, RegistryError, Strategy, TypeDescriptor};
pub use ser::{decode, encode, DecodeError, EncodeError};
pub use template::{Template, TemplateEntry};
pub use value::{deep_equals, FuncHandle, Table, TableError, TableHandle, Value};
