// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! Type and resource registry.
//!
//! The registry is an owned value: hosts mutate it through `&mut self`
//! between passes and hand `&Registry` to [`encode`](crate::ser::encode)
//! and [`decode`](crate::ser::decode). The borrow rules are the external
//! synchronization the design assumes — no `register` call can overlap a
//! pass that might consult the name being changed.
//!
//! Types map a name to an encoding [`Strategy`]; resources map a name to
//! a live object identity (and that identity back to the name, for the
//! encoder). Resource content never crosses the wire: decode hands back
//! whatever object is registered under the name *at decode time*.

use crate::func::{FunctionCodec, NoFunctionCodec};
use crate::template::Template;
use crate::value::{ObjId, Value};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Errors for registry mutations.
#[derive(Debug)]
pub enum RegistryError {
    /// The name is already bound to a different descriptor or object.
    NameCollision(String),
    /// Resources must be identity-bearing (table or function) values.
    NotReferenceable { name: String, kind: &'static str },
    /// The template names `Nil` as a field key.
    InvalidTemplate(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameCollision(name) => {
                write!(f, "name '{}' is already registered to a different entry", name)
            }
            Self::NotReferenceable { name, kind } => {
                write!(
                    f,
                    "resource '{}' must be a table or function, got {}",
                    name, kind
                )
            }
            Self::InvalidTemplate(name) => {
                write!(f, "template for '{}' uses nil as a field key", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Hook pair for custom serialization.
///
/// `serialize` turns a live object into a substitute *constructor*
/// value the engine encodes in its place; `deserialize` rebuilds the
/// object from the decoded constructor. Hooks that hand back the very
/// object they were given have no well-founded base case; the encoder
/// rejects that with
/// [`EncodeError::ConstructorCycle`](crate::ser::EncodeError::ConstructorCycle).
#[derive(Clone)]
pub struct HookPair {
    serialize: Rc<dyn Fn(&Value) -> Value>,
    deserialize: Rc<dyn Fn(Value) -> Value>,
}

impl HookPair {
    /// Build a hook pair from the two transforms.
    pub fn new(
        serialize: impl Fn(&Value) -> Value + 'static,
        deserialize: impl Fn(Value) -> Value + 'static,
    ) -> Self {
        Self {
            serialize: Rc::new(serialize),
            deserialize: Rc::new(deserialize),
        }
    }

    pub(crate) fn run_serialize(&self, value: &Value) -> Value {
        (self.serialize)(value)
    }

    pub(crate) fn run_deserialize(&self, constructor: Value) -> Value {
        (self.deserialize)(constructor)
    }

    // Hooks compare by allocation: re-registering the same pair is a
    // no-op, a different pair under the same name is a collision.
    fn same_hooks(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.serialize, &other.serialize)
            && Rc::ptr_eq(&self.deserialize, &other.deserialize)
    }
}

impl fmt::Debug for HookPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookPair").finish_non_exhaustive()
    }
}

/// How a registered type encodes.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Field-by-field: the container body verbatim, name-prefixed.
    Fields,
    /// Substitute constructor value via a [`HookPair`].
    Hooks(HookPair),
    /// Positional values driven by a registry-known [`Template`].
    Template(Template),
}

impl Strategy {
    fn kind(&self) -> &'static str {
        match self {
            Self::Fields => "fields",
            Self::Hooks(_) => "hooks",
            Self::Template(_) => "template",
        }
    }

    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fields, Self::Fields) => true,
            (Self::Hooks(a), Self::Hooks(b)) => a.same_hooks(b),
            (Self::Template(a), Self::Template(b)) => a == b,
            _ => false,
        }
    }
}

/// A type name bound to its encoding strategy.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    strategy: Strategy,
}

impl TypeDescriptor {
    /// Default field-by-field encoding.
    pub fn fields(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::Fields,
        }
    }

    /// Custom hook-pair encoding.
    pub fn hooks(name: impl Into<String>, hooks: HookPair) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::Hooks(hooks),
        }
    }

    /// Template-driven positional encoding.
    pub fn template(name: impl Into<String>, template: Template) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::Template(template),
        }
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Process-wide registry of types, resources and the function codec.
pub struct Registry {
    types: HashMap<String, Strategy>,
    resources: HashMap<String, Value>,
    resource_names: HashMap<ObjId, String>,
    func_codec: Box<dyn FunctionCodec>,
}

impl Registry {
    /// Create an empty registry with the erroring stub function codec.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            resources: HashMap::new(),
            resource_names: HashMap::new(),
            func_codec: Box::new(NoFunctionCodec),
        }
    }

    /// Register a type descriptor.
    ///
    /// Fails with [`RegistryError::NameCollision`] if the name is bound
    /// to a different descriptor; re-registering an identical descriptor
    /// is a no-op.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), RegistryError> {
        let TypeDescriptor { name, strategy } = descriptor;
        if let Strategy::Template(template) = &strategy {
            if template.has_nil_key() {
                return Err(RegistryError::InvalidTemplate(name));
            }
        }
        if let Some(existing) = self.types.get(&name) {
            if existing.same_as(&strategy) {
                return Ok(());
            }
            return Err(RegistryError::NameCollision(name));
        }
        log::debug!("[registry] registered type '{}' ({})", name, strategy.kind());
        self.types.insert(name, strategy);
        Ok(())
    }

    /// Remove a type registration. Returns whether the name was bound.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.types.remove(name).is_some();
        if removed {
            log::debug!("[registry] unregistered type '{}'", name);
        }
        removed
    }

    /// Look up the strategy for a type name.
    pub fn strategy(&self, name: &str) -> Option<&Strategy> {
        self.types.get(name)
    }

    /// Register a live object under a resource name.
    ///
    /// The value must be identity-bearing. Binding a name already held
    /// by a *different* identity fails with
    /// [`RegistryError::NameCollision`]; rebinding the same identity is
    /// a no-op.
    pub fn register_resource(
        &mut self,
        value: Value,
        name: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let id = value.identity().ok_or(RegistryError::NotReferenceable {
            name: name.clone(),
            kind: value.kind(),
        })?;
        if let Some(existing) = self.resources.get(&name) {
            if existing.identity() == Some(id) {
                return Ok(());
            }
            return Err(RegistryError::NameCollision(name));
        }
        log::debug!("[registry] registered resource '{}'", name);
        self.resource_names.insert(id, name.clone());
        self.resources.insert(name, value);
        Ok(())
    }

    /// Remove a resource registration. Returns whether the name was bound.
    pub fn unregister_resource(&mut self, name: &str) -> bool {
        match self.resources.remove(name) {
            Some(value) => {
                if let Some(id) = value.identity() {
                    self.resource_names.remove(&id);
                }
                log::debug!("[registry] unregistered resource '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Look up the live object registered under a resource name.
    pub fn resource(&self, name: &str) -> Option<&Value> {
        self.resources.get(name)
    }

    /// Install the function codec used for function values.
    pub fn set_function_codec(&mut self, codec: Box<dyn FunctionCodec>) {
        self.func_codec = codec;
    }

    pub(crate) fn resource_name(&self, id: ObjId) -> Option<&str> {
        self.resource_names.get(&id).map(String::as_str)
    }

    pub(crate) fn function_codec(&self) -> &dyn FunctionCodec {
        &*self.func_codec
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.len())
            .field("resources", &self.resources.len())
            .finish_non_exhaustive()
    }
}
