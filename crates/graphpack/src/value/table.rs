// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! The container type: ordered array part plus keyed part.

use crate::value::{ObjId, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Errors for table operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// `Nil` cannot key the keyed part.
    NilKey,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilKey => write!(f, "nil is not a valid table key"),
        }
    }
}

impl std::error::Error for TableError {}

/// A heterogeneous container.
///
/// Two parts: an ordered array part (positional entries, interior `Nil`
/// holes preserved) and a keyed part mapping arbitrary non-nil [`Value`]
/// keys — including other tables — to values. Storing `Nil` under a key
/// removes the entry, so the keyed part never holds absent values.
///
/// A table may carry a *type tag*: the name of a registered type that
/// selects its encoding strategy without changing its logical content.
#[derive(Debug, Default)]
pub struct Table {
    tag: Option<String>,
    array: Vec<Value>,
    keyed: HashMap<Value, Value>,
}

impl Table {
    /// Create an empty, untagged table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table carrying a type tag.
    pub fn tagged(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// The type tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Replace the type tag.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Append to the array part. `Nil` is legal and preserved as a hole.
    pub fn push(&mut self, value: Value) {
        self.array.push(value);
    }

    /// The array part, holes included.
    pub fn array(&self) -> &[Value] {
        &self.array
    }

    /// Array part length (holes counted).
    pub fn array_len(&self) -> usize {
        self.array.len()
    }

    /// Insert into the keyed part. Storing `Nil` removes the entry.
    pub fn set(&mut self, key: Value, value: Value) -> Result<(), TableError> {
        if key.is_nil() {
            return Err(TableError::NilKey);
        }
        if value.is_nil() {
            self.keyed.remove(&key);
        } else {
            self.keyed.insert(key, value);
        }
        Ok(())
    }

    /// Look up the keyed part. Absent keys read as `Nil`.
    pub fn get(&self, key: &Value) -> Value {
        self.keyed.get(key).cloned().unwrap_or(Value::Nil)
    }

    /// Keyed part entry count.
    pub fn keyed_len(&self) -> usize {
        self.keyed.len()
    }

    /// Iterate the keyed part (unordered).
    pub fn keyed(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.keyed.iter()
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> TableHandle {
        TableHandle::new(self)
    }
}

/// Shared, identity-bearing handle to a [`Table`].
///
/// Cloning the handle shares the table; the engine tracks the handle's
/// allocation identity to reproduce sharing and cycles across a
/// round trip. Interior mutability follows the usual `RefCell` contract:
/// `borrow`/`borrow_mut` panic on conflicting outstanding borrows.
#[derive(Clone)]
pub struct TableHandle(Rc<RefCell<Table>>);

impl TableHandle {
    /// Wrap a table into a new shared handle (a fresh identity).
    pub fn new(table: Table) -> Self {
        Self(Rc::new(RefCell::new(table)))
    }

    /// Immutably borrow the table.
    pub fn borrow(&self) -> Ref<'_, Table> {
        self.0.borrow()
    }

    /// Mutably borrow the table.
    pub fn borrow_mut(&self) -> RefMut<'_, Table> {
        self.0.borrow_mut()
    }

    /// Identity comparison: do both handles point at the same table?
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn id(&self) -> ObjId {
        ObjId(Rc::as_ptr(&self.0) as *const () as usize)
    }
}

impl Default for TableHandle {
    fn default() -> Self {
        Self::new(Table::new())
    }
}

// Manual impl: a derived Debug would recurse forever on cyclic tables.
impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableHandle({:p})", Rc::as_ptr(&self.0))
    }
}
