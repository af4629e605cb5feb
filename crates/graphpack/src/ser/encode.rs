// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! The encode pass.

use super::wire::{self, tags};
use super::EncodeError;
use crate::registry::{Registry, Strategy};
use crate::template::{Template, TemplateEntry};
use crate::value::{FuncHandle, ObjId, TableHandle, Value};
use std::collections::HashMap;

/// Encode an ordered list of values into one self-describing stream.
///
/// The count is explicit so `Nil` entries are distinct from list-end.
/// Shared and cyclic sub-objects are emitted once and back-referenced
/// afterwards, so decoding reproduces identity, not just shape.
pub fn encode(registry: &Registry, values: &[Value]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = Encoder::new(registry);
    wire::put_len(&mut encoder.buf, values.len(), "top-level value count")?;
    for value in values {
        encoder.encode_value(value)?;
    }
    log::trace!(
        "[encode] {} top-level values, {} reference slots, {} bytes",
        values.len(),
        encoder.slots.len(),
        encoder.buf.len()
    );
    Ok(encoder.buf)
}

struct Encoder<'a> {
    registry: &'a Registry,
    buf: Vec<u8>,
    /// Object identity -> slot index, in first-sight order. Scoped to
    /// this pass.
    slots: HashMap<ObjId, u32>,
}

impl<'a> Encoder<'a> {
    fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            buf: Vec::new(),
            slots: HashMap::new(),
        }
    }

    fn encode_value(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => self.buf.push(tags::NIL),
            Value::Bool(false) => self.buf.push(tags::FALSE),
            Value::Bool(true) => self.buf.push(tags::TRUE),
            Value::Number(n) => {
                self.buf.push(tags::NUMBER);
                self.buf.extend_from_slice(&n.to_bits().to_le_bytes());
            }
            Value::Text(bytes) => {
                self.buf.push(tags::TEXT);
                wire::put_bytes(&mut self.buf, bytes, "text")?;
            }
            Value::Table(handle) => {
                if !self.emit_ref_or_assign(handle.id())? {
                    self.encode_table(handle)?;
                }
            }
            Value::Func(handle) => {
                if !self.emit_ref_or_assign(handle.id())? {
                    self.encode_func(handle)?;
                }
            }
        }
        Ok(())
    }

    /// Back-reference / slot bookkeeping for identity-bearing values.
    ///
    /// Returns `true` when the value is fully emitted (a back-reference
    /// to an earlier slot, or a resource name). Otherwise the identity
    /// now owns the next slot — recorded *before* the caller recurses
    /// into content, which is what makes cycles resolvable.
    fn emit_ref_or_assign(&mut self, id: ObjId) -> Result<bool, EncodeError> {
        if let Some(&slot) = self.slots.get(&id) {
            self.buf.push(tags::REF);
            self.buf.extend_from_slice(&slot.to_le_bytes());
            return Ok(true);
        }
        let slot = u32::try_from(self.slots.len())
            .map_err(|_| EncodeError::InvalidData("reference slot count exceeds u32 range".into()))?;
        self.slots.insert(id, slot);

        if let Some(name) = self.registry.resource_name(id) {
            self.buf.push(tags::RESOURCE);
            wire::put_bytes(&mut self.buf, name.as_bytes(), "resource name")?;
            return Ok(true);
        }
        Ok(false)
    }

    fn encode_table(&mut self, handle: &TableHandle) -> Result<(), EncodeError> {
        let tag = handle.borrow().tag().map(str::to_owned);
        let name = match tag {
            None => {
                self.buf.push(tags::TABLE);
                return self.encode_table_body(handle);
            }
            Some(name) => name,
        };
        let strategy = self
            .registry
            .strategy(&name)
            .ok_or_else(|| EncodeError::UnknownType(name.clone()))?;
        match strategy {
            Strategy::Fields => {
                self.buf.push(tags::TYPED_FIELDS);
                wire::put_bytes(&mut self.buf, name.as_bytes(), "type name")?;
                self.encode_table_body(handle)
            }
            Strategy::Hooks(hooks) => {
                self.buf.push(tags::TYPED_HOOKS);
                wire::put_bytes(&mut self.buf, name.as_bytes(), "type name")?;
                let constructor = hooks.run_serialize(&Value::Table(handle.clone()));
                if constructor.identity() == Some(handle.id()) {
                    return Err(EncodeError::ConstructorCycle { type_name: name });
                }
                self.encode_value(&constructor)
            }
            Strategy::Template(template) => {
                self.buf.push(tags::TYPED_TEMPLATE);
                wire::put_bytes(&mut self.buf, name.as_bytes(), "type name")?;
                self.encode_template_body(handle, template)
            }
        }
    }

    /// Array part then keyed part. `Nil` holes are emitted in place;
    /// keys go through the same slot logic as any other value.
    fn encode_table_body(&mut self, handle: &TableHandle) -> Result<(), EncodeError> {
        let table = handle.borrow();
        wire::put_len(&mut self.buf, table.array_len(), "array length")?;
        for element in table.array() {
            self.encode_value(element)?;
        }
        wire::put_len(&mut self.buf, table.keyed_len(), "keyed entry count")?;
        for (key, value) in table.keyed() {
            self.encode_value(key)?;
            self.encode_value(value)?;
        }
        Ok(())
    }

    /// Positional values only; keys and shape live in the registry.
    /// Sub-tables under nested entries are emitted in place with no
    /// slot of their own — the decoder rebuilds them fresh.
    fn encode_template_body(
        &mut self,
        handle: &TableHandle,
        template: &Template,
    ) -> Result<(), EncodeError> {
        for entry in template.entries() {
            match entry {
                TemplateEntry::Field(key) => {
                    let value = handle.borrow().get(key);
                    self.encode_value(&value)?;
                }
                TemplateEntry::Nested { key, template: sub } => {
                    let value = handle.borrow().get(key);
                    match &value {
                        Value::Table(subtable) => self.encode_template_body(subtable, sub)?,
                        other => {
                            return Err(EncodeError::InvalidData(format!(
                                "template entry {:?} expects a sub-table, found {}",
                                key,
                                other.kind()
                            )))
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn encode_func(&mut self, handle: &FuncHandle) -> Result<(), EncodeError> {
        self.buf.push(tags::FUNC);
        let payload = self
            .registry
            .function_codec()
            .encode(handle)
            .map_err(|e| EncodeError::FunctionCodec(e.reason().to_owned()))?;
        wire::put_bytes(&mut self.buf, &payload, "function payload")
    }
}
