// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! The decode pass.

use super::wire::{tags, Reader};
use super::DecodeError;
use crate::registry::{Registry, Strategy};
use crate::template::{Template, TemplateEntry};
use crate::value::{Table, TableHandle, Value};

/// Decode a stream produced by [`encode`](super::encode) back into its
/// value list.
///
/// Objects are allocated in the encoder's slot order, so back-references
/// resolve to the one allocation they pointed at originally: shared
/// sub-objects come back shared, cycles come back cyclic.
pub fn decode(registry: &Registry, bytes: &[u8]) -> Result<Vec<Value>, DecodeError> {
    let mut decoder = Decoder::new(registry, bytes);
    let count = decoder.reader.read_len()?;
    // Each value costs at least a tag byte, so `remaining` bounds the
    // count a non-malicious stream can carry.
    let mut values = Vec::with_capacity(count.min(decoder.reader.remaining()));
    for _ in 0..count {
        values.push(decoder.decode_value()?);
    }
    if !decoder.reader.is_eof() {
        return Err(DecodeError::Malformed {
            offset: decoder.reader.offset(),
            reason: "trailing bytes after final value".into(),
        });
    }
    log::trace!(
        "[decode] {} top-level values, {} reference slots, {} bytes",
        count,
        decoder.slots.len(),
        bytes.len()
    );
    Ok(values)
}

struct Decoder<'a> {
    registry: &'a Registry,
    reader: Reader<'a>,
    /// Objects in allocation order, mirroring the encoder's numbering.
    /// Scoped to this pass.
    slots: Vec<Value>,
}

impl<'a> Decoder<'a> {
    fn new(registry: &'a Registry, bytes: &'a [u8]) -> Self {
        Self {
            registry,
            reader: Reader::new(bytes),
            slots: Vec::new(),
        }
    }

    fn decode_value(&mut self) -> Result<Value, DecodeError> {
        let tag_offset = self.reader.offset();
        let tag = self.reader.read_u8()?;
        match tag {
            tags::NIL => Ok(Value::Nil),
            tags::FALSE => Ok(Value::Bool(false)),
            tags::TRUE => Ok(Value::Bool(true)),
            tags::NUMBER => Ok(Value::Number(self.reader.read_f64_le()?)),
            tags::TEXT => Ok(Value::from(self.reader.read_payload()?)),
            tags::REF => {
                let index = self.reader.read_len()?;
                self.slots
                    .get(index)
                    .cloned()
                    .ok_or_else(|| DecodeError::Malformed {
                        offset: tag_offset,
                        reason: format!("back-reference to unassigned slot {}", index),
                    })
            }
            tags::TABLE => {
                let handle = self.alloc_table(None);
                self.decode_table_body(&handle)?;
                Ok(Value::Table(handle))
            }
            tags::TYPED_FIELDS => {
                let name = self.reader.read_name()?;
                if self.registry.strategy(&name).is_none() {
                    return Err(DecodeError::UnknownType(name));
                }
                let handle = self.alloc_table(Some(name));
                self.decode_table_body(&handle)?;
                Ok(Value::Table(handle))
            }
            tags::TYPED_HOOKS => {
                let name = self.reader.read_name()?;
                let hooks = match self.registry.strategy(&name) {
                    Some(Strategy::Hooks(hooks)) => hooks.clone(),
                    _ => return Err(DecodeError::UnknownType(name)),
                };
                // Placeholder first: the constructor may back-reference
                // this very slot. The hook result then replaces it so
                // later back-references see the final object.
                let slot = self.slots.len();
                self.alloc_table(Some(name));
                let constructor = self.decode_value()?;
                let object = hooks.run_deserialize(constructor);
                self.slots[slot] = object.clone();
                Ok(object)
            }
            tags::TYPED_TEMPLATE => {
                let name = self.reader.read_name()?;
                let registry = self.registry;
                let template = match registry.strategy(&name) {
                    Some(Strategy::Template(template)) => template,
                    _ => return Err(DecodeError::UnknownType(name.clone())),
                };
                let handle = self.alloc_table(Some(name));
                self.decode_template_body(&handle, template)?;
                Ok(Value::Table(handle))
            }
            tags::RESOURCE => {
                let name = self.reader.read_name()?;
                let object = self
                    .registry
                    .resource(&name)
                    .cloned()
                    .ok_or(DecodeError::UnknownResource(name))?;
                // The live object takes the slot: no content follows,
                // and back-references must see the registered identity.
                self.slots.push(object.clone());
                Ok(object)
            }
            tags::FUNC => {
                let payload = self.reader.read_payload()?;
                let func = self
                    .registry
                    .function_codec()
                    .decode(payload)
                    .map_err(|e| DecodeError::FunctionCodec(e.reason().to_owned()))?;
                let object = Value::Func(func);
                self.slots.push(object.clone());
                Ok(object)
            }
            other => Err(DecodeError::Malformed {
                offset: tag_offset,
                reason: format!("invalid value tag {:#04x}", other),
            }),
        }
    }

    /// Allocate the placeholder for an identity-bearing value and claim
    /// the next slot, *before* any nested content is decoded.
    fn alloc_table(&mut self, tag: Option<String>) -> TableHandle {
        let table = match tag {
            Some(name) => Table::tagged(name),
            None => Table::new(),
        };
        let handle = TableHandle::new(table);
        self.slots.push(Value::Table(handle.clone()));
        handle
    }

    fn decode_table_body(&mut self, handle: &TableHandle) -> Result<(), DecodeError> {
        let array_len = self.reader.read_len()?;
        for _ in 0..array_len {
            let element = self.decode_value()?;
            handle.borrow_mut().push(element);
        }
        let keyed_len = self.reader.read_len()?;
        for _ in 0..keyed_len {
            let entry_offset = self.reader.offset();
            let key = self.decode_value()?;
            let value = self.decode_value()?;
            handle
                .borrow_mut()
                .set(key, value)
                .map_err(|e| DecodeError::Malformed {
                    offset: entry_offset,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    fn decode_template_body(
        &mut self,
        handle: &TableHandle,
        template: &Template,
    ) -> Result<(), DecodeError> {
        for entry in template.entries() {
            let entry_offset = self.reader.offset();
            let (key, value) = match entry {
                TemplateEntry::Field(key) => (key, self.decode_value()?),
                TemplateEntry::Nested { key, template: sub } => {
                    let subtable = TableHandle::new(Table::new());
                    self.decode_template_body(&subtable, sub)?;
                    (key, Value::Table(subtable))
                }
            };
            handle
                .borrow_mut()
                .set(key.clone(), value)
                .map_err(|e| DecodeError::Malformed {
                    offset: entry_offset,
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}
