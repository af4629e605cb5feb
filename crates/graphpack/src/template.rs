// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! Positional field templates.
//!
//! A template is an ordered, registry-known list of field keys for a
//! type with a fixed field set. The encoder writes only the values, in
//! template order; keys and template shape never hit the wire because
//! the decoder reads the same template from its registry. Entries may
//! nest: a nested entry names a sub-container key and the sub-template
//! to apply to it.

use crate::value::Value;

/// One template entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateEntry {
    /// Encode the value stored under this key.
    Field(Value),
    /// Apply a sub-template to the sub-table stored under this key.
    Nested { key: Value, template: Template },
}

/// Ordered field-key list for positional encoding.
///
/// Built fluently:
///
/// ```
/// use graphpack::Template;
///
/// let quad = Template::new()
///     .field("x")
///     .field("y")
///     .nested("extent", Template::new().field("w").field("h"));
/// assert_eq!(quad.entries().len(), 3);
/// ```
///
/// Any non-nil value can be a key, including booleans and numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    entries: Vec<TemplateEntry>,
}

impl Template {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain field key.
    pub fn field(mut self, key: impl Into<Value>) -> Self {
        self.entries.push(TemplateEntry::Field(key.into()));
        self
    }

    /// Append a nested sub-template under `key`.
    pub fn nested(mut self, key: impl Into<Value>, template: Template) -> Self {
        self.entries.push(TemplateEntry::Nested {
            key: key.into(),
            template,
        });
        self
    }

    /// The entries, in encode order.
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// Does any entry (recursively) use a nil key?
    ///
    /// Registration rejects such templates; nil cannot key a table.
    pub(crate) fn has_nil_key(&self) -> bool {
        self.entries.iter().any(|e| match e {
            TemplateEntry::Field(k) => k.is_nil(),
            TemplateEntry::Nested { key, template } => key.is_nil() || template.has_nil_key(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_order() {
        let t = Template::new().field("a").field(2.0).field(false);
        let keys: Vec<&Value> = t
            .entries()
            .iter()
            .map(|e| match e {
                TemplateEntry::Field(k) => k,
                TemplateEntry::Nested { key, .. } => key,
            })
            .collect();
        assert_eq!(
            keys,
            [&Value::from("a"), &Value::from(2.0), &Value::from(false)]
        );
    }

    #[test]
    fn test_nested_nil_key_detected() {
        let t = Template::new()
            .field("ok")
            .nested("sub", Template::new().field(Value::Nil));
        assert!(t.has_nil_key());
        assert!(!Template::new().field("ok").has_nil_key());
    }
}
