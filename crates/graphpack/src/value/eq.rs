// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors

//! Graph-aware structural comparison.

use crate::value::{FuncHandle, ObjId, TableHandle, Value};
use std::collections::HashSet;

/// Deep structural equality over value graphs.
///
/// Scalars compare as [`Value`]'s `==`; tables compare by tag, array
/// part, and keyed part, recursing into entries. Cycles terminate:
/// a pair of tables already under comparison is taken as equal, so two
/// graphs with the same shape of self-reference compare equal even
/// though their handles differ. Functions compare by identity only
/// (their payloads are opaque).
///
/// Keyed parts with table- or function-valued keys are matched
/// greedily: each such key on the left must pair with some structurally
/// equal key/value entry on the right.
pub fn deep_equals(a: &Value, b: &Value) -> bool {
    let mut visited = HashSet::new();
    deep_eq(a, b, &mut visited)
}

fn deep_eq(a: &Value, b: &Value, visited: &mut HashSet<(ObjId, ObjId)>) -> bool {
    match (a, b) {
        (Value::Table(x), Value::Table(y)) => table_eq(x, y, visited),
        (Value::Func(x), Value::Func(y)) => FuncHandle::ptr_eq(x, y),
        _ => a == b,
    }
}

fn table_eq(x: &TableHandle, y: &TableHandle, visited: &mut HashSet<(ObjId, ObjId)>) -> bool {
    if TableHandle::ptr_eq(x, y) {
        return true;
    }
    // Coinductive: assume a revisited pair equal, or cycles never end.
    if !visited.insert((x.id(), y.id())) {
        return true;
    }

    let tx = x.borrow();
    let ty = y.borrow();

    if tx.tag() != ty.tag()
        || tx.array_len() != ty.array_len()
        || tx.keyed_len() != ty.keyed_len()
    {
        return false;
    }
    for (ea, eb) in tx.array().iter().zip(ty.array()) {
        if !deep_eq(ea, eb, visited) {
            return false;
        }
    }

    // Scalar keys look up directly; reference keys need structural
    // matching because identities differ across graphs.
    let mut ref_entries: Vec<(Value, Value)> = ty
        .keyed()
        .filter(|(k, _)| k.identity().is_some())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    for (k, v) in tx.keyed() {
        if k.identity().is_none() {
            if !deep_eq(v, &ty.get(k), visited) {
                return false;
            }
            continue;
        }
        let matched = ref_entries.iter().position(|(k2, v2)| {
            let mut probe = visited.clone();
            deep_eq(k, k2, &mut probe) && deep_eq(v, v2, &mut probe)
        });
        match matched {
            Some(i) => {
                ref_entries.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Table;

    fn pair() -> (TableHandle, TableHandle) {
        (TableHandle::default(), TableHandle::default())
    }

    #[test]
    fn test_scalars() {
        assert!(deep_equals(&Value::Nil, &Value::Nil));
        assert!(deep_equals(&Value::from(1.5), &Value::from(1.5)));
        assert!(!deep_equals(&Value::from(1.5), &Value::from("1.5")));
    }

    #[test]
    fn test_flat_tables() {
        let (a, b) = pair();
        for h in [&a, &b] {
            let mut t = h.borrow_mut();
            t.push(Value::from(1.0));
            t.push(Value::Nil);
            t.set(Value::from("k"), Value::from(true)).unwrap();
        }
        assert!(deep_equals(&Value::Table(a.clone()), &Value::Table(b)));
        let c = TableHandle::new(Table::new());
        assert!(!deep_equals(&Value::Table(a), &Value::Table(c)));
    }

    #[test]
    fn test_tag_mismatch() {
        let a = TableHandle::new(Table::tagged("point"));
        let b = TableHandle::new(Table::new());
        assert!(!deep_equals(&Value::Table(a), &Value::Table(b)));
    }

    #[test]
    fn test_cycles_terminate() {
        let (a, b) = pair();
        a.borrow_mut()
            .set(Value::from("next"), Value::Table(a.clone()))
            .unwrap();
        b.borrow_mut()
            .set(Value::from("next"), Value::Table(b.clone()))
            .unwrap();
        assert!(deep_equals(&Value::Table(a), &Value::Table(b)));
    }

    #[test]
    fn test_table_keys_match_structurally() {
        let (a, b) = pair();
        for h in [&a, &b] {
            let key = TableHandle::default();
            key.borrow_mut().push(Value::from(7.0));
            h.borrow_mut()
                .set(Value::Table(key), Value::from("v"))
                .unwrap();
        }
        assert!(deep_equals(&Value::Table(a), &Value::Table(b)));
    }

    #[test]
    fn test_shared_vs_duplicated_subtables() {
        // Same shape, different sharing: still structurally equal.
        let shared = TableHandle::default();
        let a = TableHandle::default();
        a.borrow_mut().push(Value::Table(shared.clone()));
        a.borrow_mut().push(Value::Table(shared));

        let b = TableHandle::default();
        b.borrow_mut().push(Value::Table(TableHandle::default()));
        b.borrow_mut().push(Value::Table(TableHandle::default()));

        assert!(deep_equals(&Value::Table(a), &Value::Table(b)));
    }
}
