// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 graphpack contributors
//
// Resources resolve by name at decode time: identity, not content.

use graphpack::{decode, encode, DecodeError, Registry, Table, TableHandle, Value};

#[test]
fn resource_decodes_to_live_object() {
    let mut reg = Registry::new();
    let obj = TableHandle::new(Table::new());
    obj.borrow_mut().set(Value::from("state"), Value::from(1.0)).unwrap();
    reg.register_resource(Value::Table(obj.clone()), "shared.config").unwrap();

    let bytes = encode(&reg, &[Value::Table(obj.clone())]).unwrap();

    // Mutate between passes: decode must see it, because only the name
    // crossed the wire.
    obj.borrow_mut().set(Value::from("state"), Value::from(2.0)).unwrap();

    let decoded = decode(&reg, &bytes).unwrap();
    let out = decoded[0].as_table().unwrap();
    assert!(TableHandle::ptr_eq(out, &obj));
    assert_eq!(out.borrow().get(&Value::from("state")), Value::from(2.0));
}

#[test]
fn resource_references_collapse_to_one_slot() {
    let mut reg = Registry::new();
    let obj = TableHandle::new(Table::new());
    reg.register_resource(Value::Table(obj.clone()), "r").unwrap();

    let bytes = encode(
        &reg,
        &[
            Value::Table(obj.clone()),
            Value::Table(obj.clone()),
            Value::Table(obj),
        ],
    )
    .unwrap();
    // name emitted once: count + (resource tag + 5-byte name) + 2 backrefs
    let one_name = 1 + 4 + 1;
    let backref = 1 + 4;
    assert_eq!(bytes.len(), 4 + one_name + 2 * backref);

    let decoded = decode(&reg, &bytes).unwrap();
    let first = decoded[0].as_table().unwrap();
    for v in &decoded[1..] {
        assert!(TableHandle::ptr_eq(first, v.as_table().unwrap()));
    }
}

#[test]
fn resource_nested_in_graph() {
    let mut reg = Registry::new();
    let res = TableHandle::new(Table::new());
    reg.register_resource(Value::Table(res.clone()), "logger").unwrap();

    let holder = TableHandle::new(Table::new());
    holder
        .borrow_mut()
        .set(Value::from("out"), Value::Table(res.clone()))
        .unwrap();

    let decoded = decode(&reg, &encode(&reg, &[Value::Table(holder)]).unwrap()).unwrap();
    let out = decoded[0].as_table().unwrap().borrow();
    let inner = out.get(&Value::from("out"));
    assert!(TableHandle::ptr_eq(inner.as_table().unwrap(), &res));
}

#[test]
fn resource_contents_never_hit_the_wire() {
    let mut reg = Registry::new();
    let obj = TableHandle::new(Table::new());
    obj.borrow_mut()
        .set(Value::from("huge"), Value::from(vec![0xAB; 10_000]))
        .unwrap();
    reg.register_resource(Value::Table(obj.clone()), "blob").unwrap();

    let bytes = encode(&reg, &[Value::Table(obj)]).unwrap();
    assert!(bytes.len() < 64, "resource encoded by value: {} bytes", bytes.len());
}

#[test]
fn unknown_resource_fails_decode() {
    let mut reg = Registry::new();
    let obj = TableHandle::new(Table::new());
    reg.register_resource(Value::Table(obj.clone()), "transient").unwrap();
    let bytes = encode(&reg, &[Value::Table(obj)]).unwrap();

    reg.unregister_resource("transient");
    assert!(matches!(
        decode(&reg, &bytes).unwrap_err(),
        DecodeError::UnknownResource(n) if n == "transient"
    ));
}

#[test]
fn rebinding_resolves_to_current_object() {
    let mut reg = Registry::new();
    let old = TableHandle::new(Table::new());
    reg.register_resource(Value::Table(old.clone()), "active").unwrap();
    let bytes = encode(&reg, &[Value::Table(old)]).unwrap();

    let new = TableHandle::new(Table::new());
    new.borrow_mut().push(Value::from("replacement"));
    reg.unregister_resource("active");
    reg.register_resource(Value::Table(new.clone()), "active").unwrap();

    let decoded = decode(&reg, &bytes).unwrap();
    assert!(TableHandle::ptr_eq(decoded[0].as_table().unwrap(), &new));
}

#[test]
fn unregistered_object_encodes_by_value_again() {
    let mut reg = Registry::new();
    let obj = TableHandle::new(Table::new());
    obj.borrow_mut().push(Value::from(9.0));
    reg.register_resource(Value::Table(obj.clone()), "tmp").unwrap();
    reg.unregister_resource("tmp");

    let decoded = decode(&reg, &encode(&reg, &[Value::Table(obj.clone())]).unwrap()).unwrap();
    let out = decoded[0].as_table().unwrap();
    // Plain structural copy now: equal content, fresh identity.
    assert!(!TableHandle::ptr_eq(out, &obj));
    assert_eq!(out.borrow().array()[0], Value::from(9.0));
}
