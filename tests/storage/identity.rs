//! Integration tests for the identity table

use kindred_foundation::{Value, WorldId};
use kindred_storage::{Identities, UidTable};

#[test]
fn resolving_is_idempotent() {
    let mut table = UidTable::new(WorldId::fresh());
    let a = table.resolve(Value::from("a"));
    let b = table.resolve(Value::Int(1));
    assert_ne!(a, b);
    assert_eq!(table.resolve(Value::from("a")), a);
    assert_eq!(table.len(), 2);
}

#[test]
fn fresh_handles_are_always_new() {
    let mut table = UidTable::new(WorldId::fresh());
    let a = table.resolve_fresh();
    let b = table.resolve_fresh();
    assert_ne!(a, b);
    assert!(matches!(table.uid(a), Some(Value::Unique(_))));
}

#[test]
fn tables_are_scoped_to_their_world() {
    let mut here = UidTable::new(WorldId::fresh());
    let mut there = UidTable::new(WorldId::fresh());
    let a = here.resolve(Value::from("a"));
    let b = there.resolve(Value::from("a"));
    assert_ne!(a, b);
    assert_eq!(a.index(), b.index());
    assert_eq!(here.uid(b), None);
    assert_eq!(here.lookup(&Value::from("missing")), None);
    assert!(!here.is_empty());
}

#[test]
fn tables_work_behind_a_trait_object() {
    let mut table: Box<dyn Identities> = Box::new(UidTable::new(WorldId::fresh()));
    let e = table.resolve(Value::keyword("player"));
    assert_eq!(table.world(), e.world());
    assert_eq!(table.uid(e), Some(&Value::keyword("player")));
}
