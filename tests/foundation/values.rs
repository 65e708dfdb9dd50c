//! Integration tests for Value semantics

use std::collections::HashSet;

use kindred_foundation::{Entity, UniqueId, Value, WorldId};

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn strings_and_keywords_are_distinct() {
    assert_ne!(Value::from("is-a"), Value::keyword("is-a"));
    assert_eq!(Value::is_a(), Value::keyword("is-a"));
}

#[test]
fn nan_equals_itself() {
    let nan = Value::Float(f64::NAN);
    assert_eq!(nan, nan.clone());
    let set: HashSet<Value> = [nan.clone(), nan].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn composite_values_compare_structurally() {
    let a = Value::from(vec![1, 2, 3]);
    let b = Value::from(vec![1, 2, 3]);
    assert_eq!(a, b);
    assert_ne!(a, Value::from(vec![1, 2]));
}

// =============================================================================
// Unique Tokens
// =============================================================================

#[test]
fn unique_tokens_never_collide() {
    let tokens: HashSet<Value> = (0..100).map(|_| Value::unique()).collect();
    assert_eq!(tokens.len(), 100);
}

#[test]
fn unique_ids_increase() {
    let a = UniqueId::new();
    let b = UniqueId::new();
    assert!(b.get() > a.get());
}

// =============================================================================
// Entity Values
// =============================================================================

#[test]
fn entity_values_round_trip() {
    let e = Entity::new(WorldId::fresh(), 3);
    assert_eq!(Value::from(e).as_entity(), Some(e));
    assert_eq!(Value::Int(3).as_entity(), None);
}

#[test]
fn ordering_is_total() {
    let mut values = vec![
        Value::from("b"),
        Value::Int(2),
        Value::Nil,
        Value::from("a"),
        Value::Bool(true),
        Value::Int(1),
    ];
    values.sort();
    let mut again = values.clone();
    again.reverse();
    again.sort();
    assert_eq!(values, again);
    assert_eq!(values[0], Value::Nil);
}
