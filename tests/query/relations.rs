//! Integration tests for relation atoms

use kindred_foundation::{ComponentKey, Type, Value};
use kindred_query::{Query, RelationQuery, Selector};

use crate::{Harness, set};

const CHILD_OF: &str = "child-of";

fn child_of() -> Value {
    Value::from(CHILD_OF)
}

// =============================================================================
// Four Shapes
// =============================================================================

#[test]
fn one_edge_answers_all_four_shapes() {
    let mut h = Harness::new();
    let e = h.entities(2);
    let (a, b) = (e[0], e[1]);
    h.store.add_relation_tag(a, child_of(), b);

    let shapes = [
        (Query::origins(child_of(), b), set(&[a])),
        (Query::origins(child_of(), Selector::Any), set(&[a])),
        (Query::targets(a, child_of()), set(&[b])),
        (Query::targets(Selector::Any, child_of()), set(&[b])),
    ];
    for (query, expected) in &shapes {
        assert_eq!(&h.eval(query), expected, "{query:?}");
    }

    h.store.remove_relation_tag(a, &child_of(), b);
    for (query, _) in &shapes {
        assert!(h.eval(query).is_empty(), "{query:?}");
    }
}

#[test]
fn wildcard_origins_minus_concrete_target() {
    let mut h = Harness::new();
    let e = h.entities(4);
    let (a, b, c, d) = (e[0], e[1], e[2], e[3]);
    h.store.add_relation_tag(b, child_of(), a);
    h.store.add_relation_tag(c, child_of(), a);
    h.store.add_relation_tag(d, child_of(), b);

    assert_eq!(h.eval(&Query::origins(child_of(), a)), set(&[b, c]));
    assert_eq!(h.eval(&Query::origins(child_of(), Selector::Any)), set(&[b, c, d]));
    assert!(h.eval(&Query::origins(child_of(), d)).is_empty());

    let q = Query::all(
        [Query::origins(child_of(), Selector::Any)],
        [Query::origins(child_of(), a)],
    )
    .unwrap();
    assert_eq!(h.eval(&q), set(&[d]));
}

#[test]
fn component_relations_are_queryable() {
    let mut h = Harness::new();
    let e = h.entities(3);
    let int = ComponentKey::of(Type::Int);
    h.store.set_relation_component(e[0], int.clone(), e[1], Value::Int(1));
    h.store.set_relation_component(e[2], int.clone(), e[1], Value::Int(2));

    assert_eq!(h.eval(&Query::origins(int.clone(), e[1])), set(&[e[0], e[2]]));
    assert_eq!(h.eval(&Query::origins(int.clone(), Selector::Any)), set(&[e[0], e[2]]));
    assert_eq!(h.eval(&Query::targets(Selector::Any, int.clone())), set(&[e[1]]));
    assert!(h.eval(&Query::origins(Value::from("int"), Selector::Any)).is_empty());
}

// =============================================================================
// Nested Sub-Queries
// =============================================================================

#[test]
fn conditional_relations() {
    let mut h = Harness::new();
    let e = h.entities(3);
    let (a, b, c) = (e[0], e[1], e[2]);
    let int = ComponentKey::of(Type::Int);
    let has_int = Query::component(int.clone());
    let parent_has_int = Query::relation(RelationQuery::origins(child_of(), has_int.clone()));
    let child_has_int = Query::relation(RelationQuery::targets(has_int, child_of()));

    h.store.add_relation_tag(a, child_of(), b);
    h.store.set_component(c, int.clone(), Value::Int(42));
    assert!(h.eval(&parent_has_int).is_empty());
    assert!(h.eval(&child_has_int).is_empty());

    h.store.set_component(b, int.clone(), Value::Int(42));
    assert_eq!(h.eval(&parent_has_int), set(&[a]));
    assert!(h.eval(&child_has_int).is_empty());

    h.store.remove_component(b, &int);
    assert!(h.eval(&parent_has_int).is_empty());
    assert!(h.eval(&child_has_int).is_empty());
}
