//! Integration tests for relations through the World

use std::collections::HashSet;

use kindred_foundation::{ComponentKey, EntitySet, ErrorKind, Type, Value};
use kindred_query::{Query, Selector};
use kindred_world::World;

fn set(entities: &[kindred_foundation::Entity]) -> EntitySet {
    entities.iter().copied().collect()
}

// =============================================================================
// Relation Tags
// =============================================================================

#[test]
fn relation_tags_answer_both_directions() {
    let mut world = World::new();
    let [a, b, c] = ["A", "B", "C"].map(|uid| world.entity(uid));
    let likes = Value::keyword("likes");
    world.add_relation_tag(a, likes.clone(), b).unwrap();
    world.add_relation_tag(a, likes.clone(), c).unwrap();
    world.add_relation_tag(b, likes.clone(), c).unwrap();

    assert_eq!(world.targets(a, &likes).unwrap(), set(&[b, c]));
    assert_eq!(world.target(b, &likes).unwrap(), c);
    assert_eq!(world.evaluate(&Query::origins(likes.clone(), c)).unwrap(), set(&[a, b]));
    assert_eq!(world.evaluate(&Query::targets(a, likes.clone())).unwrap(), set(&[b, c]));
    assert_eq!(
        world.evaluate(&Query::origins(likes.clone(), Selector::Any)).unwrap(),
        set(&[a, b])
    );
    assert_eq!(
        world.evaluate(&Query::targets(Selector::Any, likes.clone())).unwrap(),
        set(&[b, c])
    );
    assert!(world.relation_tags(a).unwrap().contains(&likes, b).unwrap());
    assert!(!world.relation_tags(b).unwrap().contains(&likes, a).unwrap());
}

#[test]
fn exclusive_target_rejects_many() {
    let mut world = World::new();
    let [a, b, c] = ["A", "B", "C"].map(|uid| world.entity(uid));
    let likes = Value::keyword("likes");
    world.add_relation_tag(a, likes.clone(), b).unwrap();
    world.add_relation_tag(a, likes.clone(), c).unwrap();

    let err = world.target(a, &likes).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousRelation { .. }));
    assert!(world.target(b, &likes).unwrap_err().is_not_found());

    world.set_relation_tag(a, likes.clone(), c).unwrap();
    assert_eq!(world.target(a, &likes).unwrap(), c);
    assert_eq!(world.targets(a, &likes).unwrap(), set(&[c]));
    assert!(world.evaluate(&Query::origins(likes.clone(), b)).unwrap().is_empty());
}

#[test]
fn relation_tags_are_inherited() {
    let mut world = World::new();
    let [a, b, c, foo, bar] = ["A", "B", "C", "foo", "bar"].map(|uid| world.entity(uid));
    let test = Value::from("test");
    world.add_relation_tag(b, Value::is_a(), a).unwrap();
    world.add_relation_tag(c, Value::is_a(), b).unwrap();
    world.add_relation_tag(a, test.clone(), foo).unwrap();

    assert_eq!(world.target(c, &test).unwrap(), foo);
    assert_eq!(
        world.relation_tags(c).unwrap().keys().unwrap(),
        HashSet::from([Value::is_a(), test.clone()])
    );

    world.add_relation_tag(b, test.clone(), bar).unwrap();
    assert_eq!(world.target(c, &test).unwrap(), bar);
    assert_eq!(world.targets(c, &test).unwrap(), set(&[foo, bar]));
    assert_eq!(world.relation_tags(c).unwrap().direct().targets(&test).unwrap(), EntitySet::new());

    // Inherited edges are not removable from the heir.
    assert!(!world.discard_relation_tag(c, &test, bar).unwrap());
    assert!(world.remove_relation_tag(c, &test, bar).unwrap_err().is_not_found());
    world.remove_relation_tag(b, &test, bar).unwrap();
    assert_eq!(world.target(c, &test).unwrap(), foo);
}

#[test]
fn set_relation_targets_replaces_the_set() {
    let mut world = World::new();
    let [a, b, c, d] = ["A", "B", "C", "D"].map(|uid| world.entity(uid));
    let knows = Value::keyword("knows");
    world.set_relation_targets(a, knows.clone(), [b, c]).unwrap();
    assert_eq!(world.targets(a, &knows).unwrap(), set(&[b, c]));

    world.set_relation_targets(a, knows.clone(), [c, d]).unwrap();
    assert_eq!(world.targets(a, &knows).unwrap(), set(&[c, d]));
    assert!(world.evaluate(&Query::origins(knows.clone(), b)).unwrap().is_empty());

    world.clear_relation_tag(a, &knows).unwrap();
    assert!(world.targets(a, &knows).unwrap().is_empty());
    assert!(world.evaluate(&Query::origins(knows, Selector::Any)).unwrap().is_empty());
}

// =============================================================================
// Relation Components
// =============================================================================

#[test]
fn relation_components_carry_values() {
    let mut world = World::new();
    let [a, b, c] = ["A", "B", "C"].map(|uid| world.entity(uid));
    let weight = ComponentKey::named("weight", Type::Int);
    world.set_relation_component(a, weight.clone(), b, 3).unwrap();
    world.set_relation_component(a, weight.clone(), c, 5).unwrap();

    assert_eq!(world.relation_component(a, &weight, b).unwrap(), &Value::Int(3));
    let view = world.relation_components(a).unwrap();
    assert_eq!(view.targets(&weight).unwrap(), set(&[b, c]));
    let mut expected = vec![(b, Value::Int(3)), (c, Value::Int(5))];
    expected.sort_by_key(|(e, _)| *e);
    let entries: Vec<(_, Value)> = view
        .entries(&weight)
        .unwrap()
        .into_iter()
        .map(|(e, v)| (e, v.clone()))
        .collect();
    assert_eq!(entries, expected);
    assert_eq!(world.evaluate(&Query::origins(weight.clone(), c)).unwrap(), set(&[a]));

    let old = world.set_relation_component(a, weight.clone(), b, 4).unwrap();
    assert_eq!(old, Some(Value::Int(3)));
    assert_eq!(world.remove_relation_component(a, &weight, b).unwrap(), Value::Int(4));
    assert!(world.remove_relation_component(a, &weight, b).unwrap_err().is_not_found());
    assert!(world.relation_component(a, &weight, b).unwrap_err().is_not_found());

    world.clear_relation_components(a, &weight).unwrap();
    assert!(world.evaluate(&Query::origins(weight, Selector::Any)).unwrap().is_empty());
}

#[test]
fn relation_components_are_inherited() {
    let mut world = World::new();
    let [base, child, target] = ["base", "child", "target"].map(|uid| world.entity(uid));
    let cost = ComponentKey::of(Type::Int);
    world.add_relation_tag(child, Value::is_a(), base).unwrap();
    world.set_relation_component(base, cost.clone(), target, 10).unwrap();

    assert_eq!(world.relation_component(child, &cost, target).unwrap(), &Value::Int(10));
    assert_eq!(world.relation_components(child).unwrap().keys().unwrap(), HashSet::from([cost.clone()]));
    assert!(
        world
            .relation_components(child)
            .unwrap()
            .direct()
            .get(&cost, target)
            .unwrap_err()
            .is_not_found()
    );

    world.set_relation_component(child, cost.clone(), target, 1).unwrap();
    assert_eq!(world.relation_component(child, &cost, target).unwrap(), &Value::Int(1));
    assert_eq!(world.relation_component(base, &cost, target).unwrap(), &Value::Int(10));
}

#[test]
fn component_and_tag_relations_are_separate() {
    let mut world = World::new();
    let [a, b] = ["A", "B"].map(|uid| world.entity(uid));
    let int = ComponentKey::of(Type::Int);
    world.set_relation_component(a, int.clone(), b, 1).unwrap();

    assert!(world.targets(a, &Value::keyword("int")).unwrap().is_empty());
    assert_eq!(world.evaluate(&Query::targets(a, int)).unwrap(), set(&[b]));
    assert!(world.relation_tags(a).unwrap().keys().unwrap().is_empty());
}

// =============================================================================
// Conditional Relations
// =============================================================================

#[test]
fn nested_selectors_follow_edges() {
    let mut world = World::new();
    let [parent, child, other] = ["parent", "child", "other"].map(|uid| world.entity(uid));
    let child_of = Value::keyword("child-of");
    let int = ComponentKey::of(Type::Int);
    world.add_relation_tag(child, child_of.clone(), parent).unwrap();
    world.add_relation_tag(other, child_of.clone(), child).unwrap();

    let has_int = Query::component(int.clone());
    let children_of_int = Query::origins(child_of.clone(), Selector::Matching(has_int.clone()));
    let parents_of_int = Query::targets(Selector::Matching(has_int), child_of);

    assert!(world.evaluate(&children_of_int).unwrap().is_empty());
    world.set_component(parent, int.clone(), 1).unwrap();
    assert_eq!(world.evaluate(&children_of_int).unwrap(), set(&[child]));
    assert!(world.evaluate(&parents_of_int).unwrap().is_empty());

    world.set_component(other, int.clone(), 2).unwrap();
    assert_eq!(world.evaluate(&parents_of_int).unwrap(), set(&[child]));
    world.take_component(parent, &int).unwrap();
    assert!(world.evaluate(&children_of_int).unwrap().is_empty());
}
