//! Integration tests for error kinds and context

use kindred_foundation::{ComponentKey, Entity, Error, ErrorContext, ErrorKind, Missing, QueryProblem, Type, WorldId};

#[test]
fn not_found_is_recognised() {
    let e = Entity::new(WorldId::fresh(), 0);
    let err = Error::component_not_found(e, ComponentKey::of(Type::Int));
    assert!(err.is_not_found());
    assert!(matches!(err.kind, ErrorKind::NotFound(Missing::Component { entity, .. }) if entity == e));
}

#[test]
fn other_kinds_are_not_not_found() {
    assert!(!Error::invalid_query(QueryProblem::NoInclusions).is_not_found());
    assert!(!Error::contract_violation("broken").is_not_found());
    assert!(!Error::snapshot("bad").is_not_found());
}

#[test]
fn context_records_operation_and_path() {
    let world = WorldId::fresh();
    let err = Error::contract_violation("two parents").with_context(
        ErrorContext::new()
            .with_operation("traverse")
            .with_step(Entity::new(world, 0))
            .with_step(Entity::new(world, 1)),
    );
    assert!(err.to_string().contains("two parents"));
    let context = err.context.expect("context attached");
    assert_eq!(context.path.len(), 2);
    assert!(context.to_string().starts_with("in traverse via"));
}

#[test]
fn foreign_entity_names_both_worlds() {
    let here = WorldId::fresh();
    let there = WorldId::fresh();
    let e = Entity::new(there, 4);
    let err = Error::foreign_entity(e, here);
    assert!(matches!(err.kind, ErrorKind::ForeignEntity { entity, world } if entity == e && world == here));
}
