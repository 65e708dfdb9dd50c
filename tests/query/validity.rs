//! Integration tests for query validation

use kindred_foundation::{ComponentKey, ErrorKind, QueryProblem, Type};
use kindred_query::{Filter, Query};

fn int() -> Query {
    Query::component(ComponentKey::of(Type::Int))
}

#[test]
fn exclusion_only_is_rejected() {
    let err = Query::all([], [int()]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidQuery(QueryProblem::ExclusionOnly)));
}

#[test]
fn empty_query_is_rejected() {
    let err = Query::all([], []).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidQuery(QueryProblem::NoInclusions)));
    let err = Query::any([]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidQuery(_)));
}

#[test]
fn require_and_exclude_same_atom_is_rejected_at_construction() {
    let err = Query::all([int()], [int()]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidQuery(QueryProblem::Contradiction(_))));

    let err = Filter::new()
        .with_component(ComponentKey::of(Type::Int))
        .without_component(ComponentKey::of(Type::Int))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidQuery(QueryProblem::Contradiction(_))));
}

#[test]
fn merging_can_expose_a_contradiction() {
    let a = Query::all([int()], []).unwrap();
    let b = Query::all([Query::tag("t")], [int()]).unwrap();
    assert!(a.and(&b).is_err());
}

#[test]
fn structurally_equal_queries_are_equal() {
    let a = Query::all([int(), Query::tag("t")], [Query::tag("dead")]).unwrap();
    let b = Query::all([Query::tag("t"), int()], [Query::tag("dead")]).unwrap();
    assert_eq!(a, b);

    let built_twice = || {
        Filter::new()
            .with_tag("t")
            .with_component(ComponentKey::of(Type::Int))
            .build()
            .unwrap()
    };
    assert_eq!(built_twice(), built_twice());
}

#[test]
fn single_term_collapses() {
    assert_eq!(Query::all([int()], []).unwrap(), int());
    assert_eq!(Query::any([int()]).unwrap(), int());
}
