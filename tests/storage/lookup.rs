//! Integration tests for the four-shape relation lookup

use kindred_foundation::{ComponentKey, Entity, RelationKey, Type, Value, WorldId};
use kindred_storage::{LookupKey, RelationLookup, Slot, Store};

fn entities(n: u32) -> Vec<Entity> {
    let world = WorldId::fresh();
    (0..n).map(|i| Entity::new(world, i)).collect()
}

fn single(entity: Entity) -> kindred_foundation::EntitySet {
    kindred_foundation::EntitySet::unit(entity)
}

// =============================================================================
// Four-Table Symmetry
// =============================================================================

#[test]
fn one_edge_fills_all_four_shapes() {
    let e = entities(2);
    let mut store = Store::new();
    let k = RelationKey::tag("likes");
    store.add_relation_tag(e[0], Value::from("likes"), e[1]);

    let lookup = store.lookup();
    assert_eq!(lookup.origins(&k, Slot::Entity(e[1])), single(e[0]));
    assert_eq!(lookup.origins(&k, Slot::Any), single(e[0]));
    assert_eq!(lookup.targets(Slot::Entity(e[0]), &k), single(e[1]));
    assert_eq!(lookup.targets(Slot::Any, &k), single(e[1]));

    store.remove_relation_tag(e[0], &Value::from("likes"), e[1]);
    assert!(store.lookup().is_empty());
}

#[test]
fn component_edges_use_their_own_keys() {
    let e = entities(2);
    let mut store = Store::new();
    let int = ComponentKey::of(Type::Int);
    store.set_relation_component(e[0], int.clone(), e[1], Value::Int(1));

    let lookup = store.lookup();
    assert_eq!(lookup.origins(&RelationKey::from(int.clone()), Slot::Any), single(e[0]));
    assert!(lookup.origins(&RelationKey::tag(Value::Int(0)), Slot::Any).is_empty());

    // Overwriting the carried value leaves the lookup alone.
    let before = store.lookup().clone();
    store.set_relation_component(e[0], int, e[1], Value::Int(2));
    assert_eq!(store.lookup(), &before);
}

// =============================================================================
// Cross-Pruning
// =============================================================================

#[test]
fn wildcards_survive_until_their_last_edge_goes() {
    let e = entities(3);
    let mut store = Store::new();
    let likes = Value::from("likes");
    let k = RelationKey::tag("likes");
    store.add_relation_tag(e[0], likes.clone(), e[2]);
    store.add_relation_tag(e[1], likes.clone(), e[2]);

    store.remove_relation_tag(e[0], &likes, e[2]);
    assert_eq!(store.lookup().origins(&k, Slot::Any), single(e[1]));
    assert_eq!(store.lookup().targets(Slot::Any, &k), single(e[2]));
    assert!(store.lookup().get(&LookupKey::targets(e[0], k.clone())).is_none());

    store.remove_relation_tag(e[1], &likes, e[2]);
    assert!(store.lookup().get(&LookupKey::origins(k.clone(), Slot::Any)).is_none());
    assert!(store.lookup().get(&LookupKey::targets(Slot::Any, k)).is_none());
    store.validate().unwrap();
}

#[test]
fn rebuilt_lookup_matches_incremental_one() {
    let e = entities(4);
    let mut store = Store::new();
    for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)] {
        store.add_relation_tag(e[a], Value::from("next"), e[b]);
    }
    store.remove_relation_tag(e[0], &Value::from("next"), e[2]);
    store.set_relation_component(e[1], ComponentKey::of(Type::Int), e[1], Value::Int(0));

    let edges = [(0, 1), (1, 2), (2, 3), (3, 0)]
        .into_iter()
        .map(|(a, b)| (e[a], RelationKey::tag("next"), e[b]))
        .chain([(e[1], RelationKey::from(ComponentKey::of(Type::Int)), e[1])]);
    assert_eq!(store.lookup(), &RelationLookup::from_edges(edges));
}
