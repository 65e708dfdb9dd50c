//! Integration tests for saving and restoring Worlds

use kindred_foundation::{ComponentKey, EntitySet, Type, Value};
use kindred_query::{Filter, Query, Selector};
use kindred_world::{World, WorldConfig};

fn hp() -> ComponentKey {
    ComponentKey::named("hp", Type::Int)
}

fn name() -> ComponentKey {
    ComponentKey::of(Type::String)
}

fn friend() -> ComponentKey {
    ComponentKey::of(Type::Entity)
}

/// A World touching every kind of data: inheritance, tagged keys, tags,
/// relation tags and components, entity values and a self edge.
fn populated() -> World {
    let mut world = World::new();
    let [goblin, grunt, boss, sword] = ["goblin", "grunt", "boss", "sword"].map(|uid| world.entity(uid));
    world.set_component(goblin, hp(), 7).unwrap();
    world.set_component(goblin, name(), "goblin").unwrap();
    world.add_tag(goblin, Value::keyword("hostile")).unwrap();
    world.add_relation_tag(grunt, Value::is_a(), goblin).unwrap();
    world.add_relation_tag(boss, Value::is_a(), goblin).unwrap();
    world.set_component(boss, hp(), 30).unwrap();
    world.set_component(boss, friend(), grunt).unwrap();
    world.add_relation_tag(boss, Value::keyword("wields"), sword).unwrap();
    world.add_relation_tag(boss, Value::keyword("trusts"), boss).unwrap();
    world.set_relation_component(boss, ComponentKey::named("grip", Type::Float), sword, 0.5).unwrap();
    world
}

fn assert_observably_equal(world: &World) {
    let e = |uid: &str| world.lookup(&Value::from(uid)).unwrap();
    let [goblin, grunt, boss, sword] = ["goblin", "grunt", "boss", "sword"].map(e);

    assert_eq!(world.get(grunt, &hp()).unwrap(), &Value::Int(7));
    assert_eq!(world.get(boss, &hp()).unwrap(), &Value::Int(30));
    assert_eq!(world.get(grunt, &name()).unwrap(), &Value::from("goblin"));
    assert_eq!(world.get(boss, &friend()).unwrap(), &Value::Entity(grunt));
    assert!(world.has_tag(boss, &Value::keyword("hostile")).unwrap());
    assert_eq!(world.target(boss, &Value::keyword("wields")).unwrap(), sword);
    assert_eq!(world.target(boss, &Value::keyword("trusts")).unwrap(), boss);
    assert_eq!(
        world
            .relation_component(boss, &ComponentKey::named("grip", Type::Float), sword)
            .unwrap(),
        &Value::Float(0.5)
    );

    let hostile: EntitySet = [goblin, grunt, boss].into_iter().collect();
    assert_eq!(world.query(Filter::new().with_tag(Value::keyword("hostile"))).unwrap(), hostile);
    let derived: EntitySet = [grunt, boss].into_iter().collect();
    assert_eq!(world.evaluate(&Query::origins(Value::is_a(), goblin)).unwrap(), derived);
    assert_eq!(
        world.evaluate(&Query::targets(Selector::Any, Value::keyword("wields"))).unwrap(),
        EntitySet::unit(sword)
    );
    world.validate().unwrap();
}

#[test]
fn snapshot_restores_every_kind_of_data() {
    let world = populated();
    let restored = World::from_snapshot(&world.snapshot().unwrap(), WorldConfig::default()).unwrap();
    assert_ne!(restored.id(), world.id());
    assert_observably_equal(&world);
    assert_observably_equal(&restored);
}

#[test]
fn snapshot_is_stable_across_a_round_trip() {
    let world = populated();
    let snapshot = world.snapshot().unwrap();
    let restored = World::from_snapshot(&snapshot, WorldConfig::default()).unwrap();
    assert_eq!(restored.snapshot().unwrap().entities.len(), snapshot.entities.len());
}

#[test]
fn json_round_trip() {
    let json = serde_json::to_string(&populated()).unwrap();
    let restored: World = serde_json::from_str(&json).unwrap();
    assert_observably_equal(&restored);
}

#[test]
fn messagepack_round_trip() {
    let bytes = rmp_serde::to_vec(&populated()).unwrap();
    let restored: World = rmp_serde::from_slice(&bytes).unwrap();
    assert_observably_equal(&restored);
}

#[test]
fn restored_worlds_stay_live() {
    let mut restored: World = serde_json::from_str(&serde_json::to_string(&populated()).unwrap()).unwrap();
    let goblin = restored.lookup(&Value::from("goblin")).unwrap();
    let grunt = restored.lookup(&Value::from("grunt")).unwrap();

    assert_eq!(restored.get(grunt, &hp()).unwrap(), &Value::Int(7));
    restored.set_component(goblin, hp(), 8).unwrap();
    assert_eq!(restored.get(grunt, &hp()).unwrap(), &Value::Int(8));

    let imp = restored.instantiate(goblin).unwrap();
    assert!(restored.query(Filter::new().with_component(hp())).unwrap().contains(&imp));
}

#[test]
fn anonymous_entities_survive() {
    let mut world = World::new();
    let anon = world.new_entity();
    let named = world.entity("named");
    world.set_component(anon, name(), "anon").unwrap();
    world.add_relation_tag(named, Value::keyword("knows"), anon).unwrap();

    let restored = World::from_snapshot(&world.snapshot().unwrap(), WorldConfig::default()).unwrap();
    let named = restored.lookup(&Value::from("named")).unwrap();
    let anon = restored.target(named, &Value::keyword("knows")).unwrap();
    assert_eq!(restored.get(anon, &name()).unwrap(), &Value::from("anon"));
}
