//! Integration tests for component change hooks

use std::cell::RefCell;
use std::rc::Rc;

use kindred_foundation::{ComponentKey, Entity, Type, Value};
use kindred_world::World;

type Log = Rc<RefCell<Vec<(Entity, Option<Value>, Option<Value>)>>>;

fn record(world: &mut World, key: ComponentKey) -> (Log, kindred_world::HookId) {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    let id = world.on_component_changed(key, move |entity, old, new| {
        sink.borrow_mut().push((entity, old.cloned(), new.cloned()));
    });
    (log, id)
}

#[test]
fn hooks_see_old_and_new_values() {
    let mut world = World::new();
    let int = ComponentKey::of(Type::Int);
    let (log, _) = record(&mut world, int.clone());
    let e = world.entity("e");

    world.set_component(e, int.clone(), 1).unwrap();
    world.set_component(e, int.clone(), 2).unwrap();
    world.remove_component(e, &int).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            (e, None, Some(Value::Int(1))),
            (e, Some(Value::Int(1)), Some(Value::Int(2))),
            (e, Some(Value::Int(2)), None),
        ]
    );
}

#[test]
fn hooks_only_fire_for_their_key() {
    let mut world = World::new();
    let int = ComponentKey::of(Type::Int);
    let named = ComponentKey::named("hp", Type::Int);
    let (log, _) = record(&mut world, int.clone());
    let e = world.entity("e");

    world.set_component(e, named.clone(), 10).unwrap();
    world.set_component(e, ComponentKey::of(Type::String), "x").unwrap();
    assert!(log.borrow().is_empty());

    // Removing something absent is not a change.
    assert_eq!(world.take_component(e, &int).unwrap(), None);
    assert!(log.borrow().is_empty());
}

#[test]
fn clear_and_spawn_report_changes() {
    let mut world = World::new();
    let int = ComponentKey::of(Type::Int);
    let (log, _) = record(&mut world, int.clone());

    let e = world.spawn([(int.clone(), Value::Int(7))], [Value::from("t")]);
    world.clear(e).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![(e, None, Some(Value::Int(7))), (e, Some(Value::Int(7)), None)]
    );
}

#[test]
fn removed_hooks_stop_firing() {
    let mut world = World::new();
    let int = ComponentKey::of(Type::Int);
    let (log, id) = record(&mut world, int.clone());
    let e = world.entity("e");

    world.set_component(e, int.clone(), 1).unwrap();
    assert!(world.remove_hook(id));
    assert!(!world.remove_hook(id));
    world.set_component(e, int, 2).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn set_default_fires_only_when_writing() {
    let mut world = World::new();
    let int = ComponentKey::of(Type::Int);
    let (log, _) = record(&mut world, int.clone());
    let base = world.spawn([(int.clone(), Value::Int(3))], []);
    let child = world.instantiate(base).unwrap();
    let orphan = world.new_entity();

    assert_eq!(world.set_default(child, int.clone(), Value::Int(9)).unwrap(), Value::Int(3));
    assert_eq!(world.set_default(orphan, int.clone(), Value::Int(9)).unwrap(), Value::Int(9));
    assert_eq!(world.get(orphan, &int).unwrap(), &Value::Int(9));
    assert_eq!(log.borrow().len(), 2);
}
