//! Integration tests for component and relation keys

use kindred_foundation::{ComponentKey, RelationKey, Type, Value};

#[test]
fn bare_and_tagged_keys_are_disjoint() {
    let bare = ComponentKey::of(Type::Int);
    let named = ComponentKey::named("hp", Type::Int);
    assert_ne!(bare, named);
    assert_eq!(bare.value_type(), named.value_type());
    assert_eq!(bare.tag(), None);
    assert_eq!(named.tag(), Some(&Value::from("hp")));
}

#[test]
fn same_tag_different_type_differs() {
    assert_ne!(
        ComponentKey::named("pos", Type::Int),
        ComponentKey::named("pos", Type::Float)
    );
}

#[test]
fn relation_keys_separate_tags_from_components() {
    let tag = RelationKey::tag(Value::from("int"));
    let component = RelationKey::from(ComponentKey::of(Type::Int));
    assert_ne!(tag, component);
    assert_eq!(RelationKey::is_a(), RelationKey::Tag(Value::is_a()));
}

#[test]
fn composite_types_nest() {
    let ty = Type::map(Type::Keyword, Type::list(Type::Int));
    assert_eq!(ty, Type::map(Type::Keyword, Type::list(Type::Int)));
    assert_ne!(ty, Type::map(Type::Keyword, Type::list(Type::Float)));
    assert_eq!(Type::named("Position"), Type::named("Position"));
}
