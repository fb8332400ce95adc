use loom_classfile::access::{ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
use loom_model::{ClassDef, MethodDef, TypeStore, OBJECT};
use loom_test_utils::{
    base_get, child_bridge, child_get, covariant_pool, default_method_pool, generated_subclass,
    BASE, CHILD, GREETER, GREETER_IMPL,
};
use pretty_assertions::assert_eq;

#[test]
fn overridden_methods_are_hidden() {
    let pool = covariant_pool();
    let child = pool.require(CHILD).unwrap();
    let reachable = child.reachable_methods();

    assert!(reachable.contains(&child_get()));
    assert!(reachable.contains(&child_bridge()));
    // The bridge overrides `Base.get()Object`.
    assert!(!reachable.contains(&base_get()));
}

#[test]
fn reachable_methods_include_declared_methods() {
    let pool = covariant_pool();
    for name in [BASE, CHILD] {
        let ty = pool.require(name).unwrap();
        let reachable = ty.reachable_methods();
        for method in &ty.declared_methods() {
            assert!(reachable.contains(method), "{method} missing from {name}");
        }
    }
}

#[test]
fn generated_subclass_inherits_from_the_whole_chain() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let reachable = generated.reachable_methods();

    assert!(generated.declared_methods().is_empty());
    assert!(reachable.contains(&child_get()));
    assert!(reachable.iter().any(|m| m.internal_name() == "toString"));
    // Constructors of super types are not inherited.
    assert!(!reachable.iter().any(|m| m.is_constructor()));
}

#[test]
fn private_and_static_interface_methods_are_not_inherited() {
    let mut store = TypeStore::with_minimal_jdk();
    store
        .define_class(
            ClassDef::interface("api/Api")
                .with_method(MethodDef::new("helper", "()V", ACC_PUBLIC | ACC_STATIC).unwrap())
                .with_method(MethodDef::new("secret", "()V", ACC_PRIVATE).unwrap()),
        )
        .unwrap();
    store
        .define_class(ClassDef::class("api/Impl", OBJECT).implementing("api/Api"))
        .unwrap();
    let pool = store.freeze();

    let reachable = pool.require("api/Impl").unwrap().reachable_methods();
    assert!(!reachable.iter().any(|m| m.internal_name() == "helper"));
    assert!(!reachable.iter().any(|m| m.internal_name() == "secret"));
}

#[test]
fn default_methods_are_keyed_by_implemented_interface() {
    let pool = default_method_pool();
    let implementation = pool.require(GREETER_IMPL).unwrap();
    let greeter = pool.require(GREETER).unwrap();

    let defaults = implementation.default_methods();
    assert_eq!(defaults.len(), 1);
    let names: Vec<&str> = defaults[&greeter]
        .iter()
        .map(|m| m.internal_name())
        .collect();
    assert_eq!(names, vec!["greet"]);
    assert!(implementation.interfaces().contains(&greeter));
}
