use loom_classfile::access::{ACC_ABSTRACT, ACC_BRIDGE, ACC_PUBLIC, ACC_SYNTHETIC};
use loom_model::{
    ClassDef, InstrumentedType, MethodDef, MethodDescription, TypeDescription, TypePool,
    TypeStore, OBJECT,
};

pub const BASE: &str = "fixture/Base";
pub const CHILD: &str = "fixture/Child";
pub const GENERATED: &str = "fixture/Gen";
pub const AMBIGUOUS: &str = "fixture/Ambiguous";
pub const GREETER: &str = "fixture/Greeter";
pub const GREETER_IMPL: &str = "fixture/GreeterImpl";

pub const BRIDGE_FLAGS: u16 = ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC;

const OBJECT_GETTER: &str = "()Ljava/lang/Object;";
const STRING_GETTER: &str = "()Ljava/lang/String;";

fn method(name: &str, descriptor: &str, access_flags: u16) -> MethodDef {
    MethodDef::new(name, descriptor, access_flags).expect("fixture descriptor should parse")
}

fn define(store: &mut TypeStore, def: ClassDef) {
    let name = def.name.clone();
    store
        .define_class(def)
        .unwrap_or_else(|err| panic!("failed to define fixture type {name}: {err}"));
}

/// `Base` declares `Object get()`; `Child extends Base` overrides it with `String get()` and
/// carries the bridge `Object get()` that javac would generate.
pub fn covariant_pool() -> TypePool {
    let mut store = TypeStore::with_minimal_jdk();
    define(
        &mut store,
        ClassDef::class(BASE, OBJECT).with_method(method("get", OBJECT_GETTER, ACC_PUBLIC)),
    );
    define(
        &mut store,
        ClassDef::class(CHILD, BASE)
            .with_method(method("get", STRING_GETTER, ACC_PUBLIC))
            .with_method(method("get", OBJECT_GETTER, BRIDGE_FLAGS)),
    );
    store.freeze()
}

pub fn base_get() -> MethodDescription {
    MethodDescription::parse(BASE, "get", OBJECT_GETTER, ACC_PUBLIC).expect("valid descriptor")
}

pub fn child_get() -> MethodDescription {
    MethodDescription::parse(CHILD, "get", STRING_GETTER, ACC_PUBLIC).expect("valid descriptor")
}

pub fn child_bridge() -> MethodDescription {
    MethodDescription::parse(CHILD, "get", OBJECT_GETTER, BRIDGE_FLAGS).expect("valid descriptor")
}

/// Name of the `i`-th return type of a bridge chain. Level 0 is `java/lang/Object`.
pub fn chain_return(level: usize) -> String {
    if level == 0 {
        OBJECT.to_string()
    } else {
        format!("fixture/R{level}")
    }
}

/// Name of the `i`-th class of a bridge chain.
pub fn chain_level(level: usize) -> String {
    format!("fixture/Level{level}")
}

fn getter_returning(level: usize) -> String {
    format!("()L{};", chain_return(level))
}

/// A hierarchy of `depth + 1` classes where each level narrows the return type of `get()` once.
///
/// `Level0` declares `get()` returning `Object`. `Level{i}` extends `Level{i-1}`, declares
/// `get()` returning `R{i}` and bridges `get()` returning `R{i-1}` to it. Resolving the
/// `Object` signature against `Level{depth}` therefore crosses `depth` bridges.
pub fn bridge_chain_pool(depth: usize) -> TypePool {
    let mut store = TypeStore::with_minimal_jdk();
    for level in 1..=depth {
        define(
            &mut store,
            ClassDef::class(chain_return(level), chain_return(level - 1)),
        );
    }
    define(
        &mut store,
        ClassDef::class(chain_level(0), OBJECT).with_method(method(
            "get",
            &getter_returning(0),
            ACC_PUBLIC,
        )),
    );
    for level in 1..=depth {
        define(
            &mut store,
            ClassDef::class(chain_level(level), chain_level(level - 1))
                .with_method(method("get", &getter_returning(level), ACC_PUBLIC))
                .with_method(method("get", &getter_returning(level - 1), BRIDGE_FLAGS)),
        );
    }
    store.freeze()
}

/// `get()` at the root of a bridge chain, as declared by `Level0`.
pub fn chain_root_get() -> MethodDescription {
    MethodDescription::parse(chain_level(0), "get", &getter_returning(0), ACC_PUBLIC)
        .expect("valid descriptor")
}

/// A class whose bridge `Object get()` is compatible with both `String get()` and
/// `Integer get()`.
pub fn ambiguous_bridge_pool() -> TypePool {
    let mut store = TypeStore::with_minimal_jdk();
    define(
        &mut store,
        ClassDef::class(AMBIGUOUS, OBJECT)
            .with_method(method("get", OBJECT_GETTER, BRIDGE_FLAGS))
            .with_method(method("get", STRING_GETTER, ACC_PUBLIC))
            .with_method(method("get", "()Ljava/lang/Integer;", ACC_PUBLIC)),
    );
    store.freeze()
}

pub fn ambiguous_bridge() -> MethodDescription {
    MethodDescription::parse(AMBIGUOUS, "get", OBJECT_GETTER, BRIDGE_FLAGS)
        .expect("valid descriptor")
}

/// An interface with one default method `greet()` and one abstract method `name()`, and a class
/// implementing it.
pub fn default_method_pool() -> TypePool {
    let mut store = TypeStore::with_minimal_jdk();
    define(
        &mut store,
        ClassDef::interface(GREETER)
            .with_method(method("greet", STRING_GETTER, ACC_PUBLIC))
            .with_method(method("name", STRING_GETTER, ACC_PUBLIC | ACC_ABSTRACT)),
    );
    define(&mut store, ClassDef::class(GREETER_IMPL, OBJECT).implementing(GREETER));
    store.freeze()
}

/// Describes a generated subclass of `super_class` named [`GENERATED`], layered over `pool`.
pub fn generated_subclass(pool: &TypePool, super_class: &str) -> TypeDescription {
    let super_type = pool
        .require(super_class)
        .unwrap_or_else(|err| panic!("missing fixture type {super_class}: {err}"));
    InstrumentedType::subclass(GENERATED, &super_type)
        .and_then(|ty| ty.describe(pool))
        .expect("generated subclass should describe")
}

/// Like [`generated_subclass`], additionally implementing `interface`.
pub fn generated_implementing(pool: &TypePool, super_class: &str, interface: &str) -> TypeDescription {
    let super_type = pool.require(super_class).expect("fixture super class");
    let interface = pool.require(interface).expect("fixture interface");
    InstrumentedType::subclass(GENERATED, &super_type)
        .map(|ty| ty.implementing(&interface))
        .and_then(|ty| ty.describe(pool))
        .expect("generated subclass should describe")
}
