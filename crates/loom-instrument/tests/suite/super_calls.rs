use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use loom_instrument::emit::opcodes;
use loom_instrument::{
    BridgeResolverStrategy, ConflictPolicy, Context, InstrumentError, MethodLookup,
    SpecialMethodInvocation, StackManipulation, StackSize, SubclassTargetFactory, Target,
    TargetFactory,
};
use loom_model::{MethodLookupEngine, ReachableMethodLookup, TypeDescription, TypePool};
use loom_test_utils::{
    base_get, child_bridge, child_get, covariant_pool, default_method_pool,
    generated_implementing, generated_subclass, Recorded, RecordingMethodVisitor, BASE, CHILD,
    GREETER, GREETER_IMPL,
};
use pretty_assertions::assert_eq;

fn target_for(
    generated: &TypeDescription,
    strategy: BridgeResolverStrategy,
) -> impl Target + Eq + Hash + std::fmt::Debug {
    let finding = ReachableMethodLookup.process(generated);
    SubclassTargetFactory::new(strategy).make(&finding).unwrap()
}

fn child(pool: &TypePool) -> TypeDescription {
    pool.require(CHILD).unwrap()
}

#[test]
fn super_type_lookup_skips_the_bridge() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = target_for(&generated, BridgeResolverStrategy::default());

    let invocation = target
        .invoke_super(&base_get(), MethodLookup::ForSuperType)
        .unwrap();
    assert_eq!(invocation, SpecialMethodInvocation::legal(child_get(), child(&pool)));
    assert_eq!(invocation.target_method().unwrap(), &child_get());
    assert!(!invocation.target_method().unwrap().is_bridge());
}

#[test]
fn exact_lookup_keeps_the_requested_signature() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = target_for(&generated, BridgeResolverStrategy::default());

    let invocation = target.invoke_super(&base_get(), MethodLookup::Exact).unwrap();
    // Calling `Object get()` on `Child` dispatches to the bridge.
    assert_eq!(invocation, SpecialMethodInvocation::legal(child_bridge(), child(&pool)));
    assert_ne!(
        invocation,
        target
            .invoke_super(&base_get(), MethodLookup::ForSuperType)
            .unwrap()
    );
}

#[test]
fn super_type_lookup_with_no_op_resolver_still_prefers_the_override() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = target_for(&generated, BridgeResolverStrategy::NoOp);

    let invocation = target
        .invoke_super(&child_bridge(), MethodLookup::ForSuperType)
        .unwrap();
    assert_eq!(invocation.target_method().unwrap(), &child_get());
}

#[test]
fn legal_super_call_emits_invokespecial_on_the_super_class() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = target_for(&generated, BridgeResolverStrategy::default());
    let invocation = target
        .invoke_super(&base_get(), MethodLookup::ForSuperType)
        .unwrap();

    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated.clone());
    let size = invocation.apply(&mut visitor, &mut context).unwrap();

    assert_eq!(
        visitor.recorded,
        vec![Recorded::invokespecial(
            CHILD,
            "get",
            "()Ljava/lang/String;",
            false
        )]
    );
    // Pops the receiver and pushes the result.
    assert_eq!(size, StackSize::new(0, 0));
    assert!(context.is_empty());
}

#[test]
fn illegal_invocations_cannot_be_applied() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated);

    let err = SpecialMethodInvocation::Illegal
        .apply(&mut visitor, &mut context)
        .unwrap_err();
    assert!(matches!(err, InstrumentError::IllegalInvocation { .. }));
    assert!(visitor.recorded.is_empty());
}

#[test]
fn default_methods_are_invoked_on_the_interface() {
    let pool = default_method_pool();
    let generated = generated_implementing(&pool, GREETER_IMPL, GREETER);
    let target = target_for(&generated, BridgeResolverStrategy::default());
    let greeter = pool.require(GREETER).unwrap();

    let invocation = target.invoke_default(&greeter, "greet()");
    assert!(invocation.is_valid());
    assert_eq!(invocation.target_type().unwrap(), &greeter);

    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated.clone());
    invocation.apply(&mut visitor, &mut context).unwrap();
    assert_eq!(
        visitor.recorded,
        vec![Recorded::MethodInsn {
            opcode: opcodes::INVOKESPECIAL,
            owner: GREETER.to_string(),
            name: "greet".to_string(),
            descriptor: "()Ljava/lang/String;".to_string(),
            is_interface: true,
        }]
    );
}

#[test]
fn abstract_and_unknown_default_methods_are_illegal() {
    let pool = default_method_pool();
    let generated = generated_implementing(&pool, GREETER_IMPL, GREETER);
    let target = target_for(&generated, BridgeResolverStrategy::default());
    let greeter = pool.require(GREETER).unwrap();
    let unrelated = pool.require(GREETER_IMPL).unwrap();

    assert_eq!(
        target.invoke_default(&greeter, "name()"),
        SpecialMethodInvocation::Illegal
    );
    assert_eq!(
        target.invoke_default(&greeter, "greet(I)"),
        SpecialMethodInvocation::Illegal
    );
    assert_eq!(
        target.invoke_default(&unrelated, "greet()"),
        SpecialMethodInvocation::Illegal
    );
}

#[test]
fn interface_methods_are_not_super_callable() {
    let pool = default_method_pool();
    let generated = generated_implementing(&pool, GREETER_IMPL, GREETER);
    let target = target_for(&generated, BridgeResolverStrategy::default());
    let greet = target
        .invoke_default(&pool.require(GREETER).unwrap(), "greet()")
        .target_method()
        .unwrap()
        .clone();

    let invocation = target.invoke_super(&greet, MethodLookup::Exact).unwrap();
    assert!(!invocation.is_valid());
}

#[test]
fn targets_compare_by_type_defaults_and_resolver() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);

    let first = target_for(&generated, BridgeResolverStrategy::default());
    let second = target_for(&generated, BridgeResolverStrategy::default());
    assert_eq!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));
    assert_eq!(first.type_description(), &generated);
}

fn hash_of(value: &impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn targets_with_different_resolvers_are_unequal() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);

    let simple = target_for(&generated, BridgeResolverStrategy::default());
    let no_op = target_for(&generated, BridgeResolverStrategy::NoOp);
    assert_ne!(simple, no_op);

    let call_bridge = target_for(
        &generated,
        BridgeResolverStrategy::Simple(ConflictPolicy::CallBridge),
    );
    assert_ne!(simple, call_bridge);
}

#[test]
fn targets_for_different_types_are_unequal() {
    let pool = covariant_pool();
    let child_target = target_for(&child(&pool), BridgeResolverStrategy::default());
    let base_target = target_for(&pool.require(BASE).unwrap(), BridgeResolverStrategy::default());
    assert_ne!(child_target, base_target);
}

#[test]
fn targets_with_different_default_methods_are_unequal() {
    let pool = default_method_pool();
    let implementing = generated_implementing(&pool, GREETER_IMPL, GREETER);
    let plain = generated_subclass(&pool, GREETER_IMPL);
    // Both generated types share one name, so only the default-method maps tell them apart.
    assert_eq!(implementing, plain);

    let with_defaults = target_for(&implementing, BridgeResolverStrategy::default());
    let without_defaults = target_for(&plain, BridgeResolverStrategy::default());
    assert_ne!(with_defaults, without_defaults);
}
