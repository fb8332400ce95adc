use std::sync::Arc;

use loom_config::LoomConfig;
use loom_instrument::{BridgeResolverStrategy, ConflictPolicy, SubclassTargetFactory, TargetFactory};
use loom_model::{MethodLookupEngine, ReachableMethodLookup};
use loom_test_utils::{
    ambiguous_bridge, ambiguous_bridge_pool, covariant_pool, generated_subclass, TaggedAuxiliary,
    AMBIGUOUS, CHILD, GENERATED,
};
use pretty_assertions::assert_eq;

#[test]
fn strategy_follows_the_bridges_section() {
    let mut config = LoomConfig::default();
    assert_eq!(
        config.bridge_resolver_strategy(),
        BridgeResolverStrategy::Simple(ConflictPolicy::FailFast)
    );

    config.bridges.conflict_policy = ConflictPolicy::CallBridge;
    assert_eq!(
        config.bridge_resolver_strategy(),
        BridgeResolverStrategy::Simple(ConflictPolicy::CallBridge)
    );

    config.bridges.resolve = false;
    assert_eq!(config.bridge_resolver_strategy(), BridgeResolverStrategy::NoOp);
}

#[test]
fn configured_policy_reaches_the_resolver() {
    let pool = ambiguous_bridge_pool();
    let generated = generated_subclass(&pool, AMBIGUOUS);
    let finding = ReachableMethodLookup.process(&generated);

    let fail_fast = LoomConfig::default();
    let factory = SubclassTargetFactory::new(fail_fast.bridge_resolver_strategy());
    assert!(factory.make(&finding).is_err());

    let config = LoomConfig::load_from_str("[bridges]\nconflict_policy = \"call-bridge\"\n")
        .expect("config should parse");
    let target = SubclassTargetFactory::new(config.bridge_resolver_strategy())
        .make(&finding)
        .expect("call-bridge tolerates ambiguous bridges");
    assert_eq!(
        target.bridge_resolver().resolve(&ambiguous_bridge()).unwrap(),
        ambiguous_bridge()
    );
}

#[test]
fn context_uses_the_configured_suffix() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let config = LoomConfig::load_from_str("[auxiliary]\nsuffix = \"accessor\"\n")
        .expect("config should parse");

    let mut context = config.context_for(&generated);
    let description = context
        .register(Arc::new(TaggedAuxiliary::new("getter")))
        .unwrap();
    assert_eq!(
        description.internal_name(),
        format!("{GENERATED}$accessor$1")
    );
    assert_eq!(context.instrumented_type(), &generated);
}
