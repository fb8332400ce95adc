use loom_instrument::{
    BridgeResolverStrategy, BridgeTarget, ConflictPolicy, InstrumentError, SimpleBridgeResolver,
};
use loom_test_utils::{ambiguous_bridge, ambiguous_bridge_pool, AMBIGUOUS};
use pretty_assertions::assert_eq;

#[test]
fn fail_fast_rejects_ambiguous_bridges_at_construction() {
    let pool = ambiguous_bridge_pool();
    let ambiguous = pool.require(AMBIGUOUS).unwrap();

    let err = SimpleBridgeResolver::new(&ambiguous, &ConflictPolicy::FailFast).unwrap_err();
    assert_eq!(
        err,
        InstrumentError::AmbiguousBridgeTarget {
            bridge: ambiguous_bridge().to_string(),
            candidates: vec![
                "fixture/Ambiguous.get()Ljava/lang/String;".to_string(),
                "fixture/Ambiguous.get()Ljava/lang/Integer;".to_string(),
            ],
        }
    );
    let message = err.to_string();
    assert!(message.contains("fixture/Ambiguous.get()Ljava/lang/Object;"));
    assert!(message.contains("Ljava/lang/String;"));
    assert!(message.contains("Ljava/lang/Integer;"));
}

#[test]
fn fail_on_request_defers_the_error_to_resolution() {
    let pool = ambiguous_bridge_pool();
    let ambiguous = pool.require(AMBIGUOUS).unwrap();

    let resolver = SimpleBridgeResolver::new(&ambiguous, &ConflictPolicy::FailOnRequest).unwrap();
    assert_eq!(resolver.target(&ambiguous_bridge()), Some(&BridgeTarget::Unknown));
    assert_eq!(
        resolver.resolve(&ambiguous_bridge()).unwrap_err(),
        InstrumentError::UnresolvedBridgeTarget {
            bridge: ambiguous_bridge().to_string(),
        }
    );
}

#[test]
fn call_bridge_resolves_to_the_bridge_itself() {
    let pool = ambiguous_bridge_pool();
    let ambiguous = pool.require(AMBIGUOUS).unwrap();

    let resolver = BridgeResolverStrategy::Simple(ConflictPolicy::CallBridge)
        .make(&ambiguous)
        .unwrap();
    let resolved = resolver.resolve(&ambiguous_bridge()).unwrap();
    assert_eq!(resolved, ambiguous_bridge());
    assert!(resolved.is_bridge());
}

#[test]
fn no_op_strategy_never_consults_the_policy() {
    let pool = ambiguous_bridge_pool();
    let ambiguous = pool.require(AMBIGUOUS).unwrap();
    let resolver = BridgeResolverStrategy::NoOp.make(&ambiguous).unwrap();
    assert_eq!(resolver.resolve(&ambiguous_bridge()).unwrap(), ambiguous_bridge());
}
