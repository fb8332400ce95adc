use loom_model::{MethodLookupEngine, ReachableMethodLookup};
use loom_test_utils::{default_method_pool, generated_implementing, GREETER, GREETER_IMPL};

#[test]
fn finding_lists_reachable_and_default_methods() {
    let pool = default_method_pool();
    let generated = generated_implementing(&pool, GREETER_IMPL, GREETER);
    let finding = ReachableMethodLookup.process(&generated);

    assert_eq!(finding.type_description, generated);
    assert_eq!(finding.invokable_methods, generated.reachable_methods());

    let greeter = pool.require(GREETER).unwrap();
    let defaults = &finding.invokable_default_methods[&greeter];
    assert_eq!(defaults.len(), 1);
    assert!(defaults.iter().all(|m| m.is_default_method()));
}
