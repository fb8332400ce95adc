use std::sync::Arc;

use loom_instrument::{AuxiliaryType, Context, InstrumentError};
use loom_model::{ModelError, TypeDescription, OBJECT};
use loom_test_utils::{
    covariant_pool, generated_subclass, MissingSuperAuxiliary, TaggedAuxiliary, CHILD, GENERATED,
    MISSING_SUPER,
};
use pretty_assertions::assert_eq;

fn context() -> Context {
    let pool = covariant_pool();
    Context::new(generated_subclass(&pool, CHILD))
}

fn tagged(tag: &str) -> Arc<dyn AuxiliaryType> {
    Arc::new(TaggedAuxiliary::new(tag))
}

#[test]
fn registering_an_equal_spec_returns_the_recorded_description() {
    let mut context = context();
    let first = context.register(tagged("accessor")).unwrap();
    let second = context.register(tagged("accessor")).unwrap();

    assert_eq!(first, second);
    assert_eq!(context.registered_auxiliary_types().len(), 1);
    assert_eq!(
        context.registered_auxiliary_types()[0].description(),
        &first
    );
}

#[test]
fn auxiliary_types_are_listed_in_registration_order() {
    let mut context = context();
    let names: Vec<String> = ["b", "a", "b", "c"]
        .into_iter()
        .map(|tag| {
            context
                .register(tagged(tag))
                .unwrap()
                .internal_name()
                .to_string()
        })
        .collect();
    assert_eq!(
        names,
        vec![
            format!("{GENERATED}$auxiliary$1"),
            format!("{GENERATED}$auxiliary$2"),
            format!("{GENERATED}$auxiliary$1"),
            format!("{GENERATED}$auxiliary$3"),
        ]
    );

    let tags: Vec<Vec<String>> = context
        .registered_auxiliary_types()
        .iter()
        .map(|ty| ty.definition().initializers().to_vec())
        .collect();
    assert_eq!(
        tags,
        vec![
            vec!["b".to_string()],
            vec!["a".to_string()],
            vec!["c".to_string()]
        ]
    );
}

#[test]
fn auxiliary_types_extend_object_and_stay_out_of_the_shared_pool() {
    let pool = covariant_pool();
    let mut context = Context::new(generated_subclass(&pool, CHILD));
    let description: TypeDescription = context.register(tagged("proxy")).unwrap();

    assert_eq!(description.super_class_name(), Some(OBJECT));
    assert!(!pool.contains(description.internal_name()));
}

#[test]
fn custom_suffix_is_used_for_names() {
    let pool = covariant_pool();
    let mut context = Context::with_suffix(generated_subclass(&pool, CHILD), "accessor");
    let description = context.register(tagged("x")).unwrap();
    assert_eq!(
        description.internal_name(),
        format!("{GENERATED}$accessor$1")
    );
}

#[test]
fn failed_synthesis_registers_nothing() {
    let mut context = context();
    let err = context
        .register(Arc::new(MissingSuperAuxiliary))
        .unwrap_err();
    assert_eq!(
        err,
        InstrumentError::Model(ModelError::UnknownType {
            name: MISSING_SUPER.to_string(),
        })
    );
    assert!(context.is_empty());
}
