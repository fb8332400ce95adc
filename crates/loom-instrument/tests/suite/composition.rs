use std::sync::Arc;

use loom_instrument::emit::opcodes;
use loom_instrument::{
    BridgeResolverStrategy, Compound, Context, ForAbstractMethod, InstrumentError,
    Instrumentation, MethodLookup, Size, SubclassTargetFactory, TargetFactory,
};
use loom_model::{InstrumentedType, MethodLookupEngine, ReachableMethodLookup};
use loom_test_utils::{
    base_get, covariant_pool, generated_subclass, MarkerInstrumentation, Recorded,
    RecordingMethodVisitor, SuperCallInstrumentation, CHILD, GENERATED,
};
use pretty_assertions::assert_eq;

fn marker(label: &str, opcode: u8, operand_stack: u32) -> Arc<dyn Instrumentation> {
    Arc::new(MarkerInstrumentation::new(label, opcode, operand_stack))
}

fn prepared_initializers(compound: &Compound) -> Vec<String> {
    let pool = covariant_pool();
    let child = pool.require(CHILD).unwrap();
    let instrumented = InstrumentedType::subclass(GENERATED, &child).unwrap();
    compound
        .prepare(instrumented)
        .unwrap()
        .initializers()
        .to_vec()
}

#[test]
fn prepare_applies_children_left_to_right() {
    let ab = Compound::new([marker("a", 0x01, 1), marker("b", 0x02, 1)]);
    let ba = Compound::new([marker("b", 0x02, 1), marker("a", 0x01, 1)]);

    assert_eq!(prepared_initializers(&ab), vec!["a", "b"]);
    assert_eq!(prepared_initializers(&ba), vec!["b", "a"]);
    assert_ne!(ab, ba);
}

#[test]
fn appenders_run_in_order_and_merge_sizes() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = SubclassTargetFactory::default()
        .make(&ReachableMethodLookup.process(&generated))
        .unwrap();

    let compound = Compound::new([marker("a", 0x01, 3), marker("b", 0x02, 1)]);
    let appender = compound.appender(&target).unwrap();
    assert!(appender.appends_code());

    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated);
    let size = appender
        .apply(&mut visitor, &mut context, &base_get())
        .unwrap();
    assert_eq!(visitor.recorded, vec![Recorded::Insn(0x01), Recorded::Insn(0x02)]);
    assert_eq!(size, Size::new(3, 1));
}

#[test]
fn super_call_through_a_compound_targets_the_override() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = SubclassTargetFactory::new(BridgeResolverStrategy::default())
        .make(&ReachableMethodLookup.process(&generated))
        .unwrap();

    let super_call: Arc<dyn Instrumentation> = Arc::new(SuperCallInstrumentation::new(
        base_get(),
        MethodLookup::ForSuperType,
    ));
    let compound = Compound::new([super_call]);
    let appender = compound.appender(&target).unwrap();

    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated);
    let size = appender
        .apply(&mut visitor, &mut context, &base_get())
        .unwrap();
    assert_eq!(
        visitor.recorded,
        vec![
            Recorded::Insn(opcodes::ALOAD_0),
            Recorded::invokespecial(CHILD, "get", "()Ljava/lang/String;", false),
            Recorded::Insn(opcodes::ARETURN),
        ]
    );
    assert_eq!(size, Size::new(1, 1));
}

#[test]
fn equal_compounds_deduplicate() {
    let first = Compound::new([marker("a", 0x01, 1), marker("b", 0x02, 1)]);
    let second = Compound::new([marker("a", 0x01, 1), marker("b", 0x02, 1)]);
    assert_eq!(first, second);

    let nested: Arc<dyn Instrumentation> = Arc::new(first.clone());
    let repeated = Compound::new([nested.clone(), marker("c", 0x03, 1), nested]);
    assert_eq!(repeated.distinct().instrumentations().len(), 2);
    assert_eq!(first.distinct(), first);
}

#[test]
fn abstract_methods_are_not_implemented() {
    let pool = covariant_pool();
    let generated = generated_subclass(&pool, CHILD);
    let target = SubclassTargetFactory::default()
        .make(&ReachableMethodLookup.process(&generated))
        .unwrap();

    let compound = Compound::new([Arc::new(ForAbstractMethod) as Arc<dyn Instrumentation>]);
    let appender = compound.appender(&target).unwrap();
    assert!(!appender.appends_code());

    let mut visitor = RecordingMethodVisitor::new();
    let mut context = Context::new(generated);
    let err = appender
        .apply(&mut visitor, &mut context, &base_get())
        .unwrap_err();
    assert!(matches!(err, InstrumentError::AbstractMethod { .. }));
}
