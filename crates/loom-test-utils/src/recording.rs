use loom_classfile::ReturnType;
use loom_instrument::emit::opcodes;
use loom_instrument::{
    AuxiliaryType, ByteCodeAppender, Context, DynamicType, Instrumentation, MethodLookup,
    MethodVisitor, Size, SpecialMethodInvocation, StackManipulation, Target,
};
use loom_model::{InstrumentedType, MethodDescription, TypeDescription, OBJECT};

/// One instruction seen by a [`RecordingMethodVisitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Insn(u8),
    MethodInsn {
        opcode: u8,
        owner: String,
        name: String,
        descriptor: String,
        is_interface: bool,
    },
}

impl Recorded {
    pub fn invokespecial(owner: &str, name: &str, descriptor: &str, is_interface: bool) -> Self {
        Recorded::MethodInsn {
            opcode: opcodes::INVOKESPECIAL,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            is_interface,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingMethodVisitor {
    pub recorded: Vec<Recorded>,
}

impl RecordingMethodVisitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MethodVisitor for RecordingMethodVisitor {
    fn visit_insn(&mut self, opcode: u8) {
        self.recorded.push(Recorded::Insn(opcode));
    }

    fn visit_method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    ) {
        self.recorded.push(Recorded::MethodInsn {
            opcode,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            is_interface,
        });
    }
}

/// Adds a type initializer labelled `label` and emits the single instruction `opcode`.
///
/// Lets tests observe the order in which a composition prepares types and applies appenders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerInstrumentation {
    pub label: String,
    pub opcode: u8,
    pub operand_stack: u32,
}

impl MarkerInstrumentation {
    pub fn new(label: impl Into<String>, opcode: u8, operand_stack: u32) -> Self {
        Self {
            label: label.into(),
            opcode,
            operand_stack,
        }
    }
}

impl Instrumentation for MarkerInstrumentation {
    fn prepare(
        &self,
        instrumented_type: InstrumentedType,
    ) -> loom_instrument::Result<InstrumentedType> {
        Ok(instrumented_type.with_initializer(self.label.clone()))
    }

    fn appender(&self, _target: &dyn Target) -> loom_instrument::Result<Box<dyn ByteCodeAppender>> {
        Ok(Box::new(MarkerAppender {
            opcode: self.opcode,
            size: Size::new(self.operand_stack, 1),
        }))
    }
}

#[derive(Debug)]
struct MarkerAppender {
    opcode: u8,
    size: Size,
}

impl ByteCodeAppender for MarkerAppender {
    fn appends_code(&self) -> bool {
        true
    }

    fn apply(
        &self,
        visitor: &mut dyn MethodVisitor,
        _context: &mut Context,
        _instrumented_method: &MethodDescription,
    ) -> loom_instrument::Result<Size> {
        visitor.visit_insn(self.opcode);
        Ok(self.size)
    }
}

/// Implements a parameterless method by calling `method` on the super type and returning its
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuperCallInstrumentation {
    pub method: MethodDescription,
    pub lookup: MethodLookup,
}

impl SuperCallInstrumentation {
    pub fn new(method: MethodDescription, lookup: MethodLookup) -> Self {
        Self { method, lookup }
    }
}

impl Instrumentation for SuperCallInstrumentation {
    fn prepare(
        &self,
        instrumented_type: InstrumentedType,
    ) -> loom_instrument::Result<InstrumentedType> {
        Ok(instrumented_type)
    }

    fn appender(&self, target: &dyn Target) -> loom_instrument::Result<Box<dyn ByteCodeAppender>> {
        let invocation = target.invoke_super(&self.method, self.lookup)?;
        tracing::debug!(
            target: "loom.test_utils",
            method = %self.method,
            valid = invocation.is_valid(),
            "planned super call"
        );
        Ok(Box::new(SuperCallAppender { invocation }))
    }
}

#[derive(Debug)]
struct SuperCallAppender {
    invocation: SpecialMethodInvocation,
}

impl ByteCodeAppender for SuperCallAppender {
    fn appends_code(&self) -> bool {
        true
    }

    fn apply(
        &self,
        visitor: &mut dyn MethodVisitor,
        context: &mut Context,
        _instrumented_method: &MethodDescription,
    ) -> loom_instrument::Result<Size> {
        let method = self.invocation.target_method()?;
        visitor.visit_insn(opcodes::ALOAD_0);
        let call = StackManipulation::apply(&self.invocation, visitor, context)?;
        let return_opcode = match method.return_type() {
            ReturnType::Void => opcodes::RETURN,
            ReturnType::Type(ty) if ty.is_reference() => opcodes::ARETURN,
            ReturnType::Type(_) => opcodes::IRETURN,
        };
        visitor.visit_insn(return_opcode);
        // The receiver occupies one slot before the call.
        let operand_stack = 1u32.max(u32::try_from(1 + call.impact).unwrap_or(0));
        let local_variables = 1 + u32::from(method.parameter_stack_size());
        Ok(Size::new(operand_stack, local_variables))
    }
}

/// An auxiliary type identified by `tag`, generated as a subclass of `java/lang/Object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedAuxiliary {
    pub tag: String,
}

impl TaggedAuxiliary {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl AuxiliaryType for TaggedAuxiliary {
    fn make(
        &self,
        name: &str,
        instrumented: &TypeDescription,
    ) -> loom_instrument::Result<DynamicType> {
        let object = instrumented.pool().require(OBJECT)?;
        let definition =
            InstrumentedType::subclass(name, &object)?.with_initializer(self.tag.clone());
        DynamicType::new(definition, instrumented.pool())
    }
}

/// An auxiliary type extending a type that is missing from the pool, so synthesis fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MissingSuperAuxiliary;

pub const MISSING_SUPER: &str = "fixture/Missing";

impl AuxiliaryType for MissingSuperAuxiliary {
    fn make(
        &self,
        name: &str,
        instrumented: &TypeDescription,
    ) -> loom_instrument::Result<DynamicType> {
        let super_class = instrumented.pool().require(MISSING_SUPER)?;
        DynamicType::new(InstrumentedType::subclass(name, &super_class)?, instrumented.pool())
    }
}
