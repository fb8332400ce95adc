use std::hash::{Hash, Hasher};

use loom_model::{MethodDescription, TypeDescription};

use crate::context::Context;
use crate::emit::{opcodes, MethodVisitor, StackManipulation, StackSize};
use crate::error::{InstrumentError, Result};

/// A non-virtual call to a specific method on a specific type, as used for super and default
/// method calls.
///
/// Two legal invocations are equal when they call a method with the same name, parameter types
/// and return type on the same type, no matter which method description was used to request
/// them.
#[derive(Debug, Clone)]
pub enum SpecialMethodInvocation {
    Legal {
        method: MethodDescription,
        on_type: TypeDescription,
    },
    /// No such invocation exists.
    Illegal,
}

impl SpecialMethodInvocation {
    pub fn legal(method: MethodDescription, on_type: TypeDescription) -> Self {
        SpecialMethodInvocation::Legal { method, on_type }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SpecialMethodInvocation::Legal { .. })
    }

    pub fn target_method(&self) -> Result<&MethodDescription> {
        match self {
            SpecialMethodInvocation::Legal { method, .. } => Ok(method),
            SpecialMethodInvocation::Illegal => Err(InstrumentError::IllegalInvocation {
                operation: "query the target method of",
            }),
        }
    }

    pub fn target_type(&self) -> Result<&TypeDescription> {
        match self {
            SpecialMethodInvocation::Legal { on_type, .. } => Ok(on_type),
            SpecialMethodInvocation::Illegal => Err(InstrumentError::IllegalInvocation {
                operation: "query the target type of",
            }),
        }
    }
}

impl PartialEq for SpecialMethodInvocation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                SpecialMethodInvocation::Legal { method, on_type },
                SpecialMethodInvocation::Legal {
                    method: other_method,
                    on_type: other_type,
                },
            ) => {
                on_type == other_type
                    && method.internal_name() == other_method.internal_name()
                    && method.parameter_types() == other_method.parameter_types()
                    && method.return_type() == other_method.return_type()
            }
            (SpecialMethodInvocation::Illegal, SpecialMethodInvocation::Illegal) => true,
            _ => false,
        }
    }
}

impl Eq for SpecialMethodInvocation {}

impl Hash for SpecialMethodInvocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SpecialMethodInvocation::Legal { method, on_type } => {
                method.internal_name().hash(state);
                method.parameter_types().hash(state);
                method.return_type().hash(state);
                on_type.hash(state);
            }
            SpecialMethodInvocation::Illegal => 0u8.hash(state),
        }
    }
}

impl StackManipulation for SpecialMethodInvocation {
    fn is_valid(&self) -> bool {
        SpecialMethodInvocation::is_valid(self)
    }

    fn apply(&self, visitor: &mut dyn MethodVisitor, _context: &mut Context) -> Result<StackSize> {
        let SpecialMethodInvocation::Legal { method, on_type } = self else {
            return Err(InstrumentError::IllegalInvocation { operation: "apply" });
        };
        visitor.visit_method_insn(
            opcodes::INVOKESPECIAL,
            on_type.internal_name(),
            method.internal_name(),
            &method.descriptor(),
            on_type.is_interface(),
        );
        // The receiver is consumed along with the arguments.
        let consumed = i32::from(method.parameter_stack_size()) + 1;
        Ok(StackSize::of_impact(
            i32::from(method.return_type().stack_size()) - consumed,
        ))
    }
}
