//! The narrow interface between planning and bytecode emission.

use std::fmt;

use loom_model::MethodDescription;

use crate::context::Context;
use crate::error::Result;

pub mod opcodes {
    pub const ALOAD_0: u8 = 0x2a;
    pub const IRETURN: u8 = 0xac;
    pub const ARETURN: u8 = 0xb0;
    pub const RETURN: u8 = 0xb1;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
}

/// Receives the instructions of one method body.
pub trait MethodVisitor {
    fn visit_insn(&mut self, opcode: u8);

    fn visit_method_insn(
        &mut self,
        opcode: u8,
        owner: &str,
        name: &str,
        descriptor: &str,
        is_interface: bool,
    );
}

/// The effect of a stack manipulation on the operand stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StackSize {
    /// Net change in stack slots.
    pub impact: i32,
    /// Largest growth reached while applying the manipulation.
    pub maximal: u32,
}

impl StackSize {
    pub const ZERO: StackSize = StackSize { impact: 0, maximal: 0 };

    pub fn new(impact: i32, maximal: u32) -> Self {
        Self { impact, maximal }
    }

    /// A manipulation whose peak is its net growth.
    pub fn of_impact(impact: i32) -> Self {
        Self {
            impact,
            maximal: impact.max(0).unsigned_abs(),
        }
    }

    /// The size of applying `self` followed by `next`.
    pub fn aggregate(self, next: StackSize) -> StackSize {
        let peak_during_next = i64::from(self.impact) + i64::from(next.maximal);
        StackSize {
            impact: self.impact + next.impact,
            maximal: self
                .maximal
                .max(u32::try_from(peak_during_next.max(0)).unwrap_or(u32::MAX)),
        }
    }
}

pub trait StackManipulation {
    fn is_valid(&self) -> bool;

    fn apply(&self, visitor: &mut dyn MethodVisitor, context: &mut Context) -> Result<StackSize>;
}

/// Frame requirements reported by a byte code appender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub operand_stack: u32,
    pub local_variables: u32,
}

impl Size {
    pub const ZERO: Size = Size {
        operand_stack: 0,
        local_variables: 0,
    };

    pub fn new(operand_stack: u32, local_variables: u32) -> Self {
        Self {
            operand_stack,
            local_variables,
        }
    }

    pub fn merge(self, other: Size) -> Size {
        Size {
            operand_stack: self.operand_stack.max(other.operand_stack),
            local_variables: self.local_variables.max(other.local_variables),
        }
    }
}

/// Emits the body of an instrumented method.
pub trait ByteCodeAppender: fmt::Debug {
    /// Whether [`ByteCodeAppender::apply`] produces code at all. Appenders for abstract methods
    /// do not.
    fn appends_code(&self) -> bool;

    fn apply(
        &self,
        visitor: &mut dyn MethodVisitor,
        context: &mut Context,
        instrumented_method: &MethodDescription,
    ) -> Result<Size>;
}
