//! Instrumentation planning: deciding which concrete method on which concrete type a generated
//! method body calls.
//!
//! The pieces, in the order a build uses them:
//!
//! - [`BridgeResolverStrategy`] builds a [`BridgeMethodResolver`] for the instrumented type, so
//!   that super calls never land on a compiler-inserted bridge.
//! - A [`TargetFactory`] turns the type's [`loom_model::Finding`] into a [`Target`] that plans
//!   super and default method calls as [`SpecialMethodInvocation`]s.
//! - [`Instrumentation`]s, usually combined in a [`Compound`], prepare the instrumented type and
//!   hand out [`ByteCodeAppender`]s.
//! - While code is emitted, the build's [`Context`] records auxiliary types.

#![forbid(unsafe_code)]

mod bridge;
mod context;
mod dyn_eq;
pub mod emit;
mod error;
mod instrumentation;
mod invocation;
mod target;

pub use crate::bridge::{
    BridgeMethodResolver, BridgeResolverStrategy, BridgeTarget, ConflictHandler, ConflictPolicy,
    SimpleBridgeResolver,
};
pub use crate::context::{AuxiliaryType, Context, DynamicType, DEFAULT_AUXILIARY_SUFFIX};
pub use crate::dyn_eq::DynEq;
pub use crate::emit::{ByteCodeAppender, MethodVisitor, Size, StackManipulation, StackSize};
pub use crate::error::{InstrumentError, Result};
pub use crate::instrumentation::{Compound, CompoundAppender, ForAbstractMethod, Instrumentation};
pub use crate::invocation::SpecialMethodInvocation;
pub use crate::target::{
    InstrumentationTarget, MethodLookup, SubclassSuperCall, SubclassTargetFactory, SuperCallPolicy,
    Target, TargetFactory,
};
