//! Utilities shared by Loom tests.
//!
//! [`fixtures`] builds small type hierarchies that exercise bridge resolution: a covariant
//! override, arbitrarily deep bridge chains, ambiguous bridges and default methods.
//! [`recording`] provides a [`MethodVisitor`](loom_instrument::MethodVisitor) that records what
//! was emitted, plus instrumentations and auxiliary types whose effects are easy to assert on.

pub mod fixtures;
pub mod recording;

pub use fixtures::*;
pub use recording::*;
