use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use loom_model::{InstrumentedType, MethodDescription};

use crate::context::Context;
use crate::dyn_eq::{dyn_eq_impls, DynEq};
use crate::emit::{ByteCodeAppender, MethodVisitor, Size};
use crate::error::{InstrumentError, Result};
use crate::target::Target;

/// Implements methods of an instrumented type.
///
/// Equal instrumentations produce the same code, so a build applies each of them at most once.
pub trait Instrumentation: DynEq + fmt::Debug {
    /// Adds the fields, methods and initializers the instrumentation relies on.
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType>;

    /// Creates the appender that emits the bodies of the methods delegated to this
    /// instrumentation.
    fn appender(&self, target: &dyn Target) -> Result<Box<dyn ByteCodeAppender>>;
}

dyn_eq_impls!(Instrumentation);

/// Applies several instrumentations in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Compound {
    instrumentations: Vec<Arc<dyn Instrumentation>>,
}

impl Compound {
    pub fn new(instrumentations: impl IntoIterator<Item = Arc<dyn Instrumentation>>) -> Self {
        Self {
            instrumentations: instrumentations.into_iter().collect(),
        }
    }

    pub fn instrumentations(&self) -> &[Arc<dyn Instrumentation>] {
        &self.instrumentations
    }

    /// The same composition with later duplicates removed.
    pub fn distinct(&self) -> Compound {
        let unique: IndexSet<Arc<dyn Instrumentation>> =
            self.instrumentations.iter().cloned().collect();
        Compound {
            instrumentations: unique.into_iter().collect(),
        }
    }
}

impl Instrumentation for Compound {
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType> {
        self.instrumentations
            .iter()
            .try_fold(instrumented_type, |ty, instrumentation| {
                instrumentation.prepare(ty)
            })
    }

    fn appender(&self, target: &dyn Target) -> Result<Box<dyn ByteCodeAppender>> {
        let appenders = self
            .instrumentations
            .iter()
            .map(|instrumentation| instrumentation.appender(target))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(CompoundAppender { appenders }))
    }
}

/// Runs several appenders in order; the frame is large enough for each of them.
#[derive(Debug)]
pub struct CompoundAppender {
    appenders: Vec<Box<dyn ByteCodeAppender>>,
}

impl CompoundAppender {
    pub fn new(appenders: Vec<Box<dyn ByteCodeAppender>>) -> Self {
        Self { appenders }
    }
}

impl ByteCodeAppender for CompoundAppender {
    fn appends_code(&self) -> bool {
        self.appenders.iter().any(|appender| appender.appends_code())
    }

    fn apply(
        &self,
        visitor: &mut dyn MethodVisitor,
        context: &mut Context,
        instrumented_method: &MethodDescription,
    ) -> Result<Size> {
        let mut size = Size::ZERO;
        for appender in &self.appenders {
            size = size.merge(appender.apply(visitor, context, instrumented_method)?);
        }
        Ok(size)
    }
}

/// Leaves a method abstract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ForAbstractMethod;

impl Instrumentation for ForAbstractMethod {
    fn prepare(&self, instrumented_type: InstrumentedType) -> Result<InstrumentedType> {
        Ok(instrumented_type)
    }

    fn appender(&self, _target: &dyn Target) -> Result<Box<dyn ByteCodeAppender>> {
        Ok(Box::new(ForAbstractMethod))
    }
}

impl ByteCodeAppender for ForAbstractMethod {
    fn appends_code(&self) -> bool {
        false
    }

    fn apply(
        &self,
        _visitor: &mut dyn MethodVisitor,
        _context: &mut Context,
        instrumented_method: &MethodDescription,
    ) -> Result<Size> {
        Err(InstrumentError::AbstractMethod {
            method: instrumented_method.to_string(),
        })
    }
}
