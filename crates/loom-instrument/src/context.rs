//! The registry of auxiliary types created while instrumenting a single type.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use loom_model::{InstrumentedType, TypeDescription, TypePool};

use crate::dyn_eq::{dyn_eq_impls, DynEq};
use crate::error::Result;

pub const DEFAULT_AUXILIARY_SUFFIX: &str = "auxiliary";

/// A helper type that an instrumentation needs generated next to the instrumented type, such as
/// an accessor or a proxy.
///
/// Equal values describe the same auxiliary type; the registry creates each of them once.
pub trait AuxiliaryType: DynEq + fmt::Debug {
    /// Synthesizes the auxiliary type under `name` for `instrumented`.
    fn make(&self, name: &str, instrumented: &TypeDescription) -> Result<DynamicType>;
}

dyn_eq_impls!(AuxiliaryType);

/// A synthesized type waiting to be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicType {
    description: TypeDescription,
    definition: InstrumentedType,
}

impl DynamicType {
    /// Describes `definition` in a layer over `pool`.
    pub fn new(definition: InstrumentedType, pool: &TypePool) -> Result<Self> {
        let description = definition.describe(pool)?;
        Ok(Self {
            description,
            definition,
        })
    }

    pub fn description(&self) -> &TypeDescription {
        &self.description
    }

    pub fn definition(&self) -> &InstrumentedType {
        &self.definition
    }
}

/// Auxiliary types registered during one build, in registration order.
///
/// A context belongs to a single build and is handed to emission code as `&mut Context`.
#[derive(Debug)]
pub struct Context {
    instrumented_type: TypeDescription,
    suffix: String,
    registered: IndexMap<Arc<dyn AuxiliaryType>, DynamicType>,
}

impl Context {
    pub fn new(instrumented_type: TypeDescription) -> Self {
        Self::with_suffix(instrumented_type, DEFAULT_AUXILIARY_SUFFIX)
    }

    pub fn with_suffix(instrumented_type: TypeDescription, suffix: impl Into<String>) -> Self {
        Self {
            instrumented_type,
            suffix: suffix.into(),
            registered: IndexMap::new(),
        }
    }

    pub fn instrumented_type(&self) -> &TypeDescription {
        &self.instrumented_type
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Registers `auxiliary` and returns the description of the type generated for it.
    ///
    /// The first registration synthesizes the type as `<instrumented>$<suffix>$<n>`; registering
    /// an equal auxiliary type again returns the recorded description. Every registered type is
    /// emitted, whether or not its description is used.
    pub fn register(&mut self, auxiliary: Arc<dyn AuxiliaryType>) -> Result<TypeDescription> {
        if let Some(existing) = self.registered.get(&auxiliary) {
            return Ok(existing.description.clone());
        }
        let name = format!(
            "{}${}${}",
            self.instrumented_type.internal_name(),
            self.suffix,
            self.registered.len() + 1
        );
        let dynamic_type = auxiliary.make(&name, &self.instrumented_type)?;
        let description = dynamic_type.description.clone();
        tracing::debug!(
            target: "loom.auxiliary",
            instrumented = %self.instrumented_type,
            auxiliary = %description,
            "registered auxiliary type"
        );
        self.registered.insert(auxiliary, dynamic_type);
        Ok(description)
    }

    pub fn registered_auxiliary_types(&self) -> Vec<DynamicType> {
        self.registered.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}
