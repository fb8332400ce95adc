//! Planning of super and default method calls on behalf of an instrumented type.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use loom_model::{Finding, MethodDescription, TypeDescription};

use crate::bridge::{BridgeMethodResolver, BridgeResolverStrategy};
use crate::error::Result;
use crate::invocation::SpecialMethodInvocation;

/// How a requested method is mapped to the method that is actually invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MethodLookup {
    /// Invoke the requested method as given.
    Exact,
    /// Invoke the most specific reachable method with the requested name and parameter types,
    /// looking through bridges.
    #[default]
    ForSuperType,
}

impl MethodLookup {
    /// The method to invoke for `method`, or `None` if no invokable method matches.
    pub fn resolve(
        &self,
        method: &MethodDescription,
        invokable_methods: &HashMap<String, MethodDescription>,
        bridge_resolver: &BridgeMethodResolver,
    ) -> Result<Option<MethodDescription>> {
        match self {
            MethodLookup::Exact => Ok(Some(method.clone())),
            MethodLookup::ForSuperType => {
                match invokable_methods.get(&method.unique_signature()) {
                    Some(invokable) => bridge_resolver.resolve(invokable).map(Some),
                    None => Ok(None),
                }
            }
        }
    }
}

/// The view of an instrumented type that instrumentations plan their calls against.
pub trait Target: fmt::Debug {
    fn type_description(&self) -> &TypeDescription;

    /// Plans a non-virtual call of `method` on the super type of the instrumented type.
    fn invoke_super(
        &self,
        method: &MethodDescription,
        lookup: MethodLookup,
    ) -> Result<SpecialMethodInvocation>;

    /// Plans a call of the default method with `unique_signature` declared by `interface`.
    /// Bridges are not resolved for default methods.
    fn invoke_default(
        &self,
        interface: &TypeDescription,
        unique_signature: &str,
    ) -> SpecialMethodInvocation;
}

/// Decides whether a resolved method can be called as a super method of the instrumented type,
/// and on which type.
pub trait SuperCallPolicy: fmt::Debug {
    fn invoke_super(
        &self,
        instrumented_type: &TypeDescription,
        method: &MethodDescription,
    ) -> SpecialMethodInvocation;
}

/// Super calls of a subclass: methods are invoked on the direct super class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SubclassSuperCall;

impl SuperCallPolicy for SubclassSuperCall {
    fn invoke_super(
        &self,
        instrumented_type: &TypeDescription,
        method: &MethodDescription,
    ) -> SpecialMethodInvocation {
        let Some(super_class) = instrumented_type.super_class() else {
            return SpecialMethodInvocation::Illegal;
        };
        if method.is_abstract()
            || method.is_static()
            || method.is_private()
            || method.is_type_initializer()
        {
            return SpecialMethodInvocation::Illegal;
        }
        if method.is_constructor() && method.declaring_type() != super_class.internal_name() {
            return SpecialMethodInvocation::Illegal;
        }
        let Some(declaring_type) = instrumented_type.pool().describe(method.declaring_type())
        else {
            return SpecialMethodInvocation::Illegal;
        };
        if declaring_type.is_interface() || !super_class.is_assignable_to(&declaring_type) {
            return SpecialMethodInvocation::Illegal;
        }
        SpecialMethodInvocation::legal(method.clone(), super_class)
    }
}

/// A [`Target`] backed by the lookup result of an instrumented type.
pub struct InstrumentationTarget<P = SubclassSuperCall> {
    type_description: TypeDescription,
    invokable_methods: HashMap<String, MethodDescription>,
    default_methods: HashMap<TypeDescription, HashMap<String, MethodDescription>>,
    bridge_resolver: BridgeMethodResolver,
    strategy: BridgeResolverStrategy,
    super_call: P,
}

impl<P: SuperCallPolicy> InstrumentationTarget<P> {
    pub fn new(
        finding: &Finding,
        strategy: &BridgeResolverStrategy,
        super_call: P,
    ) -> Result<Self> {
        let type_description = finding.type_description.clone();
        let bridge_resolver = strategy.make(&type_description)?;

        let mut invokable_methods = HashMap::with_capacity(finding.invokable_methods.len());
        for method in &finding.invokable_methods {
            match invokable_methods.entry(method.unique_signature()) {
                Entry::Vacant(entry) => {
                    entry.insert(method.clone());
                }
                // A covariant override and its bridge share a unique signature; the override is
                // the method that super calls should end up in.
                Entry::Occupied(mut entry) => {
                    if entry.get().is_bridge() && !method.is_bridge() {
                        entry.insert(method.clone());
                    }
                }
            }
        }

        let default_methods = finding
            .invokable_default_methods
            .iter()
            .map(|(interface, methods)| {
                let by_signature = methods
                    .iter()
                    .map(|method| (method.unique_signature(), method.clone()))
                    .collect();
                (interface.clone(), by_signature)
            })
            .collect();

        tracing::trace!(
            target: "loom.target",
            r#type = %type_description,
            invokable = invokable_methods.len(),
            bridges = bridge_resolver.bridge_count(),
            "created instrumentation target"
        );

        Ok(Self {
            type_description,
            invokable_methods,
            default_methods,
            bridge_resolver,
            strategy: *strategy,
            super_call,
        })
    }

    pub fn bridge_resolver(&self) -> &BridgeMethodResolver {
        &self.bridge_resolver
    }

    /// The strategy the bridge resolver was built with.
    pub fn strategy(&self) -> BridgeResolverStrategy {
        self.strategy
    }
}

impl<P: SuperCallPolicy> Target for InstrumentationTarget<P> {
    fn type_description(&self) -> &TypeDescription {
        &self.type_description
    }

    fn invoke_super(
        &self,
        method: &MethodDescription,
        lookup: MethodLookup,
    ) -> Result<SpecialMethodInvocation> {
        let Some(resolved) = lookup.resolve(method, &self.invokable_methods, &self.bridge_resolver)?
        else {
            tracing::trace!(
                target: "loom.target",
                method = %method,
                "no invokable method for super call"
            );
            return Ok(SpecialMethodInvocation::Illegal);
        };
        Ok(self
            .super_call
            .invoke_super(&self.type_description, &resolved))
    }

    fn invoke_default(
        &self,
        interface: &TypeDescription,
        unique_signature: &str,
    ) -> SpecialMethodInvocation {
        self.default_methods
            .get(interface)
            .and_then(|methods| methods.get(unique_signature))
            .map_or(SpecialMethodInvocation::Illegal, |method| {
                SpecialMethodInvocation::legal(method.clone(), interface.clone())
            })
    }
}

impl<P> fmt::Debug for InstrumentationTarget<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentationTarget")
            .field("type_description", &self.type_description)
            .field("invokable_methods", &self.invokable_methods.len())
            .field("default_methods", &self.default_methods.len())
            .field("bridge_resolver", &self.bridge_resolver)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl<P> PartialEq for InstrumentationTarget<P> {
    fn eq(&self, other: &Self) -> bool {
        self.type_description == other.type_description
            && self.default_methods == other.default_methods
            && self.strategy == other.strategy
            && self.bridge_resolver == other.bridge_resolver
    }
}

impl<P> Eq for InstrumentationTarget<P> {}

impl<P> Hash for InstrumentationTarget<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_description.hash(state);
        self.default_methods.len().hash(state);
        self.strategy.hash(state);
        self.bridge_resolver.bridge_count().hash(state);
    }
}

/// Creates the [`Target`] for an instrumented type.
pub trait TargetFactory {
    type Target: Target;

    fn make(&self, finding: &Finding) -> Result<Self::Target>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SubclassTargetFactory {
    pub bridge_resolver: BridgeResolverStrategy,
}

impl SubclassTargetFactory {
    pub fn new(bridge_resolver: BridgeResolverStrategy) -> Self {
        Self { bridge_resolver }
    }
}

impl TargetFactory for SubclassTargetFactory {
    type Target = InstrumentationTarget<SubclassSuperCall>;

    fn make(&self, finding: &Finding) -> Result<Self::Target> {
        InstrumentationTarget::new(finding, &self.bridge_resolver, SubclassSuperCall)
    }
}
