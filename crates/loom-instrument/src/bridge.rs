//! Resolution of compiler-generated bridge methods.
//!
//! A method signature at the bytecode level includes the return type, so `javac` inserts a
//! bridge whenever an override narrows the return type: `Object get()` forwards to
//! `String get()`. A super-call accessor that is compiled against the wider signature would hit
//! the bridge, and the bridge dispatches virtually to the (possibly instrumented) override. If
//! that override is implemented by calling the accessor again, the call never terminates.
//! Resolving bridges to their non-bridge target before planning the super-call avoids this.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use loom_model::matcher::{is_bridge, is_bridge_method_compatible_to, not, ElementMatcherExt};
use loom_model::{MethodDescription, MethodList, MethodSignatureToken, TypeDescription};

use crate::error::{InstrumentError, Result};

/// The resolution state recorded for one bridge method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeTarget {
    /// A final target. This is the bridge itself when no narrower override exists.
    Resolved(MethodDescription),
    /// A target that might itself be bridged by a more specific type.
    Candidate(MethodDescription),
    /// Left unresolved by the conflict policy; fails when queried.
    Unknown,
}

/// Decides the target of a bridge method with more than one candidate.
pub trait ConflictHandler {
    fn choose(&self, bridge: &MethodDescription, candidates: &MethodList) -> Result<BridgeTarget>;
}

impl<F> ConflictHandler for F
where
    F: Fn(&MethodDescription, &MethodList) -> Result<BridgeTarget>,
{
    fn choose(&self, bridge: &MethodDescription, candidates: &MethodList) -> Result<BridgeTarget> {
        self(bridge, candidates)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Abort the build as soon as an ambiguous bridge is indexed.
    #[default]
    FailFast,
    /// Record the bridge as unknown and fail only if it is resolved later.
    FailOnRequest,
    /// Call the bridge itself, accepting virtual dispatch through it.
    CallBridge,
}

impl ConflictHandler for ConflictPolicy {
    fn choose(&self, bridge: &MethodDescription, candidates: &MethodList) -> Result<BridgeTarget> {
        match self {
            ConflictPolicy::FailFast => Err(InstrumentError::AmbiguousBridgeTarget {
                bridge: bridge.to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }),
            ConflictPolicy::FailOnRequest => {
                tracing::warn!(
                    target: "loom.bridge",
                    bridge = %bridge,
                    candidates = %candidates,
                    "ambiguous bridge target deferred"
                );
                Ok(BridgeTarget::Unknown)
            }
            ConflictPolicy::CallBridge => {
                tracing::warn!(
                    target: "loom.bridge",
                    bridge = %bridge,
                    candidates = %candidates,
                    "ambiguous bridge target, calling the bridge itself"
                );
                Ok(BridgeTarget::Resolved(bridge.clone()))
            }
        }
    }
}

/// Bridge index for a single type, built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleBridgeResolver {
    owner: TypeDescription,
    bridges: HashMap<MethodSignatureToken, BridgeTarget>,
}

impl SimpleBridgeResolver {
    pub fn new(owner: &TypeDescription, conflict_handler: &dyn ConflictHandler) -> Result<Self> {
        let bridge_methods = owner.reachable_methods().filter(&is_bridge());
        let mut bridges = HashMap::with_capacity(bridge_methods.len());
        for bridge in &bridge_methods {
            let target = find_bridge_target(owner, bridge, conflict_handler)?;
            bridges.insert(bridge.signature_token(), target);
        }
        tracing::debug!(
            target: "loom.bridge",
            owner = %owner,
            bridges = bridges.len(),
            "built bridge index"
        );
        Ok(Self {
            owner: owner.clone(),
            bridges,
        })
    }

    pub fn owner(&self) -> &TypeDescription {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// The recorded state for `method`, `None` if it is not a bridge of the owner.
    pub fn target(&self, method: &MethodDescription) -> Option<&BridgeTarget> {
        self.bridges.get(&method.signature_token())
    }

    pub fn resolve(&self, method: &MethodDescription) -> Result<MethodDescription> {
        let mut path = self.resolution_path(method)?;
        Ok(path.pop().unwrap_or_else(|| method.clone()))
    }

    /// Every method visited while resolving `method`, ending with the resolved method. The
    /// path is empty when `method` is not a bridge.
    ///
    /// Each step follows one `Candidate` edge. A well-formed hierarchy narrows the return type
    /// on every edge, so a path can never be longer than the index; longer paths are reported
    /// as [`InstrumentError::BridgeChainTooDeep`].
    pub fn resolution_path(&self, method: &MethodDescription) -> Result<Vec<MethodDescription>> {
        let mut path = Vec::new();
        let mut current = method;
        for _ in 0..=self.bridges.len() {
            match self.bridges.get(&current.signature_token()) {
                None => return Ok(path),
                Some(BridgeTarget::Resolved(target)) => {
                    path.push(target.clone());
                    return Ok(path);
                }
                Some(BridgeTarget::Candidate(candidate)) => {
                    tracing::trace!(
                        target: "loom.bridge",
                        from = %current,
                        to = %candidate,
                        "following bridge candidate"
                    );
                    path.push(candidate.clone());
                    current = candidate;
                }
                Some(BridgeTarget::Unknown) => {
                    return Err(InstrumentError::UnresolvedBridgeTarget {
                        bridge: current.to_string(),
                    })
                }
            }
        }
        Err(InstrumentError::BridgeChainTooDeep {
            method: method.to_string(),
            steps: path.len(),
        })
    }
}

fn find_bridge_target(
    owner: &TypeDescription,
    bridge: &MethodDescription,
    conflict_handler: &dyn ConflictHandler,
) -> Result<BridgeTarget> {
    let pool = owner.pool();
    let Some(declaring_type) = pool.describe(bridge.declaring_type()) else {
        return Ok(BridgeTarget::Resolved(bridge.clone()));
    };
    let candidates = declaring_type
        .declared_methods()
        .filter(&not(is_bridge()).and(is_bridge_method_compatible_to(bridge, pool)));
    match candidates.len() {
        0 => Ok(BridgeTarget::Resolved(bridge.clone())),
        1 => Ok(BridgeTarget::Candidate(candidates.only()?.clone())),
        _ => conflict_handler.choose(bridge, &candidates),
    }
}

/// A bridge resolver as held by an instrumentation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMethodResolver {
    /// Treats every method as final.
    NoOp,
    Simple(SimpleBridgeResolver),
}

impl BridgeMethodResolver {
    pub fn resolve(&self, method: &MethodDescription) -> Result<MethodDescription> {
        match self {
            BridgeMethodResolver::NoOp => Ok(method.clone()),
            BridgeMethodResolver::Simple(resolver) => resolver.resolve(method),
        }
    }

    pub(crate) fn bridge_count(&self) -> usize {
        match self {
            BridgeMethodResolver::NoOp => 0,
            BridgeMethodResolver::Simple(resolver) => resolver.len(),
        }
    }
}

/// Builds the bridge resolver for each instrumented type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeResolverStrategy {
    NoOp,
    Simple(ConflictPolicy),
}

impl Default for BridgeResolverStrategy {
    fn default() -> Self {
        BridgeResolverStrategy::Simple(ConflictPolicy::default())
    }
}

impl BridgeResolverStrategy {
    pub fn make(&self, type_description: &TypeDescription) -> Result<BridgeMethodResolver> {
        match self {
            BridgeResolverStrategy::NoOp => Ok(BridgeMethodResolver::NoOp),
            BridgeResolverStrategy::Simple(policy) => Ok(BridgeMethodResolver::Simple(
                SimpleBridgeResolver::new(type_description, policy)?,
            )),
        }
    }
}
