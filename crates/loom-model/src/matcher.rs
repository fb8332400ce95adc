//! Composable predicates over model elements.

use loom_classfile::ReturnType;

use crate::method::MethodDescription;
use crate::store::TypePool;

pub trait ElementMatcher<T: ?Sized> {
    fn matches(&self, target: &T) -> bool;
}

impl<T: ?Sized, F> ElementMatcher<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, target: &T) -> bool {
        self(target)
    }
}

/// Combinators available on every sized matcher.
pub trait ElementMatcherExt<T: ?Sized>: ElementMatcher<T> + Sized {
    fn and<M: ElementMatcher<T>>(self, other: M) -> And<Self, M> {
        And(self, other)
    }

    fn or<M: ElementMatcher<T>>(self, other: M) -> Or<Self, M> {
        Or(self, other)
    }
}

impl<T: ?Sized, M: ElementMatcher<T>> ElementMatcherExt<T> for M {}

#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<T: ?Sized, A: ElementMatcher<T>, B: ElementMatcher<T>> ElementMatcher<T> for And<A, B> {
    fn matches(&self, target: &T) -> bool {
        self.0.matches(target) && self.1.matches(target)
    }
}

#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

impl<T: ?Sized, A: ElementMatcher<T>, B: ElementMatcher<T>> ElementMatcher<T> for Or<A, B> {
    fn matches(&self, target: &T) -> bool {
        self.0.matches(target) || self.1.matches(target)
    }
}

#[derive(Debug, Clone)]
pub struct Not<M>(M);

impl<T: ?Sized, M: ElementMatcher<T>> ElementMatcher<T> for Not<M> {
    fn matches(&self, target: &T) -> bool {
        !self.0.matches(target)
    }
}

pub fn not<M>(matcher: M) -> Not<M> {
    Not(matcher)
}

#[derive(Debug, Clone, Copy)]
pub struct IsBridge;

impl ElementMatcher<MethodDescription> for IsBridge {
    fn matches(&self, target: &MethodDescription) -> bool {
        target.is_bridge()
    }
}

pub fn is_bridge() -> IsBridge {
    IsBridge
}

#[derive(Debug, Clone)]
pub struct Named(String);

impl ElementMatcher<MethodDescription> for Named {
    fn matches(&self, target: &MethodDescription) -> bool {
        target.internal_name() == self.0
    }
}

pub fn named(name: impl Into<String>) -> Named {
    Named(name.into())
}

/// Matches methods that a bridge method could be forwarding to.
///
/// A candidate must share the bridge's name and arity, accept arguments at least as specific as
/// the bridge's parameters, and return a type assignable to the bridge's return type.
#[derive(Debug, Clone)]
pub struct BridgeCompatible<'a> {
    bridge: &'a MethodDescription,
    pool: &'a TypePool,
}

impl ElementMatcher<MethodDescription> for BridgeCompatible<'_> {
    fn matches(&self, candidate: &MethodDescription) -> bool {
        if candidate.internal_name() != self.bridge.internal_name() {
            return false;
        }
        let bridge_params = self.bridge.parameter_types();
        let candidate_params = candidate.parameter_types();
        if bridge_params.len() != candidate_params.len() {
            return false;
        }
        let params_compatible = bridge_params
            .iter()
            .zip(candidate_params)
            .all(|(bridge_param, param)| self.pool.is_assignable(param, bridge_param));
        if !params_compatible {
            return false;
        }
        match (self.bridge.return_type(), candidate.return_type()) {
            (ReturnType::Void, ReturnType::Void) => true,
            (ReturnType::Type(bridge_ret), ReturnType::Type(ret)) => {
                self.pool.is_assignable(ret, bridge_ret)
            }
            _ => false,
        }
    }
}

pub fn is_bridge_method_compatible_to<'a>(
    bridge: &'a MethodDescription,
    pool: &'a TypePool,
) -> BridgeCompatible<'a> {
    BridgeCompatible { bridge, pool }
}
