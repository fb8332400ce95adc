use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Equality and hashing for trait objects.
///
/// Implemented for every `'static` type with `PartialEq + Hash`. Two trait objects compare
/// equal only if their concrete types match and the values are equal.
pub trait DynEq: Any {
    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: PartialEq + Hash + Any> DynEq for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Implements `PartialEq`, `Eq` and `Hash` for `dyn $trait` through [`DynEq`].
macro_rules! dyn_eq_impls {
    ($trait:path) => {
        impl PartialEq for dyn $trait {
            fn eq(&self, other: &Self) -> bool {
                self.dyn_eq(other.as_any())
            }
        }

        impl Eq for dyn $trait {}

        impl std::hash::Hash for dyn $trait {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.dyn_hash(state)
            }
        }
    };
}

pub(crate) use dyn_eq_impls;
