use indexmap::{IndexMap, IndexSet};

use crate::method::MethodDescription;
use crate::method_list::MethodList;
use crate::type_description::TypeDescription;

/// The methods an instrumented type may invoke on itself or its super types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub type_description: TypeDescription,
    pub invokable_methods: MethodList,
    pub invokable_default_methods: IndexMap<TypeDescription, IndexSet<MethodDescription>>,
}

pub trait MethodLookupEngine {
    fn process(&self, type_description: &TypeDescription) -> Finding;
}

/// Derives a [`Finding`] from the type's reachable methods and directly implemented
/// interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReachableMethodLookup;

impl MethodLookupEngine for ReachableMethodLookup {
    fn process(&self, type_description: &TypeDescription) -> Finding {
        let invokable_default_methods = type_description
            .default_methods()
            .into_iter()
            .map(|(interface, methods)| (interface, methods.into_iter().collect()))
            .collect();
        Finding {
            type_description: type_description.clone(),
            invokable_methods: type_description.reachable_methods(),
            invokable_default_methods,
        }
    }
}
