use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use loom_classfile::FieldType;

use crate::method::MethodDescription;
use crate::method_list::MethodList;
use crate::store::{ClassDef, TypePool};

/// A read-only view of one type in a [`TypePool`].
///
/// Identity is the internal name: two descriptions of the same name are equal regardless of the
/// pool they were obtained from.
#[derive(Clone)]
pub struct TypeDescription {
    pool: TypePool,
    def: Arc<ClassDef>,
}

impl TypeDescription {
    pub(crate) fn new(pool: TypePool, def: Arc<ClassDef>) -> Self {
        Self { pool, def }
    }

    pub fn internal_name(&self) -> &str {
        &self.def.name
    }

    /// Binary name with `.` separators, e.g. `java.lang.Object`.
    pub fn name(&self) -> String {
        self.def.name.replace('/', ".")
    }

    pub fn access_flags(&self) -> u16 {
        self.def.access_flags
    }

    pub fn is_interface(&self) -> bool {
        self.def.is_interface()
    }

    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    pub fn as_field_type(&self) -> FieldType {
        FieldType::object(self.def.name.clone())
    }

    /// Internal name of the direct super class, even if the pool does not define it.
    pub fn super_class_name(&self) -> Option<&str> {
        self.def.super_class.as_deref()
    }

    pub fn super_class(&self) -> Option<TypeDescription> {
        self.def
            .super_class
            .as_deref()
            .and_then(|name| self.pool.describe(name))
    }

    /// Directly implemented interfaces that the pool knows about.
    pub fn interfaces(&self) -> Vec<TypeDescription> {
        self.def
            .interfaces
            .iter()
            .filter_map(|name| self.pool.describe(name))
            .collect()
    }

    pub fn is_assignable_to(&self, other: &TypeDescription) -> bool {
        self.pool.is_subtype(self.internal_name(), other.internal_name())
    }

    pub fn is_assignable_from(&self, other: &TypeDescription) -> bool {
        other.is_assignable_to(self)
    }

    pub fn declared_methods(&self) -> MethodList {
        self.def
            .methods
            .iter()
            .map(|m| {
                MethodDescription::with_owner_kind(
                    self.def.name.clone(),
                    self.def.is_interface(),
                    m.name.clone(),
                    m.descriptor.clone(),
                    m.access_flags,
                )
            })
            .collect()
    }

    /// Declared methods followed by every inherited method that is not overridden.
    ///
    /// A method is overridden when a more specific type declares a method with the same name and
    /// full descriptor. Constructors, type initializers and private methods of super types are
    /// not inherited; neither are static interface methods.
    pub fn reachable_methods(&self) -> MethodList {
        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        for method in self.declared_methods() {
            seen.insert(method.signature_token());
            methods.push(method);
        }

        let mut visited = HashSet::from([self.def.name.clone()]);
        let mut interfaces: VecDeque<TypeDescription> = self.interfaces().into();
        let mut current = self.super_class();
        while let Some(class) = current {
            if !visited.insert(class.def.name.clone()) {
                break;
            }
            for method in class.declared_methods() {
                if is_inheritable(&method) && seen.insert(method.signature_token()) {
                    methods.push(method);
                }
            }
            interfaces.extend(class.interfaces());
            current = class.super_class();
        }

        while let Some(interface) = interfaces.pop_front() {
            if !visited.insert(interface.def.name.clone()) {
                continue;
            }
            for method in interface.declared_methods() {
                if is_inheritable(&method)
                    && !method.is_static()
                    && seen.insert(method.signature_token())
                {
                    methods.push(method);
                }
            }
            interfaces.extend(interface.interfaces());
        }

        MethodList::new(methods)
    }

    /// The default methods each directly implemented interface contributes, keyed by interface.
    pub fn default_methods(&self) -> IndexMap<TypeDescription, MethodList> {
        self.interfaces()
            .into_iter()
            .map(|interface| {
                let defaults = interface
                    .reachable_methods()
                    .filter(&|m: &MethodDescription| m.is_default_method());
                (interface, defaults)
            })
            .collect()
    }
}

fn is_inheritable(method: &MethodDescription) -> bool {
    !method.is_constructor() && !method.is_type_initializer() && !method.is_private()
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.def.name == other.def.name
    }
}

impl Eq for TypeDescription {}

impl Hash for TypeDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.name.hash(state);
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.def.name)
    }
}

impl fmt::Debug for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescription({})", self.def.name)
    }
}
