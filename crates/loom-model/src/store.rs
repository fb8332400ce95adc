use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use loom_classfile::access::{check_internal_name, ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC};
use loom_classfile::{parse_method_descriptor, BaseType, FieldType, MethodDescriptor, ReturnType};

use crate::error::{ModelError, Result};
use crate::type_description::TypeDescription;

pub const OBJECT: &str = "java/lang/Object";
pub const STRING: &str = "java/lang/String";
pub const CHAR_SEQUENCE: &str = "java/lang/CharSequence";
pub const COMPARABLE: &str = "java/lang/Comparable";
pub const NUMBER: &str = "java/lang/Number";
pub const INTEGER: &str = "java/lang/Integer";
pub const LONG: &str = "java/lang/Long";
pub const CLONEABLE: &str = "java/lang/Cloneable";
pub const SERIALIZABLE: &str = "java/io/Serializable";

/// The definition of a class or interface, as read from a class file or synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn class(name: impl Into<String>, super_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags: ACC_PUBLIC,
            super_class: Some(super_class.into()),
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
            super_class: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub descriptor: MethodDescriptor,
    pub access_flags: u16,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, descriptor: &str, access_flags: u16) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            descriptor: parse_method_descriptor(descriptor)?,
            access_flags,
        })
    }
}

fn object_methods() -> Vec<MethodDef> {
    let object = FieldType::object(OBJECT);
    let method = |name: &str, params: Vec<FieldType>, return_type: ReturnType| MethodDef {
        name: name.to_string(),
        descriptor: MethodDescriptor::new(params, return_type),
        access_flags: ACC_PUBLIC,
    };
    vec![
        method("<init>", Vec::new(), ReturnType::Void),
        method("equals", vec![object], FieldType::Base(BaseType::Boolean).into()),
        method("hashCode", Vec::new(), FieldType::Base(BaseType::Int).into()),
        method("toString", Vec::new(), FieldType::object(STRING).into()),
    ]
}

/// A mutable collection of class definitions, frozen into a [`TypePool`] once complete.
#[derive(Debug, Default)]
pub struct TypeStore {
    parent: Option<TypePool>,
    classes: HashMap<String, Arc<ClassDef>>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the handful of JDK types most hierarchies bottom out in.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::default();
        let defs = [
            ClassDef {
                name: OBJECT.to_string(),
                access_flags: ACC_PUBLIC,
                super_class: None,
                interfaces: Vec::new(),
                methods: object_methods(),
            },
            ClassDef::interface(CHAR_SEQUENCE),
            ClassDef::interface(COMPARABLE),
            ClassDef::interface(CLONEABLE),
            ClassDef::interface(SERIALIZABLE),
            ClassDef::class(STRING, OBJECT)
                .implementing(CHAR_SEQUENCE)
                .implementing(COMPARABLE)
                .implementing(SERIALIZABLE),
            ClassDef::class(NUMBER, OBJECT).implementing(SERIALIZABLE),
            ClassDef::class(INTEGER, NUMBER).implementing(COMPARABLE),
            ClassDef::class(LONG, NUMBER).implementing(COMPARABLE),
        ];
        for def in defs {
            store.classes.insert(def.name.clone(), Arc::new(def));
        }
        store
    }

    /// A store whose lookups fall back to `parent` for names it does not define itself.
    pub fn layered(parent: &TypePool) -> Self {
        Self {
            parent: Some(parent.clone()),
            classes: HashMap::new(),
        }
    }

    pub fn define_class(&mut self, def: ClassDef) -> Result<()> {
        check_internal_name(&def.name)?;
        let shadows_parent = self
            .parent
            .as_ref()
            .is_some_and(|parent| parent.class_def(&def.name).is_some());
        if self.classes.contains_key(&def.name) || shadows_parent {
            return Err(ModelError::DuplicateType { name: def.name });
        }
        self.classes.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.class_def(name).is_some())
    }

    pub fn freeze(self) -> TypePool {
        TypePool(Arc::new(PoolData {
            parent: self.parent,
            classes: self.classes,
        }))
    }
}

/// An immutable, cheaply clonable universe of types.
#[derive(Clone)]
pub struct TypePool(Arc<PoolData>);

struct PoolData {
    parent: Option<TypePool>,
    classes: HashMap<String, Arc<ClassDef>>,
}

impl TypePool {
    pub(crate) fn class_def(&self, name: &str) -> Option<&Arc<ClassDef>> {
        let mut pool = self;
        loop {
            if let Some(def) = pool.0.classes.get(name) {
                return Some(def);
            }
            pool = pool.0.parent.as_ref()?;
        }
    }

    pub fn describe(&self, name: &str) -> Option<TypeDescription> {
        let def = self.class_def(name)?.clone();
        Some(TypeDescription::new(self.clone(), def))
    }

    pub fn require(&self, name: &str) -> Result<TypeDescription> {
        self.describe(name).ok_or_else(|| ModelError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.class_def(name).is_some()
    }

    /// Whether a value of type `sub` may be stored in a location of type `sup`.
    ///
    /// Types missing from the pool are only assignable to themselves and `java/lang/Object`.
    pub fn is_assignable(&self, sub: &FieldType, sup: &FieldType) -> bool {
        match (sub, sup) {
            (FieldType::Base(a), FieldType::Base(b)) => a == b,
            (FieldType::Array(_), FieldType::Object(name)) => {
                name == OBJECT || name == CLONEABLE || name == SERIALIZABLE
            }
            (FieldType::Array(a), FieldType::Array(b)) => match (a.as_ref(), b.as_ref()) {
                (FieldType::Base(a), FieldType::Base(b)) => a == b,
                (FieldType::Base(_), _) | (_, FieldType::Base(_)) => false,
                (a, b) => self.is_assignable(a, b),
            },
            (FieldType::Object(a), FieldType::Object(b)) => self.is_subtype(a, b),
            _ => false,
        }
    }

    /// Walks super class and interface edges from `sub` looking for `sup`.
    pub(crate) fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == OBJECT {
            return true;
        }
        let mut pending = vec![sub];
        let mut seen: HashSet<&str> = pending.iter().copied().collect();
        while let Some(next) = pending.pop() {
            if next == sup {
                return true;
            }
            let Some(def) = self.class_def(next) else {
                continue;
            };
            for parent in def.super_class.iter().chain(def.interfaces.iter()) {
                let parent = parent.as_str();
                if seen.insert(parent) {
                    pending.push(parent);
                }
            }
        }
        false
    }
}

impl fmt::Debug for TypePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.0.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypePool")
            .field("classes", &names)
            .field("layered", &self.0.parent.is_some())
            .finish()
    }
}
