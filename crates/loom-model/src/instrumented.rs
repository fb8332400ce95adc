use loom_classfile::access::{check_internal_name, ACC_PUBLIC, ACC_SYNTHETIC};
use loom_classfile::{FieldType, MethodDescriptor};

use crate::error::{ModelError, Result};
use crate::method::MethodDescription;
use crate::store::{ClassDef, MethodDef, TypePool, TypeStore};
use crate::type_description::TypeDescription;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescription {
    pub name: String,
    pub field_type: FieldType,
    pub access_flags: u16,
}

impl FieldDescription {
    pub fn new(name: impl Into<String>, field_type: FieldType, access_flags: u16) -> Self {
        Self {
            name: name.into(),
            field_type,
            access_flags,
        }
    }
}

/// The type under construction, as seen by instrumentations while they prepare it.
///
/// Values are immutable; every `with_*` method returns the extended type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentedType {
    name: String,
    access_flags: u16,
    super_class: String,
    interfaces: Vec<String>,
    fields: Vec<FieldDescription>,
    methods: Vec<MethodDescription>,
    initializers: Vec<String>,
}

impl InstrumentedType {
    /// A public class named `name` extending `super_class`.
    pub fn subclass(name: impl Into<String>, super_class: &TypeDescription) -> Result<Self> {
        let name = name.into();
        check_internal_name(&name)?;
        Ok(Self {
            name,
            access_flags: ACC_PUBLIC | ACC_SYNTHETIC,
            super_class: super_class.internal_name().to_string(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            initializers: Vec::new(),
        })
    }

    pub fn internal_name(&self) -> &str {
        &self.name
    }

    pub fn super_class(&self) -> &str {
        &self.super_class
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[FieldDescription] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDescription] {
        &self.methods
    }

    /// Labels of the type initializer fragments, in registration order.
    pub fn initializers(&self) -> &[String] {
        &self.initializers
    }

    pub fn implementing(mut self, interface: &TypeDescription) -> Self {
        let name = interface.internal_name();
        if !self.interfaces.iter().any(|existing| existing == name) {
            self.interfaces.push(name.to_string());
        }
        self
    }

    pub fn with_field(mut self, field: FieldDescription) -> Result<Self> {
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(ModelError::DuplicateField {
                owner: self.name,
                name: field.name,
            });
        }
        self.fields.push(field);
        Ok(self)
    }

    pub fn with_method(
        mut self,
        name: impl Into<String>,
        descriptor: MethodDescriptor,
        access_flags: u16,
    ) -> Result<Self> {
        let method = MethodDescription::new(self.name.clone(), name, descriptor, access_flags);
        let token = method.signature_token();
        if self.methods.iter().any(|m| m.signature_token() == token) {
            return Err(ModelError::DuplicateMethod {
                owner: self.name,
                method: method.to_string(),
            });
        }
        self.methods.push(method);
        Ok(self)
    }

    pub fn with_initializer(mut self, label: impl Into<String>) -> Self {
        self.initializers.push(label.into());
        self
    }

    /// Defines this type in a layer over `pool` and describes it.
    pub fn describe(&self, pool: &TypePool) -> Result<TypeDescription> {
        let mut store = TypeStore::layered(pool);
        store.define_class(ClassDef {
            name: self.name.clone(),
            access_flags: self.access_flags,
            super_class: Some(self.super_class.clone()),
            interfaces: self.interfaces.clone(),
            methods: self
                .methods
                .iter()
                .map(|m| MethodDef {
                    name: m.internal_name().to_string(),
                    descriptor: m.method_descriptor().clone(),
                    access_flags: m.access_flags(),
                })
                .collect(),
        })?;
        store.freeze().require(&self.name)
    }
}
