use std::fmt;
use std::sync::Arc;

use loom_classfile::access::{
    ACC_ABSTRACT, ACC_BRIDGE, ACC_PRIVATE, ACC_STATIC, ACC_SYNTHETIC, CONSTRUCTOR_NAME,
    TYPE_INITIALIZER_NAME,
};
use loom_classfile::{parse_method_descriptor, FieldType, MethodDescriptor, ReturnType};

use crate::error::Result;

/// An immutable description of a method declared by some type.
///
/// Cloning is cheap; all clones share the same data.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodDescription(Arc<MethodData>);

#[derive(PartialEq, Eq, Hash)]
struct MethodData {
    declaring_type: String,
    declared_by_interface: bool,
    name: String,
    descriptor: MethodDescriptor,
    access_flags: u16,
}

impl MethodDescription {
    /// A method declared by a class.
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        descriptor: MethodDescriptor,
        access_flags: u16,
    ) -> Self {
        Self::with_owner_kind(declaring_type.into(), false, name.into(), descriptor, access_flags)
    }

    /// A method declared by an interface.
    pub fn new_interface_member(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        descriptor: MethodDescriptor,
        access_flags: u16,
    ) -> Self {
        Self::with_owner_kind(declaring_type.into(), true, name.into(), descriptor, access_flags)
    }

    /// Like [`MethodDescription::new`] but takes the descriptor in its textual form.
    pub fn parse(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        descriptor: &str,
        access_flags: u16,
    ) -> Result<Self> {
        let descriptor = parse_method_descriptor(descriptor)?;
        Ok(Self::new(declaring_type, name, descriptor, access_flags))
    }

    pub(crate) fn with_owner_kind(
        declaring_type: String,
        declared_by_interface: bool,
        name: String,
        descriptor: MethodDescriptor,
        access_flags: u16,
    ) -> Self {
        Self(Arc::new(MethodData {
            declaring_type,
            declared_by_interface,
            name,
            descriptor,
            access_flags,
        }))
    }

    pub fn internal_name(&self) -> &str {
        &self.0.name
    }

    /// Internal name of the type declaring this method.
    pub fn declaring_type(&self) -> &str {
        &self.0.declaring_type
    }

    pub fn is_declared_by_interface(&self) -> bool {
        self.0.declared_by_interface
    }

    pub fn method_descriptor(&self) -> &MethodDescriptor {
        &self.0.descriptor
    }

    pub fn descriptor(&self) -> String {
        self.0.descriptor.descriptor()
    }

    pub fn parameter_types(&self) -> &[FieldType] {
        &self.0.descriptor.params
    }

    pub fn return_type(&self) -> &ReturnType {
        &self.0.descriptor.return_type
    }

    pub fn access_flags(&self) -> u16 {
        self.0.access_flags
    }

    /// Name plus parameter descriptor; deliberately ignores the return type so that a
    /// covariant override and its bridge share one signature.
    pub fn unique_signature(&self) -> String {
        format!("{}{}", self.0.name, self.0.descriptor.parameter_descriptor())
    }

    pub fn signature_token(&self) -> MethodSignatureToken {
        MethodSignatureToken {
            name: self.0.name.clone(),
            return_type: self.0.descriptor.return_type.clone(),
            parameter_types: self.0.descriptor.params.clone(),
        }
    }

    pub fn is_bridge(&self) -> bool {
        self.0.access_flags & ACC_BRIDGE != 0
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.access_flags & ACC_SYNTHETIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.0.access_flags & ACC_STATIC != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.0.access_flags & ACC_ABSTRACT != 0
    }

    pub fn is_private(&self) -> bool {
        self.0.access_flags & ACC_PRIVATE != 0
    }

    pub fn is_constructor(&self) -> bool {
        self.0.name == CONSTRUCTOR_NAME
    }

    pub fn is_type_initializer(&self) -> bool {
        self.0.name == TYPE_INITIALIZER_NAME
    }

    /// A non-abstract instance method with a body, declared by an interface.
    pub fn is_default_method(&self) -> bool {
        self.0.declared_by_interface && !self.is_abstract() && !self.is_static() && !self.is_private()
    }

    /// Operand stack slots consumed by the arguments, not counting a receiver.
    pub fn parameter_stack_size(&self) -> u16 {
        self.0.descriptor.parameter_stack_size()
    }
}

impl fmt::Display for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.0.declaring_type, self.0.name, self.0.descriptor)
    }
}

impl fmt::Debug for MethodDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodDescription({self}, flags=0x{:04x})", self.0.access_flags)
    }
}

/// The erased signature of a method including its return type.
///
/// Two methods share a token iff a bridge for one is interchangeable with the other at the
/// call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignatureToken {
    pub name: String,
    pub return_type: ReturnType,
    pub parameter_types: Vec<FieldType>,
}
