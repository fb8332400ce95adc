use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    fn descriptor_char(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub const OBJECT_NAME: &'static str = "java/lang/Object";

    pub fn object(internal_name: impl Into<String>) -> Self {
        FieldType::Object(internal_name.into())
    }

    pub fn array(component: FieldType) -> Self {
        FieldType::Array(Box::new(component))
    }

    /// Number of operand stack slots a value of this type occupies.
    pub fn stack_size(&self) -> u16 {
        match self {
            FieldType::Base(BaseType::Long) | FieldType::Base(BaseType::Double) => 2,
            _ => 1,
        }
    }

    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldType::Base(_))
    }

    /// Internal name of an object type, `None` for primitives and arrays.
    pub fn internal_name(&self) -> Option<&str> {
        match self {
            FieldType::Object(name) => Some(name),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.descriptor_char()),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

impl ReturnType {
    pub fn stack_size(&self) -> u16 {
        match self {
            ReturnType::Void => 0,
            ReturnType::Type(ty) => ty.stack_size(),
        }
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

impl From<FieldType> for ReturnType {
    fn from(ty: FieldType) -> Self {
        ReturnType::Type(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    pub fn new(params: Vec<FieldType>, return_type: impl Into<ReturnType>) -> Self {
        Self {
            params,
            return_type: return_type.into(),
        }
    }

    /// The parameter part of the descriptor, e.g. `(ILjava/lang/String;)`.
    pub fn parameter_descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            out.push_str(&param.descriptor());
        }
        out.push(')');
        out
    }

    /// Stack slots consumed by the arguments, not counting a receiver.
    pub fn parameter_stack_size(&self) -> u16 {
        self.params.iter().map(FieldType::stack_size).sum()
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.parameter_descriptor(), self.return_type)
    }
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let (ty, rest) = parse_field_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let Some(mut rest) = desc.strip_prefix('(') else {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    };

    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        let (param, after) = parse_field_type(rest)?;
        params.push(param);
        rest = after;
    }

    if rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    let (return_type, rest) = if let Some(rest) = rest.strip_prefix('V') {
        (ReturnType::Void, rest)
    } else {
        let (ty, rest) = parse_field_type(rest)?;
        (ReturnType::Type(ty), rest)
    };

    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }

    Ok(MethodDescriptor { params, return_type })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(Error::InvalidDescriptor(input.to_string()));
    }
    match bytes[0] as char {
        'B' => Ok((FieldType::Base(BaseType::Byte), &input[1..])),
        'C' => Ok((FieldType::Base(BaseType::Char), &input[1..])),
        'D' => Ok((FieldType::Base(BaseType::Double), &input[1..])),
        'F' => Ok((FieldType::Base(BaseType::Float), &input[1..])),
        'I' => Ok((FieldType::Base(BaseType::Int), &input[1..])),
        'J' => Ok((FieldType::Base(BaseType::Long), &input[1..])),
        'S' => Ok((FieldType::Base(BaseType::Short), &input[1..])),
        'Z' => Ok((FieldType::Base(BaseType::Boolean), &input[1..])),
        'L' => match input.find(';') {
            Some(end) if end > 1 => {
                let name = &input[1..end];
                Ok((FieldType::Object(name.to_string()), &input[end + 1..]))
            }
            _ => Err(Error::InvalidDescriptor(input.to_string())),
        },
        '[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(Error::InvalidDescriptor(input.to_string())),
    }
}
