#![forbid(unsafe_code)]

pub mod access;
mod descriptor;
mod error;

pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
