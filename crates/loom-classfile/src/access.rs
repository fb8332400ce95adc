//! Class and member access flags (JVMS 4.1, 4.6).
//!
//! `ACC_BRIDGE` shares its bit with `ACC_VOLATILE`; the meaning depends on whether the flags
//! belong to a method or a field.

use crate::error::{Error, Result};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const TYPE_INITIALIZER_NAME: &str = "<clinit>";

/// Validates a binary class name in internal form (`java/lang/Object`).
pub fn check_internal_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('/')
        && !name.ends_with('/')
        && !name.contains("//")
        && !name.contains(['.', ';', '[']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInternalName(name.to_string()))
    }
}
