//! The method and type model consumed by instrumentation planning.
//!
//! Types live in an immutable [`TypePool`] built through a [`TypeStore`]. A [`TypeDescription`]
//! answers the questions the planner asks of a type: which methods it declares, which methods
//! are reachable through inheritance, and which default methods its interfaces contribute.

#![forbid(unsafe_code)]

mod error;
mod instrumented;
mod lookup;
pub mod matcher;
mod method;
mod method_list;
mod store;
mod type_description;

pub use crate::error::{ModelError, Result};
pub use crate::instrumented::{FieldDescription, InstrumentedType};
pub use crate::lookup::{Finding, MethodLookupEngine, ReachableMethodLookup};
pub use crate::matcher::ElementMatcher;
pub use crate::method::{MethodDescription, MethodSignatureToken};
pub use crate::method_list::MethodList;
pub use crate::store::{
    ClassDef, MethodDef, TypePool, TypeStore, CHAR_SEQUENCE, CLONEABLE, COMPARABLE, INTEGER, LONG,
    NUMBER, OBJECT, SERIALIZABLE, STRING,
};
pub use crate::type_description::TypeDescription;
