pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors produced while building or querying the type model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Classfile(#[from] loom_classfile::Error),

    #[error("type {name} is already defined")]
    DuplicateType { name: String },

    #[error("type {name} is not known to the type pool")]
    UnknownType { name: String },

    #[error("{owner} already declares a field named {name}")]
    DuplicateField { owner: String, name: String },

    #[error("{owner} already declares method {method}")]
    DuplicateMethod { owner: String, method: String },

    #[error("expected exactly one method, found {found}")]
    NotExactlyOne { found: usize },
}
