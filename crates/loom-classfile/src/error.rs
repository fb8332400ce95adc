use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidDescriptor(String),
    InvalidInternalName(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
            Error::InvalidInternalName(name) => write!(f, "invalid internal name: {name}"),
        }
    }
}

impl std::error::Error for Error {}
