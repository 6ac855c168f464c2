use std::fmt::{self, Display};

/// Errors produced by model constructors and token parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownRegion(String),
    UnknownResolution(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownRegion(code) => {
                write!(f, "unknown region code: {code}")
            }
            ModelError::UnknownResolution(token) => {
                write!(f, "unknown resolution token: {token}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
