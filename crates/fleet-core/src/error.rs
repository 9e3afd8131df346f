//! Error types for the fleet dashboard domain

use thiserror::Error;

/// Core error type for domain parsing and validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl CoreError {
    pub fn unknown_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownValue {
            kind,
            value: value.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
