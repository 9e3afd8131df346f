//! Client error types

use thiserror::Error;

/// Failures talking to the fleet-management service.
///
/// Every variant is reported the same way upstream; there is no
/// transient/permanent split and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
