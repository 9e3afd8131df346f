//! Command dispatch errors

use fleet_client::ClientError;
use fleet_core::CommandKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Form input rejected before anything was sent
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Reset requires explicit operator confirmation")]
    ConfirmationRequired,

    #[error("{command} failed: {source}")]
    Api {
        command: CommandKind,
        #[source]
        source: ClientError,
    },
}

impl CommandError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
