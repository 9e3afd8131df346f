//! Console error types

use fleet_core::CoreError;
use thiserror::Error;

/// Operator input that could not be turned into a console command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Unknown command '{0}', type 'help' for the list")]
    UnknownCommand(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid {argument}: '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ConsoleError {
    pub fn missing(command: &'static str, argument: &'static str) -> Self {
        Self::MissingArgument { command, argument }
    }

    pub fn invalid(argument: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            value: value.into(),
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
