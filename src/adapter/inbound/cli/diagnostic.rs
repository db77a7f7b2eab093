//! Miette diagnostics for errors that end a command.

use miette::Diagnostic;
use thiserror::Error;

use crate::adapter::outbound::session::{TOKEN_VAR, USER_ID_VAR};
use crate::error::{ApiError, ConfigError, Error};

/// Top-level failure rendered by miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(bikeyard::command))]
pub struct CommandFailed {
    pub message: String,

    #[help]
    pub help: Option<String>,
}

impl CommandFailed {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl From<Error> for CommandFailed {
    fn from(err: Error) -> Self {
        let failed = Self::new(err.to_string());
        match &err {
            Error::Api(ApiError::Unauthenticated) => {
                failed.with_help(format!("set {TOKEN_VAR} to your session token"))
            }
            Error::Api(ApiError::Status { status: 401, .. }) => {
                failed.with_help(format!("the token in {TOKEN_VAR} was rejected"))
            }
            Error::Api(ApiError::Transport(_)) => {
                failed.with_help("check that the API in [api].base_url is reachable")
            }
            Error::Config(ConfigError::ReadFile(_) | ConfigError::Parse(_)) => {
                failed.with_help("pass --config with the path to a valid bikeyard.toml")
            }
            Error::ListingNotFound(_) => {
                failed.with_help("run `bikeyard listings` to see your listing ids")
            }
            Error::InvalidInput(message) if message.contains(USER_ID_VAR) => {
                failed.with_help(format!("set {USER_ID_VAR} to your user id"))
            }
            _ => failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_suggests_token() {
        let failed = CommandFailed::from(Error::Api(ApiError::Unauthenticated));
        assert!(failed.help.unwrap().contains(TOKEN_VAR));
    }

    #[test]
    fn other_errors_have_no_help() {
        let failed = CommandFailed::from(Error::InvalidInput("username is required".into()));
        assert_eq!(failed.message, "invalid input: username is required");
        assert!(failed.help.is_none());
    }
}
