//! Unified error handling for the mailer

use crate::email::TransportError;
use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, MailError>;

/// Errors raised by connector construction and dispatch.
///
/// Delivery failures during `dispatch` never surface here; handlers fold them
/// into a failed result message instead.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid custom templates: {0}")]
    InvalidTemplates(String),

    #[error("Malformed message: {0}")]
    MalformedInput(String),

    #[error("No handler registered for message type '{0}'")]
    HandlerNotRegistered(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl MailError {
    /// Whether the error points at caller or configuration mistakes
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, MailError::Transport(_))
    }
}

impl From<validator::ValidationErrors> for MailError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MailError::Configuration(errors.to_string())
    }
}
