//! Auth9 Mailer - transactional mail connector
//!
//! Turns registration, password-reset and credential-change events into
//! localized mails and delivers them over SMTP or AWS SES. Callers hand a
//! [`ConnectorMessage`] to a [`Connector`] and get a result message back.

pub mod config;
pub mod connector;
pub mod domain;
pub mod email;
pub mod error;
pub mod telemetry;

// Re-export commonly used types
pub use config::MailerConfig;
pub use connector::{Connector, ConnectorBuilder, ConnectorState, MailHandler};
pub use domain::{
    ConnectorMessage, CustomMailData, EmailAddress, MailAttachment, MessageData, RegLogMailData,
};
pub use error::{MailError, Result};
