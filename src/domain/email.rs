//! Email backend configuration and envelope types

use super::message::MailAttachment;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Delivery backend configuration - one variant per supported transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MailBackendConfig {
    /// SMTP relay
    Smtp(SmtpConfig),

    /// AWS Simple Email Service
    Ses(SesConfig),
}

impl MailBackendConfig {
    /// Short backend name, as used in logs and metrics
    pub fn backend_type(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Ses(_) => "ses",
        }
    }
}

/// Settings for the SMTP relay backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SmtpConfig {
    /// Relay hostname
    #[validate(length(min = 1))]
    pub host: String,

    /// Relay port, 587 unless configured
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Login; no AUTH is attempted without it
    pub username: Option<String>,

    pub password: Option<String>,

    /// Upgrade the connection with STARTTLS
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// Timeout applied to each SMTP command
    pub timeout_secs: Option<u64>,
}

/// Settings for the AWS SES backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SesConfig {
    /// Region hosting the verified sender identity
    #[validate(length(min = 1))]
    pub region: String,

    /// Static credentials; the default AWS provider chain is used when absent
    pub access_key_id: Option<String>,

    pub secret_access_key: Option<String>,

    /// SES configuration set attached to every send
    pub configuration_set: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_smtp_port() -> u16 {
    587
}

/// Email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmailAddress {
    #[validate(email)]
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Rendered email handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub attachments: Vec<MailAttachment>,
}

impl OutgoingMail {
    pub fn new(
        from: EmailAddress,
        to: EmailAddress,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to: vec![to],
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_text_body(mut self, text_body: impl Into<String>) -> Self {
        self.text_body = Some(text_body.into());
        self
    }

    pub fn with_attachment(mut self, attachment: MailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Receipt returned by a transport after a successful send
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

impl SendReceipt {
    pub fn new(message_id: Option<String>) -> Self {
        Self { message_id }
    }
}
