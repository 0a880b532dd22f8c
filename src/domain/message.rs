//! Connector message types
//!
//! A [`ConnectorMessage`] flows into a connector describing an event and comes
//! back out as a result carrying `success` and a single `logcontent` audit line.

use crate::error::{MailError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Message type handled by the templated registration mail handler
pub const REGLOG_MAIL: &str = "reglog_mail";

/// Message type handled by the literal subject/body handler
pub const CUSTOM_MAIL: &str = "custom_mail";

/// File attached to a custom mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAttachment {
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Content-ID; when set the file is attached inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
}

impl MailAttachment {
    pub fn new(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            filename: None,
            cid: None,
            filetype: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }

    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }

    /// Check the attachment is well formed
    pub fn validate(&self) -> Result<()> {
        if self.filepath.trim().is_empty() {
            return Err(MailError::MalformedInput(
                "mail_attachment.filepath must not be empty".to_string(),
            ));
        }

        if let Some(filetype) = &self.filetype {
            filetype.parse::<mime_guess::Mime>().map_err(|e| {
                MailError::MalformedInput(format!(
                    "mail_attachment.filetype '{}' is not a MIME type: {}",
                    filetype, e
                ))
            })?;
        }

        if matches!(&self.cid, Some(cid) if cid.trim().is_empty()) {
            return Err(MailError::MalformedInput(
                "mail_attachment.cid must not be empty".to_string(),
            ));
        }

        if matches!(&self.filename, Some(name) if name.trim().is_empty()) {
            return Err(MailError::MalformedInput(
                "mail_attachment.filename must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Name presented to the recipient; falls back to the last path component
    pub fn file_name(&self) -> String {
        self.filename
            .clone()
            .or_else(|| {
                Path::new(&self.filepath)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "attachment".to_string())
    }

    /// MIME type of the attachment, guessed from the path when not given
    pub fn content_type(&self) -> String {
        match &self.filetype {
            Some(filetype) => filetype.clone(),
            None => mime_guess::from_path(&self.filepath)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

/// Payload of a `reglog_mail` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegLogMailData {
    /// Template table key (`register`, `resetPass`, `credsEdit`, ...)
    pub process: String,
    pub username: String,
    pub email: String,
    pub app_name: String,
    pub app_address: String,
    #[serde(default)]
    pub reset_code: Option<String>,
    /// Only referenced by the `register` body
    #[serde(default)]
    pub password: Option<String>,
}

impl RegLogMailData {
    pub fn new(
        process: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        app_name: impl Into<String>,
        app_address: impl Into<String>,
    ) -> Self {
        Self {
            process: process.into(),
            username: username.into(),
            email: email.into(),
            app_name: app_name.into(),
            app_address: app_address.into(),
            reset_code: None,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_reset_code(mut self, reset_code: impl Into<String>) -> Self {
        self.reset_code = Some(reset_code.into());
        self
    }
}

/// Payload of a `custom_mail` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMailData {
    pub process: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub mail_subject: String,
    pub mail_body: String,
    #[serde(default)]
    pub mail_attachment: Option<MailAttachment>,
}

impl CustomMailData {
    pub fn new(
        process: impl Into<String>,
        email: impl Into<String>,
        mail_subject: impl Into<String>,
        mail_body: impl Into<String>,
    ) -> Self {
        Self {
            process: process.into(),
            username: None,
            email: email.into(),
            mail_subject: mail_subject.into(),
            mail_body: mail_body.into(),
            mail_attachment: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_attachment(mut self, attachment: MailAttachment) -> Self {
        self.mail_attachment = Some(attachment);
        self
    }
}

/// Data carried by a message, one variant per handler family
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum MessageData {
    RegLogMail(RegLogMailData),
    CustomMail(CustomMailData),
    /// Open payload for custom handlers
    Other(Map<String, Value>),
    #[default]
    Empty,
}

impl MessageData {
    /// Build typed data from an untyped JSON payload.
    ///
    /// The built-in mail types require `process` to be a single non-empty string.
    pub fn from_json(message_type: &str, value: Value) -> Result<Self> {
        match message_type {
            REGLOG_MAIL => {
                require_process(&value)?;
                serde_json::from_value(value)
                    .map(Self::RegLogMail)
                    .map_err(|e| {
                        MailError::MalformedInput(format!("invalid {} data: {}", REGLOG_MAIL, e))
                    })
            }
            CUSTOM_MAIL => {
                require_process(&value)?;
                serde_json::from_value(value)
                    .map(Self::CustomMail)
                    .map_err(|e| {
                        MailError::MalformedInput(format!("invalid {} data: {}", CUSTOM_MAIL, e))
                    })
            }
            _ => match value {
                Value::Object(map) => Ok(Self::Other(map)),
                Value::Null => Ok(Self::Empty),
                other => Err(MailError::MalformedInput(format!(
                    "message data must be an object, got {}",
                    other
                ))),
            },
        }
    }

    pub fn process(&self) -> Option<&str> {
        match self {
            Self::RegLogMail(data) => Some(&data.process),
            Self::CustomMail(data) => Some(&data.process),
            Self::Other(map) => map.get("process").and_then(Value::as_str),
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

fn require_process(value: &Value) -> Result<()> {
    match value.get("process") {
        Some(Value::String(process)) if !process.trim().is_empty() => Ok(()),
        Some(Value::String(_)) => Err(MailError::MalformedInput(
            "data.process must not be empty".to_string(),
        )),
        Some(other) => Err(MailError::MalformedInput(format!(
            "data.process must be a single string, got {}",
            other
        ))),
        None => Err(MailError::MalformedInput(
            "data.process is required".to_string(),
        )),
    }
}

/// Unit of communication in and out of a connector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorMessage {
    /// Selects the handler
    #[serde(rename = "type")]
    pub message_type: String,
    pub time: DateTime<Utc>,
    #[serde(skip_serializing_if = "MessageData::is_empty")]
    pub data: MessageData,
    /// Set on result messages only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Set on result messages only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logcontent: Option<String>,
}

impl ConnectorMessage {
    pub fn new(message_type: impl Into<String>, data: MessageData) -> Self {
        Self {
            message_type: message_type.into(),
            time: Utc::now(),
            data,
            success: None,
            logcontent: None,
        }
    }

    pub fn reglog_mail(data: RegLogMailData) -> Self {
        Self::new(REGLOG_MAIL, MessageData::RegLogMail(data))
    }

    pub fn custom_mail(data: CustomMailData) -> Self {
        Self::new(CUSTOM_MAIL, MessageData::CustomMail(data))
    }

    /// Parse a message from its type and an untyped JSON payload
    pub fn from_json(message_type: impl Into<String>, data: Value) -> Result<Self> {
        let message_type = message_type.into();
        let data = MessageData::from_json(&message_type, data)?;
        Ok(Self::new(message_type, data))
    }

    /// Build a result message
    pub fn outcome(message_type: impl Into<String>, success: bool, logcontent: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            time: Utc::now(),
            data: MessageData::Empty,
            success: Some(success),
            logcontent: Some(logcontent.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }

    pub fn is_outcome(&self) -> bool {
        self.success.is_some()
    }
}
