//! Domain types for mail dispatch

pub mod email;
pub mod message;

pub use email::{EmailAddress, MailBackendConfig, OutgoingMail, SendReceipt, SesConfig, SmtpConfig};
pub use message::{
    ConnectorMessage, CustomMailData, MailAttachment, MessageData, RegLogMailData, CUSTOM_MAIL,
    REGLOG_MAIL,
};
