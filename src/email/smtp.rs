//! SMTP mail transport using lettre

use super::mime::{build_message, load_attachments};
use super::transport::{MailTransport, TransportError};
use crate::domain::{OutgoingMail, SendReceipt, SmtpConfig};
use async_trait::async_trait;
use lettre::{
    transport::smtp::{self, authentication::Credentials},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use std::time::Duration;

/// Delivers through an SMTP relay
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpTransport {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let relay = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = relay.port(config.port);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Some(Duration::from_secs(secs)));
        }

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Map a reply code to an error kind. 530/534/535 are the AUTH rejections.
fn from_reply_code(code: &str, detail: String) -> TransportError {
    match code {
        "530" | "534" | "535" => TransportError::AuthenticationFailed(detail),
        "421" => TransportError::ConnectionError(detail),
        _ => TransportError::SendFailed(detail),
    }
}

fn classify_error(error: &smtp::Error) -> TransportError {
    let detail = error.to_string();

    if let Some(code) = error.status() {
        return from_reply_code(&code.to_string(), detail);
    }
    if error.is_client() || error.is_response() {
        TransportError::SendFailed(detail)
    } else {
        // No reply at all: socket, TLS or timeout
        TransportError::ConnectionError(detail)
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, TransportError> {
        let attachments = load_attachments(&mail.attachments).await?;
        let email = build_message(mail, attachments)?;

        match self.transport.send(email).await {
            Ok(response) => {
                let message_id = response.message().next().map(|s| s.to_string());
                Ok(SendReceipt::new(message_id))
            }
            Err(e) => Err(classify_error(&e)),
        }
    }

    async fn test_connection(&self) -> Result<(), TransportError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(TransportError::ConnectionError(format!(
                "SMTP server {} did not accept the connection",
                self.host
            ))),
            Err(e) => match classify_error(&e) {
                TransportError::SendFailed(msg) => Err(TransportError::ConnectionError(msg)),
                other => Err(other),
            },
        }
    }

    fn provider_name(&self) -> &'static str {
        "smtp"
    }
}
