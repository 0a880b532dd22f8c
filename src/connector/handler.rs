//! Message handlers
//!
//! A handler owns one message type: it validates the payload, renders the mail,
//! calls the transport, and reduces the outcome to a result message. Transport
//! failures never escape a handler; only malformed input does.

use super::ConnectorState;
use crate::domain::{ConnectorMessage, EmailAddress, MessageData, OutgoingMail};
use crate::email::TemplateEngine;
use crate::error::{MailError, Result};
use crate::telemetry::metrics;
use async_trait::async_trait;
use std::time::Instant;

/// Handles one message type on behalf of a connector
#[async_trait]
pub trait MailHandler: Send + Sync {
    async fn handle(
        &self,
        state: &ConnectorState,
        message: ConnectorMessage,
    ) -> Result<ConnectorMessage>;
}

fn require_process(process: &str) -> Result<()> {
    if process.trim().is_empty() {
        return Err(MailError::MalformedInput(
            "data.process must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Send through the connector transport and fold the outcome into a result message
pub async fn deliver(
    state: &ConnectorState,
    message_type: &str,
    logline: String,
    mail: OutgoingMail,
) -> ConnectorMessage {
    let transport = state.transport();
    let started = Instant::now();
    let outcome = transport.send(&mail).await;
    metrics::record_send_duration(transport.provider_name(), started.elapsed());

    match outcome {
        Ok(receipt) => {
            tracing::info!(
                module_id = %state.module_id(),
                message_type,
                backend = transport.provider_name(),
                message_id = ?receipt.message_id,
                "Mail sent: {}",
                logline
            );
            ConnectorMessage::outcome(message_type, true, logline)
        }
        Err(e) => {
            tracing::warn!(
                module_id = %state.module_id(),
                message_type,
                backend = transport.provider_name(),
                error = %e,
                "Mail delivery failed: {}",
                logline
            );
            ConnectorMessage::outcome(message_type, false, format!("{}|{}", logline, e.detail()))
        }
    }
}

/// Renders a process template and sends it (`reglog_mail`)
#[derive(Debug, Default, Clone, Copy)]
pub struct RegLogMailHandler;

#[async_trait]
impl MailHandler for RegLogMailHandler {
    async fn handle(
        &self,
        state: &ConnectorState,
        message: ConnectorMessage,
    ) -> Result<ConnectorMessage> {
        let MessageData::RegLogMail(data) = message.data else {
            return Err(MailError::MalformedInput(format!(
                "'{}' expects registration mail data",
                message.message_type
            )));
        };
        require_process(&data.process)?;

        let template = state.templates().get(&data.process).ok_or_else(|| {
            MailError::MalformedInput(format!("no template for process '{}'", data.process))
        })?;

        let mut engine = TemplateEngine::new();
        engine
            .set("app_name", data.app_name.as_str())
            .set("username", data.username.as_str())
            .set("email", data.email.as_str())
            .set("app_address", data.app_address.as_str())
            .set_opt("reset_code", data.reset_code.as_deref());
        let subject = engine.render(&template.subject);

        engine.set_opt("password", data.password.as_deref());
        let body = engine.render(&template.body);

        let mail = OutgoingMail::new(
            state.sender().clone(),
            EmailAddress::new(data.email.as_str()),
            subject,
            body,
        );
        let logline = format!("{}/{}:{}", data.username, data.email, data.process);

        Ok(deliver(state, &message.message_type, logline, mail).await)
    }
}

/// Sends a caller-provided subject and body verbatim (`custom_mail`)
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomMailHandler;

#[async_trait]
impl MailHandler for CustomMailHandler {
    async fn handle(
        &self,
        state: &ConnectorState,
        message: ConnectorMessage,
    ) -> Result<ConnectorMessage> {
        let MessageData::CustomMail(data) = message.data else {
            return Err(MailError::MalformedInput(format!(
                "'{}' expects custom mail data",
                message.message_type
            )));
        };
        require_process(&data.process)?;

        let mut mail = OutgoingMail::new(
            state.sender().clone(),
            EmailAddress::new(data.email.as_str()),
            data.mail_subject,
            data.mail_body,
        );
        if let Some(attachment) = data.mail_attachment {
            attachment.validate()?;
            mail = mail.with_attachment(attachment);
        }

        let logline = match &data.username {
            Some(username) => format!("{}/{}:{}", username, data.email, data.process),
            None => format!("{}:{}", data.email, data.process),
        };

        Ok(deliver(state, &message.message_type, logline, mail).await)
    }
}
