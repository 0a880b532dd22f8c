//! MIME message assembly shared by the SMTP and SES raw-message paths

use super::transport::TransportError;
use crate::domain::{EmailAddress, MailAttachment, OutgoingMail};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    Message,
};

/// Attachment with its file content read into memory
#[derive(Debug, Clone)]
pub struct LoadedAttachment {
    pub filename: String,
    pub content_type: String,
    pub cid: Option<String>,
    pub content: Vec<u8>,
}

/// Read every attachment from disk. Any unreadable file fails the whole send.
pub async fn load_attachments(
    attachments: &[MailAttachment],
) -> Result<Vec<LoadedAttachment>, TransportError> {
    let mut loaded = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let content = tokio::fs::read(&attachment.filepath).await.map_err(|e| {
            TransportError::Attachment(format!("{}: {}", attachment.filepath, e))
        })?;
        loaded.push(LoadedAttachment {
            filename: attachment.file_name(),
            content_type: attachment.content_type(),
            cid: attachment.cid.clone(),
            content,
        });
    }
    Ok(loaded)
}

pub fn parse_mailbox(address: &EmailAddress, role: &str) -> Result<Mailbox, TransportError> {
    address.to_string().parse().map_err(|e| {
        TransportError::InvalidConfiguration(format!("Invalid {} address: {}", role, e))
    })
}

/// Build a complete MIME message for `mail`
pub fn build_message(
    mail: &OutgoingMail,
    attachments: Vec<LoadedAttachment>,
) -> Result<Message, TransportError> {
    if mail.to.is_empty() {
        return Err(TransportError::InvalidConfiguration(
            "No recipients specified".to_string(),
        ));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&mail.from, "from")?)
        .subject(&mail.subject);

    for to in &mail.to {
        builder = builder.to(parse_mailbox(to, "to")?);
    }

    if attachments.is_empty() {
        return match &mail.text_body {
            Some(text_body) => builder
                .multipart(alternative(text_body, &mail.html_body))
                .map_err(|e| TransportError::SendFailed(e.to_string())),
            None => builder
                .header(ContentType::TEXT_HTML)
                .body(mail.html_body.clone())
                .map_err(|e| TransportError::SendFailed(e.to_string())),
        };
    }

    let mut related = match &mail.text_body {
        Some(text_body) => MultiPart::related().multipart(alternative(text_body, &mail.html_body)),
        None => MultiPart::related().singlepart(html_part(&mail.html_body)),
    };
    let mut regular = Vec::new();

    for attachment in attachments {
        let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
            TransportError::Attachment(format!(
                "{}: invalid content type '{}': {}",
                attachment.filename, attachment.content_type, e
            ))
        })?;
        match attachment.cid {
            Some(cid) => {
                related = related.singlepart(
                    Attachment::new_inline_with_name(cid, attachment.filename)
                        .body(attachment.content, content_type),
                );
            }
            None => regular.push(
                Attachment::new(attachment.filename).body(attachment.content, content_type),
            ),
        }
    }

    let mut mixed = MultiPart::mixed().multipart(related);
    for part in regular {
        mixed = mixed.singlepart(part);
    }

    builder
        .multipart(mixed)
        .map_err(|e| TransportError::SendFailed(e.to_string()))
}

fn html_part(html_body: &str) -> SinglePart {
    SinglePart::builder()
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())
}

fn alternative(text_body: &str, html_body: &str) -> MultiPart {
    MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text_body.to_string()),
        )
        .singlepart(html_part(html_body))
}
