//! Connector dispatch integration tests

use async_trait::async_trait;
use auth9_mailer::connector::{ConnectorState, MailHandler};
use auth9_mailer::domain::{MessageData, CUSTOM_MAIL, REGLOG_MAIL};
use auth9_mailer::email::{TemplateOverrides, TransportError};
use auth9_mailer::{
    Connector, ConnectorMessage, CustomMailData, MailAttachment, MailError, RegLogMailData,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

mod common;

use common::RecordingTransport;

fn register_event() -> RegLogMailData {
    RegLogMailData::new("register", "alice", "a@x.com", "Demo", "http://demo").with_password("pw123")
}

#[tokio::test]
async fn test_register_mail_rendered_and_sent() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let result = connector
        .dispatch(ConnectorMessage::reglog_mail(register_event()))
        .await
        .unwrap();

    assert_eq!(result.success, Some(true));
    assert_eq!(result.logcontent.as_deref(), Some("alice/a@x.com:register"));

    let mail = transport.last();
    assert_eq!(mail.to[0].email, "a@x.com");
    assert_eq!(mail.from.to_string(), "Demo <noreply@demo.test>");
    assert_eq!(mail.subject, "Demo - confirmation of registration");
    for expected in ["alice", "http://demo", "pw123"] {
        assert!(mail.html_body.contains(expected), "body lacks {}", expected);
    }
    for token in ["?username?", "?app_address?", "?password?", "?app_name?"] {
        assert!(!mail.html_body.contains(token), "body still has {}", token);
        assert!(!mail.subject.contains(token), "subject still has {}", token);
    }
}

#[tokio::test]
async fn test_transport_failure_reported_in_result() {
    let transport = RecordingTransport::failing(TransportError::SendFailed("SMTP refused".into()));
    let connector = common::connector(transport.clone());

    let result = connector
        .dispatch(ConnectorMessage::reglog_mail(register_event()))
        .await
        .unwrap();

    assert_eq!(result.success, Some(false));
    assert_eq!(
        result.logcontent.as_deref(),
        Some("alice/a@x.com:register|SMTP refused")
    );
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_custom_mail_sent_verbatim() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let data = CustomMailData::new("notice", "b@x.com", "Hi", "<p>Hello</p>");
    let result = connector
        .dispatch(ConnectorMessage::custom_mail(data))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.logcontent.as_deref(), Some("b@x.com:notice"));

    let mail = transport.last();
    assert_eq!(mail.subject, "Hi");
    assert_eq!(mail.html_body, "<p>Hello</p>");
    assert!(mail.attachments.is_empty());
}

#[tokio::test]
async fn test_custom_mail_placeholders_not_interpolated() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let data = CustomMailData::new("notice", "b@x.com", "Hi ?username?", "?app_name?")
        .with_username("bob");
    connector
        .dispatch(ConnectorMessage::custom_mail(data))
        .await
        .unwrap();

    let mail = transport.last();
    assert_eq!(mail.subject, "Hi ?username?");
    assert_eq!(mail.html_body, "?app_name?");
}

#[tokio::test]
async fn test_reset_and_creds_edit_processes() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let reset = RegLogMailData::new("resetPass", "alice", "a@x.com", "Demo", "http://demo")
        .with_reset_code("RC-42");
    let result = connector
        .dispatch(ConnectorMessage::reglog_mail(reset))
        .await
        .unwrap();
    assert_eq!(result.logcontent.as_deref(), Some("alice/a@x.com:resetPass"));
    assert!(transport.last().html_body.contains("RC-42"));

    let creds = RegLogMailData::new("credsEdit", "alice2", "a@x.com", "Demo", "http://demo");
    connector
        .dispatch(ConnectorMessage::reglog_mail(creds))
        .await
        .unwrap();
    let mail = transport.last();
    assert_eq!(mail.subject, "Demo - credentials changed");
    assert!(mail.html_body.contains("alice2"));
}

#[rstest]
#[case(json!(""))]
#[case(json!(["a", "b"]))]
#[case(json!(7))]
#[tokio::test]
async fn test_malformed_process_rejected_before_send(#[case] process: serde_json::Value) {
    let payload = json!({
        "process": process,
        "username": "alice",
        "email": "a@x.com",
        "app_name": "Demo",
        "app_address": "http://demo",
    });

    let result = ConnectorMessage::from_json(REGLOG_MAIL, payload);
    assert!(matches!(result, Err(MailError::MalformedInput(_))));
}

#[tokio::test]
async fn test_empty_process_rejected_at_dispatch() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let mut data = register_event();
    data.process = String::new();
    let result = connector.dispatch(ConnectorMessage::reglog_mail(data)).await;

    assert!(matches!(result, Err(MailError::MalformedInput(_))));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_dispatch_from_json_payload() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let message = ConnectorMessage::from_json(
        CUSTOM_MAIL,
        json!({
            "process": "invoice",
            "username": "bob",
            "email": "b@x.com",
            "mail_subject": "Invoice",
            "mail_body": "<p>See attached</p>",
        }),
    )
    .unwrap();

    let result = connector.dispatch(message).await.unwrap();
    assert_eq!(result.logcontent.as_deref(), Some("bob/b@x.com:invoice"));
    assert_eq!(transport.last().subject, "Invoice");
}

#[tokio::test]
async fn test_unknown_message_type() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let result = connector
        .dispatch(ConnectorMessage::new("sms", MessageData::Empty))
        .await;

    assert!(matches!(result, Err(MailError::HandlerNotRegistered(_))));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_attachment_fails_before_send() {
    let transport = RecordingTransport::new();
    let connector = common::connector(transport.clone());

    let data = CustomMailData::new("report", "b@x.com", "Report", "<p>Attached</p>")
        .with_attachment(MailAttachment::new(""));
    let result = connector.dispatch(ConnectorMessage::custom_mail(data)).await;

    assert!(matches!(result, Err(MailError::MalformedInput(_))));
    assert!(transport.sent().is_empty());
}

#[rstest]
#[case(json!({"register": "not-a-list"}))]
#[case(json!({"register": {"subject": "X", "wrongkey": "Y"}}))]
#[case(json!({"farewell": {"subject": "Bye"}}))]
#[case(json!(["register"]))]
fn test_invalid_custom_templates_rejected(#[case] templates: serde_json::Value) {
    let result = Connector::builder(RecordingTransport::new(), common::sender())
        .custom_templates_json(&templates)
        .and_then(|builder| builder.build());

    assert!(matches!(result, Err(MailError::InvalidTemplates(_))));
}

#[tokio::test]
async fn test_template_override_keeps_default_body() {
    let transport = RecordingTransport::new();
    let connector = Connector::builder(transport.clone(), common::sender())
        .custom_templates(TemplateOverrides::new().subject("register", "Welcome ?username?"))
        .build()
        .unwrap();

    connector
        .dispatch(ConnectorMessage::reglog_mail(register_event()))
        .await
        .unwrap();

    let mail = transport.last();
    assert_eq!(mail.subject, "Welcome alice");
    assert!(mail.html_body.contains("Thank you for registering"));
}

#[tokio::test]
async fn test_new_process_from_overrides() {
    let transport = RecordingTransport::new();
    let templates = json!({
        "farewell": {"subject": "Bye ?username?", "body": "<p>?app_name? misses you</p>"}
    });
    let connector = Connector::builder(transport.clone(), common::sender())
        .custom_templates_json(&templates)
        .unwrap()
        .build()
        .unwrap();

    let data = RegLogMailData::new("farewell", "alice", "a@x.com", "Demo", "http://demo");
    let result = connector
        .dispatch(ConnectorMessage::reglog_mail(data))
        .await
        .unwrap();

    assert!(result.is_success());
    let mail = transport.last();
    assert_eq!(mail.subject, "Bye alice");
    assert_eq!(mail.html_body, "<p>Demo misses you</p>");
}

#[tokio::test]
async fn test_polish_templates() {
    let transport = RecordingTransport::new();
    let connector = Connector::builder(transport.clone(), common::sender())
        .lang("pl")
        .build()
        .unwrap();

    connector
        .dispatch(ConnectorMessage::reglog_mail(register_event()))
        .await
        .unwrap();

    assert_eq!(transport.last().subject, "Demo - potwierdzenie rejestracji");
}

struct AuditHandler;

#[async_trait]
impl MailHandler for AuditHandler {
    async fn handle(
        &self,
        state: &ConnectorState,
        message: ConnectorMessage,
    ) -> auth9_mailer::Result<ConnectorMessage> {
        let process = message.data.process().unwrap_or("none").to_string();
        Ok(ConnectorMessage::outcome(
            message.message_type,
            true,
            format!("audited:{}:{}", state.lang(), process),
        ))
    }
}

#[tokio::test]
async fn test_custom_handler_replaces_default() {
    let transport = RecordingTransport::new();
    let connector = Connector::builder(transport.clone(), common::sender())
        .custom_handler(REGLOG_MAIL, Arc::new(AuditHandler))
        .build()
        .unwrap();

    let result = connector
        .dispatch(ConnectorMessage::reglog_mail(register_event()))
        .await
        .unwrap();

    assert_eq!(result.logcontent.as_deref(), Some("audited:en:register"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_custom_handler_receives_open_payload() {
    let connector = Connector::builder(RecordingTransport::new(), common::sender())
        .custom_handler("audit", Arc::new(AuditHandler))
        .build()
        .unwrap();

    let message = ConnectorMessage::from_json("audit", json!({"process": "login"})).unwrap();
    let result = connector.dispatch(message).await.unwrap();

    assert_eq!(result.logcontent.as_deref(), Some("audited:en:login"));
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let transport = RecordingTransport::new();
    let connector = Arc::new(common::connector(transport.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let connector = connector.clone();
            tokio::spawn(async move {
                let data = RegLogMailData::new(
                    "register",
                    format!("user{}", i),
                    format!("user{}@x.com", i),
                    "Demo",
                    "http://demo",
                );
                connector
                    .dispatch(ConnectorMessage::reglog_mail(data))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_success());
    }
    assert_eq!(transport.sent().len(), 8);
}

#[tokio::test]
async fn test_connection_check_uses_transport() {
    let ok = common::connector(RecordingTransport::new());
    assert!(ok.test_connection().await.is_ok());
    assert_eq!(ok.backend_name(), "spy");

    let failing = common::connector(RecordingTransport::failing(
        TransportError::ConnectionError("refused".into()),
    ));
    assert!(matches!(
        failing.test_connection().await,
        Err(MailError::Transport(TransportError::ConnectionError(_)))
    ));
}

#[test]
fn test_result_message_serialization() {
    let outcome = ConnectorMessage::outcome(REGLOG_MAIL, false, "alice/a@x.com:register|boom");
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["type"], "reglog_mail");
    assert_eq!(value["success"], false);
    assert_eq!(value["logcontent"], "alice/a@x.com:register|boom");
    assert!(value.get("data").is_none());
    assert!(value.get("time").is_some());
}
