//! Common test utilities

use async_trait::async_trait;
use auth9_mailer::domain::{EmailAddress, OutgoingMail, SendReceipt};
use auth9_mailer::email::{MailTransport, TransportError};
use auth9_mailer::Connector;
use std::sync::{Arc, Mutex};

/// Transport spy that records every mail it is asked to send
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    failure: Option<TransportError>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transport whose every send fails with `error`
    pub fn failing(error: TransportError) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(error),
        })
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> OutgoingMail {
        self.sent().pop().expect("no mail was sent")
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, TransportError> {
        self.sent.lock().unwrap().push(mail.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(SendReceipt::new(Some(format!(
                "spy-{}",
                self.sent.lock().unwrap().len()
            )))),
        }
    }

    async fn test_connection(&self) -> Result<(), TransportError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "spy"
    }
}

pub fn sender() -> EmailAddress {
    EmailAddress::with_name("noreply@demo.test", "Demo")
}

/// Connector with default settings over `transport`
pub fn connector(transport: Arc<RecordingTransport>) -> Connector {
    Connector::builder(transport, sender())
        .build()
        .expect("default connector should build")
}
