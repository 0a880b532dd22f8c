//! Mail transport trait and error types

use crate::domain::{OutgoingMail, SendReceipt};
use async_trait::async_trait;
use thiserror::Error;

/// Mail transport error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Mail transport not configured")]
    NotConfigured,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Attachment error: {0}")]
    Attachment(String),

    #[error("Rate limited")]
    RateLimited,
}

impl TransportError {
    /// Bare error text, without the variant prefix
    pub fn detail(&self) -> String {
        match self {
            Self::ConnectionError(msg)
            | Self::AuthenticationFailed(msg)
            | Self::SendFailed(msg)
            | Self::InvalidConfiguration(msg)
            | Self::Attachment(msg) => msg.clone(),
            Self::NotConfigured | Self::RateLimited => self.to_string(),
        }
    }
}

/// Delivery backend used by a connector
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a rendered mail
    async fn send(&self, mail: &OutgoingMail) -> Result<SendReceipt, TransportError>;

    /// Test connection to the backend
    async fn test_connection(&self) -> Result<(), TransportError>;

    /// Get the backend name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;

    #[tokio::test]
    async fn test_mock_transport() {
        let mut mock = MockMailTransport::new();

        mock.expect_provider_name().returning(|| "mock");
        mock.expect_test_connection().returning(|| Ok(()));
        mock.expect_send()
            .returning(|_| Ok(SendReceipt::new(Some("msg-123".to_string()))));

        assert_eq!(mock.provider_name(), "mock");
        assert!(mock.test_connection().await.is_ok());

        let mail = OutgoingMail::new(
            EmailAddress::new("from@example.com"),
            EmailAddress::new("test@example.com"),
            "Test",
            "<p>Hello</p>",
        );
        let receipt = mock.send(&mail).await.unwrap();
        assert_eq!(receipt.message_id.as_deref(), Some("msg-123"));
    }

    #[test]
    fn test_transport_error_detail() {
        assert_eq!(
            TransportError::SendFailed("SMTP refused".to_string()).detail(),
            "SMTP refused"
        );
        assert_eq!(
            TransportError::SendFailed("SMTP refused".to_string()).to_string(),
            "Send failed: SMTP refused"
        );
        assert_eq!(TransportError::RateLimited.detail(), "Rate limited");
        assert_eq!(
            TransportError::NotConfigured.detail(),
            "Mail transport not configured"
        );
    }
}
