//! Mail connectors
//!
//! A [`Connector`] couples the template table to one delivery backend and routes
//! each [`ConnectorMessage`] to the handler registered for its type.
//!
//! ```no_run
//! use auth9_mailer::connector::Connector;
//! use auth9_mailer::domain::{ConnectorMessage, EmailAddress, RegLogMailData, SmtpConfig};
//!
//! # async fn run() -> auth9_mailer::Result<()> {
//! let smtp = SmtpConfig {
//!     host: "smtp.example.com".to_string(),
//!     port: 587,
//!     username: None,
//!     password: None,
//!     use_tls: true,
//!     timeout_secs: Some(30),
//! };
//! let connector = Connector::smtp(&smtp, EmailAddress::new("noreply@example.com"))?
//!     .lang("en")
//!     .build()?;
//!
//! let data = RegLogMailData::new("register", "alice", "a@x.com", "Demo", "https://demo.example.com")
//!     .with_password("s3cret");
//! let result = connector.dispatch(ConnectorMessage::reglog_mail(data)).await?;
//! println!("{}", result.logcontent.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod handler;

pub use handler::{CustomMailHandler, MailHandler, RegLogMailHandler};

use crate::config::MailerConfig;
use crate::domain::{
    ConnectorMessage, EmailAddress, MailBackendConfig, SesConfig, SmtpConfig, CUSTOM_MAIL,
    REGLOG_MAIL,
};
use crate::email::{
    BuiltinTexts, MailTransport, OverriddenTexts, SesTransport, SmtpTransport, TemplateOverrides,
    TemplateTable, TextLookup,
};
use crate::error::{MailError, Result};
use crate::telemetry::metrics;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

/// Read-only connector data handed to every handler
pub struct ConnectorState {
    module_id: String,
    lang: String,
    sender: EmailAddress,
    templates: TemplateTable,
    transport: Arc<dyn MailTransport>,
}

impl ConnectorState {
    pub fn new(
        sender: EmailAddress,
        lang: impl Into<String>,
        templates: TemplateTable,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            module_id: Uuid::new_v4().to_string(),
            lang: lang.into(),
            sender,
            templates,
            transport,
        }
    }

    /// Opaque id generated once per connector
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn sender(&self) -> &EmailAddress {
        &self.sender
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn transport(&self) -> &dyn MailTransport {
        self.transport.as_ref()
    }
}

/// Routes messages to handlers bound to one delivery backend
pub struct Connector {
    state: ConnectorState,
    handlers: HashMap<String, Arc<dyn MailHandler>>,
}

impl Connector {
    /// Start building a connector over any transport
    pub fn builder(transport: Arc<dyn MailTransport>, sender: EmailAddress) -> ConnectorBuilder {
        ConnectorBuilder::new(transport, sender)
    }

    /// Start building a connector delivering over SMTP
    pub fn smtp(config: &SmtpConfig, sender: EmailAddress) -> Result<ConnectorBuilder> {
        config.validate()?;
        let transport = SmtpTransport::from_config(config)?;
        Ok(Self::builder(Arc::new(transport), sender))
    }

    /// Start building a connector delivering through AWS SES
    pub async fn ses(config: &SesConfig, sender: EmailAddress) -> Result<ConnectorBuilder> {
        config.validate()?;
        let transport = SesTransport::from_config(config).await?;
        Ok(Self::builder(Arc::new(transport), sender))
    }

    /// Build a fully configured connector from [`MailerConfig`]
    pub async fn from_config(config: &MailerConfig) -> Result<Self> {
        let builder = match &config.backend {
            MailBackendConfig::Smtp(smtp) => Self::smtp(smtp, config.sender.clone())?,
            MailBackendConfig::Ses(ses) => Self::ses(ses, config.sender.clone()).await?,
        };

        builder
            .lang(config.lang.clone())
            .text_overrides(config.text_overrides.clone())
            .custom_templates(config.custom_templates.clone())
            .build()
    }

    /// Route a message to its handler.
    ///
    /// Returns `Err` only for caller mistakes (unknown type, malformed data);
    /// delivery failures come back as `Ok` with `success == Some(false)`.
    pub async fn dispatch(&self, message: ConnectorMessage) -> Result<ConnectorMessage> {
        let message_type = message.message_type.clone();

        let Some(handler) = self.handlers.get(&message_type) else {
            tracing::error!(
                module_id = %self.state.module_id,
                message_type = %message_type,
                "No handler registered for message type"
            );
            metrics::record_dispatch(self.type_label(&message_type), "rejected");
            return Err(MailError::HandlerNotRegistered(message_type));
        };

        let span = tracing::info_span!(
            "mail_dispatch",
            module_id = %self.state.module_id,
            message_type = %message_type,
            process = message.data.process().unwrap_or_default(),
        );

        let result = handler.handle(&self.state, message).instrument(span).await;

        match &result {
            Ok(outcome) if outcome.is_success() => metrics::record_dispatch(&message_type, "success"),
            Ok(_) => metrics::record_dispatch(&message_type, "failure"),
            Err(e) => {
                tracing::error!(
                    module_id = %self.state.module_id,
                    message_type = %message_type,
                    error = %e,
                    "Mail dispatch rejected"
                );
                metrics::record_dispatch(&message_type, "rejected");
            }
        }

        result
    }

    /// Metric label for `message_type`; caller-chosen unregistered types collapse
    /// into one label
    fn type_label<'a>(&self, message_type: &'a str) -> &'a str {
        if self.handlers.contains_key(message_type) {
            message_type
        } else {
            metrics::UNKNOWN_TYPE
        }
    }

    /// Check the backend is reachable with the configured credentials
    pub async fn test_connection(&self) -> Result<()> {
        Ok(self.state.transport.test_connection().await?)
    }

    pub fn state(&self) -> &ConnectorState {
        &self.state
    }

    pub fn module_id(&self) -> &str {
        self.state.module_id()
    }

    pub fn lang(&self) -> &str {
        self.state.lang()
    }

    pub fn templates(&self) -> &TemplateTable {
        self.state.templates()
    }

    pub fn backend_name(&self) -> &'static str {
        self.state.transport.provider_name()
    }

    /// Registered message types, sorted
    pub fn handler_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Construction-time options for a [`Connector`]
pub struct ConnectorBuilder {
    transport: Arc<dyn MailTransport>,
    sender: EmailAddress,
    lang: String,
    text_lookup: Option<Arc<dyn TextLookup>>,
    text_overrides: HashMap<String, String>,
    custom_handlers: Vec<(String, Arc<dyn MailHandler>)>,
    custom_templates: TemplateOverrides,
}

impl ConnectorBuilder {
    pub fn new(transport: Arc<dyn MailTransport>, sender: EmailAddress) -> Self {
        Self {
            transport,
            sender,
            lang: "en".to_string(),
            text_lookup: None,
            text_overrides: HashMap::new(),
            custom_handlers: Vec::new(),
            custom_templates: TemplateOverrides::new(),
        }
    }

    /// Language of the default templates (default `en`)
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Replace the built-in text tables
    pub fn text_lookup(mut self, lookup: Arc<dyn TextLookup>) -> Self {
        self.text_lookup = Some(lookup);
        self
    }

    pub fn text_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.text_overrides.extend(overrides);
        self
    }

    /// Register a handler; a later registration for the same type wins,
    /// including over the built-in `reglog_mail` and `custom_mail` handlers
    pub fn custom_handler(
        mut self,
        message_type: impl Into<String>,
        handler: Arc<dyn MailHandler>,
    ) -> Self {
        self.custom_handlers.push((message_type.into(), handler));
        self
    }

    /// Add template overrides; repeated calls merge per (process, field)
    pub fn custom_templates(mut self, overrides: TemplateOverrides) -> Self {
        self.custom_templates.merge(overrides);
        self
    }

    /// Validate and merge untyped template overrides
    pub fn custom_templates_json(self, value: &serde_json::Value) -> Result<Self> {
        let overrides = TemplateOverrides::from_value(value)?;
        Ok(self.custom_templates(overrides))
    }

    pub fn build(self) -> Result<Connector> {
        self.sender.validate()?;

        if self.lang.trim().is_empty() {
            return Err(MailError::Configuration(
                "language must not be empty".to_string(),
            ));
        }

        let base: Arc<dyn TextLookup> = self
            .text_lookup
            .unwrap_or_else(|| Arc::new(BuiltinTexts::new()));
        let texts = OverriddenTexts::new(base, self.text_overrides);

        let mut templates = TemplateTable::build(&self.lang, &texts)?;
        templates.merge(self.custom_templates)?;

        let mut handlers: HashMap<String, Arc<dyn MailHandler>> = HashMap::new();
        handlers.insert(REGLOG_MAIL.to_string(), Arc::new(RegLogMailHandler));
        handlers.insert(CUSTOM_MAIL.to_string(), Arc::new(CustomMailHandler));

        for (message_type, handler) in self.custom_handlers {
            if message_type.trim().is_empty() {
                return Err(MailError::Configuration(
                    "custom handler message type must not be empty".to_string(),
                ));
            }
            handlers.insert(message_type, handler);
        }

        let state = ConnectorState::new(self.sender, self.lang, templates, self.transport);

        tracing::debug!(
            module_id = %state.module_id,
            backend = state.transport.provider_name(),
            lang = %state.lang,
            handlers = handlers.len(),
            "Mail connector ready"
        );

        Ok(Connector { state, handlers })
    }
}
