//! Configuration management for the mailer

use crate::domain::{EmailAddress, MailBackendConfig, SesConfig, SmtpConfig};
use crate::email::TemplateOverrides;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Delivery backend
    pub backend: MailBackendConfig,
    /// Sender mailbox used for every outgoing mail
    pub sender: EmailAddress,
    /// Language of the default templates
    pub lang: String,
    /// Per-key replacements for the localized text fragments
    pub text_overrides: HashMap<String, String>,
    /// Validated template overrides
    pub custom_templates: TemplateOverrides,
    /// Logging and metrics
    pub telemetry: TelemetryConfig,
}

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
        }
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

impl MailerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match var("MAIL_BACKEND")
            .unwrap_or_else(|| "smtp".to_string())
            .to_lowercase()
            .as_str()
        {
            "smtp" => MailBackendConfig::Smtp(SmtpConfig {
                host: var("SMTP_HOST").context("SMTP_HOST is required for the smtp backend")?,
                port: var("SMTP_PORT")
                    .unwrap_or_else(|| "587".to_string())
                    .parse()
                    .context("Invalid SMTP_PORT")?,
                username: var("SMTP_USERNAME"),
                password: var("SMTP_PASSWORD"),
                use_tls: parse_bool(var("SMTP_USE_TLS"), true),
                timeout_secs: var("SMTP_TIMEOUT_SECS")
                    .map(|s| s.parse())
                    .transpose()
                    .context("Invalid SMTP_TIMEOUT_SECS")?,
            }),
            "ses" => MailBackendConfig::Ses(SesConfig {
                region: var("SES_REGION")
                    .or_else(|| var("AWS_REGION"))
                    .unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: var("SES_ACCESS_KEY_ID"),
                secret_access_key: var("SES_SECRET_ACCESS_KEY"),
                configuration_set: var("SES_CONFIGURATION_SET"),
            }),
            other => bail!("Unsupported MAIL_BACKEND '{}' (expected smtp or ses)", other),
        };

        let sender = EmailAddress {
            email: var("MAIL_FROM_EMAIL").context("MAIL_FROM_EMAIL is required")?,
            name: var("MAIL_FROM_NAME"),
        };

        let text_overrides: HashMap<String, String> = match var("MAIL_TEXT_OVERRIDES") {
            Some(raw) => serde_json::from_str(&raw).context("Invalid MAIL_TEXT_OVERRIDES")?,
            None => HashMap::new(),
        };

        let custom_templates = match var("MAIL_CUSTOM_TEMPLATES") {
            Some(raw) => {
                let value: serde_json::Value =
                    serde_json::from_str(&raw).context("MAIL_CUSTOM_TEMPLATES is not valid JSON")?;
                TemplateOverrides::from_value(&value).context("Invalid MAIL_CUSTOM_TEMPLATES")?
            }
            None => TemplateOverrides::new(),
        };

        Ok(Self {
            backend,
            sender,
            lang: var("MAIL_LANG").unwrap_or_else(|| "en".to_string()),
            text_overrides,
            custom_templates,
            telemetry: TelemetryConfig {
                log_format: var("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
                metrics_enabled: parse_bool(var("METRICS_ENABLED"), false),
            },
        })
    }
}
