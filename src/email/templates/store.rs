//! Per-process subject/body templates

use crate::email::texts::TextLookup;
use crate::error::{MailError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const REGISTER: &str = "register";
pub const RESET_PASS: &str = "resetPass";
pub const CREDS_EDIT: &str = "credsEdit";

/// Subject and body template for one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailTemplatePair {
    pub subject: String,
    pub body: String,
}

impl MailTemplatePair {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Partial replacement for a process template
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateOverride {
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// Caller-supplied template overrides keyed by process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateOverrides {
    entries: BTreeMap<String, TemplateOverride>,
}

impl TemplateOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, process: impl Into<String>, subject: impl Into<String>) -> Self {
        self.entries.entry(process.into()).or_default().subject = Some(subject.into());
        self
    }

    pub fn body(mut self, process: impl Into<String>, body: impl Into<String>) -> Self {
        self.entries.entry(process.into()).or_default().body = Some(body.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold `other` in per (process, field); fields set in `other` win
    pub fn merge(&mut self, other: TemplateOverrides) {
        for (process, entry) in other.entries {
            let current = self.entries.entry(process).or_default();
            if entry.subject.is_some() {
                current.subject = entry.subject;
            }
            if entry.body.is_some() {
                current.body = entry.body;
            }
        }
    }

    /// Parse and validate overrides from an untyped JSON value.
    ///
    /// Expected shape: `{"<process>": {"subject"?: "...", "body"?: "..."}, ...}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(MailError::InvalidTemplates(format!(
                "expected an object keyed by process, got {}",
                value
            )));
        };

        let mut overrides = Self::new();
        for (process, entry) in map {
            if process.trim().is_empty() {
                return Err(MailError::InvalidTemplates(
                    "process names must not be empty".to_string(),
                ));
            }

            let Value::Object(fields) = entry else {
                return Err(MailError::InvalidTemplates(format!(
                    "'{}' must be an object with 'subject' and/or 'body', got {}",
                    process, entry
                )));
            };

            let mut parsed = TemplateOverride::default();
            for (field, text) in fields {
                let Value::String(text) = text else {
                    return Err(MailError::InvalidTemplates(format!(
                        "'{}.{}' must be a string",
                        process, field
                    )));
                };
                match field.as_str() {
                    "subject" => parsed.subject = Some(text.clone()),
                    "body" => parsed.body = Some(text.clone()),
                    other => {
                        return Err(MailError::InvalidTemplates(format!(
                            "'{}' has unsupported key '{}' (allowed: subject, body)",
                            process, other
                        )))
                    }
                }
            }

            overrides.entries.insert(process.clone(), parsed);
        }

        Ok(overrides)
    }
}

/// Mail templates keyed by process name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateTable {
    entries: BTreeMap<String, MailTemplatePair>,
}

impl TemplateTable {
    /// Build the default templates for `lang`
    pub fn build(lang: &str, texts: &dyn TextLookup) -> Result<Self> {
        let t = |key: &str| texts.text(lang, key);
        let footer = format!("<hr><p>{}</p>", t("mail_automatic")?);

        let mut table = Self::default();

        table.insert(
            REGISTER,
            MailTemplatePair::new(
                format!("?app_name? - {}", t("reg_mail_h")?),
                format!(
                    "<p>{}</p><p>{} ?username?</p><p>{} ?app_address?</p><p>{} ?password?</p><p>{}</p>{}",
                    t("reg_mail_1")?,
                    t("reg_mail_2")?,
                    t("reg_mail_3")?,
                    t("reg_mail_4")?,
                    t("reg_mail_5")?,
                    footer
                ),
            ),
        );

        table.insert(
            RESET_PASS,
            MailTemplatePair::new(
                format!("?app_name? - {}", t("reset_mail_h")?),
                format!(
                    "<p>{}</p><p>{} ?reset_code?</p><p>{}</p>{}",
                    t("reset_mail_1")?,
                    t("reset_mail_2")?,
                    t("reset_mail_3")?,
                    footer
                ),
            ),
        );

        table.insert(
            CREDS_EDIT,
            MailTemplatePair::new(
                format!("?app_name? - {}", t("crededit_mail_h")?),
                format!("<p>{} ?username?</p>{}", t("crededit_mail_1")?, footer),
            ),
        );

        Ok(table)
    }

    pub fn get(&self, process: &str) -> Option<&MailTemplatePair> {
        self.entries.get(process)
    }

    pub fn contains(&self, process: &str) -> bool {
        self.entries.contains_key(process)
    }

    pub fn processes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn insert(&mut self, process: impl Into<String>, pair: MailTemplatePair) {
        self.entries.insert(process.into(), pair);
    }

    /// Merge overrides field by field. A process not yet in the table needs both fields.
    pub fn merge(&mut self, overrides: TemplateOverrides) -> Result<()> {
        for (process, entry) in overrides.entries {
            if process.trim().is_empty() {
                return Err(MailError::InvalidTemplates(
                    "process names must not be empty".to_string(),
                ));
            }

            match self.entries.get_mut(&process) {
                Some(pair) => {
                    if let Some(subject) = entry.subject {
                        pair.subject = subject;
                    }
                    if let Some(body) = entry.body {
                        pair.body = body;
                    }
                }
                None => match (entry.subject, entry.body) {
                    (Some(subject), Some(body)) => {
                        self.entries
                            .insert(process, MailTemplatePair { subject, body });
                    }
                    _ => {
                        return Err(MailError::InvalidTemplates(format!(
                            "new process '{}' needs both 'subject' and 'body'",
                            process
                        )))
                    }
                },
            }
        }
        Ok(())
    }
}
