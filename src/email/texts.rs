//! Localized text fragments used to build the default mail templates

use crate::error::{MailError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Keys every text lookup must resolve for template construction
pub const REQUIRED_TEXT_KEYS: &[&str] = &[
    "reg_mail_h",
    "reg_mail_1",
    "reg_mail_2",
    "reg_mail_3",
    "reg_mail_4",
    "reg_mail_5",
    "reset_mail_h",
    "reset_mail_1",
    "reset_mail_2",
    "reset_mail_3",
    "crededit_mail_h",
    "crededit_mail_1",
    "mail_automatic",
];

/// Languages shipped with [`BuiltinTexts`]. `i18` resolves every key to itself.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "pl", "i18"];

/// Resolves a localized text fragment
pub trait TextLookup: Send + Sync {
    fn text(&self, lang: &str, key: &str) -> Result<String>;
}

impl<T: TextLookup + ?Sized> TextLookup for Arc<T> {
    fn text(&self, lang: &str, key: &str) -> Result<String> {
        (**self).text(lang, key)
    }
}

const EN: &[(&str, &str)] = &[
    ("reg_mail_h", "confirmation of registration"),
    ("reg_mail_1", "Thank you for registering an account in our application."),
    ("reg_mail_2", "Your username:"),
    ("reg_mail_3", "You can sign in to your account at:"),
    ("reg_mail_4", "Your password:"),
    ("reg_mail_5", "Keep this message in a safe place, or delete it once you no longer need it."),
    ("reset_mail_h", "password reset code"),
    ("reset_mail_1", "A password reset has been requested for your account."),
    ("reset_mail_2", "Your reset code:"),
    ("reset_mail_3", "If you did not request a password reset, you can safely ignore this message."),
    ("crededit_mail_h", "credentials changed"),
    ("crededit_mail_1", "The credentials of your account have been changed. Your username is now:"),
    ("mail_automatic", "This message was generated automatically. Please do not reply to it."),
];

const PL: &[(&str, &str)] = &[
    ("reg_mail_h", "potwierdzenie rejestracji"),
    ("reg_mail_1", "Dziękujemy za założenie konta w naszej aplikacji."),
    ("reg_mail_2", "Twoja nazwa użytkownika:"),
    ("reg_mail_3", "Możesz zalogować się do swojego konta pod adresem:"),
    ("reg_mail_4", "Twoje hasło:"),
    ("reg_mail_5", "Przechowuj tę wiadomość w bezpiecznym miejscu lub usuń ją, gdy nie będzie już potrzebna."),
    ("reset_mail_h", "kod resetowania hasła"),
    ("reset_mail_1", "Zażądano zresetowania hasła do Twojego konta."),
    ("reset_mail_2", "Twój kod resetujący:"),
    ("reset_mail_3", "Jeśli to nie Ty prosiłeś o zresetowanie hasła, zignoruj tę wiadomość."),
    ("crededit_mail_h", "zmiana danych logowania"),
    ("crededit_mail_1", "Dane logowania do Twojego konta zostały zmienione. Twoja nazwa użytkownika to:"),
    ("mail_automatic", "Ta wiadomość została wygenerowana automatycznie. Prosimy na nią nie odpowiadać."),
];

/// Text tables shipped with the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTexts;

impl BuiltinTexts {
    pub fn new() -> Self {
        Self
    }

    fn table(lang: &str) -> Result<Option<&'static [(&'static str, &'static str)]>> {
        match lang {
            "en" => Ok(Some(EN)),
            "pl" => Ok(Some(PL)),
            "i18" => Ok(None),
            other => Err(MailError::Configuration(format!(
                "unsupported language '{}' (expected one of: {})",
                other,
                SUPPORTED_LANGUAGES.join(", ")
            ))),
        }
    }
}

impl TextLookup for BuiltinTexts {
    fn text(&self, lang: &str, key: &str) -> Result<String> {
        let Some(table) = Self::table(lang)? else {
            return Ok(key.to_string());
        };

        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .ok_or_else(|| {
                MailError::Configuration(format!("no '{}' text for key '{}'", lang, key))
            })
    }
}

/// Wraps a lookup with caller-supplied per-key replacements, applied for every
/// language. Only keys the inner lookup resolves can be replaced.
pub struct OverriddenTexts<L> {
    inner: L,
    overrides: HashMap<String, String>,
}

impl<L: TextLookup> OverriddenTexts<L> {
    pub fn new(inner: L, overrides: HashMap<String, String>) -> Self {
        Self { inner, overrides }
    }
}

impl<L: TextLookup> TextLookup for OverriddenTexts<L> {
    fn text(&self, lang: &str, key: &str) -> Result<String> {
        // The inner lookup still runs so an unsupported language fails
        match (self.inner.text(lang, key), self.overrides.get(key)) {
            (Ok(_), Some(replacement)) => Ok(replacement.clone()),
            (result, _) => result,
        }
    }
}
