//! Mail template system
//!
//! Templates are plain strings with `?name?` placeholders, built per process from
//! localized text fragments and overridable by the caller.

pub mod engine;
pub mod store;

pub use engine::{interpolate, TemplateEngine};
pub use store::{
    MailTemplatePair, TemplateOverride, TemplateOverrides, TemplateTable, CREDS_EDIT, REGISTER,
    RESET_PASS,
};
