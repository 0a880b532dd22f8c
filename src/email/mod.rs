//! Email rendering and delivery
//!
//! This module provides the pieces a connector is assembled from:
//! - localized text fragments and per-process templates
//! - `?name?` placeholder interpolation
//! - delivery transports: SMTP (using lettre) and AWS SES

pub mod mime;
pub mod ses;
pub mod smtp;
pub mod templates;
pub mod texts;
pub mod transport;

pub use ses::SesTransport;
pub use smtp::SmtpTransport;
pub use templates::{interpolate, MailTemplatePair, TemplateEngine, TemplateOverrides, TemplateTable};
pub use texts::{BuiltinTexts, OverriddenTexts, TextLookup};
pub use transport::{MailTransport, TransportError};
