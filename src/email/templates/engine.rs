//! Placeholder interpolation
//!
//! Placeholders are written `?name?`. Any text between two delimiters is a
//! candidate name; it is substituted only when the value map has it.

use std::collections::HashMap;

const DELIMITER: char = '?';

/// Replace every `?token?` whose value is `Some` in a single left-to-right pass.
///
/// Unknown tokens and tokens mapped to `None` are kept literally. Substituted
/// text is never rescanned.
pub fn interpolate(template: &str, values: &HashMap<String, Option<String>>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(DELIMITER) {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let replacement = after.find(DELIMITER).and_then(|end| {
            let token = &after[..end];
            if token.is_empty() {
                return None;
            }
            values
                .get(token)
                .and_then(|value| value.as_deref())
                .map(|value| (value, end))
        });

        match replacement {
            Some((value, end)) => {
                output.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                output.push(DELIMITER);
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Template rendering engine with placeholder substitution
#[derive(Debug, Default, Clone)]
pub struct TemplateEngine {
    variables: HashMap<String, Option<String>>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), Some(value.into()));
        self
    }

    /// Set a variable that may be absent; `None` leaves its placeholder in place
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> &mut Self {
        self.variables.insert(key.into(), value.map(Into::into));
        self
    }

    /// Set multiple variables from an iterator
    pub fn set_all<I, K, V>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in iter {
            self.variables.insert(k.into(), Some(v.into()));
        }
        self
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> String {
        interpolate(template, &self.variables)
    }
}
