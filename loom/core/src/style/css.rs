//! CSS declaration list builder

use std::fmt::Write;

/// Ordered list of CSS declarations
///
/// Empty values are skipped. The text form is `key: value;` entries joined by
/// a single space, the form written into `style="..."` attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssBuilder {
    declarations: Vec<(String, String)>,
}

impl CssBuilder {
    /// Empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key: value;` unless `value` is empty
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.declarations.push((key.to_string(), value));
        }
    }

    /// Append `key` with `values` joined by `separator`
    pub fn add_values<S: AsRef<str>>(&mut self, key: &str, separator: &str, values: &[S]) {
        if values.is_empty() {
            return;
        }
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(separator);
        self.add(key, joined);
    }

    /// Value of the last declaration of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Declarations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether nothing was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// `key: value;` entries joined by a single space
    #[must_use]
    pub fn finish(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.declarations {
            if !text.is_empty() {
                text.push(' ');
            }
            let _ = write!(text, "{key}: {value};");
        }
        text
    }

    /// `selector { key: value; ... }`
    #[must_use]
    pub fn rule(&self, selector: &str) -> String {
        format!("{selector} {{ {} }}", self.finish())
    }
}
