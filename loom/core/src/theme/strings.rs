//! Localized string tables
//!
//! Accepted forms:
//!
//! ```text
//! strings:ru { hello = "Привет" }
//! strings { en = _{ hello = Hello }, ru = _{ hello = "Привет" } }
//! strings { hello = Hello }          // default table
//! ```

use std::collections::HashMap;

use crate::data::DataObject;
use crate::error::{LoomError, LoomResult};

/// Language used for text entries written directly under `strings`
const DEFAULT_LANGUAGE: &str = "";

/// String tables keyed by language
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringTables {
    tables: HashMap<String, HashMap<String, String>>,
}

impl StringTables {
    /// No tables
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the entries of a `strings` or `strings:<lang>` object
    ///
    /// # Errors
    ///
    /// [`LoomError::InvalidFormat`] when the object is not a string table.
    pub fn add_object(&mut self, object: &DataObject) -> LoomResult<()> {
        if let Some(lang) = object.tag().strip_prefix("strings:") {
            if lang.is_empty() {
                return Err(LoomError::invalid("strings", object.tag()));
            }
            self.add_table(lang, object);
            return Ok(());
        }
        if object.tag() != "strings" {
            return Err(LoomError::invalid("strings", object.tag()));
        }
        for node in object.nodes() {
            if let Some(table) = node.value.as_object() {
                self.add_table(&node.tag, table);
            } else if let Some(text) = node.value.as_text() {
                self.insert(DEFAULT_LANGUAGE, &node.tag, text);
            }
        }
        Ok(())
    }

    fn add_table(&mut self, lang: &str, object: &DataObject) {
        for node in object.nodes() {
            if let Some(text) = node.value.as_text() {
                self.insert(lang, &node.tag, text);
            }
        }
    }

    /// Add one entry
    pub fn insert(&mut self, lang: &str, tag: &str, text: &str) {
        self.tables
            .entry(lang.to_string())
            .or_default()
            .insert(tag.to_string(), text.to_string());
    }

    /// Entry of `tag` in exactly `lang`
    #[must_use]
    pub fn get(&self, lang: &str, tag: &str) -> Option<&str> {
        self.tables.get(lang)?.get(tag).map(String::as_str)
    }

    /// Text of `tag` for the first matching language, then the default table
    ///
    /// Falls back to the tag itself; the second value tells whether an entry
    /// was found.
    #[must_use]
    pub fn lookup(&self, tag: &str, languages: &[String]) -> (String, bool) {
        let found = languages
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DEFAULT_LANGUAGE))
            .find_map(|lang| self.get(lang, tag));
        match found {
            Some(text) => (text.to_string(), true),
            None => {
                tracing::debug!(tag = %tag, "no string resource");
                (tag.to_string(), false)
            }
        }
    }

    /// Whether no entry exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> StringTables {
        let mut tables = StringTables::new();
        tables
            .add_object(&DataObject::parse("strings { en = _{ hello = Hello, bye = Bye }, ok = OK }").unwrap())
            .unwrap();
        tables
            .add_object(&DataObject::parse("strings:de { hello = Hallo }").unwrap())
            .unwrap();
        tables
    }

    #[test]
    fn test_language_fallback() {
        let tables = tables();
        let langs = vec!["de".to_string(), "en".to_string()];
        assert_eq!(tables.lookup("hello", &langs), ("Hallo".to_string(), true));
        assert_eq!(tables.lookup("bye", &langs), ("Bye".to_string(), true));
        assert_eq!(tables.lookup("ok", &langs), ("OK".to_string(), true));
        assert_eq!(tables.lookup("missing", &langs), ("missing".to_string(), false));
    }

    #[test]
    fn test_rejects_other_objects() {
        let mut tables = StringTables::new();
        assert!(tables.add_object(&DataObject::parse("theme { }").unwrap()).is_err());
        assert!(tables.add_object(&DataObject::parse("strings: { a = b }").unwrap()).is_err());
        assert!(tables.is_empty());
    }
}
