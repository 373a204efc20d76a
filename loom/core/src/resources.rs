//! Process-wide resources
//!
//! Themes and string tables are registered before the first session starts
//! and shared read-only afterwards; each session holds an `Arc` of the
//! registry it was created with.

use std::path::Path;

use crate::data::DataObject;
use crate::error::{LoomError, LoomResult};
use crate::theme::{StringTables, Theme};

/// File extension of resource files picked up by [`Resources::load_dir`]
pub const RESOURCE_EXTENSION: &str = "rui";

/// Theme and string tables shared by all sessions
#[derive(Clone, Debug, PartialEq)]
pub struct Resources {
    /// Active theme
    pub theme: Theme,
    /// Localized strings
    pub strings: StringTables,
}

impl Default for Resources {
    fn default() -> Self {
        Self::new()
    }
}

impl Resources {
    /// The built-in theme and no strings
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: Theme::default_theme(),
            strings: StringTables::new(),
        }
    }

    /// Register every top-level object of a `.rui` text
    ///
    /// A `theme` object is merged into the active theme; `strings` and
    /// `strings:<lang>` objects are added to the string tables.
    ///
    /// # Errors
    ///
    /// [`LoomError::InvalidFormat`] when the text does not parse or the
    /// object is neither a theme nor a string table.
    pub fn add_text(&mut self, text: &str) -> LoomResult<()> {
        let object = DataObject::parse(text)?;
        self.add_object(&object)
    }

    /// Register one parsed object
    ///
    /// # Errors
    ///
    /// [`LoomError::InvalidFormat`] for unsupported objects.
    pub fn add_object(&mut self, object: &DataObject) -> LoomResult<()> {
        match object.tag() {
            "theme" => {
                self.theme.add_object(object);
                Ok(())
            }
            tag if tag == "strings" || tag.starts_with("strings:") => self.strings.add_object(object),
            tag => Err(LoomError::invalid("resource", tag)),
        }
    }

    /// Register a `.rui` file
    ///
    /// # Errors
    ///
    /// [`LoomError::ResourceMissing`] when the file cannot be read, or the
    /// errors of [`Resources::add_text`].
    pub fn add_file(&mut self, path: &Path) -> LoomResult<()> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "cannot read resource");
            LoomError::ResourceMissing {
                name: path.display().to_string(),
            }
        })?;
        self.add_text(&text)
    }

    /// Register every `.rui` file of a directory, in name order
    ///
    /// Files that fail to load are logged and skipped. Returns the number of
    /// files registered.
    ///
    /// # Errors
    ///
    /// [`LoomError::ResourceMissing`] when the directory cannot be listed.
    pub fn load_dir(&mut self, dir: &Path) -> LoomResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|_| LoomError::ResourceMissing {
            name: dir.display().to_string(),
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == RESOURCE_EXTENSION))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.add_file(&path) {
                Ok(()) => loaded += 1,
                Err(e) => e.log(),
            }
        }
        tracing::info!(dir = %dir.display(), loaded, "resources loaded");
        Ok(loaded)
    }
}
