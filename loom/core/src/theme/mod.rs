//! Themes and constants
//!
//! A theme is a `.rui` object with the tag `theme`:
//!
//! ```text
//! theme {
//!     name = default,
//!     constants = _{ ruiPopupTitleHeight = 32px },
//!     constants:touch = _{ ruiButtonPadding = 8px },
//!     colors = _{ ruiTextColor = #FF202020 },
//!     colors:dark = _{ ruiTextColor = #FFE0E0E0 },
//!     images = _{ logo = logo.png },
//!     styles = [
//!         ruiButton { padding = 4px, radius = 4px },
//!         ruiButton:disabled { opacity = 0.5 },
//!     ],
//! }
//! ```
//!
//! # Design Philosophy
//!
//! - The theme is built once, before the first session, and then shared
//!   read-only between sessions behind an `Arc`
//! - Style bags keep `@name` references verbatim; they are resolved while
//!   the style sheet is rendered, against the session's dark/touch flags
//! - A reference chain is followed at most [`MAX_REFERENCE_DEPTH`] steps so a
//!   cycle in the theme reads as a missing resource instead of hanging

mod strings;

pub use strings::StringTables;

use std::collections::BTreeMap;

use crate::data::{DataObject, DataValue};
use crate::error::{LoomError, LoomResult};
use crate::properties::{ConstantResolver, Properties, PropertyBag, PropertyValue};
use crate::style::view_style_css;

/// Longest `@a -> @b -> ...` chain followed before giving up
pub const MAX_REFERENCE_DEPTH: usize = 8;

/// Selector suffix of the disabled variant of a style
const DISABLED_SUFFIX: &str = ":disabled";

/// Theme embedded in the crate, providing every `rui*` class the views use
pub const DEFAULT_THEME: &str = include_str!("default.rui");

/// Named constants, colors, images and styles
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Theme {
    name: String,
    constants: BTreeMap<String, String>,
    touch_constants: BTreeMap<String, String>,
    colors: BTreeMap<String, String>,
    dark_colors: BTreeMap<String, String>,
    images: BTreeMap<String, String>,
    dark_images: BTreeMap<String, String>,
    styles: BTreeMap<String, PropertyBag>,
    disabled_styles: BTreeMap<String, PropertyBag>,
}

impl Theme {
    /// Empty theme
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The embedded default theme
    #[must_use]
    pub fn default_theme() -> Self {
        match Self::from_text(DEFAULT_THEME) {
            Ok(theme) => theme,
            Err(error) => {
                error.log();
                Self::new("default")
            }
        }
    }

    /// Parse `.rui` theme text
    pub fn from_text(text: &str) -> LoomResult<Self> {
        Self::parse(&DataObject::parse(text)?)
    }

    /// Build a theme from a parsed `theme {...}` object
    ///
    /// Unknown sections are ignored; a style property that does not fit its
    /// tag is logged and skipped without dropping the rest of the style.
    pub fn parse(object: &DataObject) -> LoomResult<Self> {
        if object.tag() != "theme" {
            return Err(LoomError::invalid("theme", object.tag()));
        }
        let mut theme = Self::new(object.property_value("name").unwrap_or_default());
        theme.add_object(object);
        Ok(theme)
    }

    /// Merge the sections of another `theme {...}` object into this theme
    pub fn add_object(&mut self, object: &DataObject) {
        for node in object.nodes() {
            let table = match node.tag.as_str() {
                "constants" => &mut self.constants,
                "constants:touch" => &mut self.touch_constants,
                "colors" => &mut self.colors,
                "colors:dark" => &mut self.dark_colors,
                "images" => &mut self.images,
                "images:dark" => &mut self.dark_images,
                "styles" => {
                    if let Some(items) = node.value.as_array() {
                        for item in items.iter().filter_map(DataValue::as_object) {
                            self.add_style(item);
                        }
                    }
                    continue;
                }
                "name" => continue,
                other => {
                    tracing::debug!(section = %other, "ignoring unsupported theme section");
                    continue;
                }
            };
            if let Some(section) = node.value.as_object() {
                for entry in section.nodes() {
                    if let Some(text) = entry.value.as_text() {
                        table.insert(entry.tag.clone(), text.to_string());
                    }
                }
            }
        }
    }

    fn add_style(&mut self, object: &DataObject) {
        let mut bag = PropertyBag::new();
        for node in object.nodes() {
            bag.set(&node.tag, PropertyValue::from_data(&node.value));
        }
        match object.tag().strip_suffix(DISABLED_SUFFIX) {
            Some(base) => self.disabled_styles.insert(base.to_string(), bag),
            None => self.styles.insert(object.tag().to_string(), bag),
        };
    }

    /// Theme name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Constant `tag`, the touch variant first when `touch`
    #[must_use]
    pub fn constant(&self, tag: &str, touch: bool) -> Option<&str> {
        if touch {
            if let Some(value) = self.touch_constants.get(tag) {
                return Some(value);
            }
        }
        self.constants.get(tag).map(String::as_str)
    }

    /// Color `tag`, the dark variant first when `dark`
    #[must_use]
    pub fn color(&self, tag: &str, dark: bool) -> Option<&str> {
        if dark {
            if let Some(value) = self.dark_colors.get(tag) {
                return Some(value);
            }
        }
        self.colors.get(tag).map(String::as_str)
    }

    /// Image `tag`, the dark variant first when `dark`
    #[must_use]
    pub fn image(&self, tag: &str, dark: bool) -> Option<&str> {
        if dark {
            if let Some(value) = self.dark_images.get(tag) {
                return Some(value);
            }
        }
        self.images.get(tag).map(String::as_str)
    }

    /// Style `name`
    #[must_use]
    pub fn style(&self, name: &str) -> Option<&PropertyBag> {
        self.styles.get(name)
    }

    /// Disabled variant of style `name`
    #[must_use]
    pub fn disabled_style(&self, name: &str) -> Option<&PropertyBag> {
        self.disabled_styles.get(name)
    }

    /// Names of all styles in sheet order
    #[must_use]
    pub fn style_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        names.extend(
            self.disabled_styles
                .keys()
                .map(String::as_str)
                .filter(|name| !self.styles.contains_key(*name)),
        );
        names.sort_by(|a, b| sheet_order(a, b));
        names
    }

    /// Define or replace a constant
    pub fn set_constant(&mut self, tag: &str, value: &str, touch: bool) {
        let table = if touch { &mut self.touch_constants } else { &mut self.constants };
        table.insert(tag.to_string(), value.to_string());
    }

    /// Define or replace a color
    pub fn set_color(&mut self, tag: &str, value: &str, dark: bool) {
        let table = if dark { &mut self.dark_colors } else { &mut self.colors };
        table.insert(tag.to_string(), value.to_string());
    }

    /// Define or replace a style
    pub fn set_style(&mut self, name: &str, style: PropertyBag) {
        self.styles.insert(name.to_string(), style);
    }

    /// Resolve `@name` (without the `@`) to its final text
    ///
    /// Constants are searched first, then colors, then images. A value that
    /// is itself a reference is followed up to [`MAX_REFERENCE_DEPTH`] steps.
    ///
    /// # Errors
    ///
    /// [`LoomError::ResourceMissing`] when a name in the chain is undefined or
    /// the chain is too long (a cycle).
    pub fn resolve(&self, name: &str, dark: bool, touch: bool) -> LoomResult<String> {
        let mut current = name;
        for _ in 0..MAX_REFERENCE_DEPTH {
            let value = self
                .constant(current, touch)
                .or_else(|| self.color(current, dark))
                .or_else(|| self.image(current, dark))
                .ok_or_else(|| LoomError::ResourceMissing {
                    name: format!("@{current}"),
                })?;
            match value.strip_prefix('@') {
                Some(next) => current = next,
                None => return Ok(value.to_string()),
            }
        }
        Err(LoomError::ResourceMissing {
            name: format!("@{name} (reference chain longer than {MAX_REFERENCE_DEPTH})"),
        })
    }

    /// Resolver reading this theme with the given flags
    #[must_use]
    pub fn resolver(&self, dark: bool, touch: bool) -> ThemeResolver<'_> {
        ThemeResolver {
            theme: self,
            dark,
            touch,
        }
    }

    // ========================================================================
    // Style sheet
    // ========================================================================

    /// CSS of every style, `rui*` styles first, then the application's
    ///
    /// A disabled variant renders as `.name[data-disabled="1"]`, the attribute
    /// every disabled view carries.
    #[must_use]
    pub fn css_text(&self, dark: bool, touch: bool) -> String {
        let resolver = self.resolver(dark, touch);
        let empty = BTreeMap::new();
        let mut rules = Vec::new();
        for name in self.style_names() {
            if let Some(style) = self.styles.get(name) {
                let css = view_style_css(style, &empty, &resolver);
                if !css.is_empty() {
                    rules.push(css.rule(&format!(".{name}")));
                }
            }
            if let Some(style) = self.disabled_styles.get(name) {
                let css = view_style_css(style, &empty, &resolver);
                if !css.is_empty() {
                    rules.push(css.rule(&format!(".{name}[data-disabled=\"1\"]")));
                }
            }
        }
        rules.join("\n")
    }
}

/// `rui*` names before application names, each group alphabetical
fn sheet_order(a: &str, b: &str) -> std::cmp::Ordering {
    let system = |name: &str| !name.starts_with("rui");
    system(a).cmp(&system(b)).then_with(|| a.cmp(b))
}

/// [`ConstantResolver`] over a theme with fixed dark/touch flags
#[derive(Clone, Copy, Debug)]
pub struct ThemeResolver<'a> {
    theme: &'a Theme,
    dark: bool,
    touch: bool,
}

impl ConstantResolver for ThemeResolver<'_> {
    fn resolve_constant(&self, name: &str) -> Option<String> {
        match self.theme.resolve(name, self.dark, self.touch) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(error = %error, "constant lookup failed");
                None
            }
        }
    }
}
