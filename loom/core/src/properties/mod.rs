//! Property model
//!
//! Every view, style and composite value is a tag-keyed bag behind the
//! [`Properties`] trait.
//!
//! # Design Philosophy
//!
//! - One tagged sum ([`PropertyValue`]) for every stored value, one schema
//!   table ([`schema`]) per bag deciding how an input is coerced
//! - Composite families (border, radius, ...) are bags of their own
//!   ([`SubProperty`]); the view bag delegates leaf tags to them
//! - A failed set never leaves a bag partially mutated

pub mod bag;
pub mod coerce;
pub mod enums;
pub mod names;
pub mod resolve;
pub mod schema;
pub mod value;

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::data::DataObject;
use crate::error::{LoomError, LoomResult};

pub use bag::{ChangeListener, PropertyBag};
pub use enums::EnumTable;
pub use resolve::{ConstantResolver, NoConstants};
pub use schema::{normalize_view_tag, CompositeKind, PropertyKind};
pub use value::{Params, PropertyValue};

/// A tag-keyed property bag
pub trait Properties {
    /// Human readable bag name for diagnostics
    fn owner(&self) -> &'static str;

    /// Canonical spelling of `tag` in this bag
    fn normalize(&self, tag: &str) -> String {
        tag.trim().to_ascii_lowercase()
    }

    /// Current value of `tag`
    fn get(&self, tag: &str) -> Option<PropertyValue>;

    /// Set `tag`, all-or-nothing
    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()>;

    /// Remove `tag` (no-op when absent)
    fn remove(&mut self, tag: &str);

    /// Tags that currently hold a value
    fn all_tags(&self) -> Vec<String>;

    /// Remove everything
    fn clear(&mut self);

    /// Whether no tag holds a value
    fn is_empty(&self) -> bool {
        self.all_tags().is_empty()
    }

    /// Set `tag`, logging a rejected value instead of returning it
    fn set(&mut self, tag: &str, value: impl Into<PropertyValue>) -> bool
    where
        Self: Sized,
    {
        match self.set_value(tag, value.into()) {
            Ok(()) => true,
            Err(error) => {
                error.log();
                false
            }
        }
    }
}

/// A composite value stored under one aggregate tag of a view
pub trait SubProperty: Properties + Default + Clone + PartialEq + Debug {
    /// Name used in diagnostics
    const NAME: &'static str;

    /// Borrow `Self` out of a stored value
    fn from_stored(value: &PropertyValue) -> Option<&Self>;

    /// Wrap into the matching [`PropertyValue`] variant
    fn into_value(self) -> PropertyValue;

    /// Parse the text form (by default a `.rui` object such as `_{style = solid}`)
    fn parse_text(tag: &str, text: &str) -> LoomResult<Self> {
        if text.contains('{') {
            let object = DataObject::parse(text)?;
            return Self::build(tag, PropertyValue::Object(object));
        }
        Err(LoomError::incompatible(tag, &text))
    }

    /// Build from any accepted input
    fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        if let Some(existing) = Self::from_stored(&value) {
            return Ok(existing.clone());
        }
        let params = match value {
            PropertyValue::Params(params) => params,
            PropertyValue::Object(object) => Params::from_object(&object),
            PropertyValue::Text(text) => return Self::parse_text(tag, &text),
            other => return Err(LoomError::incompatible(tag, &other)),
        };
        let mut result = Self::default();
        for (leaf, value) in params {
            result.set_value(&leaf, value)?;
        }
        Ok(result)
    }
}

/// Typed storage shared by the composite bags
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    values: BTreeMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Stored value of `tag`
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&PropertyValue> {
        self.values.get(tag)
    }

    /// Coerce `value` to `kind` and store it
    pub fn set_typed(&mut self, tag: &str, kind: PropertyKind, value: PropertyValue) -> LoomResult<()> {
        let value = coerce::coerce(tag, kind, value)?;
        self.values.insert(tag.to_string(), value);
        Ok(())
    }

    /// Store `value` unchecked
    pub fn insert(&mut self, tag: impl Into<String>, value: PropertyValue) {
        self.values.insert(tag.into(), value);
    }

    /// Remove and return `tag`
    pub fn remove(&mut self, tag: &str) -> Option<PropertyValue> {
        self.values.remove(tag)
    }

    /// Stored tags in sorted order
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(tag, value)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(t, v)| (t.as_str(), v))
    }
}
