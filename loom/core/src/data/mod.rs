//! `.rui` Data Tree
//!
//! The textual object tree used for themes, styles, view templates and every
//! inbound browser message:
//!
//! ```text
//! click-event{id=id000001, timeStamp=1700, button=0}
//! theme {
//!     colors = _{ ruiTextColor = #FF202020 },
//!     styles = [ ruiButton{ padding = 4px } ],
//! }
//! ```
//!
//! A [`DataObject`] is a tag plus an ordered list of [`DataNode`]s; each node
//! holds a [`DataValue`] which is text, a nested object or an array.

mod parser;
mod writer;

use std::fmt;
use std::str::FromStr;

use crate::error::{LoomError, LoomResult};

pub use parser::parse_data_text;

/// Value held by a [`DataNode`]
#[derive(Clone, Debug, PartialEq)]
pub enum DataValue {
    /// Plain text (bare, quoted or raw in the source)
    Text(String),
    /// Nested object
    Object(DataObject),
    /// Array of texts and objects
    Array(Vec<DataValue>),
}

impl DataValue {
    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Object content, if this is an object value
    #[must_use]
    pub fn as_object(&self) -> Option<&DataObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Array content, if this is an array value
    #[must_use]
    pub fn as_array(&self) -> Option<&[DataValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DataObject> for DataValue {
    fn from(value: DataObject) -> Self {
        Self::Object(value)
    }
}

/// `tag = value` pair inside an object
#[derive(Clone, Debug, PartialEq)]
pub struct DataNode {
    /// Key
    pub tag: String,
    /// Value
    pub value: DataValue,
}

/// Tagged, ordered collection of nodes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataObject {
    tag: String,
    nodes: Vec<DataNode>,
}

impl DataObject {
    /// Create an empty object
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            nodes: Vec::new(),
        }
    }

    /// Parse `.rui` text
    pub fn parse(text: &str) -> LoomResult<Self> {
        parse_data_text(text)
    }

    /// Object tag
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the object has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&DataNode> {
        self.nodes.get(index)
    }

    /// All nodes in source order
    pub fn nodes(&self) -> impl Iterator<Item = &DataNode> {
        self.nodes.iter()
    }

    /// Value of the node with `tag`
    #[must_use]
    pub fn property(&self, tag: &str) -> Option<&DataValue> {
        self.nodes
            .iter()
            .find(|node| node.tag == tag)
            .map(|node| &node.value)
    }

    /// Text value of the node with `tag`
    #[must_use]
    pub fn property_value(&self, tag: &str) -> Option<&str> {
        self.property(tag).and_then(DataValue::as_text)
    }

    /// Object value of the node with `tag`
    #[must_use]
    pub fn property_object(&self, tag: &str) -> Option<&DataObject> {
        self.property(tag).and_then(DataValue::as_object)
    }

    /// Array value of the node with `tag`
    #[must_use]
    pub fn property_array(&self, tag: &str) -> Option<&[DataValue]> {
        self.property(tag).and_then(DataValue::as_array)
    }

    /// Parse the text value of `tag` into `T`
    #[must_use]
    pub fn parse_property<T: FromStr>(&self, tag: &str) -> Option<T> {
        self.property_value(tag).and_then(|text| text.trim().parse().ok())
    }

    /// Float value of `tag`
    #[must_use]
    pub fn float_property(&self, tag: &str) -> Option<f64> {
        self.parse_property(tag)
    }

    /// Bool value of `tag` (`1`/`true`/`yes`/`on` and their negations)
    #[must_use]
    pub fn bool_property(&self, tag: &str) -> Option<bool> {
        self.property_value(tag).and_then(parse_bool)
    }

    /// Set (replace or append) a node
    pub fn set_property(&mut self, tag: impl Into<String>, value: impl Into<DataValue>) {
        let tag = tag.into();
        let value = value.into();
        if let Some(node) = self.nodes.iter_mut().find(|node| node.tag == tag) {
            node.value = value;
        } else {
            self.nodes.push(DataNode { tag, value });
        }
    }

    /// Set a text node
    pub fn set_property_value(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.set_property(tag, DataValue::Text(value.into()));
    }

    /// Set an object node
    pub fn set_property_object(&mut self, tag: impl Into<String>, object: DataObject) {
        self.set_property(tag, DataValue::Object(object));
    }

    /// Remove and return the node with `tag`
    pub fn remove_property(&mut self, tag: &str) -> Option<DataNode> {
        let index = self.nodes.iter().position(|node| node.tag == tag)?;
        Some(self.nodes.remove(index))
    }

    /// Builder-style [`DataObject::set_property_value`]
    #[must_use]
    pub fn with(mut self, tag: &str, value: impl Into<DataValue>) -> Self {
        self.set_property(tag, value);
        self
    }
}

/// Parse the `.rui` spelling of a bool
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&writer::write_object(self))
    }
}

impl FromStr for DataObject {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_data_text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove_properties() {
        let mut object = DataObject::new("obj");
        object.set_property_value("a", "1");
        object.set_property_value("b", "2");
        object.set_property_value("a", "3");

        assert_eq!(object.len(), 2);
        assert_eq!(object.property_value("a"), Some("3"));
        assert_eq!(object.node(1).map(|n| n.tag.as_str()), Some("b"));

        let removed = object.remove_property("a").unwrap();
        assert_eq!(removed.value, DataValue::from("3"));
        assert!(object.property("a").is_none());
    }

    #[test]
    fn test_typed_accessors() {
        let object = DataObject::new("e")
            .with("x", "1.5")
            .with("ctrlKey", "1")
            .with("shiftKey", "false");
        assert_eq!(object.float_property("x"), Some(1.5));
        assert_eq!(object.bool_property("ctrlKey"), Some(true));
        assert_eq!(object.bool_property("shiftKey"), Some(false));
        assert_eq!(object.parse_property::<i64>("x"), None);
    }
}
