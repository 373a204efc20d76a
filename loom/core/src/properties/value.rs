//! The tagged sum of every storable property value

use std::collections::BTreeMap;

use crate::animation::Animation;
use crate::data::{DataObject, DataValue};
use crate::events::ListenerList;
use crate::style::{
    BackgroundElement, BorderProperty, BoundsProperty, ColumnSeparatorProperty, FilterProperty,
    GradientPoint, OutlineProperty, RadiusProperty, ShadowProperty, TransformProperty,
};
use crate::values::{AngleUnit, Color, Range, SizeUnit};
use crate::view::ViewId;

/// A property value
///
/// Inputs may use any variant; the owning bag coerces them to the canonical
/// variant of the tag's kind before storing. A `Text` that starts with `@` is
/// a constant reference and is stored as-is for every scalar kind.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    // ========================================================================
    // Scalars
    // ========================================================================
    /// Flag
    Bool(bool),
    /// Integer (also the index of an enum value)
    Int(i64),
    /// Float
    Float(f64),
    /// Text or `@constant` reference
    Text(String),
    /// ARGB color
    Color(Color),
    /// CSS length
    Size(SizeUnit),
    /// CSS angle
    Angle(AngleUnit),
    /// Grid span
    Range(Range),

    // ========================================================================
    // Lists and raw objects
    // ========================================================================
    /// Lengths (grid cell sizes)
    Sizes(Vec<SizeUnit>),
    /// Texts
    Texts(Vec<String>),
    /// Ordered `tag -> value` map used to build composite values
    Params(Params),
    /// Raw `.rui` object
    Object(DataObject),
    /// Raw `.rui` objects
    Objects(Vec<DataObject>),

    // ========================================================================
    // Composite sub-properties
    // ========================================================================
    /// Border family
    Border(Box<BorderProperty>),
    /// Corner radii
    Radius(Box<RadiusProperty>),
    /// Margin or padding quad
    Bounds(Box<BoundsProperty>),
    /// Outline
    Outline(Box<OutlineProperty>),
    /// Transform chain
    Transform(Box<TransformProperty>),
    /// Filter chain
    Filter(Box<FilterProperty>),
    /// Column rule
    ColumnSeparator(Box<ColumnSeparatorProperty>),
    /// Box or text shadows
    Shadows(Vec<ShadowProperty>),
    /// Background layers
    Background(Vec<BackgroundElement>),
    /// Gradient stops
    GradientPoints(Vec<GradientPoint>),

    // ========================================================================
    // Animation, events, children
    // ========================================================================
    /// One animation descriptor
    Animation(Box<Animation>),
    /// `property tag -> transition descriptor`
    Transitions(BTreeMap<String, Animation>),
    /// Keyframe animations
    Animations(Vec<Animation>),
    /// Listener callbacks of one event
    Listeners(ListenerList),
    /// Child views
    Views(Vec<ViewId>),
}

impl PropertyValue {
    /// Text content, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a `@constant` reference
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.as_text().is_some_and(|t| t.starts_with('@'))
    }

    /// Convert a parsed `.rui` value
    #[must_use]
    pub fn from_data(value: &DataValue) -> Self {
        match value {
            DataValue::Text(text) => Self::Text(text.clone()),
            DataValue::Object(object) => Self::Object(object.clone()),
            DataValue::Array(items) => {
                if items.iter().all(|item| item.as_text().is_some()) {
                    Self::Texts(
                        items
                            .iter()
                            .filter_map(DataValue::as_text)
                            .map(String::from)
                            .collect(),
                    )
                } else {
                    Self::Objects(items.iter().filter_map(DataValue::as_object).cloned().collect())
                }
            }
        }
    }

    /// Short name of the variant for diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Color(_) => "color",
            Self::Size(_) => "size",
            Self::Angle(_) => "angle",
            Self::Range(_) => "range",
            Self::Sizes(_) => "sizes",
            Self::Texts(_) => "texts",
            Self::Params(_) => "params",
            Self::Object(_) => "object",
            Self::Objects(_) => "objects",
            Self::Border(_) => "border",
            Self::Radius(_) => "radius",
            Self::Bounds(_) => "bounds",
            Self::Outline(_) => "outline",
            Self::Transform(_) => "transform",
            Self::Filter(_) => "filter",
            Self::ColumnSeparator(_) => "column-separator",
            Self::Shadows(_) => "shadows",
            Self::Background(_) => "background",
            Self::GradientPoints(_) => "gradient",
            Self::Animation(_) => "animation",
            Self::Transitions(_) => "transitions",
            Self::Animations(_) => "animations",
            Self::Listeners(_) => "listeners",
            Self::Views(_) => "views",
        }
    }
}

/// Ordered `tag -> value` list, the Rust spelling of an inline `{k = v}` literal
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(Vec<(String, PropertyValue)>);

impl Params {
    /// Empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set `tag` to `value`
    #[must_use]
    pub fn with(mut self, tag: &str, value: impl Into<PropertyValue>) -> Self {
        self.insert(tag, value);
        self
    }

    /// Replace or append `tag`
    pub fn insert(&mut self, tag: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(t, _)| t == tag) {
            entry.1 = value;
        } else {
            self.0.push((tag.to_string(), value));
        }
    }

    /// Value of `tag`
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&PropertyValue> {
        self.0.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from a `.rui` object (tag dropped)
    #[must_use]
    pub fn from_object(object: &DataObject) -> Self {
        Self(
            object
                .nodes()
                .map(|node| (node.tag.clone(), PropertyValue::from_data(&node.value)))
                .collect(),
        )
    }
}

impl IntoIterator for Params {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

macro_rules! from_impl {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

macro_rules! from_boxed_impl {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(Box::new(value))
                }
            }
        )+
    };
}

from_impl!(
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => Text,
    Color => Color,
    SizeUnit => Size,
    AngleUnit => Angle,
    Range => Range,
    Vec<SizeUnit> => Sizes,
    Vec<String> => Texts,
    Params => Params,
    DataObject => Object,
    Vec<ShadowProperty> => Shadows,
    Vec<BackgroundElement> => Background,
    Vec<GradientPoint> => GradientPoints,
    BTreeMap<String, Animation> => Transitions,
    Vec<Animation> => Animations,
    ListenerList => Listeners,
    Vec<ViewId> => Views,
);

from_boxed_impl!(
    BorderProperty => Border,
    RadiusProperty => Radius,
    BoundsProperty => Bounds,
    OutlineProperty => Outline,
    TransformProperty => Transform,
    FilterProperty => Filter,
    ColumnSeparatorProperty => ColumnSeparator,
    Animation => Animation,
);

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<ShadowProperty> for PropertyValue {
    fn from(value: ShadowProperty) -> Self {
        Self::Shadows(vec![value])
    }
}

impl From<BackgroundElement> for PropertyValue {
    fn from(value: BackgroundElement) -> Self {
        Self::Background(vec![value])
    }
}

impl From<ViewId> for PropertyValue {
    fn from(value: ViewId) -> Self {
        Self::Views(vec![value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_insert_keeps_order() {
        let params = Params::new()
            .with("style", "solid")
            .with("width", SizeUnit::px(1.0))
            .with("style", "dashed");
        let tags: Vec<_> = params.iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["style", "width"]);
        assert_eq!(params.get("style"), Some(&PropertyValue::from("dashed")));
    }

    #[test]
    fn test_from_data_arrays() {
        let texts = DataValue::Array(vec!["a".into(), "b".into()]);
        assert_eq!(
            PropertyValue::from_data(&texts),
            PropertyValue::Texts(vec!["a".into(), "b".into()])
        );

        let objects = DataValue::Array(vec![DataValue::Object(DataObject::new("x"))]);
        assert!(matches!(
            PropertyValue::from_data(&objects),
            PropertyValue::Objects(ref o) if o.len() == 1
        ));
    }

    #[test]
    fn test_constant_detection() {
        assert!(PropertyValue::from("@buttonColor").is_constant());
        assert!(!PropertyValue::from("red").is_constant());
        assert!(!PropertyValue::Int(3).is_constant());
    }
}
