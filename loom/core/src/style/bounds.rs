//! Margin and padding quads

use crate::error::{LoomError, LoomResult};
use crate::properties::resolve::size_value;
use crate::properties::{ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty};
use crate::values::SizeUnit;

use super::css::CssBuilder;

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Four side lengths, the input form of `margin` and `padding`
///
/// The view bag never stores this value; it explodes it into the four
/// `<tag>-<side>` leaves and rebuilds it on read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundsProperty {
    map: PropertyMap,
}

impl BoundsProperty {
    /// Same length on every side
    #[must_use]
    pub fn uniform(size: SizeUnit) -> Self {
        let mut bounds = Self::default();
        for side in SIDES {
            bounds.map.insert(side, PropertyValue::Size(size));
        }
        bounds
    }

    /// Resolved lengths, auto where unset
    #[must_use]
    pub fn bounds(&self, resolver: &dyn ConstantResolver) -> Bounds {
        let side = |name: &str| {
            self.map
                .get(name)
                .and_then(|value| size_value(value, resolver))
                .unwrap_or_else(SizeUnit::auto)
        };
        Bounds {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }
}

impl Properties for BoundsProperty {
    fn owner(&self) -> &'static str {
        "bounds"
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        self.map.get(&self.normalize(tag)).cloned()
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        if !SIDES.contains(&tag.as_str()) {
            return Err(LoomError::unknown_tag(&tag, "bounds"));
        }
        self.map.set_typed(&tag, PropertyKind::Size, value)
    }

    fn remove(&mut self, tag: &str) {
        self.map.remove(&self.normalize(tag));
    }

    fn all_tags(&self) -> Vec<String> {
        self.map.tags()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

impl SubProperty for BoundsProperty {
    const NAME: &'static str = "bounds";

    fn from_stored(value: &PropertyValue) -> Option<&Self> {
        match value {
            PropertyValue::Bounds(bounds) => Some(bounds),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Bounds(Box::new(self))
    }

    /// `a` (all sides), `v,h` or `top,right,bottom,left`
    fn parse_text(tag: &str, text: &str) -> LoomResult<Self> {
        if text.contains('{') {
            let object = crate::data::DataObject::parse(text)?;
            return Self::build(tag, PropertyValue::Object(object));
        }
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        let order: [usize; 4] = match parts.len() {
            1 => [0, 0, 0, 0],
            2 => [0, 1, 0, 1],
            4 => [0, 1, 2, 3],
            _ => return Err(LoomError::invalid("bounds", text)),
        };
        let mut bounds = Self::default();
        for (side, index) in SIDES.iter().zip(order) {
            bounds.set_value(side, parts[index].into())?;
        }
        Ok(bounds)
    }

    fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        match value {
            PropertyValue::Bounds(bounds) => Ok(*bounds),
            PropertyValue::Size(size) => Ok(Self::uniform(size)),
            PropertyValue::Int(_) | PropertyValue::Float(_) => {
                let PropertyValue::Size(size) = crate::properties::coerce::coerce(tag, PropertyKind::Size, value)? else {
                    return Err(LoomError::invalid("bounds", tag));
                };
                Ok(Self::uniform(size))
            }
            PropertyValue::Text(text) if text.starts_with('@') => {
                let mut bounds = Self::default();
                for side in SIDES {
                    bounds.map.insert(side, PropertyValue::Text(text.clone()));
                }
                Ok(bounds)
            }
            PropertyValue::Text(text) => Self::parse_text(tag, &text),
            PropertyValue::Params(params) => {
                let mut bounds = Self::default();
                for (side, value) in params {
                    bounds.set_value(&side, value)?;
                }
                Ok(bounds)
            }
            PropertyValue::Object(object) => Self::build(
                tag,
                PropertyValue::Params(crate::properties::Params::from_object(&object)),
            ),
            other => Err(LoomError::incompatible(tag, &other)),
        }
    }
}

/// Resolved side lengths
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Top side
    pub top: SizeUnit,
    /// Right side
    pub right: SizeUnit,
    /// Bottom side
    pub bottom: SizeUnit,
    /// Left side
    pub left: SizeUnit,
}

impl Bounds {
    /// `v` when all sides are equal, else `t r b l`; auto prints as `0`
    #[must_use]
    pub fn css_value(&self) -> String {
        let sides = [self.top, self.right, self.bottom, self.left];
        if sides.iter().all(|side| *side == self.top) {
            self.top.css_string("0")
        } else {
            sides.map(|side| side.css_string("0")).join(" ")
        }
    }

    /// Write `tag: value`
    pub fn css(&self, builder: &mut CssBuilder, tag: &str) {
        builder.add(tag, self.css_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;

    #[test]
    fn test_text_forms() {
        let one = BoundsProperty::build("margin", "4px".into()).unwrap();
        assert_eq!(one.bounds(&NoConstants).css_value(), "4px");

        let two = BoundsProperty::build("margin", "1px, 2px".into()).unwrap();
        assert_eq!(two.bounds(&NoConstants).css_value(), "1px 2px 1px 2px");

        let four = BoundsProperty::build("padding", "1px,2px,3px,4px".into()).unwrap();
        assert_eq!(four.get("left"), Some(PropertyValue::Size(SizeUnit::px(4.0))));
    }

    #[test]
    fn test_bad_text_is_rejected() {
        assert!(BoundsProperty::build("margin", "1px,2px,3px".into()).is_err());
        assert!(BoundsProperty::build("margin", "wide".into()).is_err());
    }

    #[test]
    fn test_auto_prints_zero() {
        let mut bounds = BoundsProperty::default();
        bounds.set("top", "8px");
        assert_eq!(bounds.bounds(&NoConstants).css_value(), "8px 0 0 0");
    }
}
