//! Corner radius composite
//!
//! Local tags: `x`, `y` (all corners), `<corner>` (both axes of one corner)
//! and `<corner>-x` / `<corner>-y`. Lookups fall back from the most specific
//! tag to the shared one.

use crate::error::{LoomError, LoomResult};
use crate::properties::resolve::size_value;
use crate::properties::{
    ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty,
};
use crate::values::SizeUnit;

use super::css::CssBuilder;

/// Corners in CSS shorthand order
pub const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

/// Corner radius family of a view
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RadiusProperty {
    map: PropertyMap,
}

impl RadiusProperty {
    /// Same circular radius on every corner
    #[must_use]
    pub fn uniform(radius: SizeUnit) -> Self {
        let mut result = Self::default();
        result.map.insert("x", PropertyValue::Size(radius));
        result.map.insert("y", PropertyValue::Size(radius));
        result
    }

    fn axis_value(&self, corner: &str, axis: &str) -> Option<&PropertyValue> {
        self.map
            .get(&format!("{corner}-{axis}"))
            .or_else(|| self.map.get(corner))
            .or_else(|| self.map.get(axis))
    }

    /// Resolved radii of every corner
    #[must_use]
    pub fn box_radius(&self, resolver: &dyn ConstantResolver) -> BoxRadius {
        let axis = |corner: &str, axis: &str| {
            self.axis_value(corner, axis)
                .and_then(|value| size_value(value, resolver))
                .unwrap_or_else(SizeUnit::auto)
        };
        let corner = |name: &str| (axis(name, "x"), axis(name, "y"));
        BoxRadius {
            top_left: corner("top-left"),
            top_right: corner("top-right"),
            bottom_right: corner("bottom-right"),
            bottom_left: corner("bottom-left"),
        }
    }

    /// Write `border-radius`
    pub fn css(&self, builder: &mut CssBuilder, resolver: &dyn ConstantResolver) {
        builder.add("border-radius", self.box_radius(resolver).css_value());
    }

    fn is_corner(tag: &str) -> bool {
        CORNERS.contains(&tag)
    }

    fn is_corner_axis(tag: &str) -> bool {
        tag.strip_suffix("-x")
            .or_else(|| tag.strip_suffix("-y"))
            .is_some_and(Self::is_corner)
    }
}

impl Properties for RadiusProperty {
    fn owner(&self) -> &'static str {
        "radius"
    }

    fn normalize(&self, tag: &str) -> String {
        let tag = tag.trim().to_ascii_lowercase();
        tag.strip_prefix("radius-").unwrap_or(&tag).to_string()
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        let tag = self.normalize(tag);
        if let Some(value) = self.map.get(&tag) {
            return Some(value.clone());
        }
        if let Some((corner, axis)) = tag.rsplit_once('-') {
            if Self::is_corner(corner) {
                return self.axis_value(corner, axis).cloned();
            }
        }
        None
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        match tag.as_str() {
            "x" | "y" => {
                self.map.set_typed(&tag, PropertyKind::Size, value)?;
                for corner in CORNERS {
                    self.map.remove(&format!("{corner}-{tag}"));
                }
                Ok(())
            }
            corner if Self::is_corner(corner) => {
                if let PropertyValue::Text(text) = &value {
                    if let Some((x, y)) = text.split_once('/') {
                        let x = crate::properties::coerce::coerce(&tag, PropertyKind::Size, x.trim().into())?;
                        let y = crate::properties::coerce::coerce(&tag, PropertyKind::Size, y.trim().into())?;
                        self.map.remove(corner);
                        self.map.insert(format!("{corner}-x"), x);
                        self.map.insert(format!("{corner}-y"), y);
                        return Ok(());
                    }
                }
                self.map.set_typed(corner, PropertyKind::Size, value)?;
                self.map.remove(&format!("{corner}-x"));
                self.map.remove(&format!("{corner}-y"));
                Ok(())
            }
            leaf if Self::is_corner_axis(leaf) => self.map.set_typed(leaf, PropertyKind::Size, value),
            _ => Err(LoomError::unknown_tag(&tag, "radius")),
        }
    }

    fn remove(&mut self, tag: &str) {
        let tag = self.normalize(tag);
        if Self::is_corner(&tag) {
            for leaf in [tag.clone(), format!("{tag}-x"), format!("{tag}-y")] {
                self.map.remove(&leaf);
            }
        } else {
            self.map.remove(&tag);
        }
    }

    fn all_tags(&self) -> Vec<String> {
        self.map.tags()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

impl SubProperty for RadiusProperty {
    const NAME: &'static str = "radius";

    fn from_stored(value: &PropertyValue) -> Option<&Self> {
        match value {
            PropertyValue::Radius(radius) => Some(radius),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Radius(Box::new(self))
    }

    /// `r`, `rx/ry` or a `.rui` object
    fn parse_text(tag: &str, text: &str) -> LoomResult<Self> {
        if text.contains('{') {
            let object = crate::data::DataObject::parse(text)?;
            return Self::build(tag, PropertyValue::Object(object));
        }
        let (x, y) = text.split_once('/').unwrap_or((text, text));
        let mut radius = Self::default();
        radius.set_value("x", x.trim().into())?;
        radius.set_value("y", y.trim().into())?;
        Ok(radius)
    }

    fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        match value {
            PropertyValue::Radius(radius) => Ok(*radius),
            PropertyValue::Size(size) => Ok(Self::uniform(size)),
            PropertyValue::Int(_) | PropertyValue::Float(_) => {
                let mut radius = Self::default();
                radius.set_value("x", value.clone())?;
                radius.set_value("y", value)?;
                Ok(radius)
            }
            PropertyValue::Text(text) => Self::parse_text(tag, &text),
            PropertyValue::Params(params) => {
                let mut radius = Self::default();
                for (leaf, value) in params {
                    radius.set_value(&leaf, value)?;
                }
                Ok(radius)
            }
            PropertyValue::Object(object) => {
                Self::build(tag, PropertyValue::Params(crate::properties::Params::from_object(&object)))
            }
            other => Err(LoomError::incompatible(tag, &other)),
        }
    }
}

/// Resolved `(x, y)` radii of every corner
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxRadius {
    /// Top-left corner
    pub top_left: (SizeUnit, SizeUnit),
    /// Top-right corner
    pub top_right: (SizeUnit, SizeUnit),
    /// Bottom-right corner
    pub bottom_right: (SizeUnit, SizeUnit),
    /// Bottom-left corner
    pub bottom_left: (SizeUnit, SizeUnit),
}

impl BoxRadius {
    fn corners(&self) -> [(SizeUnit, SizeUnit); 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    /// Whether every corner has the same radii
    #[must_use]
    pub fn all_corners_equal(&self) -> bool {
        self.corners().iter().all(|corner| *corner == self.top_left)
    }

    /// `border-radius` value, empty when every radius is zero or auto
    #[must_use]
    pub fn css_value(&self) -> String {
        let corners = self.corners();
        let zero = |size: &SizeUnit| size.is_auto() || size.value == 0.0;
        if corners.iter().all(|(x, y)| zero(x) && zero(y)) {
            return String::new();
        }

        let (x, y) = self.top_left;
        if self.all_corners_equal() {
            return if x == y {
                x.css_string("0")
            } else {
                format!("{} / {}", x.css_string("0"), y.css_string("0"))
            };
        }

        let xs = corners.map(|(x, _)| x.css_string("0")).join(" ");
        if corners.iter().all(|(x, y)| x == y) {
            xs
        } else {
            let ys = corners.map(|(_, y)| y.css_string("0")).join(" ");
            format!("{xs} / {ys}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;

    #[test]
    fn test_uniform_radius_collapses() {
        let radius = RadiusProperty::uniform(SizeUnit::px(4.0));
        assert_eq!(radius.box_radius(&NoConstants).css_value(), "4px");
    }

    #[test]
    fn test_elliptic_corners() {
        let mut radius = RadiusProperty::default();
        radius.set("x", "4px");
        radius.set("y", "2px");
        radius.set("top-left", "8px");
        assert_eq!(
            radius.box_radius(&NoConstants).css_value(),
            "8px 4px 4px 4px / 8px 2px 2px 2px"
        );
    }

    #[test]
    fn test_corner_leaf_falls_back() {
        let mut radius = RadiusProperty::default();
        radius.set("y", "3px");
        radius.set("top-right", "1px/5px");
        assert_eq!(radius.get("bottom-left-y"), Some(PropertyValue::Size(SizeUnit::px(3.0))));
        assert_eq!(radius.get("top-right-y"), Some(PropertyValue::Size(SizeUnit::px(5.0))));
        assert_eq!(radius.get("radius-top-right-x"), Some(PropertyValue::Size(SizeUnit::px(1.0))));
    }

    #[test]
    fn test_text_forms() {
        let radius = RadiusProperty::build("radius", "6px/3px".into()).unwrap();
        assert_eq!(radius.box_radius(&NoConstants).css_value(), "6px / 3px");
    }
}
