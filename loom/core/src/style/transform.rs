//! 2D/3D transform chain

use std::fmt::Write;

use crate::error::{LoomError, LoomResult};
use crate::properties::names as tag;
use crate::properties::resolve::{angle_value, float_value, size_value};
use crate::properties::{ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty};
use crate::values::{format_float, AngleUnit, SizeUnit, SizeUnitType};

fn leaf_kind(leaf: &str) -> Option<PropertyKind> {
    match leaf {
        tag::PERSPECTIVE | tag::TRANSLATE_X | tag::TRANSLATE_Y | tag::TRANSLATE_Z => Some(PropertyKind::Size),
        tag::SCALE_X | tag::SCALE_Y | tag::SCALE_Z | tag::ROTATE_X | tag::ROTATE_Y | tag::ROTATE_Z => {
            Some(PropertyKind::Float)
        }
        tag::ROTATE | tag::SKEW_X | tag::SKEW_Y => Some(PropertyKind::Angle),
        _ => None,
    }
}

/// Transform of a view: perspective, skew, translation, scale and rotation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformProperty {
    map: PropertyMap,
}

impl TransformProperty {
    fn size(&self, leaf: &str, resolver: &dyn ConstantResolver) -> Option<SizeUnit> {
        self.map.get(leaf).and_then(|v| size_value(v, resolver))
    }

    fn angle(&self, leaf: &str, resolver: &dyn ConstantResolver) -> Option<AngleUnit> {
        self.map.get(leaf).and_then(|v| angle_value(v, resolver))
    }

    fn float_text(&self, leaf: &str, resolver: &dyn ConstantResolver) -> (String, bool) {
        match self.map.get(leaf).and_then(|v| float_value(v, resolver)) {
            Some(value) => (format_float(value), true),
            None => ("1".to_string(), false),
        }
    }

    /// CSS `transform` value, empty when nothing applies
    #[must_use]
    pub fn css_value(&self, resolver: &dyn ConstantResolver) -> String {
        let non_zero = |size: &Option<SizeUnit>| size.is_some_and(|s| !s.is_auto() && s.value != 0.0);
        let mut parts: Vec<String> = Vec::new();

        let perspective = self.size(tag::PERSPECTIVE, resolver);
        if let Some(perspective) = perspective.filter(|_| non_zero(&perspective)) {
            parts.push(format!("perspective({})", perspective.css_string("0")));
        }

        let skew_x = self.angle(tag::SKEW_X, resolver);
        let skew_y = self.angle(tag::SKEW_Y, resolver);
        if skew_x.is_some() || skew_y.is_some() {
            parts.push(format!(
                "skew({},{})",
                skew_x.unwrap_or_default().css_string(),
                skew_y.unwrap_or_default().css_string()
            ));
        }

        let x = self.size(tag::TRANSLATE_X, resolver);
        let y = self.size(tag::TRANSLATE_Y, resolver);
        let z = self.size(tag::TRANSLATE_Z, resolver);
        let text = |size: Option<SizeUnit>| size.unwrap_or_else(SizeUnit::auto).css_string("0px");
        if non_zero(&z) {
            parts.push(format!("translate3d({},{},{})", text(x), text(y), text(z)));
        } else if non_zero(&x) || non_zero(&y) {
            parts.push(format!("translate({},{})", text(x), text(y)));
        }

        let (scale_x, has_x) = self.float_text(tag::SCALE_X, resolver);
        let (scale_y, has_y) = self.float_text(tag::SCALE_Y, resolver);
        let (scale_z, has_z) = self.float_text(tag::SCALE_Z, resolver);
        if has_z {
            parts.push(format!("scale3d({scale_x},{scale_y},{scale_z})"));
        } else if has_x || has_y {
            parts.push(format!("scale({scale_x},{scale_y})"));
        }

        if let Some(angle) = self.angle(tag::ROTATE, resolver) {
            let (rx, has_x) = self.float_text(tag::ROTATE_X, resolver);
            let (ry, has_y) = self.float_text(tag::ROTATE_Y, resolver);
            let (rz, has_z) = self.float_text(tag::ROTATE_Z, resolver);
            if has_x || has_y || has_z {
                parts.push(format!("rotate3d({rx},{ry},{rz},{})", angle.css_string()));
            } else {
                parts.push(format!("rotate({})", angle.css_string()));
            }
        }

        parts.join(" ")
    }
}

impl Properties for TransformProperty {
    fn owner(&self) -> &'static str {
        "transform"
    }

    fn normalize(&self, tag: &str) -> String {
        let tag = tag.trim().to_ascii_lowercase();
        tag.strip_prefix("push-").unwrap_or(&tag).to_string()
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        self.map.get(&self.normalize(tag)).cloned()
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        match leaf_kind(&tag) {
            Some(kind) => self.map.set_typed(&tag, kind, value),
            None => Err(LoomError::unknown_tag(&tag, "transform")),
        }
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

impl SubProperty for TransformProperty {
    const NAME: &'static str = "transform";

    fn from_stored(value: &PropertyValue) -> Option<&Self> {
        match value {
            PropertyValue::Transform(transform) => Some(transform),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Transform(Box::new(self))
    }
}

/// `transform-origin` / `perspective-origin` value, empty when all are auto
///
/// Percent values 0, 50 and 100 print as keywords.
#[must_use]
pub fn origin_css(x: SizeUnit, y: SizeUnit, z: SizeUnit) -> String {
    if x.is_auto() && y.is_auto() && z.is_auto() {
        return String::new();
    }
    let axis = |size: SizeUnit, keywords: [&str; 3]| {
        if size.unit == SizeUnitType::Percent {
            match size.value {
                v if v == 0.0 => return keywords[0].to_string(),
                v if v == 50.0 => return keywords[1].to_string(),
                v if v == 100.0 => return keywords[2].to_string(),
                _ => {}
            }
        }
        size.css_string("center")
    };
    let mut text = format!(
        "{} {}",
        axis(x, ["left", "center", "right"]),
        axis(y, ["top", "center", "bottom"])
    );
    if !z.is_auto() && z.value != 0.0 {
        let _ = write!(text, " {}", z.css_string("0"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;

    #[test]
    fn test_chain_order() {
        let mut transform = TransformProperty::default();
        transform.set("rotate", "90deg");
        transform.set("translate-x", "10px");
        transform.set("scale-y", 2);
        transform.set("perspective", "100px");
        assert_eq!(
            transform.css_value(&NoConstants),
            "perspective(100px) translate(10px,0px) scale(1,2) rotate(90deg)"
        );
    }

    #[test]
    fn test_rotate3d_and_push_alias() {
        let mut transform = TransformProperty::default();
        transform.set("push-rotate", "45deg");
        transform.set("rotate-z", 1);
        assert_eq!(transform.css_value(&NoConstants), "rotate3d(1,1,1,45deg)");
    }

    #[test]
    fn test_origin_keywords() {
        assert_eq!(
            origin_css(SizeUnit::percent(0.0), SizeUnit::percent(100.0), SizeUnit::auto()),
            "left bottom"
        );
        assert_eq!(origin_css(SizeUnit::auto(), SizeUnit::auto(), SizeUnit::auto()), "");
        assert_eq!(
            origin_css(SizeUnit::px(5.0), SizeUnit::auto(), SizeUnit::px(2.0)),
            "5px center 2px"
        );
    }
}
