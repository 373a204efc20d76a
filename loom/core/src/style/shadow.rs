//! Box and text shadows

use crate::error::{LoomError, LoomResult};
use crate::properties::resolve::{bool_value, color_value, size_value};
use crate::properties::{ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty};
use crate::values::{Color, SizeUnit};

fn leaf_kind(leaf: &str) -> Option<PropertyKind> {
    match leaf {
        "color" => Some(PropertyKind::Color),
        "inset" => Some(PropertyKind::Bool),
        "x-offset" | "y-offset" | "blur" | "spread-radius" => Some(PropertyKind::Size),
        _ => None,
    }
}

/// One shadow layer
///
/// Local tags: `color`, `inset`, `x-offset`, `y-offset`, `blur`,
/// `spread-radius`. Text shadows ignore `inset` and `spread-radius`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowProperty {
    map: PropertyMap,
}

struct ResolvedShadow {
    color: Color,
    inset: bool,
    x: SizeUnit,
    y: SizeUnit,
    blur: SizeUnit,
    spread: SizeUnit,
}

fn is_zero(size: SizeUnit) -> bool {
    size.is_auto() || size.value == 0.0
}

impl ShadowProperty {
    /// Box shadow
    #[must_use]
    pub fn new(x: SizeUnit, y: SizeUnit, blur: SizeUnit, spread: SizeUnit, color: Color) -> Self {
        let mut shadow = Self::default();
        shadow.map.insert("x-offset", PropertyValue::Size(x));
        shadow.map.insert("y-offset", PropertyValue::Size(y));
        shadow.map.insert("blur", PropertyValue::Size(blur));
        shadow.map.insert("spread-radius", PropertyValue::Size(spread));
        shadow.map.insert("color", PropertyValue::Color(color));
        shadow
    }

    /// Inner box shadow
    #[must_use]
    pub fn inset(x: SizeUnit, y: SizeUnit, blur: SizeUnit, spread: SizeUnit, color: Color) -> Self {
        let mut shadow = Self::new(x, y, blur, spread, color);
        shadow.map.insert("inset", PropertyValue::Bool(true));
        shadow
    }

    /// Text shadow
    #[must_use]
    pub fn text(x: SizeUnit, y: SizeUnit, blur: SizeUnit, color: Color) -> Self {
        let mut shadow = Self::default();
        shadow.map.insert("x-offset", PropertyValue::Size(x));
        shadow.map.insert("y-offset", PropertyValue::Size(y));
        shadow.map.insert("blur", PropertyValue::Size(blur));
        shadow.map.insert("color", PropertyValue::Color(color));
        shadow
    }

    fn resolve(&self, resolver: &dyn ConstantResolver) -> ResolvedShadow {
        let size = |leaf: &str| {
            self.map
                .get(leaf)
                .and_then(|v| size_value(v, resolver))
                .unwrap_or_else(SizeUnit::auto)
        };
        ResolvedShadow {
            color: self
                .map
                .get("color")
                .and_then(|v| color_value(v, resolver))
                .unwrap_or_default(),
            inset: self
                .map
                .get("inset")
                .and_then(|v| bool_value(v, resolver))
                .unwrap_or(false),
            x: size("x-offset"),
            y: size("y-offset"),
            blur: size("blur"),
            spread: size("spread-radius"),
        }
    }

    /// Whether the box shadow draws anything
    #[must_use]
    pub fn visible(&self, resolver: &dyn ConstantResolver) -> bool {
        let s = self.resolve(resolver);
        s.color.alpha() > 0 && !(is_zero(s.x) && is_zero(s.y) && is_zero(s.blur) && is_zero(s.spread))
    }

    /// `[inset ]x y blur spread color`, `None` when invisible
    #[must_use]
    pub fn box_css(&self, resolver: &dyn ConstantResolver) -> Option<String> {
        if !self.visible(resolver) {
            return None;
        }
        let s = self.resolve(resolver);
        Some(format!(
            "{}{} {} {} {} {}",
            if s.inset { "inset " } else { "" },
            s.x.css_string("0"),
            s.y.css_string("0"),
            s.blur.css_string("0"),
            s.spread.css_string("0"),
            s.color.css_string()
        ))
    }

    /// `x y blur color`, `None` when invisible
    #[must_use]
    pub fn text_css(&self, resolver: &dyn ConstantResolver) -> Option<String> {
        let s = self.resolve(resolver);
        if s.color.alpha() == 0 || (is_zero(s.x) && is_zero(s.y) && is_zero(s.blur)) {
            return None;
        }
        Some(format!(
            "{} {} {} {}",
            s.x.css_string("0"),
            s.y.css_string("0"),
            s.blur.css_string("0"),
            s.color.css_string()
        ))
    }
}

/// `box-shadow` (`text == false`) or `text-shadow` value of a shadow list
#[must_use]
pub fn shadows_css(shadows: &[ShadowProperty], text: bool, resolver: &dyn ConstantResolver) -> String {
    shadows
        .iter()
        .filter_map(|shadow| {
            if text {
                shadow.text_css(resolver)
            } else {
                shadow.box_css(resolver)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl Properties for ShadowProperty {
    fn owner(&self) -> &'static str {
        "shadow"
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        self.map.get(&self.normalize(tag)).cloned()
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        match leaf_kind(&tag) {
            Some(kind) => self.map.set_typed(&tag, kind, value),
            None => Err(LoomError::unknown_tag(&tag, "shadow")),
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

impl ShadowProperty {
    /// Build one shadow from params, an object or its `.rui` text
    pub fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        let params = match value {
            PropertyValue::Shadows(list) if list.len() == 1 => {
                return Ok(list.into_iter().next().unwrap_or_default());
            }
            PropertyValue::Params(params) => params,
            PropertyValue::Object(object) => crate::properties::Params::from_object(&object),
            PropertyValue::Text(text) => {
                let object = crate::data::DataObject::parse(&text)?;
                crate::properties::Params::from_object(&object)
            }
            other => return Err(LoomError::incompatible(tag, &other)),
        };
        let mut shadow = Self::default();
        for (leaf, value) in params {
            shadow.set_value(&leaf, value)?;
        }
        Ok(shadow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{NoConstants, Params};

    #[test]
    fn test_box_and_text_forms() {
        let shadow = ShadowProperty::inset(
            SizeUnit::px(1.0),
            SizeUnit::px(2.0),
            SizeUnit::px(3.0),
            SizeUnit::auto(),
            Color::BLACK,
        );
        assert_eq!(
            shadow.box_css(&NoConstants).as_deref(),
            Some("inset 1px 2px 3px 0 rgb(0,0,0)")
        );
        assert_eq!(shadow.text_css(&NoConstants).as_deref(), Some("1px 2px 3px rgb(0,0,0)"));
    }

    #[test]
    fn test_invisible_shadows_are_skipped() {
        let clear = ShadowProperty::text(SizeUnit::px(1.0), SizeUnit::px(1.0), SizeUnit::auto(), Color::TRANSPARENT);
        let flat = ShadowProperty::text(SizeUnit::auto(), SizeUnit::auto(), SizeUnit::auto(), Color::RED);
        let real = ShadowProperty::text(SizeUnit::px(1.0), SizeUnit::auto(), SizeUnit::auto(), Color::RED);
        assert_eq!(
            shadows_css(&[clear, flat, real.clone(), real], true, &NoConstants),
            "1px 0 0 rgb(255,0,0), 1px 0 0 rgb(255,0,0)"
        );
    }

    #[test]
    fn test_build_from_params() {
        let shadow = ShadowProperty::build(
            "shadow",
            Params::new().with("x-offset", 2).with("color", "red").into(),
        )
        .unwrap();
        assert_eq!(shadow.get("x-offset"), Some(PropertyValue::Size(SizeUnit::px(2.0))));
        assert!(ShadowProperty::build("shadow", Params::new().with("angle", 2).into()).is_err());
    }
}
