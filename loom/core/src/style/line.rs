//! Single-line composites: outline and column separator
//!
//! Both carry the local tags `style`, `width` and `color` and resolve to a
//! [`ViewBorder`].

use crate::error::{LoomError, LoomResult};
use crate::properties::enums::BORDER_STYLE;
use crate::properties::resolve::{color_value, enum_value, size_value};
use crate::properties::{ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty};
use crate::values::{Color, SizeUnit, SizeUnitType};

use super::border::ViewBorder;
use super::css::CssBuilder;

fn part_kind(part: &str) -> Option<PropertyKind> {
    match part {
        "style" => Some(PropertyKind::Enum(&BORDER_STYLE)),
        "width" => Some(PropertyKind::Size),
        "color" => Some(PropertyKind::Color),
        _ => None,
    }
}

fn resolve_line(map: &PropertyMap, resolver: &dyn ConstantResolver) -> ViewBorder {
    ViewBorder {
        style: map
            .get("style")
            .and_then(|v| enum_value(v, &BORDER_STYLE, resolver))
            .unwrap_or(0),
        width: map
            .get("width")
            .and_then(|v| size_value(v, resolver))
            .unwrap_or_else(SizeUnit::auto),
        color: map
            .get("color")
            .and_then(|v| color_value(v, resolver))
            .unwrap_or_default(),
    }
}

macro_rules! line_property {
    ($(#[$doc:meta])* $name:ident, $owner:literal, $prefix:literal, $variant:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            map: PropertyMap,
        }

        impl $name {
            /// Line with every part set
            #[must_use]
            pub fn new(style: &str, width: SizeUnit, color: Color) -> Self {
                let mut line = Self::default();
                let index = BORDER_STYLE.index_of(style).unwrap_or(0);
                line.map.insert("style", PropertyValue::Int(index as i64));
                line.map.insert("width", PropertyValue::Size(width));
                line.map.insert("color", PropertyValue::Color(color));
                line
            }

            /// Resolved line
            #[must_use]
            pub fn view_border(&self, resolver: &dyn ConstantResolver) -> ViewBorder {
                resolve_line(&self.map, resolver)
            }
        }

        impl Properties for $name {
            fn owner(&self) -> &'static str {
                $owner
            }

            fn normalize(&self, tag: &str) -> String {
                let tag = tag.trim().to_ascii_lowercase();
                tag.strip_prefix($prefix).unwrap_or(&tag).to_string()
            }

            fn get(&self, tag: &str) -> Option<PropertyValue> {
                self.map.get(&self.normalize(tag)).cloned()
            }

            fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
                let tag = self.normalize(tag);
                match part_kind(&tag) {
                    Some(kind) => self.map.set_typed(&tag, kind, value),
                    None => Err(LoomError::unknown_tag(&tag, $owner)),
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

        impl SubProperty for $name {
            const NAME: &'static str = $owner;

            fn from_stored(value: &PropertyValue) -> Option<&Self> {
                match value {
                    PropertyValue::$variant(line) => Some(line),
                    _ => None,
                }
            }

            fn into_value(self) -> PropertyValue {
                PropertyValue::$variant(Box::new(self))
            }
        }
    };
}

line_property!(
    /// Outline drawn outside the border
    OutlineProperty,
    "outline",
    "outline-",
    Outline
);

line_property!(
    /// Rule drawn between columns of a multi-column container
    ColumnSeparatorProperty,
    "column-separator",
    "column-separator-",
    ColumnSeparator
);

fn fixed_width(width: SizeUnit) -> bool {
    !matches!(
        width.unit,
        SizeUnitType::Auto | SizeUnitType::Fraction | SizeUnitType::Percent
    ) && width.value > 0.0
}

impl OutlineProperty {
    /// Write `outline: w style color` when the line is visible
    pub fn css(&self, builder: &mut CssBuilder, resolver: &dyn ConstantResolver) {
        let line = self.view_border(resolver);
        if line.style > 0 && line.color.alpha() > 0 && fixed_width(line.width) {
            builder.add(
                "outline",
                format!(
                    "{} {} {}",
                    line.width.css_string("0"),
                    BORDER_STYLE.css_value(line.style),
                    line.color.css_string()
                ),
            );
        }
    }
}

impl ColumnSeparatorProperty {
    /// Write `column-rule` from the parts that are set
    pub fn css(&self, builder: &mut CssBuilder, resolver: &dyn ConstantResolver) {
        let line = self.view_border(resolver);
        let mut parts = Vec::with_capacity(3);
        if !matches!(line.width.unit, SizeUnitType::Auto | SizeUnitType::Fraction) && line.width.value > 0.0 {
            parts.push(line.width.css_string("0"));
        }
        if line.style > 0 {
            parts.push(BORDER_STYLE.css_value(line.style).to_string());
        }
        if line.color != Color::TRANSPARENT {
            parts.push(line.color.css_string());
        }
        builder.add_values("column-rule", " ", &parts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;

    #[test]
    fn test_outline_needs_visible_line() {
        let mut builder = CssBuilder::new();
        let outline = OutlineProperty::new("dashed", SizeUnit::px(2.0), Color::RED);
        outline.css(&mut builder, &NoConstants);
        assert_eq!(builder.finish(), "outline: 2px dashed rgb(255,0,0);");

        let mut builder = CssBuilder::new();
        OutlineProperty::new("none", SizeUnit::px(2.0), Color::RED).css(&mut builder, &NoConstants);
        OutlineProperty::new("solid", SizeUnit::percent(5.0), Color::RED).css(&mut builder, &NoConstants);
        OutlineProperty::new("solid", SizeUnit::px(1.0), Color::TRANSPARENT).css(&mut builder, &NoConstants);
        assert!(builder.is_empty());
    }

    #[test]
    fn test_column_rule_parts() {
        let mut rule = ColumnSeparatorProperty::default();
        rule.set("column-separator-style", "dotted");
        rule.set("color", "blue");
        let mut builder = CssBuilder::new();
        rule.css(&mut builder, &NoConstants);
        assert_eq!(builder.finish(), "column-rule: dotted rgb(0,0,255);");
    }

    #[test]
    fn test_unknown_part_rejected() {
        let mut outline = OutlineProperty::default();
        assert!(!outline.set("offset", "2px"));
        assert!(outline.is_empty());
    }
}
