//! Border composite
//!
//! Local tags: `style`, `width`, `color` (shared by all sides), the side
//! objects `left`, `right`, `top`, `bottom`, and the twelve per-side leaves
//! `<side>-style`, `<side>-width`, `<side>-color`. A per-side leaf overrides
//! the shared value; setting a shared value clears its overrides.

use crate::error::{LoomError, LoomResult};
use crate::properties::enums::BORDER_STYLE;
use crate::properties::resolve::{color_value, enum_value, size_value};
use crate::properties::{
    ConstantResolver, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty,
};
use crate::values::{Color, SizeUnit};

use super::css::CssBuilder;

/// Sides in CSS shorthand order
pub const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const PARTS: [&str; 3] = ["style", "width", "color"];

fn part_kind(part: &str) -> Option<PropertyKind> {
    match part {
        "style" => Some(PropertyKind::Enum(&BORDER_STYLE)),
        "width" => Some(PropertyKind::Size),
        "color" => Some(PropertyKind::Color),
        _ => None,
    }
}

/// Border family of a view
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderProperty {
    map: PropertyMap,
}

impl BorderProperty {
    /// Border with the same line on every side
    #[must_use]
    pub fn uniform(style: &str, width: SizeUnit, color: Color) -> Self {
        let mut border = Self::default();
        let index = BORDER_STYLE.index_of(style).unwrap_or(0);
        border.map.insert("style", PropertyValue::Int(index as i64));
        border.map.insert("width", PropertyValue::Size(width));
        border.map.insert("color", PropertyValue::Color(color));
        border
    }

    fn side_part(&self, side: &str, part: &str) -> Option<&PropertyValue> {
        self.map
            .get(&format!("{side}-{part}"))
            .or_else(|| self.map.get(part))
    }

    fn side_border(&self, side: &str) -> Self {
        let mut result = Self::default();
        for part in PARTS {
            if let Some(value) = self.side_part(side, part) {
                result.map.insert(part, value.clone());
            }
        }
        result
    }

    /// Resolved line of every side
    #[must_use]
    pub fn view_borders(&self, resolver: &dyn ConstantResolver) -> ViewBorders {
        let side = |name: &str| ViewBorder {
            style: self
                .side_part(name, "style")
                .and_then(|v| enum_value(v, &BORDER_STYLE, resolver))
                .unwrap_or(0),
            width: self
                .side_part(name, "width")
                .and_then(|v| size_value(v, resolver))
                .unwrap_or_else(SizeUnit::auto),
            color: self
                .side_part(name, "color")
                .and_then(|v| color_value(v, resolver))
                .unwrap_or_default(),
        };
        ViewBorders {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        }
    }

    /// Write `border` (all sides equal) or the three longhands
    pub fn css(&self, builder: &mut CssBuilder, resolver: &dyn ConstantResolver) {
        self.view_borders(resolver).css(builder);
    }
}

impl Properties for BorderProperty {
    fn owner(&self) -> &'static str {
        "border"
    }

    fn normalize(&self, tag: &str) -> String {
        let tag = tag.trim().to_ascii_lowercase();
        let tag = tag.strip_prefix("border-").unwrap_or(&tag);
        if let Some((part, side)) = tag.split_once('-') {
            if PARTS.contains(&part) && SIDES.contains(&side) {
                return format!("{side}-{part}");
            }
        }
        tag.to_string()
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        let tag = self.normalize(tag);
        if SIDES.contains(&tag.as_str()) {
            let side = self.side_border(&tag);
            return (!side.map.is_empty()).then(|| side.into_value());
        }
        match tag.split_once('-') {
            Some((side, part)) if SIDES.contains(&side) => self.side_part(side, part).cloned(),
            _ => self.map.get(&tag).cloned(),
        }
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);

        if let Some(kind) = part_kind(&tag) {
            self.map.set_typed(&tag, kind, value)?;
            for side in SIDES {
                self.map.remove(&format!("{side}-{tag}"));
            }
            return Ok(());
        }

        if SIDES.contains(&tag.as_str()) {
            let side = Self::build(&tag, value)?;
            for part in PARTS {
                let leaf = format!("{tag}-{part}");
                match side.map.get(part) {
                    Some(value) => self.map.insert(leaf, value.clone()),
                    None => {
                        self.map.remove(&leaf);
                    }
                }
            }
            return Ok(());
        }

        match tag.split_once('-') {
            Some((side, part)) if SIDES.contains(&side) => match part_kind(part) {
                Some(kind) => self.map.set_typed(&tag, kind, value),
                None => Err(LoomError::unknown_tag(&tag, "border")),
            },
            _ => Err(LoomError::unknown_tag(&tag, "border")),
        }
    }

    fn remove(&mut self, tag: &str) {
        let tag = self.normalize(tag);
        if part_kind(&tag).is_some() {
            self.map.remove(&tag);
            for side in SIDES {
                self.map.remove(&format!("{side}-{tag}"));
            }
        } else if SIDES.contains(&tag.as_str()) {
            for part in PARTS {
                self.map.remove(&format!("{tag}-{part}"));
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

impl SubProperty for BorderProperty {
    const NAME: &'static str = "border";

    fn from_stored(value: &PropertyValue) -> Option<&Self> {
        match value {
            PropertyValue::Border(border) => Some(border),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Border(Box::new(self))
    }
}

/// Resolved line of one side
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewBorder {
    /// Index into the border style table
    pub style: usize,
    /// Line width
    pub width: SizeUnit,
    /// Line color
    pub color: Color,
}

/// Resolved lines of all sides
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewBorders {
    /// Top line
    pub top: ViewBorder,
    /// Right line
    pub right: ViewBorder,
    /// Bottom line
    pub bottom: ViewBorder,
    /// Left line
    pub left: ViewBorder,
}

impl ViewBorders {
    fn sides(&self) -> [&ViewBorder; 4] {
        [&self.top, &self.right, &self.bottom, &self.left]
    }

    /// Whether every side has the same line
    #[must_use]
    pub fn all_the_same(&self) -> bool {
        self.sides().iter().all(|side| **side == self.top)
    }

    /// Write `border: w s c` when all sides are equal, otherwise
    /// `border-style`, `border-width` and `border-color` longhands
    pub fn css(&self, builder: &mut CssBuilder) {
        let sides = self.sides();

        if self.all_the_same() {
            let line = self.top;
            let mut parts = Vec::with_capacity(3);
            if !line.width.is_auto() {
                parts.push(line.width.css_string("0"));
            }
            parts.push(BORDER_STYLE.css_value(line.style).to_string());
            if line.color != Color::TRANSPARENT {
                parts.push(line.color.css_string());
            }
            builder.add_values("border", " ", &parts);
            return;
        }

        let styles = sides.map(|side| BORDER_STYLE.css_value(side.style));
        if styles.iter().all(|s| *s == styles[0]) {
            builder.add("border-style", styles[0]);
        } else {
            builder.add_values("border-style", " ", &styles);
        }

        if sides.iter().all(|side| side.width == self.top.width) {
            if !self.top.width.is_auto() {
                builder.add("border-width", self.top.width.css_string("0"));
            }
        } else {
            builder.add_values("border-width", " ", &sides.map(|side| side.width.css_string("0")));
        }

        if sides.iter().all(|side| side.color == self.top.color) {
            if self.top.color != Color::TRANSPARENT {
                builder.add("border-color", self.top.color.css_string());
            }
        } else {
            builder.add_values("border-color", " ", &sides.map(|side| side.color.css_string()));
        }
    }
}
