//! Background layers: image, linear, radial and conic gradients
//!
//! A view's `background` is an ordered list of [`BackgroundElement`]s. Each
//! element is a small property bag whose accepted tags depend on its kind.
//! The CSS text of a gradient layer ends with `") "` so layers can be
//! concatenated.

use std::fmt::Write;

use crate::data::{DataObject, DataValue};
use crate::error::{LoomError, LoomResult};
use crate::properties::coerce::coerce;
use crate::properties::enums::{
    ATTACHMENT, BACKGROUND_FIT, DIRECTION, IMAGE_HORIZONTAL_ALIGN, IMAGE_VERTICAL_ALIGN,
    RADIAL_GRADIENT_RADIUS, RADIAL_GRADIENT_SHAPE, REPEAT,
};
use crate::properties::resolve::{
    angle_value, bool_value, color_value, enum_value, resolve_text, size_value, text_value,
};
use crate::properties::{ConstantResolver, Params, Properties, PropertyKind, PropertyMap, PropertyValue};
use crate::values::{AngleUnit, Color, SizeUnit, SizeUnitType};

// ============================================================================
// Gradient stops
// ============================================================================

/// One color stop of a gradient
///
/// `color` holds a [`Color`] or an `@constant`. `position` holds a length
/// (linear and radial), an angle (conic) or an `@constant`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientPoint {
    /// Stop color
    pub color: PropertyValue,
    /// Optional stop position
    pub position: Option<PropertyValue>,
}

impl GradientPoint {
    /// Stop with a length position
    #[must_use]
    pub fn new(color: Color, position: Option<SizeUnit>) -> Self {
        Self {
            color: PropertyValue::Color(color),
            position: position.map(PropertyValue::Size),
        }
    }

    /// Stop with an angle position (conic gradients)
    #[must_use]
    pub fn at_angle(color: Color, angle: AngleUnit) -> Self {
        Self {
            color: PropertyValue::Color(color),
            position: Some(PropertyValue::Angle(angle)),
        }
    }

    /// Parse `color [position]`
    pub fn parse(text: &str) -> LoomResult<Self> {
        let text = text.trim();
        let (color_text, position_text) = match text.split_once(' ') {
            Some((color, position)) => (color, position.trim()),
            None => (text, ""),
        };
        if color_text.is_empty() {
            return Err(LoomError::invalid("gradient point", text));
        }
        Ok(Self {
            color: Self::color_input(color_text)?,
            position: Self::position_input(position_text)?,
        })
    }

    fn color_input(text: &str) -> LoomResult<PropertyValue> {
        if text.starts_with('@') {
            Ok(PropertyValue::Text(text.to_string()))
        } else {
            Ok(PropertyValue::Color(Color::parse(text)?))
        }
    }

    fn position_input(text: &str) -> LoomResult<Option<PropertyValue>> {
        if text.is_empty() {
            return Ok(None);
        }
        if text.starts_with('@') {
            return Ok(Some(PropertyValue::Text(text.to_string())));
        }
        if let Ok(size) = SizeUnit::parse(text) {
            return Ok(Some(PropertyValue::Size(size)));
        }
        Ok(Some(PropertyValue::Angle(AngleUnit::parse(text)?)))
    }

    /// Build from `{color = ..., pos = ...}`
    pub fn from_object(object: &DataObject) -> LoomResult<Self> {
        let color = object
            .property_value("color")
            .ok_or_else(|| LoomError::invalid("gradient point", object.to_string()))?;
        let position = object
            .property_value("pos")
            .or_else(|| object.property_value("position"))
            .unwrap_or("");
        Ok(Self {
            color: Self::color_input(color)?,
            position: Self::position_input(position)?,
        })
    }

    fn css(&self, angular: bool, resolver: &dyn ConstantResolver) -> Option<String> {
        let color = color_value(&self.color, resolver)?;
        let mut text = if color.alpha() == 255 {
            color.rgb_string()
        } else {
            color.css_string()
        };
        if let Some(position) = &self.position {
            if angular {
                if let Some(angle) = angle_value(position, resolver) {
                    let _ = write!(text, " {}", angle.css_string());
                }
            } else if let Some(size) = size_value(position, resolver).filter(|s| !s.is_auto()) {
                let _ = write!(text, " {}", stop_position(size));
            }
        }
        Some(text)
    }
}

fn stop_position(size: SizeUnit) -> String {
    if size.unit == SizeUnitType::Em {
        size.css_string("")
    } else {
        size.to_string()
    }
}

fn parse_points(text: &str) -> LoomResult<Vec<GradientPoint>> {
    let points = text
        .split(',')
        .map(GradientPoint::parse)
        .collect::<LoomResult<Vec<_>>>()?;
    if points.len() < 2 {
        return Err(LoomError::invalid("gradient", "at least 2 points expected"));
    }
    Ok(points)
}

fn gradient_input(tag: &str, value: PropertyValue) -> LoomResult<PropertyValue> {
    let points = match value {
        PropertyValue::Text(text) if text.starts_with('@') && !text.contains(',') => {
            return Ok(PropertyValue::Text(text));
        }
        PropertyValue::Text(text) => parse_points(&text)?,
        PropertyValue::Texts(texts) => texts
            .iter()
            .map(|text| GradientPoint::parse(text))
            .collect::<LoomResult<_>>()?,
        PropertyValue::Objects(objects) => objects
            .iter()
            .map(GradientPoint::from_object)
            .collect::<LoomResult<_>>()?,
        PropertyValue::GradientPoints(points) => points,
        other => return Err(LoomError::incompatible(tag, &other)),
    };
    if points.len() < 2 {
        return Err(LoomError::invalid("gradient", "at least 2 points expected"));
    }
    Ok(PropertyValue::GradientPoints(points))
}

// ============================================================================
// Layers
// ============================================================================

/// Kind of a background layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundKind {
    /// `url(...)` image
    Image,
    /// `linear-gradient(...)`
    LinearGradient,
    /// `radial-gradient(...)`
    RadialGradient,
    /// `conic-gradient(...)`
    ConicGradient,
}

impl BackgroundKind {
    /// `.rui` object tag of the kind
    #[must_use]
    pub fn object_tag(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::LinearGradient => "linear-gradient",
            Self::RadialGradient => "radial-gradient",
            Self::ConicGradient => "conic-gradient",
        }
    }

    fn from_object_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "linear-gradient" => Some(Self::LinearGradient),
            "radial-gradient" => Some(Self::RadialGradient),
            "conic-gradient" => Some(Self::ConicGradient),
            _ => None,
        }
    }
}

/// One layer of a view background
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundElement {
    kind: BackgroundKind,
    map: PropertyMap,
}

impl BackgroundElement {
    /// Empty layer of `kind`
    #[must_use]
    pub fn new(kind: BackgroundKind) -> Self {
        Self {
            kind,
            map: PropertyMap::default(),
        }
    }

    /// Layer of `kind` with every param applied
    pub fn with_params(kind: BackgroundKind, params: Params) -> LoomResult<Self> {
        let mut element = Self::new(kind);
        for (tag, value) in params {
            element.set_value(&tag, value)?;
        }
        Ok(element)
    }

    /// Image layer
    pub fn image(params: Params) -> LoomResult<Self> {
        Self::with_params(BackgroundKind::Image, params)
    }

    /// Linear gradient layer
    pub fn linear_gradient(params: Params) -> LoomResult<Self> {
        Self::with_params(BackgroundKind::LinearGradient, params)
    }

    /// Radial gradient layer
    pub fn radial_gradient(params: Params) -> LoomResult<Self> {
        Self::with_params(BackgroundKind::RadialGradient, params)
    }

    /// Conic gradient layer
    pub fn conic_gradient(params: Params) -> LoomResult<Self> {
        Self::with_params(BackgroundKind::ConicGradient, params)
    }

    /// Layer kind
    #[must_use]
    pub fn kind(&self) -> BackgroundKind {
        self.kind
    }

    /// Build from a `.rui` object (its tag names the kind) or its text
    pub fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        match value {
            PropertyValue::Background(mut list) if list.len() == 1 => {
                list.pop().ok_or_else(|| LoomError::incompatible(tag, &"[]"))
            }
            PropertyValue::Object(object) => Self::from_object(&object),
            PropertyValue::Text(text) => Self::from_object(&DataObject::parse(&text)?),
            other => Err(LoomError::incompatible(tag, &other)),
        }
    }

    fn from_object(object: &DataObject) -> LoomResult<Self> {
        let kind = BackgroundKind::from_object_tag(object.tag())
            .ok_or_else(|| LoomError::invalid("background element", object.tag().to_string()))?;
        let mut element = Self::new(kind);
        for node in object.nodes() {
            let value = match &node.value {
                DataValue::Array(items) if node.tag == "gradient" => PropertyValue::Objects(
                    items.iter().filter_map(DataValue::as_object).cloned().collect(),
                ),
                other => PropertyValue::from_data(other),
            };
            element.set_value(&node.tag, value)?;
        }
        Ok(element)
    }

    fn leaf_kind(&self, tag: &str) -> Option<PropertyKind> {
        use BackgroundKind as B;
        match (self.kind, tag) {
            (B::Image, "src") => Some(PropertyKind::Text),
            (B::Image, "width" | "height") => Some(PropertyKind::Size),
            (B::Image, "attachment") => Some(PropertyKind::Enum(&ATTACHMENT)),
            (B::Image, "repeat") => Some(PropertyKind::Enum(&REPEAT)),
            (B::Image, "fit") => Some(PropertyKind::Enum(&BACKGROUND_FIT)),
            (B::Image, "image-horizontal-align") => Some(PropertyKind::Enum(&IMAGE_HORIZONTAL_ALIGN)),
            (B::Image, "image-vertical-align") => Some(PropertyKind::Enum(&IMAGE_VERTICAL_ALIGN)),
            (B::Image, _) => None,
            (_, "repeating") => Some(PropertyKind::Bool),
            (B::RadialGradient, "radial-gradient-shape") => Some(PropertyKind::Enum(&RADIAL_GRADIENT_SHAPE)),
            (B::RadialGradient | B::ConicGradient, "center-x" | "center-y") => Some(PropertyKind::Size),
            (B::ConicGradient, "from") => Some(PropertyKind::Angle),
            _ => None,
        }
    }

    fn set_direction(&mut self, value: PropertyValue) -> LoomResult<()> {
        let stored = match value {
            PropertyValue::Angle(angle) => PropertyValue::Angle(angle),
            PropertyValue::Text(text) if text.starts_with('@') => PropertyValue::Text(text),
            PropertyValue::Text(text) => match DIRECTION.index_of(&text) {
                Some(index) => PropertyValue::Int(index as i64),
                None => PropertyValue::Angle(AngleUnit::parse(&text)?),
            },
            other => coerce("direction", PropertyKind::Enum(&DIRECTION), other)?,
        };
        self.map.insert("direction", stored);
        Ok(())
    }

    fn set_radial_radius(&mut self, value: PropertyValue) -> LoomResult<()> {
        const TAG: &str = "radial-gradient-radius";
        let stored = match value {
            PropertyValue::Text(text) if text.starts_with('@') => Some(PropertyValue::Text(text)),
            PropertyValue::Text(text) => match SizeUnit::parse(&text) {
                Ok(size) => (!size.is_auto()).then_some(PropertyValue::Size(size)),
                Err(_) => Some(coerce(TAG, PropertyKind::Enum(&RADIAL_GRADIENT_RADIUS), text.into())?),
            },
            PropertyValue::Size(size) => (!size.is_auto()).then_some(PropertyValue::Size(size)),
            PropertyValue::Sizes(sizes) => match sizes.len() {
                0 => None,
                1 => (!sizes[0].is_auto()).then_some(PropertyValue::Size(sizes[0])),
                _ => Some(PropertyValue::Sizes(sizes)),
            },
            other => Some(coerce(TAG, PropertyKind::Enum(&RADIAL_GRADIENT_RADIUS), other)?),
        };
        match stored {
            Some(value) => self.map.insert(TAG, value),
            None => {
                self.map.remove(TAG);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // CSS
    // ------------------------------------------------------------------------

    /// CSS text of the layer, empty when the layer is incomplete
    #[must_use]
    pub fn css(&self, resolver: &dyn ConstantResolver) -> String {
        match self.kind {
            BackgroundKind::Image => self.image_css(resolver),
            BackgroundKind::LinearGradient => self.linear_css(resolver),
            BackgroundKind::RadialGradient => self.radial_css(resolver),
            BackgroundKind::ConicGradient => self.conic_css(resolver),
        }
    }

    fn enum_index(&self, tag: &str, table: &crate::properties::EnumTable, resolver: &dyn ConstantResolver) -> Option<usize> {
        self.map.get(tag).and_then(|v| enum_value(v, table, resolver))
    }

    fn size(&self, tag: &str, resolver: &dyn ConstantResolver) -> SizeUnit {
        self.map
            .get(tag)
            .and_then(|v| size_value(v, resolver))
            .unwrap_or_else(SizeUnit::auto)
    }

    fn open(&self, name: &str, resolver: &dyn ConstantResolver) -> String {
        let repeating = self
            .map
            .get("repeating")
            .and_then(|v| bool_value(v, resolver))
            .unwrap_or(false);
        if repeating {
            format!("repeating-{name}(")
        } else {
            format!("{name}(")
        }
    }

    fn points(&self, resolver: &dyn ConstantResolver) -> Option<Vec<GradientPoint>> {
        match self.map.get("gradient")? {
            PropertyValue::GradientPoints(points) => Some(points.clone()),
            PropertyValue::Text(text) => {
                let text = resolve_text(text, resolver)?;
                match parse_points(&text) {
                    Ok(points) => Some(points),
                    Err(error) => {
                        error.log();
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn stops_css(&self, angular: bool, resolver: &dyn ConstantResolver) -> Option<String> {
        let points = self.points(resolver)?;
        let stops = points
            .iter()
            .map(|point| point.css(angular, resolver))
            .collect::<Option<Vec<_>>>()?;
        Some(stops.join(", "))
    }

    fn image_css(&self, resolver: &dyn ConstantResolver) -> String {
        let Some(src) = self
            .map
            .get("src")
            .and_then(|v| text_value(v, resolver))
            .filter(|src| !src.is_empty())
        else {
            return String::new();
        };

        let mut css = format!("url({src})");
        let attachment = self.enum_index("attachment", &ATTACHMENT, resolver).unwrap_or(0);
        if attachment > 0 {
            if let Some(name) = ATTACHMENT.name(attachment) {
                let _ = write!(css, " {name}");
            }
        }
        let horizontal = self
            .enum_index("image-horizontal-align", &IMAGE_HORIZONTAL_ALIGN, resolver)
            .and_then(|i| IMAGE_HORIZONTAL_ALIGN.name(i))
            .unwrap_or("left");
        let vertical = self
            .enum_index("image-vertical-align", &IMAGE_VERTICAL_ALIGN, resolver)
            .and_then(|i| IMAGE_VERTICAL_ALIGN.name(i))
            .unwrap_or("top");
        let _ = write!(css, " {horizontal} {vertical}");

        let fit = self.enum_index("fit", &BACKGROUND_FIT, resolver).unwrap_or(0);
        match BACKGROUND_FIT.name(fit).filter(|_| fit > 0) {
            Some(fit) => {
                let _ = write!(css, " / {fit}");
            }
            None => {
                let width = self.size("width", resolver);
                let height = self.size("height", resolver);
                if !width.is_auto() || !height.is_auto() {
                    let _ = write!(css, " / {} {}", width.css_string("auto"), height.css_string("auto"));
                }
            }
        }

        let repeat = self
            .enum_index("repeat", &REPEAT, resolver)
            .and_then(|i| REPEAT.name(i))
            .unwrap_or("no-repeat");
        let _ = write!(css, " {repeat}");
        css
    }

    fn linear_css(&self, resolver: &dyn ConstantResolver) -> String {
        let mut css = self.open("linear-gradient", resolver);
        match self.map.get("direction") {
            Some(PropertyValue::Int(index)) => {
                let _ = write!(css, "{}, ", DIRECTION.css_value(usize::try_from(*index).unwrap_or(0)));
            }
            Some(PropertyValue::Angle(angle)) => {
                let _ = write!(css, "{}, ", angle.css_string());
            }
            Some(PropertyValue::Text(text)) => match resolve_text(text, resolver) {
                Some(text) => {
                    if let Some(index) = DIRECTION.index_of(&text) {
                        let _ = write!(css, "{}, ", DIRECTION.css_value(index));
                    } else if let Ok(angle) = AngleUnit::parse(&text) {
                        let _ = write!(css, "{}, ", angle.css_string());
                    } else {
                        LoomError::invalid("linear gradient direction", text).log();
                    }
                }
                None => LoomError::invalid("linear gradient direction", text.clone()).log(),
            },
            _ => {}
        }
        let Some(stops) = self.stops_css(false, resolver) else {
            return String::new();
        };
        let _ = write!(css, "{stops}) ");
        css
    }

    fn radial_css(&self, resolver: &dyn ConstantResolver) -> String {
        let mut css = self.open("radial-gradient", resolver);
        let circle = self.enum_index("radial-gradient-shape", &RADIAL_GRADIENT_SHAPE, resolver) == Some(1);
        let mut shape = if circle { "circle " } else { "ellipse " };

        let keyword = |css: &mut String, shape: &mut &str, index: usize| {
            css.push_str(shape);
            *shape = "";
            let _ = write!(css, "{} ", RADIAL_GRADIENT_RADIUS.css_value(index));
        };
        let ellipse = |css: &mut String, shape: &mut &str, sizes: &[SizeUnit], auto: &str| {
            css.push_str("ellipse ");
            *shape = "";
            for size in sizes.iter().take(2) {
                let _ = write!(css, "{} ", size.css_string(auto));
            }
        };

        match self.map.get("radial-gradient-radius") {
            Some(PropertyValue::Int(index)) => keyword(&mut css, &mut shape, usize::try_from(*index).unwrap_or(0)),
            Some(PropertyValue::Size(size)) => ellipse(&mut css, &mut shape, &[*size, *size], ""),
            Some(PropertyValue::Sizes(sizes)) => ellipse(&mut css, &mut shape, sizes, "50%"),
            Some(PropertyValue::Text(text)) => match resolve_text(text, resolver) {
                Some(text) => {
                    if let Some(index) = RADIAL_GRADIENT_RADIUS.index_of(&text) {
                        keyword(&mut css, &mut shape, index);
                    } else if let Some(size) = SizeUnit::parse(&text).ok().filter(|s| !s.is_auto()) {
                        ellipse(&mut css, &mut shape, &[size, size], "");
                    } else {
                        LoomError::invalid("radial gradient radius", text).log();
                    }
                }
                None => LoomError::invalid("radial gradient radius", text.clone()).log(),
            },
            _ => {}
        }

        let x = self.size("center-x", resolver);
        let y = self.size("center-y", resolver);
        if !x.is_auto() || !y.is_auto() {
            let _ = write!(css, "{shape}at {} {}", x.css_string("50%"), y.css_string("50%"));
        }

        let Some(stops) = self.stops_css(false, resolver) else {
            return String::new();
        };
        let _ = write!(css, ", {stops}) ");
        css
    }

    fn conic_css(&self, resolver: &dyn ConstantResolver) -> String {
        let Some(points) = self.points(resolver).filter(|points| points.len() >= 2) else {
            return String::new();
        };
        let mut css = self.open("conic-gradient", resolver);
        let mut prefix = Vec::new();
        if let Some(from) = self.map.get("from").and_then(|v| angle_value(v, resolver)) {
            prefix.push(format!("from {}", from.css_string()));
        }
        let x = self.size("center-x", resolver);
        let y = self.size("center-y", resolver);
        if !x.is_auto() || !y.is_auto() {
            prefix.push(format!("at {} {}", x.css_string("50%"), y.css_string("50%")));
        }

        let mut parts = Vec::new();
        if !prefix.is_empty() {
            parts.push(prefix.join(" "));
        }
        parts.extend(points.iter().filter_map(|point| point.css(true, resolver)));
        let _ = write!(css, "{}) ", parts.join(", "));
        css
    }
}

impl Properties for BackgroundElement {
    fn owner(&self) -> &'static str {
        self.kind.object_tag()
    }

    fn normalize(&self, tag: &str) -> String {
        let tag = tag.trim().to_ascii_lowercase();
        let alias = match (self.kind, tag.as_str()) {
            (BackgroundKind::Image, "source") => "src",
            (BackgroundKind::Image, "horizontal-align") => "image-horizontal-align",
            (BackgroundKind::Image, "vertical-align") => "image-vertical-align",
            (BackgroundKind::RadialGradient, "radius") => "radial-gradient-radius",
            (BackgroundKind::RadialGradient, "shape") => "radial-gradient-shape",
            (_, "x-center") => "center-x",
            (_, "y-center") => "center-y",
            _ => return tag,
        };
        alias.to_string()
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        self.map.get(&self.normalize(tag)).cloned()
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        match (self.kind, tag.as_str()) {
            (BackgroundKind::Image, _) => {}
            (_, "gradient") => {
                let stored = gradient_input(&tag, value)?;
                self.map.insert(tag, stored);
                return Ok(());
            }
            (BackgroundKind::LinearGradient, "direction") => return self.set_direction(value),
            (BackgroundKind::RadialGradient, "radial-gradient-radius") => return self.set_radial_radius(value),
            _ => {}
        }
        match self.leaf_kind(&tag) {
            Some(kind) => self.map.set_typed(&tag, kind, value),
            None => Err(LoomError::unknown_tag(&tag, self.owner())),
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

/// CSS `background` value of a layer list, empty when no layer renders
#[must_use]
pub fn background_css(layers: &[BackgroundElement], resolver: &dyn ConstantResolver) -> String {
    layers
        .iter()
        .map(|layer| layer.css(resolver))
        .filter(|css| !css.is_empty())
        .map(|css| css.trim_end().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;

    #[test]
    fn test_linear_gradient_text() {
        let gradient = BackgroundElement::linear_gradient(
            Params::new().with("direction", "to bottom").with(
                "gradient",
                vec![
                    GradientPoint::new(Color::RED, Some(SizeUnit::percent(0.0))),
                    GradientPoint::new(Color::BLUE, Some(SizeUnit::percent(100.0))),
                ],
            ),
        )
        .unwrap();
        assert_eq!(
            gradient.css(&NoConstants),
            "linear-gradient(to bottom, #FF0000 0%, #0000FF 100%) "
        );

        let mut repeating = gradient.clone();
        repeating.set("repeating", true);
        assert!(repeating.css(&NoConstants).starts_with("repeating-linear-gradient(to bottom, "));
    }

    #[test]
    fn test_gradient_needs_two_points() {
        let mut gradient = BackgroundElement::new(BackgroundKind::LinearGradient);
        assert!(!gradient.set("gradient", "red"));
        assert!(gradient.set("gradient", "red, blue 50%"));
        assert!(gradient.set("direction", "45deg"));
        assert_eq!(gradient.css(&NoConstants), "linear-gradient(45deg, #FF0000, #0000FF 50%) ");
    }

    #[test]
    fn test_radial_gradient_uses_center_y() {
        let gradient = BackgroundElement::radial_gradient(
            Params::new()
                .with("shape", "circle")
                .with("radius", "farthest-side")
                .with("x-center", "10%")
                .with("center-y", "20%")
                .with("gradient", "white, black"),
        )
        .unwrap();
        assert_eq!(
            gradient.css(&NoConstants),
            "radial-gradient(circle farthest-side at 10% 20%, #FFFFFF, #000000) "
        );
    }

    #[test]
    fn test_conic_gradient_prefix() {
        let gradient = BackgroundElement::conic_gradient(
            Params::new()
                .with("from", "90deg")
                .with("center-x", "50%")
                .with(
                    "gradient",
                    vec![
                        GradientPoint::at_angle(Color::RED, AngleUnit::deg(0.0)),
                        GradientPoint::at_angle(Color::BLUE, AngleUnit::deg(180.0)),
                    ],
                ),
        )
        .unwrap();
        assert_eq!(
            gradient.css(&NoConstants),
            "conic-gradient(from 90deg at 50% 50%, #FF0000 0deg, #0000FF 180deg) "
        );
    }

    #[test]
    fn test_image_layer() {
        let image = BackgroundElement::image(
            Params::new()
                .with("src", "bg.png")
                .with("repeat", "repeat-x")
                .with("fit", "cover"),
        )
        .unwrap();
        assert_eq!(image.css(&NoConstants), "url(bg.png) left top / cover repeat-x");
    }

    #[test]
    fn test_build_from_object_text() {
        let element = BackgroundElement::build(
            "background",
            r#"linear-gradient { direction = to-right, gradient = "red, blue" }"#.into(),
        )
        .unwrap();
        assert_eq!(element.kind(), BackgroundKind::LinearGradient);
        assert_eq!(
            background_css(&[element], &NoConstants),
            "linear-gradient(to right, #FF0000, #0000FF)"
        );
    }
}
