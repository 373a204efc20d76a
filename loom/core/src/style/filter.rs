//! Graphical filter chain (`filter` and `backdrop-filter`)

use crate::error::{LoomError, LoomResult};
use crate::properties::resolve::{angle_value, float_value};
use crate::properties::{ConstantResolver, Params, Properties, PropertyKind, PropertyMap, PropertyValue, SubProperty};
use crate::values::format_float;

use super::shadow::ShadowProperty;

const PERCENT_FILTERS: [&str; 7] = [
    "brightness",
    "contrast",
    "saturate",
    "grayscale",
    "invert",
    "opacity",
    "sepia",
];

fn float_limit(leaf: &str) -> Option<f64> {
    match leaf {
        "blur" | "brightness" | "contrast" | "saturate" => Some(10000.0),
        "grayscale" | "invert" | "opacity" | "sepia" => Some(100.0),
        _ => None,
    }
}

/// Filter functions applied to a view or to the area behind it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterProperty {
    map: PropertyMap,
    drop_shadows: Vec<ShadowProperty>,
}

impl FilterProperty {
    /// CSS value: `blur(Npx) brightness(N%) ... hue-rotate(a) drop-shadow(...)`
    #[must_use]
    pub fn css_value(&self, resolver: &dyn ConstantResolver) -> String {
        let float = |leaf: &str| self.map.get(leaf).and_then(|v| float_value(v, resolver));
        let mut parts = Vec::new();

        if let Some(blur) = float("blur") {
            parts.push(format!("blur({}px)", format_float(blur)));
        }
        for leaf in PERCENT_FILTERS {
            if let Some(value) = float(leaf) {
                parts.push(format!("{leaf}({}%)", format_float(value)));
            }
        }
        if let Some(angle) = self.map.get("hue-rotate").and_then(|v| angle_value(v, resolver)) {
            parts.push(format!("hue-rotate({})", angle.css_string()));
        }
        for shadow in &self.drop_shadows {
            if let Some(css) = shadow.text_css(resolver) {
                parts.push(format!("drop-shadow({css})"));
            }
        }
        parts.join(" ")
    }
}

impl Properties for FilterProperty {
    fn owner(&self) -> &'static str {
        "filter"
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        let tag = self.normalize(tag);
        if tag == "drop-shadow" {
            return (!self.drop_shadows.is_empty()).then(|| PropertyValue::Shadows(self.drop_shadows.clone()));
        }
        self.map.get(&tag).cloned()
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        if let Some(limit) = float_limit(&tag) {
            let coerced = crate::properties::coerce::coerce(&tag, PropertyKind::Float, value)?;
            if let PropertyValue::Float(f) = coerced {
                if !(0.0..=limit).contains(&f) {
                    return Err(LoomError::invalid("filter value", format!("{tag} = {f}")));
                }
            }
            self.map.insert(tag, coerced);
            return Ok(());
        }
        match tag.as_str() {
            "hue-rotate" => self.map.set_typed(&tag, PropertyKind::Angle, value),
            "drop-shadow" => {
                self.drop_shadows = match value {
                    PropertyValue::Shadows(list) => list,
                    PropertyValue::Objects(objects) => objects
                        .into_iter()
                        .map(|object| ShadowProperty::build(&tag, PropertyValue::Object(object)))
                        .collect::<LoomResult<_>>()?,
                    other => vec![ShadowProperty::build(&tag, other)?],
                };
                Ok(())
            }
            _ => Err(LoomError::unknown_tag(&tag, "filter")),
        }
    }

    fn remove(&mut self, tag: &str) {
        let tag = self.normalize(tag);
        if tag == "drop-shadow" {
            self.drop_shadows.clear();
        } else {
            self.map.remove(&tag);
        }
    }

    fn all_tags(&self) -> Vec<String> {
        let mut tags = self.map.tags();
        if !self.drop_shadows.is_empty() {
            tags.push("drop-shadow".to_string());
        }
        tags
    }

    fn clear(&mut self) {
        self.map.clear();
        self.drop_shadows.clear();
    }
}

impl SubProperty for FilterProperty {
    const NAME: &'static str = "filter";

    fn from_stored(value: &PropertyValue) -> Option<&Self> {
        match value {
            PropertyValue::Filter(filter) => Some(filter),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Filter(Box::new(self))
    }

    fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        let params = match value {
            PropertyValue::Filter(filter) => return Ok(*filter),
            PropertyValue::Params(params) => params,
            PropertyValue::Object(object) => Params::from_object(&object),
            PropertyValue::Text(text) => Params::from_object(&crate::data::DataObject::parse(&text)?),
            other => return Err(LoomError::incompatible(tag, &other)),
        };
        let mut filter = Self::default();
        for (leaf, value) in params {
            filter.set_value(&leaf, value)?;
        }
        if filter.is_empty() {
            return Err(LoomError::invalid("filter", "empty filter"));
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::NoConstants;
    use crate::values::{Color, SizeUnit};

    #[test]
    fn test_filter_css_order() {
        let mut filter = FilterProperty::default();
        filter.set("sepia", 40);
        filter.set("hue-rotate", "30deg");
        filter.set("blur", 2.5);
        filter.set(
            "drop-shadow",
            ShadowProperty::text(SizeUnit::px(1.0), SizeUnit::px(1.0), SizeUnit::auto(), Color::BLACK),
        );
        assert_eq!(
            filter.css_value(&NoConstants),
            "blur(2.5px) sepia(40%) hue-rotate(30deg) drop-shadow(1px 1px 0 rgb(0,0,0))"
        );
    }

    #[test]
    fn test_range_limits() {
        let mut filter = FilterProperty::default();
        assert!(!filter.set("invert", 150));
        assert!(!filter.set("blur", -1));
        assert!(filter.is_empty());
        assert!(FilterProperty::build("filter", Params::new().into()).is_err());
    }
}
