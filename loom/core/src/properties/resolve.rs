//! Typed reads of stored values with lazy `@constant` resolution
//!
//! Stored values keep `@name` references verbatim; they are resolved against
//! the active theme only when a value is read for serialization. A reference
//! that cannot be resolved is logged and reads as absent, so the serializer
//! writes nothing for it instead of breaking the declaration list.

use crate::error::LoomError;
use crate::values::{AngleUnit, Color, Range, SizeUnit};

use super::enums::EnumTable;
use super::value::PropertyValue;

/// Source of `@name` constant values
pub trait ConstantResolver {
    /// Text of the constant `name` (without the `@`)
    fn resolve_constant(&self, name: &str) -> Option<String>;
}

/// Resolver with no constants at all
#[derive(Clone, Copy, Debug, Default)]
pub struct NoConstants;

impl ConstantResolver for NoConstants {
    fn resolve_constant(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Text of a value with a leading `@` reference resolved
///
/// Returns `None` (and logs) when the reference is unknown.
pub fn resolve_text(text: &str, resolver: &dyn ConstantResolver) -> Option<String> {
    match text.strip_prefix('@') {
        None => Some(text.to_string()),
        Some(name) => {
            let resolved = resolver.resolve_constant(name);
            if resolved.is_none() {
                LoomError::ResourceMissing {
                    name: text.to_string(),
                }
                .log();
            }
            resolved
        }
    }
}

fn parsed<T>(
    text: &str,
    resolver: &dyn ConstantResolver,
    parse: impl FnOnce(&str) -> Result<T, LoomError>,
) -> Option<T> {
    let text = resolve_text(text, resolver)?;
    match parse(&text) {
        Ok(value) => Some(value),
        Err(error) => {
            error.log();
            None
        }
    }
}

/// Read a value as text
pub fn text_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<String> {
    match value {
        PropertyValue::Text(text) => resolve_text(text, resolver),
        PropertyValue::Int(n) => Some(n.to_string()),
        PropertyValue::Float(f) => Some(crate::values::format_float(*f)),
        PropertyValue::Bool(b) => Some(b.to_string()),
        PropertyValue::Color(c) => Some(c.to_string()),
        PropertyValue::Size(s) => Some(s.to_string()),
        PropertyValue::Angle(a) => Some(a.to_string()),
        PropertyValue::Range(r) => Some(r.to_string()),
        _ => None,
    }
}

/// Read a value as a length
pub fn size_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<SizeUnit> {
    match value {
        PropertyValue::Size(size) => Some(*size),
        PropertyValue::Float(f) => Some(SizeUnit::px(*f)),
        PropertyValue::Int(n) => Some(SizeUnit::px(*n as f64)),
        PropertyValue::Text(text) => parsed(text, resolver, SizeUnit::parse),
        _ => None,
    }
}

/// Read a value as a color
pub fn color_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<Color> {
    match value {
        PropertyValue::Color(color) => Some(*color),
        PropertyValue::Int(n) => u32::try_from(*n).ok().map(Color),
        PropertyValue::Text(text) => parsed(text, resolver, Color::parse),
        _ => None,
    }
}

/// Read a value as an angle
pub fn angle_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<AngleUnit> {
    match value {
        PropertyValue::Angle(angle) => Some(*angle),
        PropertyValue::Float(f) => Some(AngleUnit::rad(*f)),
        PropertyValue::Int(n) => Some(AngleUnit::rad(*n as f64)),
        PropertyValue::Text(text) => parsed(text, resolver, AngleUnit::parse),
        _ => None,
    }
}

/// Read a value as a grid range
pub fn range_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<Range> {
    match value {
        PropertyValue::Range(range) => Some(*range),
        PropertyValue::Int(n) => Some(Range::single(*n)),
        PropertyValue::Text(text) => parsed(text, resolver, Range::parse),
        _ => None,
    }
}

/// Read a value as a flag
pub fn bool_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<bool> {
    match value {
        PropertyValue::Bool(b) => Some(*b),
        PropertyValue::Int(n) => Some(*n != 0),
        PropertyValue::Text(text) => parsed(text, resolver, |t| {
            crate::data::parse_bool(t).ok_or_else(|| LoomError::invalid("bool", t))
        }),
        _ => None,
    }
}

/// Read a value as an integer
pub fn int_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<i64> {
    match value {
        PropertyValue::Int(n) => Some(*n),
        PropertyValue::Float(f) => Some(f.round() as i64),
        PropertyValue::Text(text) => parsed(text, resolver, |t| {
            t.trim()
                .parse::<i64>()
                .map_err(|_| LoomError::invalid("integer", t))
        }),
        _ => None,
    }
}

/// Read a value as a float
pub fn float_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<f64> {
    match value {
        PropertyValue::Float(f) => Some(*f),
        PropertyValue::Int(n) => Some(*n as f64),
        PropertyValue::Text(text) => parsed(text, resolver, |t| {
            t.trim()
                .parse::<f64>()
                .map_err(|_| LoomError::invalid("float", t))
        }),
        _ => None,
    }
}

/// Read a value as an index into `table`
pub fn enum_value(
    value: &PropertyValue,
    table: &EnumTable,
    resolver: &dyn ConstantResolver,
) -> Option<usize> {
    match value {
        PropertyValue::Int(n) => usize::try_from(*n).ok(),
        PropertyValue::Text(text) => parsed(text, resolver, |t| {
            table
                .index_of(t)
                .ok_or_else(|| LoomError::incompatible(table.tag, &t))
        }),
        _ => None,
    }
}

/// Read a value as a list of lengths
pub fn sizes_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Vec<SizeUnit> {
    match value {
        PropertyValue::Sizes(sizes) => sizes.clone(),
        PropertyValue::Texts(texts) => texts
            .iter()
            .filter_map(|t| parsed(t, resolver, SizeUnit::parse))
            .collect(),
        other => size_value(other, resolver).into_iter().collect(),
    }
}

/// Read a value as a list of texts; a single text is split on commas
pub fn texts_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Vec<String> {
    match value {
        PropertyValue::Texts(texts) => texts.iter().filter_map(|t| resolve_text(t, resolver)).collect(),
        PropertyValue::Text(text) => resolve_text(text, resolver)
            .map(|text| text.split(',').map(|t| t.trim().to_string()).collect())
            .unwrap_or_default(),
        other => text_value(other, resolver).into_iter().collect(),
    }
}
