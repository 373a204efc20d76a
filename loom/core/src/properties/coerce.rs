//! Coercion of input values to the canonical variant of a scalar kind

use crate::data::parse_bool;
use crate::error::{LoomError, LoomResult};
use crate::values::{AngleUnit, Color, Range, SizeUnit};

use super::schema::PropertyKind;
use super::value::PropertyValue;

/// Coerce `value` to the canonical storage of `kind`
///
/// `@constant` texts are kept verbatim for every scalar kind. Non-scalar kinds
/// are owned by the bag and are rejected here.
pub fn coerce(tag: &str, kind: PropertyKind, value: PropertyValue) -> LoomResult<PropertyValue> {
    use PropertyValue as V;

    if value.is_constant() && is_scalar(kind) {
        return Ok(value);
    }

    let incompatible = |value: &PropertyValue| LoomError::incompatible(tag, value);

    let coerced = match (kind, value) {
        (PropertyKind::Bool, V::Bool(b)) => V::Bool(b),
        (PropertyKind::Bool, V::Int(n)) => V::Bool(n != 0),
        (PropertyKind::Bool, V::Text(text)) => {
            V::Bool(parse_bool(&text).ok_or_else(|| LoomError::invalid("bool", text))?)
        }

        (PropertyKind::Int, V::Int(n)) => V::Int(n),
        (PropertyKind::Int, V::Float(f)) if f.fract() == 0.0 => V::Int(f as i64),
        (PropertyKind::Int, V::Text(text)) => V::Int(
            text.trim()
                .parse()
                .map_err(|_| LoomError::invalid("integer", text))?,
        ),

        (PropertyKind::Float, V::Float(f)) => V::Float(f),
        (PropertyKind::Float, V::Int(n)) => V::Float(n as f64),
        (PropertyKind::Float, V::Text(text)) => V::Float(
            text.trim()
                .parse()
                .map_err(|_| LoomError::invalid("float", text))?,
        ),

        (PropertyKind::Fraction, value) => V::Float(fraction(tag, value)?),

        (PropertyKind::Text, V::Text(text)) => V::Text(text),
        (PropertyKind::Text, V::Int(n)) => V::Text(n.to_string()),
        (PropertyKind::Text, V::Float(f)) => V::Text(crate::values::format_float(f)),

        (PropertyKind::Color, V::Color(c)) => V::Color(c),
        (PropertyKind::Color, V::Int(n)) => V::Color(Color(
            u32::try_from(n).map_err(|_| LoomError::incompatible(tag, &n))?,
        )),
        (PropertyKind::Color, V::Text(text)) => V::Color(Color::parse(&text)?),

        (PropertyKind::Size, V::Size(s)) => V::Size(s),
        (PropertyKind::Size, V::Int(n)) => V::Size(SizeUnit::px(n as f64)),
        (PropertyKind::Size, V::Float(f)) => V::Size(SizeUnit::px(f)),
        (PropertyKind::Size, V::Text(text)) => V::Size(SizeUnit::parse(&text)?),

        (PropertyKind::Angle, V::Angle(a)) => V::Angle(a),
        (PropertyKind::Angle, V::Int(n)) => V::Angle(AngleUnit::rad(n as f64)),
        (PropertyKind::Angle, V::Float(f)) => V::Angle(AngleUnit::rad(f)),
        (PropertyKind::Angle, V::Text(text)) => V::Angle(AngleUnit::parse(&text)?),

        (PropertyKind::Range, V::Range(r)) => V::Range(r),
        (PropertyKind::Range, V::Int(n)) => V::Range(Range::single(n)),
        (PropertyKind::Range, V::Text(text)) => V::Range(Range::parse(&text)?),

        (PropertyKind::Sizes, V::Sizes(sizes)) => V::Sizes(sizes),
        (PropertyKind::Sizes, V::Size(size)) => V::Sizes(vec![size]),
        (PropertyKind::Sizes, V::Int(n)) => V::Sizes(vec![SizeUnit::px(n as f64)]),
        (PropertyKind::Sizes, V::Float(f)) => V::Sizes(vec![SizeUnit::px(f)]),
        (PropertyKind::Sizes, V::Text(text)) => V::Sizes(
            text.split(',')
                .map(SizeUnit::parse)
                .collect::<LoomResult<_>>()?,
        ),
        (PropertyKind::Sizes, V::Texts(texts)) => V::Sizes(
            texts
                .iter()
                .map(|t| SizeUnit::parse(t))
                .collect::<LoomResult<_>>()?,
        ),

        (PropertyKind::Texts, V::Texts(texts)) => V::Texts(texts),
        (PropertyKind::Texts, V::Text(text)) => {
            V::Texts(text.split(',').map(|t| t.trim().to_string()).collect())
        }

        (PropertyKind::Enum(table), V::Int(n)) => {
            let len = table.values.len();
            if n < 0 || n as usize >= len {
                return Err(LoomError::OutOfRange {
                    tag: tag.to_string(),
                    index: n,
                    len,
                });
            }
            V::Int(n)
        }
        (PropertyKind::Enum(table), V::Text(text)) => match table.index_of(&text) {
            Some(index) => V::Int(index as i64),
            None => return Err(LoomError::incompatible(tag, &text)),
        },

        (_, value) => return Err(incompatible(&value)),
    };
    Ok(coerced)
}

fn is_scalar(kind: PropertyKind) -> bool {
    matches!(
        kind,
        PropertyKind::Bool
            | PropertyKind::Int
            | PropertyKind::Float
            | PropertyKind::Fraction
            | PropertyKind::Text
            | PropertyKind::Color
            | PropertyKind::Size
            | PropertyKind::Angle
            | PropertyKind::Range
            | PropertyKind::Sizes
            | PropertyKind::Texts
            | PropertyKind::Enum(_)
    )
}

fn fraction(tag: &str, value: PropertyValue) -> LoomResult<f64> {
    let number = match &value {
        PropertyValue::Float(f) => *f,
        PropertyValue::Int(n) => *n as f64,
        PropertyValue::Text(text) => {
            let text = text.trim();
            match text.strip_suffix('%') {
                Some(percent) => {
                    percent
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| LoomError::invalid("opacity", text))?
                        / 100.0
                }
                None => text
                    .parse::<f64>()
                    .map_err(|_| LoomError::invalid("opacity", text))?,
            }
        }
        _ => return Err(LoomError::incompatible(tag, &value)),
    };
    if (0.0..=1.0).contains(&number) {
        Ok(number)
    } else {
        Err(LoomError::incompatible(tag, &value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::enums;

    #[test]
    fn test_scalar_coercions() {
        assert_eq!(
            coerce("width", PropertyKind::Size, PropertyValue::Int(10)).unwrap(),
            PropertyValue::Size(SizeUnit::px(10.0))
        );
        assert_eq!(
            coerce("text-color", PropertyKind::Color, "#F00".into()).unwrap(),
            PropertyValue::Color(Color::RED)
        );
        assert_eq!(
            coerce("disabled", PropertyKind::Bool, "yes".into()).unwrap(),
            PropertyValue::Bool(true)
        );
    }

    #[test]
    fn test_constants_are_kept() {
        assert_eq!(
            coerce("width", PropertyKind::Size, "@gap".into()).unwrap(),
            PropertyValue::from("@gap")
        );
    }

    #[test]
    fn test_opacity_accepts_percent() {
        assert_eq!(
            coerce("opacity", PropertyKind::Fraction, "50%".into()).unwrap(),
            PropertyValue::Float(0.5)
        );
        assert!(coerce("opacity", PropertyKind::Fraction, PropertyValue::Float(1.5)).is_err());
    }

    #[test]
    fn test_enum_orientation_aliases() {
        let kind = PropertyKind::Enum(&enums::ORIENTATION);
        assert_eq!(coerce("orientation", kind, "Vertical".into()).unwrap(), PropertyValue::Int(0));
        assert_eq!(coerce("orientation", kind, "horizontal".into()).unwrap(), PropertyValue::Int(1));
        assert!(matches!(
            coerce("orientation", kind, PropertyValue::Int(9)),
            Err(LoomError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_incompatible_type() {
        assert!(matches!(
            coerce("width", PropertyKind::Size, PropertyValue::Bool(true)),
            Err(LoomError::IncompatibleType { .. })
        ));
    }
}
