//! CSS length value

use std::fmt;
use std::str::FromStr;

use crate::error::{LoomError, LoomResult};

/// Unit of a [`SizeUnit`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SizeUnitType {
    /// `auto`: the value is ignored
    #[default]
    Auto,
    /// Pixels
    Px,
    /// Root em (serialized to CSS as `rem`)
    Em,
    /// x-height
    Ex,
    /// Percent of the parent dimension
    Percent,
    /// Points
    Pt,
    /// Picas
    Pc,
    /// Inches
    Inch,
    /// Millimeters
    Mm,
    /// Centimeters
    Cm,
    /// Grid fraction
    Fraction,
    /// Percent of the viewport width
    Vw,
    /// Percent of the viewport height
    Vh,
    /// Width of the "0" glyph
    Ch,
}

impl SizeUnitType {
    /// Text suffix used by `Display` and the parser
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Auto => "",
            Self::Px => "px",
            Self::Em => "em",
            Self::Ex => "ex",
            Self::Percent => "%",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::Inch => "in",
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::Fraction => "fr",
            Self::Vw => "vw",
            Self::Vh => "vh",
            Self::Ch => "ch",
        }
    }
}

/// Suffixes probed by the parser; `rem` precedes `em`
const SUFFIXES: &[(&str, SizeUnitType)] = &[
    ("rem", SizeUnitType::Em),
    ("em", SizeUnitType::Em),
    ("ex", SizeUnitType::Ex),
    ("px", SizeUnitType::Px),
    ("%", SizeUnitType::Percent),
    ("pt", SizeUnitType::Pt),
    ("pc", SizeUnitType::Pc),
    ("in", SizeUnitType::Inch),
    ("mm", SizeUnitType::Mm),
    ("cm", SizeUnitType::Cm),
    ("fr", SizeUnitType::Fraction),
    ("vw", SizeUnitType::Vw),
    ("vh", SizeUnitType::Vh),
    ("ch", SizeUnitType::Ch),
];

/// A length: unit plus magnitude
#[derive(Clone, Copy, Debug, Default)]
pub struct SizeUnit {
    /// Unit
    pub unit: SizeUnitType,
    /// Magnitude (ignored for `Auto`)
    pub value: f64,
}

impl SizeUnit {
    /// `auto`
    #[must_use]
    pub const fn auto() -> Self {
        Self {
            unit: SizeUnitType::Auto,
            value: 0.0,
        }
    }

    /// Build a size of any unit
    #[must_use]
    pub const fn new(unit: SizeUnitType, value: f64) -> Self {
        Self { unit, value }
    }

    /// Pixels
    #[must_use]
    pub const fn px(value: f64) -> Self {
        Self::new(SizeUnitType::Px, value)
    }

    /// Root em
    #[must_use]
    pub const fn em(value: f64) -> Self {
        Self::new(SizeUnitType::Em, value)
    }

    /// Percent
    #[must_use]
    pub const fn percent(value: f64) -> Self {
        Self::new(SizeUnitType::Percent, value)
    }

    /// Grid fraction
    #[must_use]
    pub const fn fr(value: f64) -> Self {
        Self::new(SizeUnitType::Fraction, value)
    }

    /// Whether this is `auto`
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.unit == SizeUnitType::Auto
    }

    /// Parse `auto`, `none`, `0`, a bare number (pixels) or `<number><unit>`
    pub fn parse(text: &str) -> LoomResult<Self> {
        let text = text.trim();
        match text {
            "auto" | "none" | "" => return Ok(Self::auto()),
            "0" => return Ok(Self::px(0.0)),
            _ => {}
        }

        for (suffix, unit) in SUFFIXES {
            if let Some(number) = text.strip_suffix(suffix) {
                let value = number
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| LoomError::invalid("size", text))?;
                return Ok(Self::new(*unit, value));
            }
        }

        text.parse::<f64>()
            .map(Self::px)
            .map_err(|_| LoomError::invalid("size", text))
    }

    /// CSS form; `Auto` yields `text_for_auto`, zero yields `0`
    #[must_use]
    pub fn css_string(&self, text_for_auto: &str) -> String {
        match self.unit {
            SizeUnitType::Auto => text_for_auto.to_string(),
            SizeUnitType::Em => format!("{}rem", self.value),
            _ if self.value == 0.0 => "0".to_string(),
            _ => self.to_string(),
        }
    }
}

impl PartialEq for SizeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit && (self.is_auto() || self.value == other.value)
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auto() {
            f.write_str("auto")
        } else {
            write!(f, "{}{}", self.value, self.unit.suffix())
        }
    }
}

impl FromStr for SizeUnit {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeUnit::parse(s)
    }
}
