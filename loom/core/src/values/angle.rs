//! CSS angle value

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{LoomError, LoomResult};

/// Unit of an [`AngleUnit`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AngleUnitType {
    /// Radians
    #[default]
    Radian,
    /// Multiples of π radians
    PiRadian,
    /// Degrees
    Degree,
    /// Gradians
    Gradian,
    /// Turns
    Turn,
}

impl AngleUnitType {
    fn suffix(self) -> &'static str {
        match self {
            Self::Radian => "rad",
            Self::PiRadian => "pi",
            Self::Degree => "deg",
            Self::Gradian => "grad",
            Self::Turn => "turn",
        }
    }
}

/// `grad` must be probed before `rad`
const SUFFIXES: &[(&str, AngleUnitType)] = &[
    ("π", AngleUnitType::PiRadian),
    ("°", AngleUnitType::Degree),
    ("deg", AngleUnitType::Degree),
    ("grad", AngleUnitType::Gradian),
    ("rad", AngleUnitType::Radian),
    ("pi", AngleUnitType::PiRadian),
    ("turn", AngleUnitType::Turn),
];

/// An angle: unit plus magnitude
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AngleUnit {
    /// Unit
    pub unit: AngleUnitType,
    /// Magnitude
    pub value: f64,
}

impl AngleUnit {
    /// Build an angle of any unit
    #[must_use]
    pub const fn new(unit: AngleUnitType, value: f64) -> Self {
        Self { unit, value }
    }

    /// Degrees
    #[must_use]
    pub const fn deg(value: f64) -> Self {
        Self::new(AngleUnitType::Degree, value)
    }

    /// Radians
    #[must_use]
    pub const fn rad(value: f64) -> Self {
        Self::new(AngleUnitType::Radian, value)
    }

    /// Parse `<number><unit>`; a bare number is radians and `π` alone is one π
    pub fn parse(text: &str) -> LoomResult<Self> {
        let text = text.trim().to_lowercase();
        if text == "π" {
            return Ok(Self::new(AngleUnitType::PiRadian, 1.0));
        }

        let number = |n: &str| {
            n.trim()
                .parse::<f64>()
                .map_err(|_| LoomError::invalid("angle", text.as_str()))
        };

        for (suffix, unit) in SUFFIXES {
            if let Some(n) = text.strip_suffix(suffix) {
                return Ok(Self::new(*unit, number(n)?));
            }
        }
        Ok(Self::rad(number(&text)?))
    }

    /// CSS form; multiples of π are converted to radians
    #[must_use]
    pub fn css_string(&self) -> String {
        if self.unit == AngleUnitType::PiRadian {
            format!("{}rad", self.value * PI)
        } else {
            self.to_string()
        }
    }

    /// Convert to radians
    #[must_use]
    pub fn to_radian(self) -> Self {
        let value = match self.unit {
            AngleUnitType::Radian => return self,
            AngleUnitType::PiRadian => self.value * PI,
            AngleUnitType::Degree => self.value * PI / 180.0,
            AngleUnitType::Gradian => self.value * PI / 200.0,
            AngleUnitType::Turn => self.value * 2.0 * PI,
        };
        Self::rad(value)
    }

    /// Convert to degrees
    #[must_use]
    pub fn to_degree(self) -> Self {
        let value = match self.unit {
            AngleUnitType::Degree => return self,
            AngleUnitType::Radian => self.value * 180.0 / PI,
            AngleUnitType::PiRadian => self.value * 180.0,
            AngleUnitType::Gradian => self.value * 360.0 / 400.0,
            AngleUnitType::Turn => self.value * 360.0,
        };
        Self::deg(value)
    }

    /// Convert to gradians
    #[must_use]
    pub fn to_gradian(self) -> Self {
        let value = match self.unit {
            AngleUnitType::Gradian => return self,
            AngleUnitType::Radian => self.value * 200.0 / PI,
            AngleUnitType::PiRadian => self.value * 200.0,
            AngleUnitType::Degree => self.value * 400.0 / 360.0,
            AngleUnitType::Turn => self.value * 400.0,
        };
        Self::new(AngleUnitType::Gradian, value)
    }

    /// Convert to turns
    #[must_use]
    pub fn to_turn(self) -> Self {
        let value = match self.unit {
            AngleUnitType::Turn => return self,
            AngleUnitType::Radian => self.value / (2.0 * PI),
            AngleUnitType::PiRadian => self.value / 2.0,
            AngleUnitType::Degree => self.value / 360.0,
            AngleUnitType::Gradian => self.value / 400.0,
        };
        Self::new(AngleUnitType::Turn, value)
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for AngleUnit {
    type Err = LoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AngleUnit::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(AngleUnit::parse("90deg").unwrap(), AngleUnit::deg(90.0));
        assert_eq!(AngleUnit::parse("45°").unwrap(), AngleUnit::deg(45.0));
        assert_eq!(
            AngleUnit::parse("100grad").unwrap(),
            AngleUnit::new(AngleUnitType::Gradian, 100.0)
        );
        assert_eq!(AngleUnit::parse("1.5rad").unwrap(), AngleUnit::rad(1.5));
        assert_eq!(
            AngleUnit::parse("0.5pi").unwrap(),
            AngleUnit::new(AngleUnitType::PiRadian, 0.5)
        );
        assert_eq!(
            AngleUnit::parse("π").unwrap(),
            AngleUnit::new(AngleUnitType::PiRadian, 1.0)
        );
        assert_eq!(
            AngleUnit::parse("0.25turn").unwrap(),
            AngleUnit::new(AngleUnitType::Turn, 0.25)
        );
        assert_eq!(AngleUnit::parse("2").unwrap(), AngleUnit::rad(2.0));
        assert!(AngleUnit::parse("left").is_err());
    }

    #[test]
    fn test_css_string() {
        assert_eq!(AngleUnit::deg(30.0).css_string(), "30deg");
        assert_eq!(
            AngleUnit::new(AngleUnitType::PiRadian, 1.0).css_string(),
            format!("{}rad", PI)
        );
    }

    #[test]
    fn test_conversions() {
        let turn = AngleUnit::new(AngleUnitType::Turn, 0.5);
        assert_eq!(turn.to_degree(), AngleUnit::deg(180.0));
        assert_eq!(AngleUnit::deg(90.0).to_turn().value, 0.25);
        assert_eq!(AngleUnit::deg(180.0).to_gradian().value, 200.0);
        assert!((AngleUnit::deg(180.0).to_radian().value - PI).abs() < 1e-12);
    }
}
