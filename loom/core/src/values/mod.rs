//! Value Types
//!
//! Scalar values stored in property bags and serialized to CSS:
//!
//! - [`Color`]: 32-bit ARGB
//! - [`SizeUnit`]: CSS length with unit
//! - [`AngleUnit`]: CSS angle with unit
//! - [`Range`]: grid cell span
//! - [`Frame`] / [`Scroll`]: browser-reported geometry
//!
//! Every type parses from its text form (`FromStr`) and prints back through
//! `Display`. CSS rendering is a separate method because CSS differs from the
//! canonical text in a few places (`rem`, `rgb(...)`, radians for π).

mod angle;
mod color;
mod frame;
mod range;
mod size;

pub use angle::{AngleUnit, AngleUnitType};
pub use color::Color;
pub use frame::{Frame, Scroll};
pub use range::Range;
pub use size::{SizeUnit, SizeUnitType};

/// Format a float the way CSS and `.rui` text expect (no trailing `.0`)
#[must_use]
pub fn format_float(value: f64) -> String {
    format!("{value}")
}

/// Format a float with at most `precision` decimals, trailing zeros dropped
#[must_use]
pub fn format_float_precision(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        text
    }
}
