//! Style / CSS serializer
//!
//! Composite style values (border, radius, bounds, outline, column rule,
//! transform, shadows, filters, background layers) and the projection of a
//! whole property bag into an ordered CSS declaration list.
//!
//! # Design Philosophy
//!
//! - Each composite owns its own bag and its own serializer; the view
//!   projection ([`view_style_css`]) only decides the order
//! - `@constant` references are resolved while serializing, never when
//!   storing, so a theme switch re-renders without touching the bags
//! - Invisible or unresolvable parts are skipped, never rendered as broken
//!   CSS

mod background;
mod border;
mod bounds;
mod css;
mod filter;
mod line;
mod radius;
mod shadow;
mod transform;
mod view_css;

pub use background::{background_css, BackgroundElement, BackgroundKind, GradientPoint};
pub use border::{BorderProperty, ViewBorder, ViewBorders, SIDES};
pub use bounds::{Bounds, BoundsProperty};
pub use css::CssBuilder;
pub use filter::FilterProperty;
pub use line::{ColumnSeparatorProperty, OutlineProperty};
pub use radius::{BoxRadius, RadiusProperty, CORNERS};
pub use shadow::{shadows_css, ShadowProperty};
pub use transform::{origin_css, TransformProperty};
pub use view_css::view_style_css;
