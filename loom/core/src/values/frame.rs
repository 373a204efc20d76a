//! Geometry reported by the browser

/// Position and size of a view, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Frame {
    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Scroll geometry of a view
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Scroll {
    /// Horizontal scroll offset
    pub x: f64,
    /// Vertical scroll offset
    pub y: f64,
    /// Scrollable content width
    pub width: f64,
    /// Scrollable content height
    pub height: f64,
}
