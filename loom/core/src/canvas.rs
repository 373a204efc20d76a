//! Canvas command stream
//!
//! A [`Canvas`] records 2D drawing calls as one script that replays them on
//! the browser's `CanvasRenderingContext2D`. A `CanvasView` owns a
//! [`DrawHandler`](crate::view::DrawHandler); every redraw (explicit, or
//! after the browser reports a new size) runs it against a fresh canvas and
//! sends the script as a single frame.
//!
//! # Design Philosophy
//!
//! - Gradients and patterns are script variables with names issued by the
//!   recorder (`gradient1`, `pattern2`, ...), so one object can style several
//!   calls of the same draw
//! - Arguments are formatted here, nothing is validated in the browser;
//!   calls with meaningless arguments (negative line width, unknown image)
//!   are skipped with a log line

use std::fmt::Write;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::bridge::{is_error_answer, quote, ScriptArg};
use crate::error::{LoomError, LoomResult};
use crate::session::Session;
use crate::values::{format_float, Color, SizeUnit};
use crate::view::{KindState, ViewId, ViewKind};

fn num(value: f64) -> String {
    format_float(value)
}

fn nums(values: &[f64]) -> String {
    values.iter().map(|v| num(*v)).collect::<Vec<_>>().join(",")
}

// ============================================================================
// Styles
// ============================================================================

/// `lineJoin`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    /// Sharp corners
    Miter,
    /// Rounded corners
    Round,
    /// Cut corners
    Bevel,
}

/// `lineCap`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    /// Flat, ending at the point
    Butt,
    /// Rounded
    Round,
    /// Flat, extended by half the width
    Square,
}

/// `textBaseline`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextBaseline {
    /// Alphabetic baseline
    Alphabetic,
    /// Top of the em square
    Top,
    /// Middle of the em square
    Middle,
    /// Bottom of the em square
    Bottom,
    /// Hanging baseline
    Hanging,
    /// Ideographic baseline
    Ideographic,
}

/// `textAlign`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Left
    Left,
    /// Right
    Right,
    /// Center
    Center,
    /// Line start
    Start,
    /// Line end
    End,
}

/// Repetition of a pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Once
    NoRepeat,
    /// Both directions
    Both,
    /// Horizontally
    X,
    /// Vertically
    Y,
}

macro_rules! css_keywords {
    ($($ty:ty { $($variant:ident => $text:expr),+ $(,)? })+) => {
        $(
            impl $ty {
                fn keyword(self) -> &'static str {
                    match self {
                        $(Self::$variant => $text),+
                    }
                }
            }
        )+
    };
}

css_keywords! {
    LineJoin { Miter => "miter", Round => "round", Bevel => "bevel" }
    LineCap { Butt => "butt", Round => "round", Square => "square" }
    TextBaseline {
        Alphabetic => "alphabetic",
        Top => "top",
        Middle => "middle",
        Bottom => "bottom",
        Hanging => "hanging",
        Ideographic => "ideographic",
    }
    TextAlign { Left => "left", Right => "right", Center => "center", Start => "start", End => "end" }
    Repeat { NoRepeat => "no-repeat", Both => "repeat", X => "repeat-x", Y => "repeat-y" }
}

/// Gradient or pattern variable of one draw
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasStyle(String);

impl CanvasStyle {
    /// Script variable name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Path
// ============================================================================

/// Path built once and filled, stroked or clipped by a canvas
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    script: String,
}

impl Path {
    /// Empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, call: &str, args: &[f64]) -> Self {
        let _ = write!(self.script, "\nctx.{call}({});", nums(args));
        self
    }

    /// Start a new sub-path at `(x, y)`
    #[must_use]
    pub fn move_to(self, x: f64, y: f64) -> Self {
        self.push("moveTo", &[x, y])
    }

    /// Straight line to `(x, y)`
    #[must_use]
    pub fn line_to(self, x: f64, y: f64) -> Self {
        self.push("lineTo", &[x, y])
    }

    /// Circular arc around `(x, y)`
    #[must_use]
    pub fn arc(mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, clockwise: bool) -> Self {
        let _ = write!(
            self.script,
            "\nctx.arc({},{});",
            nums(&[x, y, radius, start, end]),
            !clockwise
        );
        self
    }

    /// Arc tangent to two lines
    #[must_use]
    pub fn arc_to(self, x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) -> Self {
        self.push("arcTo", &[x0, y0, x1, y1, radius])
    }

    /// Cubic Bézier curve
    #[must_use]
    pub fn bezier_curve_to(self, cp0x: f64, cp0y: f64, cp1x: f64, cp1y: f64, x: f64, y: f64) -> Self {
        self.push("bezierCurveTo", &[cp0x, cp0y, cp1x, cp1y, x, y])
    }

    /// Quadratic Bézier curve
    #[must_use]
    pub fn quadratic_curve_to(self, cpx: f64, cpy: f64, x: f64, y: f64) -> Self {
        self.push("quadraticCurveTo", &[cpx, cpy, x, y])
    }

    /// Elliptic arc
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        mut self,
        x: f64,
        y: f64,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start: f64,
        end: f64,
        clockwise: bool,
    ) -> Self {
        let _ = write!(
            self.script,
            "\nctx.ellipse({},{});",
            nums(&[x, y, radius_x, radius_y, rotation, start, end]),
            !clockwise
        );
        self
    }

    /// Rectangle sub-path
    #[must_use]
    pub fn rect(self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.push("rect", &[x, y, width, height])
    }

    /// Line back to the start of the sub-path
    #[must_use]
    pub fn close(mut self) -> Self {
        self.script.push_str("\nctx.closePath();");
        self
    }

    fn script_text(&self) -> String {
        format!("\nctx.beginPath();{}", self.script)
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Recorder of one draw of a canvas view
#[derive(Debug)]
pub struct Canvas {
    view: ViewId,
    width: f64,
    height: f64,
    script: String,
    next_var: u32,
    ready_images: Vec<String>,
}

impl Canvas {
    /// Recorder for the `<canvas>` of `view`, sized `width × height` CSS pixels
    #[must_use]
    pub fn new(view: &ViewId, width: f64, height: f64) -> Self {
        let mut script = String::with_capacity(4096);
        let _ = write!(
            script,
            "{{\nconst canvas = document.getElementById('{view}');\n\
             if (canvas) {{\n\
             const ctx = canvas.getContext('2d');\n\
             const dpr = window.devicePixelRatio || 1;\n\
             ctx.canvas.width = dpr * canvas.clientWidth;\n\
             ctx.canvas.height = dpr * canvas.clientHeight;\n\
             ctx.scale(dpr, dpr);"
        );
        Self {
            view: view.clone(),
            width,
            height,
            script,
            next_var: 0,
            ready_images: Vec::new(),
        }
    }

    /// View being drawn
    #[must_use]
    pub fn view(&self) -> &ViewId {
        &self.view
    }

    /// Width in CSS pixels
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in CSS pixels
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    fn line(&mut self, text: &str) {
        self.script.push('\n');
        self.script.push_str(text);
    }

    fn call(&mut self, func: &str, args: &[f64]) {
        let _ = write!(self.script, "\nctx.{func}({});", nums(args));
    }

    fn next_var(&mut self, prefix: &str) -> String {
        self.next_var += 1;
        format!("{prefix}{}", self.next_var)
    }

    /// The recorded script, closed
    #[must_use]
    pub fn finish(mut self) -> String {
        self.script.push_str("\n}\n}");
        self.script
    }

    // ------------------------------------------------------------------------
    // State and transforms
    // ------------------------------------------------------------------------

    /// Push the drawing state
    pub fn save(&mut self) {
        self.line("ctx.save();");
    }

    /// Pop the drawing state
    pub fn restore(&mut self) {
        self.line("ctx.restore();");
    }

    /// Clip to a rectangle
    pub fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.line("ctx.beginPath();");
        self.call("rect", &[x, y, width, height]);
        self.line("ctx.clip();");
    }

    /// Clip to a path
    pub fn clip_path(&mut self, path: &Path) {
        self.script.push_str(&path.script_text());
        self.line("ctx.clip();");
    }

    /// Scale
    pub fn set_scale(&mut self, x: f64, y: f64) {
        self.call("scale", &[x, y]);
    }

    /// Translate
    pub fn set_translation(&mut self, x: f64, y: f64) {
        self.call("translate", &[x, y]);
    }

    /// Rotate by `angle` radians
    pub fn set_rotation(&mut self, angle: f64) {
        self.call("rotate", &[angle]);
    }

    /// Multiply by the matrix `[x_scale y_skew x_skew y_scale dx dy]`
    pub fn set_transformation(&mut self, x_scale: f64, y_scale: f64, x_skew: f64, y_skew: f64, dx: f64, dy: f64) {
        self.call("transform", &[x_scale, y_skew, x_skew, y_scale, dx, dy]);
    }

    /// Back to the identity (keeping the pixel ratio scale)
    pub fn reset_transformation(&mut self) {
        self.line("ctx.resetTransform();\nctx.scale(dpr, dpr);");
    }

    // ------------------------------------------------------------------------
    // Fill and stroke styles
    // ------------------------------------------------------------------------

    /// Solid fill color
    pub fn set_fill_color(&mut self, color: Color) {
        let _ = write!(self.script, "\nctx.fillStyle = {};", quote(&color.css_string()));
    }

    /// Solid stroke color
    pub fn set_stroke_color(&mut self, color: Color) {
        let _ = write!(self.script, "\nctx.strokeStyle = {};", quote(&color.css_string()));
    }

    fn gradient_stops(&mut self, name: &str, start: Color, stops: &[(f64, Color)], end: Color) {
        let _ = write!(self.script, "\n{name}.addColorStop(0, {});", quote(&start.css_string()));
        for (offset, color) in stops.iter().filter(|(offset, _)| (0.0..=1.0).contains(offset)) {
            let _ = write!(
                self.script,
                "\n{name}.addColorStop({}, {});",
                num(*offset),
                quote(&color.css_string())
            );
        }
        let _ = write!(self.script, "\n{name}.addColorStop(1, {});", quote(&end.css_string()));
    }

    /// Linear gradient from `(x0, y0)` to `(x1, y1)`
    ///
    /// `stops` are `(offset, color)` pairs between the end colors; offsets
    /// outside `0..=1` are dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn linear_gradient(
        &mut self,
        x0: f64,
        y0: f64,
        start: Color,
        x1: f64,
        y1: f64,
        end: Color,
        stops: &[(f64, Color)],
    ) -> CanvasStyle {
        let name = self.next_var("gradient");
        let _ = write!(self.script, "\nlet {name} = ctx.createLinearGradient({});", nums(&[x0, y0, x1, y1]));
        self.gradient_stops(&name, start, stops, end);
        CanvasStyle(name)
    }

    /// Radial gradient between two circles
    #[allow(clippy::too_many_arguments)]
    pub fn radial_gradient(
        &mut self,
        x0: f64,
        y0: f64,
        r0: f64,
        start: Color,
        x1: f64,
        y1: f64,
        r1: f64,
        end: Color,
        stops: &[(f64, Color)],
    ) -> CanvasStyle {
        let name = self.next_var("gradient");
        let _ = write!(
            self.script,
            "\nlet {name} = ctx.createRadialGradient({});",
            nums(&[x0, y0, r0, x1, y1, r1])
        );
        self.gradient_stops(&name, start, stops, end);
        CanvasStyle(name)
    }

    /// Pattern of a loaded image; `None` while the image is not ready
    pub fn pattern(&mut self, url: &str, repeat: Repeat) -> Option<CanvasStyle> {
        if !self.ready_images.iter().any(|ready| ready == url) {
            tracing::debug!(view = %self.view, url = %url, "pattern of an image not loaded");
            return None;
        }
        let name = self.next_var("pattern");
        let _ = write!(
            self.script,
            "\nlet {name} = null;\n{{\nconst img = images.get({});\nif (img) {{\n{name} = ctx.createPattern(img, '{}');\n}}\n}}",
            quote(url),
            repeat.keyword()
        );
        Some(CanvasStyle(name))
    }

    /// Fill with a gradient or pattern
    pub fn set_fill_style(&mut self, style: &CanvasStyle) {
        let _ = write!(self.script, "\nif ({0}) ctx.fillStyle = {0};", style.0);
    }

    /// Stroke with a gradient or pattern
    pub fn set_stroke_style(&mut self, style: &CanvasStyle) {
        let _ = write!(self.script, "\nif ({0}) ctx.strokeStyle = {0};", style.0);
    }

    // ------------------------------------------------------------------------
    // Lines, text, shadow
    // ------------------------------------------------------------------------

    /// Line width; ignored unless positive
    pub fn set_line_width(&mut self, width: f64) {
        if width > 0.0 {
            let _ = write!(self.script, "\nctx.lineWidth = {};", num(width));
        }
    }

    /// Corner style
    pub fn set_line_join(&mut self, join: LineJoin) {
        let _ = write!(self.script, "\nctx.lineJoin = '{}';", join.keyword());
    }

    /// End style
    pub fn set_line_cap(&mut self, cap: LineCap) {
        let _ = write!(self.script, "\nctx.lineCap = '{}';", cap.keyword());
    }

    /// Dash pattern; a negative offset keeps the current one
    pub fn set_line_dash(&mut self, dash: &[f64], offset: f64) {
        let _ = write!(self.script, "\nctx.setLineDash([{}]);", nums(dash));
        if offset >= 0.0 {
            let _ = write!(self.script, "\nctx.lineDashOffset = {};", num(offset));
        }
    }

    /// Font by family list and size
    pub fn set_font(&mut self, family: &str, size: SizeUnit) {
        let font = font_text(family, size);
        let _ = write!(self.script, "\nctx.font = {};", quote(&font));
    }

    /// Text baseline
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        let _ = write!(self.script, "\nctx.textBaseline = '{}';", baseline.keyword());
    }

    /// Text alignment
    pub fn set_text_align(&mut self, align: TextAlign) {
        let _ = write!(self.script, "\nctx.textAlign = '{}';", align.keyword());
    }

    /// Shadow of the following drawing
    pub fn set_shadow(&mut self, offset_x: f64, offset_y: f64, blur: f64, color: Color) {
        let _ = write!(
            self.script,
            "\nctx.shadowColor = {};\nctx.shadowOffsetX = {};\nctx.shadowOffsetY = {};\nctx.shadowBlur = {};",
            quote(&color.css_string()),
            num(offset_x),
            num(offset_y),
            num(blur.max(0.0))
        );
    }

    /// No shadow
    pub fn reset_shadow(&mut self) {
        self.line("ctx.shadowColor = 'rgba(0,0,0,0)';\nctx.shadowOffsetX = 0;\nctx.shadowOffsetY = 0;\nctx.shadowBlur = 0;");
    }

    // ------------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------------

    /// Erase a rectangle
    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.call("clearRect", &[x, y, width, height]);
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.call("fillRect", &[x, y, width, height]);
    }

    /// Outline a rectangle
    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.call("strokeRect", &[x, y, width, height]);
    }

    /// Fill then outline a rectangle
    pub fn fill_and_stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill_rect(x, y, width, height);
        self.stroke_rect(x, y, width, height);
    }

    fn rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        let r = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let path = Path::new()
            .move_to(x + r, y)
            .arc_to(x + width, y, x + width, y + height, r)
            .arc_to(x + width, y + height, x, y + height, r)
            .arc_to(x, y + height, x, y, r)
            .arc_to(x, y, x + width, y, r)
            .close();
        self.script.push_str(&path.script_text());
    }

    /// Fill a rounded rectangle
    pub fn fill_rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        self.rounded_rect(x, y, width, height, radius);
        self.line("ctx.fill();");
    }

    /// Outline a rounded rectangle
    pub fn stroke_rounded_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        self.rounded_rect(x, y, width, height, radius);
        self.line("ctx.stroke();");
    }

    fn ellipse_path(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64) {
        let path = Path::new().ellipse(x, y, radius_x, radius_y, rotation, 0.0, 2.0 * std::f64::consts::PI, false);
        self.script.push_str(&path.script_text());
    }

    /// Fill an ellipse
    pub fn fill_ellipse(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64) {
        if radius_x >= 0.0 && radius_y >= 0.0 {
            self.ellipse_path(x, y, radius_x, radius_y, rotation);
            self.line("ctx.fill();");
        }
    }

    /// Outline an ellipse
    pub fn stroke_ellipse(&mut self, x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64) {
        if radius_x >= 0.0 && radius_y >= 0.0 {
            self.ellipse_path(x, y, radius_x, radius_y, rotation);
            self.line("ctx.stroke();");
        }
    }

    /// Fill a path
    pub fn fill_path(&mut self, path: &Path) {
        self.script.push_str(&path.script_text());
        self.line("ctx.fill();");
    }

    /// Outline a path
    pub fn stroke_path(&mut self, path: &Path) {
        self.script.push_str(&path.script_text());
        self.line("ctx.stroke();");
    }

    /// Fill then outline a path
    pub fn fill_and_stroke_path(&mut self, path: &Path) {
        self.script.push_str(&path.script_text());
        self.line("ctx.fill();\nctx.stroke();");
    }

    /// Straight line
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let path = Path::new().move_to(x0, y0).line_to(x1, y1);
        self.stroke_path(&path);
    }

    /// Fill text at `(x, y)`
    pub fn fill_text(&mut self, x: f64, y: f64, text: &str) {
        let _ = write!(self.script, "\nctx.fillText({}, {});", quote(text), nums(&[x, y]));
    }

    /// Outline text at `(x, y)`
    pub fn stroke_text(&mut self, x: f64, y: f64, text: &str) {
        let _ = write!(self.script, "\nctx.strokeText({}, {});", quote(text), nums(&[x, y]));
    }

    // ------------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------------

    fn draw_image_args(&mut self, url: &str, args: &[f64]) {
        if !self.ready_images.iter().any(|ready| ready == url) {
            tracing::debug!(view = %self.view, url = %url, "drawing an image not loaded");
            return;
        }
        let _ = write!(
            self.script,
            "\n{{\nconst img = images.get({});\nif (img) {{\nctx.drawImage(img, {});\n}}\n}}",
            quote(url),
            nums(args)
        );
    }

    /// Draw a loaded image at `(x, y)`
    pub fn draw_image(&mut self, x: f64, y: f64, url: &str) {
        self.draw_image_args(url, &[x, y]);
    }

    /// Draw a loaded image scaled into a rectangle
    pub fn draw_image_in_rect(&mut self, x: f64, y: f64, width: f64, height: f64, url: &str) {
        self.draw_image_args(url, &[x, y, width, height]);
    }

    /// Draw part of a loaded image scaled into a rectangle
    pub fn draw_image_fragment(&mut self, source: [f64; 4], target: [f64; 4], url: &str) {
        let args = [source[0], source[1], source[2], source[3], target[0], target[1], target[2], target[3]];
        self.draw_image_args(url, &args);
    }
}

/// CSS `font` shorthand of a size and a family list
fn font_text(family: &str, size: SizeUnit) -> String {
    let families: Vec<String> = family
        .split(',')
        .map(|name| name.trim_matches(|c: char| c == ' ' || c == '\n' || c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| {
            if name.contains(' ') {
                format!("\"{name}\"")
            } else {
                name.to_string()
            }
        })
        .collect();
    format!("{} {}", size.css_string("1rem"), families.join(","))
}

// ============================================================================
// Canvas views
// ============================================================================

/// Size of a text as measured by the browser
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width
    pub width: f64,
    /// Distance from the baseline to the top of the glyphs
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the glyphs
    pub descent: f64,
    /// Distance from the alignment point to the left edge
    pub left: f64,
    /// Distance from the alignment point to the right edge
    pub right: f64,
}

impl Session {
    /// Install (or with `None` remove) the drawer of a canvas view and redraw
    pub fn set_draw_handler(&mut self, id: &ViewId, handler: Option<Arc<dyn Fn(&mut Canvas) + Send + Sync>>) {
        let id = self.forward(id);
        match self.view_mut(&id).map(|view| &mut view.state) {
            Some(KindState::Canvas(slot)) => *slot = handler,
            Some(_) => {
                tracing::warn!(view = %id, "draw handler on a view that is not a canvas");
                return;
            }
            None => {
                LoomError::NotFound { path: id.to_string() }.log();
                return;
            }
        }
        self.redraw_canvas(&id);
    }

    /// Run the drawer of a canvas view and send the result
    ///
    /// Nothing happens while the view is not on screen; the browser's size
    /// report after it appears triggers the first draw.
    pub fn redraw_canvas(&mut self, id: &ViewId) {
        let id = self.forward(id);
        if self.view_kind(&id) != Some(ViewKind::CanvasView) || !self.is_on_screen(&id) {
            return;
        }
        let Some(view) = self.view(&id) else {
            return;
        };
        let frame = view.frame();
        let handler = match &view.state {
            KindState::Canvas(handler) => handler.clone(),
            _ => None,
        };

        let mut canvas = Canvas::new(&id, frame.width, frame.height);
        canvas.ready_images = self.images.ready_urls();
        canvas.clear_rect(0.0, 0.0, frame.width, frame.height);
        if let Some(handler) = handler {
            handler(&mut canvas);
        }
        let script = canvas.finish();
        self.emit(|bridge| {
            bridge.write_script(&script);
        });
    }

    /// Measure `text` in `font` on the canvas of `id`
    pub fn canvas_text_metrics(
        &mut self,
        id: &ViewId,
        text: &str,
        family: &str,
        size: SizeUnit,
    ) -> BoxFuture<'static, LoomResult<TextMetrics>> {
        let id = self.forward(id);
        let font = font_text(family, size);
        self.call_getter(
            "canvasTextMetrics",
            &[ScriptArg::from(id.as_str()), ScriptArg::from(font), ScriptArg::from(text)],
        )
        .map(|answer| {
            if is_error_answer(&answer) {
                return Err(LoomError::BridgeDisconnected {
                    operation: "canvasTextMetrics".to_string(),
                });
            }
            let number = |tag: &str| answer.float_property(tag).unwrap_or(0.0);
            Ok(TextMetrics {
                width: number("width"),
                ascent: number("ascent"),
                descent: number("descent"),
                left: number("left"),
                right: number("right"),
            })
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::DataObject;
    use crate::session::test_support::{connected_session, drain};

    fn canvas() -> Canvas {
        Canvas::new(&ViewId::from("id000001"), 100.0, 50.0)
    }

    fn body(canvas: Canvas) -> String {
        let script = canvas.finish();
        let start = script.find("ctx.scale(dpr, dpr);").unwrap() + "ctx.scale(dpr, dpr);".len();
        script[start..script.len() - "\n}\n}".len()].to_string()
    }

    #[test]
    fn test_shapes_and_styles() {
        let mut c = canvas();
        c.set_fill_color(Color(0xFFFF_0000));
        c.fill_rect(1.0, 2.0, 3.5, 4.0);
        c.set_line_width(-1.0);
        c.set_line_dash(&[4.0, 2.0], 1.0);
        c.set_text_align(TextAlign::Center);
        c.fill_text(5.0, 6.0, "it's");
        assert_eq!(
            body(c),
            "\nctx.fillStyle = 'rgb(255,0,0)';\
             \nctx.fillRect(1,2,3.5,4);\
             \nctx.setLineDash([4,2]);\
             \nctx.lineDashOffset = 1;\
             \nctx.textAlign = 'center';\
             \nctx.fillText('it\\'s', 5,6);"
        );
    }

    #[test]
    fn test_gradients_get_distinct_variables() {
        let mut c = canvas();
        let red = Color(0xFFFF_0000);
        let blue = Color(0xFF00_00FF);
        let first = c.linear_gradient(0.0, 0.0, red, 10.0, 0.0, blue, &[(0.5, red), (2.0, blue)]);
        let second = c.radial_gradient(0.0, 0.0, 1.0, red, 0.0, 0.0, 5.0, blue, &[]);
        assert_eq!(first.name(), "gradient1");
        assert_eq!(second.name(), "gradient2");
        c.set_fill_style(&first);
        c.set_stroke_style(&first);
        let script = body(c);
        assert!(script.contains("let gradient1 = ctx.createLinearGradient(0,0,10,0);"), "{script}");
        assert!(script.contains("gradient1.addColorStop(0.5, 'rgb(255,0,0)');"), "{script}");
        assert!(!script.contains("addColorStop(2,"), "{script}");
        assert!(script.contains("if (gradient1) ctx.fillStyle = gradient1;"), "{script}");
        assert!(script.contains("if (gradient1) ctx.strokeStyle = gradient1;"), "{script}");
    }

    #[test]
    fn test_paths_and_images() {
        let mut c = canvas();
        c.stroke_path(&Path::new().move_to(0.0, 0.0).line_to(10.0, 10.0).close());
        c.draw_image(0.0, 0.0, "missing.png");
        assert!(c.pattern("missing.png", Repeat::Both).is_none());
        assert_eq!(
            body(c),
            "\nctx.beginPath();\nctx.moveTo(0,0);\nctx.lineTo(10,10);\nctx.closePath();\nctx.stroke();"
        );
    }

    #[test]
    fn test_font_quotes_families_with_spaces() {
        assert_eq!(font_text("Open Sans, serif", SizeUnit::px(12.0)), "12px \"Open Sans\",serif");
    }

    #[test]
    fn test_redraw_after_resize() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::CanvasView);
        session.set_draw_handler(
            &id,
            Some(Arc::new(|canvas: &mut Canvas| {
                let (w, h) = (canvas.width(), canvas.height());
                canvas.stroke_rect(0.0, 0.0, w, h);
            })),
        );
        assert_eq!(drain(&mut rx), "");

        session.set_root_view(&id);
        drain(&mut rx);
        session.handle_message(
            &DataObject::parse("resize{views=[_{id=id000001, x=0, y=0, width=80, height=40}]}").unwrap(),
        );
        let out = drain(&mut rx);
        assert!(out.contains("document.getElementById('id000001')"), "{out}");
        assert!(out.contains("ctx.clearRect(0,0,80,40);\nctx.strokeRect(0,0,80,40);"), "{out}");
    }

    #[tokio::test]
    async fn test_text_metrics_getter() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::CanvasView);
        let metrics = session.canvas_text_metrics(&id, "Hi", "serif", SizeUnit::px(10.0));
        assert_eq!(drain(&mut rx), "canvasTextMetrics(0, 'id000001', '10px serif', 'Hi');");
        session.handle_message(
            &DataObject::parse("answer{answerID=0, width=12.5, ascent=8, descent=2, left=0, right=12}").unwrap(),
        );
        let metrics = metrics.await.unwrap();
        assert!((metrics.width - 12.5).abs() < f64::EPSILON);
        assert!((metrics.descent - 2.0).abs() < f64::EPSILON);
    }
}
