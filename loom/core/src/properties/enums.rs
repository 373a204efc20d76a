//! Enumerated property tables
//!
//! An enum property stores an index into [`EnumTable::values`]. The table
//! also carries the CSS property name and the CSS spelling of each value, so
//! the serializer never needs a per-tag switch for plain enums.

/// Value table of one enumerated property
#[derive(Debug)]
pub struct EnumTable {
    /// Property tag the table belongs to (used in diagnostics)
    pub tag: &'static str,
    /// Accepted spellings, indexed by stored value
    pub values: &'static [&'static str],
    /// CSS property written for this tag, empty when emitted by custom code
    pub css_tag: &'static str,
    /// CSS spelling of each value (same length as `values`)
    pub css_values: &'static [&'static str],
    /// Extra spellings resolving to an index
    pub aliases: &'static [(&'static str, usize)],
}

impl EnumTable {
    /// Resolve a text (case-insensitive name, alias or decimal index)
    #[must_use]
    pub fn index_of(&self, text: &str) -> Option<usize> {
        let text = text.trim().to_ascii_lowercase();
        if let Some(index) = self.values.iter().position(|v| *v == text) {
            return Some(index);
        }
        if let Some((_, index)) = self.aliases.iter().find(|(alias, _)| *alias == text) {
            return Some(*index);
        }
        text.parse::<usize>()
            .ok()
            .filter(|index| *index < self.values.len())
    }

    /// Name of the value at `index`
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.values.get(index).copied()
    }

    /// CSS spelling of the value at `index`, clamped to the default on overflow
    #[must_use]
    pub fn css_value(&self, index: usize) -> &'static str {
        match self.css_values.get(index) {
            Some(value) => value,
            None => {
                tracing::error!(tag = self.tag, index, "enum value out of range, using default");
                self.css_values.first().copied().unwrap_or("")
            }
        }
    }
}

macro_rules! enum_table {
    ($name:ident, $tag:expr, $css_tag:expr, [$($value:expr),+ $(,)?]) => {
        enum_table!($name, $tag, $css_tag, [$($value),+], [$($value),+], []);
    };
    ($name:ident, $tag:expr, $css_tag:expr, [$($value:expr),+ $(,)?], [$($css:expr),+ $(,)?]) => {
        enum_table!($name, $tag, $css_tag, [$($value),+], [$($css),+], []);
    };
    ($name:ident, $tag:expr, $css_tag:expr, [$($value:expr),+ $(,)?], [$($css:expr),+ $(,)?], [$($alias:expr),* $(,)?]) => {
        #[allow(missing_docs)]
        pub static $name: EnumTable = EnumTable {
            tag: $tag,
            values: &[$($value),+],
            css_tag: $css_tag,
            css_values: &[$($css),+],
            aliases: &[$($alias),*],
        };
    };
}

// ============================================================================
// View
// ============================================================================

enum_table!(VISIBILITY, "visibility", "", ["visible", "invisible", "gone"]);
enum_table!(
    SEMANTICS,
    "semantics",
    "",
    [
        "default", "article", "section", "aside", "header", "main", "footer", "navigation",
        "figure", "figure-caption", "button", "p", "h1", "h2", "h3", "h4", "h5", "h6",
        "blockquote", "code"
    ],
    [
        "div", "article", "section", "aside", "header", "main", "footer", "nav", "figure",
        "figcaption", "button", "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "code"
    ]
);
enum_table!(OVERFLOW, "overflow", "overflow", ["hidden", "visible", "scroll", "auto"]);
enum_table!(
    CURSOR,
    "cursor",
    "cursor",
    [
        "auto", "default", "none", "context-menu", "help", "pointer", "progress", "wait", "cell",
        "crosshair", "text", "vertical-text", "alias", "copy", "move", "no-drop", "not-allowed",
        "e-resize", "n-resize", "ne-resize", "nw-resize", "s-resize", "se-resize", "sw-resize",
        "w-resize", "ew-resize", "ns-resize", "nesw-resize", "nwse-resize", "col-resize",
        "row-resize", "all-scroll", "zoom-in", "zoom-out", "grab", "grabbing"
    ]
);
enum_table!(
    MIX_BLEND_MODE,
    "mix-blend-mode",
    "mix-blend-mode",
    [
        "normal", "multiply", "screen", "overlay", "darken", "lighten", "color-dodge",
        "color-burn", "hard-light", "soft-light", "difference", "exclusion", "hue",
        "saturation", "color", "luminosity"
    ]
);
enum_table!(FLOAT, "float", "float", ["none", "left", "right"]);
enum_table!(RESIZE, "resize", "resize", ["none", "both", "horizontal", "vertical"]);

// ============================================================================
// Text
// ============================================================================

enum_table!(TEXT_ALIGN, "text-align", "text-align", ["left", "right", "center", "justify"]);
enum_table!(
    TEXT_TRANSFORM,
    "text-transform",
    "text-transform",
    ["none", "capitalize", "lowercase", "uppercase"]
);
enum_table!(
    TEXT_WEIGHT,
    "text-weight",
    "font-weight",
    [
        "inherit", "thin", "extra-light", "light", "normal", "medium", "semi-bold", "bold",
        "extra-bold", "black"
    ],
    ["inherit", "100", "200", "300", "normal", "500", "600", "bold", "800", "900"]
);
enum_table!(
    TEXT_DIRECTION,
    "text-direction",
    "direction",
    ["system", "left-to-right", "right-to-left"],
    ["", "ltr", "rtl"]
);
enum_table!(
    WRITING_MODE,
    "writing-mode",
    "writing-mode",
    [
        "horizontal-top-to-bottom",
        "horizontal-bottom-to-top",
        "vertical-right-to-left",
        "vertical-left-to-right"
    ],
    ["horizontal-tb", "horizontal-bt", "vertical-rl", "vertical-lr"]
);
enum_table!(
    VERTICAL_TEXT_ORIENTATION,
    "vertical-text-orientation",
    "text-orientation",
    ["mixed", "upright"]
);
enum_table!(
    WHITE_SPACE,
    "white-space",
    "white-space",
    ["normal", "nowrap", "pre", "pre-wrap", "pre-line", "break-spaces"]
);
enum_table!(
    WORD_BREAK,
    "word-break",
    "word-break",
    ["normal", "break-all", "keep-all", "break-word"]
);
enum_table!(TEXT_OVERFLOW, "text-overflow", "text-overflow", ["clip", "ellipsis"]);
enum_table!(
    TEXT_LINE_STYLE,
    "text-line-style",
    "text-decoration-style",
    ["inherit", "solid", "dashed", "dotted", "double", "wavy"]
);

// ============================================================================
// Border, outline, column separator
// ============================================================================

enum_table!(
    BORDER_STYLE,
    "style",
    "",
    ["none", "solid", "dashed", "dotted", "double"]
);

// ============================================================================
// Layouts
// ============================================================================

enum_table!(
    ORIENTATION,
    "orientation",
    "",
    ["up-down", "start-to-end", "bottom-up", "end-to-start"],
    ["column", "row", "column-reverse", "row-reverse"],
    [("vertical", 0), ("horizontal", 1), ("left-to-right", 1)]
);
enum_table!(
    LIST_WRAP,
    "list-wrap",
    "",
    ["off", "on", "reverse"],
    ["nowrap", "wrap", "wrap-reverse"]
);
enum_table!(
    VERTICAL_ALIGN,
    "vertical-align",
    "",
    ["top", "bottom", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    HORIZONTAL_ALIGN,
    "horizontal-align",
    "",
    ["left", "right", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    CELL_VERTICAL_ALIGN,
    "cell-vertical-align",
    "align-items",
    ["top", "bottom", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    CELL_HORIZONTAL_ALIGN,
    "cell-horizontal-align",
    "justify-items",
    ["left", "right", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    CELL_VERTICAL_SELF_ALIGN,
    "cell-vertical-self-align",
    "align-self",
    ["top", "bottom", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    CELL_HORIZONTAL_SELF_ALIGN,
    "cell-horizontal-self-align",
    "justify-self",
    ["left", "right", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);
enum_table!(
    TABS,
    "tabs",
    "",
    ["top", "bottom", "left", "right", "left-list", "right-list", "hidden"]
);
enum_table!(
    CHECKBOX_VERTICAL_ALIGN,
    "checkbox-vertical-align",
    "",
    ["top", "bottom", "center"],
    ["start", "end", "center"]
);
enum_table!(
    CHECKBOX_HORIZONTAL_ALIGN,
    "checkbox-horizontal-align",
    "",
    ["left", "right", "center"],
    ["start", "end", "center"]
);
enum_table!(
    EDIT_VIEW_TYPE,
    "edit-view-type",
    "",
    ["text", "password", "email", "emails", "url", "phone", "multiline"]
);
enum_table!(NUMBER_PICKER_TYPE, "number-picker-type", "", ["editor", "slider"]);
enum_table!(SELECTION_MODE, "selection-mode", "", ["none", "cell", "row"]);

// ============================================================================
// Images, media and backgrounds
// ============================================================================

enum_table!(
    FIT,
    "fit",
    "object-fit",
    ["none", "contain", "cover", "fill", "scale-down"]
);
enum_table!(
    IMAGE_VERTICAL_ALIGN,
    "image-vertical-align",
    "",
    ["top", "bottom", "center"]
);
enum_table!(
    IMAGE_HORIZONTAL_ALIGN,
    "image-horizontal-align",
    "",
    ["left", "right", "center"]
);
enum_table!(PRELOAD, "preload", "", ["none", "metadata", "auto"]);
enum_table!(
    BACKGROUND_CLIP,
    "background-clip",
    "background-clip",
    ["border-box", "padding-box", "content-box"]
);
enum_table!(
    BACKGROUND_ORIGIN,
    "background-origin",
    "background-origin",
    ["border-box", "padding-box", "content-box"]
);
enum_table!(
    BACKGROUND_BLEND_MODE,
    "background-blend-mode",
    "background-blend-mode",
    [
        "normal", "multiply", "screen", "overlay", "darken", "lighten", "color-dodge",
        "color-burn", "hard-light", "soft-light", "difference", "exclusion", "hue",
        "saturation", "color", "luminosity"
    ]
);
enum_table!(
    REPEAT,
    "repeat",
    "",
    ["no-repeat", "repeat", "repeat-x", "repeat-y", "round", "space"]
);
enum_table!(ATTACHMENT, "attachment", "", ["scroll", "fixed", "local"]);
enum_table!(BACKGROUND_FIT, "fit", "", ["none", "contain", "cover"]);
enum_table!(
    DIRECTION,
    "direction",
    "",
    [
        "to-top",
        "to-right-top",
        "to-right",
        "to-right-bottom",
        "to-bottom",
        "to-left-bottom",
        "to-left",
        "to-left-top"
    ],
    [
        "to top",
        "to right top",
        "to right",
        "to right bottom",
        "to bottom",
        "to left bottom",
        "to left",
        "to left top"
    ],
    [
        ("to top", 0),
        ("to right top", 1),
        ("to right", 2),
        ("to right bottom", 3),
        ("to bottom", 4),
        ("to left bottom", 5),
        ("to left", 6),
        ("to left top", 7)
    ]
);
enum_table!(
    RADIAL_GRADIENT_SHAPE,
    "radial-gradient-shape",
    "",
    ["ellipse", "circle"]
);
enum_table!(
    RADIAL_GRADIENT_RADIUS,
    "radial-gradient-radius",
    "",
    ["closest-side", "closest-corner", "farthest-side", "farthest-corner"]
);

// ============================================================================
// Animation, popup
// ============================================================================

enum_table!(
    ANIMATION_DIRECTION,
    "animation-direction",
    "",
    ["normal", "reverse", "alternate", "alternate-reverse"]
);
enum_table!(ARROW, "arrow", "", ["none", "top", "right", "bottom", "left"]);
enum_table!(ARROW_ALIGN, "arrow-align", "", ["left", "right", "center"], ["start", "end", "center"], [("top", 0), ("bottom", 1)]);
enum_table!(
    BUTTONS_ALIGN,
    "buttons-align",
    "",
    ["left", "right", "center", "stretch"],
    ["start", "end", "center", "stretch"]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_names_and_numbers() {
        assert_eq!(VISIBILITY.index_of("Gone"), Some(2));
        assert_eq!(VISIBILITY.index_of("1"), Some(1));
        assert_eq!(VISIBILITY.index_of("3"), None);
        assert_eq!(VISIBILITY.index_of("hidden"), None);
    }

    #[test]
    fn test_orientation_aliases() {
        assert_eq!(ORIENTATION.index_of("vertical"), Some(0));
        assert_eq!(ORIENTATION.index_of("horizontal"), Some(1));
        assert_eq!(ORIENTATION.index_of("left-to-right"), Some(1));
        assert_eq!(ORIENTATION.css_value(1), "row");
    }

    #[test]
    fn test_css_value_clamps() {
        assert_eq!(TEXT_WEIGHT.css_value(7), "bold");
        assert_eq!(TEXT_WEIGHT.css_value(99), "inherit");
        assert_eq!(DIRECTION.index_of("to bottom"), Some(4));
        assert_eq!(DIRECTION.css_value(4), "to bottom");
    }

    #[test]
    fn test_tables_are_consistent() {
        for table in [
            &VISIBILITY,
            &SEMANTICS,
            &TEXT_WEIGHT,
            &TEXT_DIRECTION,
            &WRITING_MODE,
            &ORIENTATION,
            &LIST_WRAP,
            &DIRECTION,
            &CHECKBOX_VERTICAL_ALIGN,
        ] {
            assert_eq!(table.values.len(), table.css_values.len(), "{}", table.tag);
        }
    }
}
