//! Per-tag schema of the view property bag
//!
//! The setter is table driven: the tag is normalized, looked up here, and the
//! resulting [`PropertyKind`] decides how the value is coerced and stored.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::events::{PayloadKind, EVENT_TAGS};

use super::enums::{self, EnumTable};
use super::names as tag;

/// Storage category of a tag
#[derive(Clone, Copy, Debug)]
pub enum PropertyKind {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// `f64` in `0..=1`, also accepts `NN%`
    Fraction,
    /// Text
    Text,
    /// [`crate::values::Color`]
    Color,
    /// [`crate::values::SizeUnit`]
    Size,
    /// [`crate::values::AngleUnit`]
    Angle,
    /// [`crate::values::Range`]
    Range,
    /// List of sizes
    Sizes,
    /// List of texts
    Texts,
    /// Index into an enum table
    Enum(&'static EnumTable),
    /// Margin / padding quad, exploded into four size leaves
    Bounds,
    /// Aggregate tag of a composite sub-property
    Composite(CompositeKind),
    /// Leaf tag delegated to a composite sub-property
    Leaf(CompositeKind),
    /// Box / text shadows
    Shadows,
    /// Background layers
    Background,
    /// Transition map
    Transitions,
    /// Keyframe animation list
    Animations,
    /// Listener list of an event
    Listener(PayloadKind),
    /// Child views of a container
    Views,
    /// Raw object / params, stored unvalidated
    Object,
}

/// Composite sub-property families
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeKind {
    /// `border`
    Border,
    /// `radius`
    Radius,
    /// `outline`
    Outline,
    /// `transform`
    Transform,
    /// `filter` / `backdrop-filter`
    Filter,
    /// `column-separator`
    ColumnSeparator,
}

impl CompositeKind {
    /// View-level aggregate tag that stores the composite
    #[must_use]
    pub fn aggregate(self) -> &'static str {
        match self {
            Self::Border => tag::BORDER,
            Self::Radius => tag::RADIUS,
            Self::Outline => tag::OUTLINE,
            Self::Transform => tag::TRANSFORM,
            Self::Filter => tag::FILTER,
            Self::ColumnSeparator => tag::COLUMN_SEPARATOR,
        }
    }

    /// Tag of the leaf inside the composite bag
    #[must_use]
    pub fn local_tag(self, view_tag: &str) -> String {
        let local = match self {
            Self::Border => view_tag.strip_prefix("border-"),
            Self::Radius => view_tag.strip_prefix("radius-"),
            Self::Outline => view_tag.strip_prefix("outline-"),
            Self::ColumnSeparator => view_tag.strip_prefix("column-separator-"),
            Self::Transform | Self::Filter => None,
        };
        local.unwrap_or(view_tag).to_string()
    }

    /// View-level tag of a local leaf tag
    #[must_use]
    pub fn view_tag(self, local: &str) -> String {
        match self {
            Self::Border => format!("border-{local}"),
            Self::Radius => format!("radius-{local}"),
            Self::Outline => format!("outline-{local}"),
            Self::ColumnSeparator => format!("column-separator-{local}"),
            Self::Transform | Self::Filter => local.to_string(),
        }
    }
}

/// Lower-case, trim and fold view-level aliases
#[must_use]
pub fn normalize_view_tag(tag: &str) -> String {
    let tag = tag.trim().to_ascii_lowercase();
    let alias = match tag.as_str() {
        "top-margin" => tag::MARGIN_TOP,
        "right-margin" => tag::MARGIN_RIGHT,
        "bottom-margin" => tag::MARGIN_BOTTOM,
        "left-margin" => tag::MARGIN_LEFT,
        "top-padding" => tag::PADDING_TOP,
        "right-padding" => tag::PADDING_RIGHT,
        "bottom-padding" => tag::PADDING_BOTTOM,
        "left-padding" => tag::PADDING_LEFT,
        "origin-x" => tag::TRANSFORM_ORIGIN_X,
        "origin-y" => tag::TRANSFORM_ORIGIN_Y,
        "origin-z" => tag::TRANSFORM_ORIGIN_Z,
        "tabindex" => tag::TAB_INDEX,
        "type" => tag::NUMBER_PICKER_TYPE,
        "min" => tag::NUMBER_PICKER_MIN,
        "max" => tag::NUMBER_PICKER_MAX,
        "step" => tag::NUMBER_PICKER_STEP,
        "value" => tag::NUMBER_PICKER_VALUE,
        "precision" => tag::NUMBER_PICKER_PRECISION,
        _ => return tag,
    };
    alias.to_string()
}

/// Kind of a normalized view tag
#[must_use]
pub fn view_property_kind(tag: &str) -> Option<PropertyKind> {
    VIEW_SCHEMA.get(tag).copied()
}

static VIEW_SCHEMA: LazyLock<HashMap<&'static str, PropertyKind>> = LazyLock::new(|| {
    use CompositeKind as C;
    use PropertyKind as K;

    let mut schema: HashMap<&'static str, PropertyKind> = HashMap::new();
    let mut add = |tags: &[&'static str], kind: PropertyKind| {
        for t in tags {
            schema.insert(t, kind);
        }
    };

    add(
        &[
            tag::ID,
            tag::STYLE,
            tag::STYLE_DISABLED,
            tag::TOOLTIP,
            tag::FONT_NAME,
            tag::TEXT,
            tag::HINT,
            tag::SRC,
            tag::ALT_TEXT,
            tag::POSTER,
            tag::TAB_STYLE,
            tag::CURRENT_TAB_STYLE,
            tag::TITLE,
            tag::ICON,
            tag::PUSH_TIMING,
        ],
        K::Text,
    );
    add(
        &[
            tag::DISABLED,
            tag::FOCUSABLE,
            tag::USER_SELECT,
            tag::ITALIC,
            tag::SMALL_CAPS,
            tag::STRIKETHROUGH,
            tag::OVERLINE,
            tag::UNDERLINE,
            tag::COLUMN_SPAN_ALL,
            tag::AVOID_BREAK,
            tag::BACKFACE_VISIBLE,
            tag::ANIMATION_PAUSED,
            tag::CHECKED,
            tag::READ_ONLY,
            tag::CONTROLS,
            tag::LOOP,
            tag::MUTED,
            tag::TAB_CLOSE_BUTTON,
        ],
        K::Bool,
    );
    add(
        &[
            tag::Z_INDEX,
            tag::ORDER,
            tag::TAB_INDEX,
            tag::COLUMN_COUNT,
            tag::TAB_SIZE,
            tag::MAX_LENGTH,
            tag::CURRENT,
            tag::NUMBER_PICKER_PRECISION,
            tag::HEAD_HEIGHT,
            tag::FOOT_HEIGHT,
        ],
        K::Int,
    );
    add(
        &[
            tag::PUSH_DURATION,
            tag::NUMBER_PICKER_MIN,
            tag::NUMBER_PICKER_MAX,
            tag::NUMBER_PICKER_STEP,
            tag::NUMBER_PICKER_VALUE,
        ],
        K::Float,
    );
    add(&[tag::ITEMS, tag::DISABLED_ITEMS, tag::DATA_LIST], K::Texts);
    add(&[tag::OPACITY], K::Fraction);
    add(
        &[
            tag::TEXT_COLOR,
            tag::BACKGROUND_COLOR,
            tag::TEXT_LINE_COLOR,
            tag::CARET_COLOR,
            tag::ACCENT_COLOR,
        ],
        K::Color,
    );
    add(
        &[
            tag::WIDTH,
            tag::HEIGHT,
            tag::MIN_WIDTH,
            tag::MIN_HEIGHT,
            tag::MAX_WIDTH,
            tag::MAX_HEIGHT,
            tag::LEFT,
            tag::RIGHT,
            tag::TOP,
            tag::BOTTOM,
            tag::MARGIN_TOP,
            tag::MARGIN_RIGHT,
            tag::MARGIN_BOTTOM,
            tag::MARGIN_LEFT,
            tag::PADDING_TOP,
            tag::PADDING_RIGHT,
            tag::PADDING_BOTTOM,
            tag::PADDING_LEFT,
            tag::TEXT_SIZE,
            tag::TEXT_INDENT,
            tag::LETTER_SPACING,
            tag::WORD_SPACING,
            tag::LINE_HEIGHT,
            tag::TEXT_LINE_THICKNESS,
            tag::LIST_ROW_GAP,
            tag::LIST_COLUMN_GAP,
            tag::GRID_ROW_GAP,
            tag::GRID_COLUMN_GAP,
            tag::COLUMN_GAP,
            tag::COLUMN_WIDTH,
            tag::OUTLINE_OFFSET,
            tag::PERSPECTIVE_ORIGIN_X,
            tag::PERSPECTIVE_ORIGIN_Y,
            tag::TRANSFORM_ORIGIN_X,
            tag::TRANSFORM_ORIGIN_Y,
            tag::TRANSFORM_ORIGIN_Z,
        ],
        K::Size,
    );
    add(&[tag::ROW, tag::COLUMN], K::Range);
    add(&[tag::CELL_WIDTH, tag::CELL_HEIGHT], K::Sizes);
    add(&[tag::MARGIN, tag::PADDING], K::Bounds);

    let enum_tags: &[(&'static str, &'static EnumTable)] = &[
        (tag::VISIBILITY, &enums::VISIBILITY),
        (tag::SEMANTICS, &enums::SEMANTICS),
        (tag::OVERFLOW, &enums::OVERFLOW),
        (tag::CURSOR, &enums::CURSOR),
        (tag::MIX_BLEND_MODE, &enums::MIX_BLEND_MODE),
        (tag::FLOAT, &enums::FLOAT),
        (tag::RESIZE, &enums::RESIZE),
        (tag::TEXT_ALIGN, &enums::TEXT_ALIGN),
        (tag::TEXT_TRANSFORM, &enums::TEXT_TRANSFORM),
        (tag::TEXT_WEIGHT, &enums::TEXT_WEIGHT),
        (tag::TEXT_DIRECTION, &enums::TEXT_DIRECTION),
        (tag::WRITING_MODE, &enums::WRITING_MODE),
        (tag::VERTICAL_TEXT_ORIENTATION, &enums::VERTICAL_TEXT_ORIENTATION),
        (tag::WHITE_SPACE, &enums::WHITE_SPACE),
        (tag::WORD_BREAK, &enums::WORD_BREAK),
        (tag::TEXT_OVERFLOW, &enums::TEXT_OVERFLOW),
        (tag::TEXT_LINE_STYLE, &enums::TEXT_LINE_STYLE),
        (tag::ORIENTATION, &enums::ORIENTATION),
        (tag::LIST_WRAP, &enums::LIST_WRAP),
        (tag::VERTICAL_ALIGN, &enums::VERTICAL_ALIGN),
        (tag::HORIZONTAL_ALIGN, &enums::HORIZONTAL_ALIGN),
        (tag::CELL_VERTICAL_ALIGN, &enums::CELL_VERTICAL_ALIGN),
        (tag::CELL_HORIZONTAL_ALIGN, &enums::CELL_HORIZONTAL_ALIGN),
        (tag::CELL_VERTICAL_SELF_ALIGN, &enums::CELL_VERTICAL_SELF_ALIGN),
        (tag::CELL_HORIZONTAL_SELF_ALIGN, &enums::CELL_HORIZONTAL_SELF_ALIGN),
        (tag::TABS, &enums::TABS),
        (tag::CHECKBOX_VERTICAL_ALIGN, &enums::CHECKBOX_VERTICAL_ALIGN),
        (tag::CHECKBOX_HORIZONTAL_ALIGN, &enums::CHECKBOX_HORIZONTAL_ALIGN),
        (tag::EDIT_VIEW_TYPE, &enums::EDIT_VIEW_TYPE),
        (tag::NUMBER_PICKER_TYPE, &enums::NUMBER_PICKER_TYPE),
        (tag::SELECTION_MODE, &enums::SELECTION_MODE),
        (tag::FIT, &enums::FIT),
        (tag::IMAGE_VERTICAL_ALIGN, &enums::IMAGE_VERTICAL_ALIGN),
        (tag::IMAGE_HORIZONTAL_ALIGN, &enums::IMAGE_HORIZONTAL_ALIGN),
        (tag::PRELOAD, &enums::PRELOAD),
        (tag::BACKGROUND_CLIP, &enums::BACKGROUND_CLIP),
        (tag::BACKGROUND_ORIGIN, &enums::BACKGROUND_ORIGIN),
        (tag::BACKGROUND_BLEND_MODE, &enums::BACKGROUND_BLEND_MODE),
    ];
    for (t, table) in enum_tags {
        add(&[t], K::Enum(table));
    }

    add(&[tag::BORDER], K::Composite(C::Border));
    add(
        &[
            tag::BORDER_LEFT,
            tag::BORDER_RIGHT,
            tag::BORDER_TOP,
            tag::BORDER_BOTTOM,
            tag::BORDER_STYLE,
            tag::BORDER_LEFT_STYLE,
            tag::BORDER_RIGHT_STYLE,
            tag::BORDER_TOP_STYLE,
            tag::BORDER_BOTTOM_STYLE,
            tag::BORDER_WIDTH,
            tag::BORDER_LEFT_WIDTH,
            tag::BORDER_RIGHT_WIDTH,
            tag::BORDER_TOP_WIDTH,
            tag::BORDER_BOTTOM_WIDTH,
            tag::BORDER_COLOR,
            tag::BORDER_LEFT_COLOR,
            tag::BORDER_RIGHT_COLOR,
            tag::BORDER_TOP_COLOR,
            tag::BORDER_BOTTOM_COLOR,
        ],
        K::Leaf(C::Border),
    );
    add(&[tag::RADIUS], K::Composite(C::Radius));
    add(
        &[
            tag::RADIUS_X,
            tag::RADIUS_Y,
            tag::RADIUS_TOP_LEFT,
            tag::RADIUS_TOP_LEFT_X,
            tag::RADIUS_TOP_LEFT_Y,
            tag::RADIUS_TOP_RIGHT,
            tag::RADIUS_TOP_RIGHT_X,
            tag::RADIUS_TOP_RIGHT_Y,
            tag::RADIUS_BOTTOM_LEFT,
            tag::RADIUS_BOTTOM_LEFT_X,
            tag::RADIUS_BOTTOM_LEFT_Y,
            tag::RADIUS_BOTTOM_RIGHT,
            tag::RADIUS_BOTTOM_RIGHT_X,
            tag::RADIUS_BOTTOM_RIGHT_Y,
        ],
        K::Leaf(C::Radius),
    );
    add(&[tag::OUTLINE], K::Composite(C::Outline));
    add(
        &[tag::OUTLINE_STYLE, tag::OUTLINE_WIDTH, tag::OUTLINE_COLOR],
        K::Leaf(C::Outline),
    );
    add(&[tag::COLUMN_SEPARATOR], K::Composite(C::ColumnSeparator));
    add(
        &[
            tag::COLUMN_SEPARATOR_STYLE,
            tag::COLUMN_SEPARATOR_WIDTH,
            tag::COLUMN_SEPARATOR_COLOR,
        ],
        K::Leaf(C::ColumnSeparator),
    );
    add(&[tag::TRANSFORM], K::Composite(C::Transform));
    add(
        &[
            tag::PERSPECTIVE,
            tag::TRANSLATE_X,
            tag::TRANSLATE_Y,
            tag::TRANSLATE_Z,
            tag::SCALE_X,
            tag::SCALE_Y,
            tag::SCALE_Z,
            tag::ROTATE,
            tag::ROTATE_X,
            tag::ROTATE_Y,
            tag::ROTATE_Z,
            tag::SKEW_X,
            tag::SKEW_Y,
        ],
        K::Leaf(C::Transform),
    );
    add(&[tag::FILTER, tag::BACKDROP_FILTER], K::Composite(C::Filter));

    add(&[tag::SHADOW, tag::TEXT_SHADOW], K::Shadows);
    add(&[tag::BACKGROUND], K::Background);
    add(&[tag::TRANSITION], K::Transitions);
    add(&[tag::ANIMATION], K::Animations);
    add(&[tag::CONTENT], K::Views);
    add(&[tag::BUTTONS], K::Object);

    for (event, payload) in EVENT_TAGS {
        add(&[event], K::Listener(*payload));
    }

    schema
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  Top-Margin ", "WIDTH", "origin-x", "border-left-style"] {
            let once = normalize_view_tag(raw);
            assert_eq!(normalize_view_tag(&once), once);
        }
        assert_eq!(normalize_view_tag("Top-Margin"), "margin-top");
    }

    #[test]
    fn test_kinds() {
        assert!(matches!(view_property_kind("width"), Some(PropertyKind::Size)));
        assert!(matches!(
            view_property_kind("border-top-color"),
            Some(PropertyKind::Leaf(CompositeKind::Border))
        ));
        assert!(matches!(
            view_property_kind("click-event"),
            Some(PropertyKind::Listener(PayloadKind::Mouse))
        ));
        assert!(view_property_kind("no-such-tag").is_none());
    }

    #[test]
    fn test_local_tags() {
        assert_eq!(CompositeKind::Border.local_tag("border-left-style"), "left-style");
        assert_eq!(CompositeKind::Radius.local_tag("radius-top-left-x"), "top-left-x");
        assert_eq!(CompositeKind::Outline.local_tag("outline-color"), "color");
        assert_eq!(CompositeKind::Transform.local_tag("rotate-x"), "rotate-x");
    }
}
