//! CSS projection of a view (or style) property bag
//!
//! The declaration order is fixed so that the same bag always renders the
//! same text; the incremental diff emitter and the tests compare against it.

use std::collections::BTreeMap;

use crate::animation::{animations_css, transitions_css, Animation};
use crate::properties::enums::{self, EnumTable};
use crate::properties::names as tag;
use crate::properties::resolve::{
    bool_value, color_value, enum_value, float_value, int_value, range_value, sizes_value,
    size_value, text_value,
};
use crate::properties::{ConstantResolver, Properties, PropertyBag, PropertyValue};
use crate::values::{format_float_precision, SizeUnit};

use super::background::background_css;
use super::css::CssBuilder;
use super::shadow::shadows_css;
use super::transform::origin_css;

/// Size tags written as-is, `(view tag, css property)`
const SIZE_PROPERTIES: &[(&str, &str)] = &[
    (tag::WIDTH, "width"),
    (tag::HEIGHT, "height"),
    (tag::MIN_WIDTH, "min-width"),
    (tag::MIN_HEIGHT, "min-height"),
    (tag::MAX_WIDTH, "max-width"),
    (tag::MAX_HEIGHT, "max-height"),
    (tag::LEFT, "left"),
    (tag::RIGHT, "right"),
    (tag::TOP, "top"),
    (tag::BOTTOM, "bottom"),
    (tag::TEXT_SIZE, "font-size"),
    (tag::TEXT_INDENT, "text-indent"),
    (tag::LETTER_SPACING, "letter-spacing"),
    (tag::WORD_SPACING, "word-spacing"),
    (tag::LINE_HEIGHT, "line-height"),
    (tag::TEXT_LINE_THICKNESS, "text-decoration-thickness"),
    (tag::LIST_ROW_GAP, "row-gap"),
    (tag::LIST_COLUMN_GAP, "column-gap"),
    (tag::GRID_ROW_GAP, "grid-row-gap"),
    (tag::GRID_COLUMN_GAP, "grid-column-gap"),
    (tag::COLUMN_GAP, "column-gap"),
    (tag::COLUMN_WIDTH, "column-width"),
    (tag::OUTLINE_OFFSET, "outline-offset"),
];

const COLOR_PROPERTIES: &[(&str, &str)] = &[
    (tag::TEXT_COLOR, "color"),
    (tag::TEXT_LINE_COLOR, "text-decoration-color"),
    (tag::CARET_COLOR, "caret-color"),
    (tag::ACCENT_COLOR, "accent-color"),
];

/// Enums whose table names the CSS property
static ENUM_PROPERTIES: &[(&str, &EnumTable)] = &[
    (tag::OVERFLOW, &enums::OVERFLOW),
    (tag::TEXT_ALIGN, &enums::TEXT_ALIGN),
    (tag::TEXT_TRANSFORM, &enums::TEXT_TRANSFORM),
    (tag::TEXT_WEIGHT, &enums::TEXT_WEIGHT),
    (tag::TEXT_LINE_STYLE, &enums::TEXT_LINE_STYLE),
    (tag::WRITING_MODE, &enums::WRITING_MODE),
    (tag::TEXT_DIRECTION, &enums::TEXT_DIRECTION),
    (tag::VERTICAL_TEXT_ORIENTATION, &enums::VERTICAL_TEXT_ORIENTATION),
    (tag::CELL_VERTICAL_ALIGN, &enums::CELL_VERTICAL_ALIGN),
    (tag::CELL_HORIZONTAL_ALIGN, &enums::CELL_HORIZONTAL_ALIGN),
    (tag::CELL_VERTICAL_SELF_ALIGN, &enums::CELL_VERTICAL_SELF_ALIGN),
    (tag::CELL_HORIZONTAL_SELF_ALIGN, &enums::CELL_HORIZONTAL_SELF_ALIGN),
    (tag::CURSOR, &enums::CURSOR),
    (tag::WHITE_SPACE, &enums::WHITE_SPACE),
    (tag::WORD_BREAK, &enums::WORD_BREAK),
    (tag::TEXT_OVERFLOW, &enums::TEXT_OVERFLOW),
    (tag::FLOAT, &enums::FLOAT),
    (tag::RESIZE, &enums::RESIZE),
    (tag::MIX_BLEND_MODE, &enums::MIX_BLEND_MODE),
    (tag::BACKGROUND_BLEND_MODE, &enums::BACKGROUND_BLEND_MODE),
];

const ORIENTATION_START_TO_END: usize = 1;
const ORIENTATION_BOTTOM_UP: usize = 2;
const ORIENTATION_END_TO_START: usize = 3;
const WRAP_REVERSE: usize = 2;
const WRITING_MODE_VERTICAL: [usize; 2] = [2, 3];

struct Reader<'a> {
    bag: &'a PropertyBag,
    resolver: &'a dyn ConstantResolver,
}

impl Reader<'_> {
    fn raw(&self, tag: &str) -> Option<&PropertyValue> {
        self.bag.get_raw(tag)
    }

    fn size(&self, tag: &str) -> Option<SizeUnit> {
        self.raw(tag).and_then(|v| size_value(v, self.resolver))
    }

    fn origin_size(&self, tag: &str) -> SizeUnit {
        self.size(tag).unwrap_or_else(SizeUnit::auto)
    }

    fn flag(&self, tag: &str) -> Option<bool> {
        self.raw(tag).and_then(|v| bool_value(v, self.resolver))
    }

    fn int(&self, tag: &str) -> Option<i64> {
        self.raw(tag).and_then(|v| int_value(v, self.resolver))
    }

    fn enumeration(&self, tag: &str, table: &EnumTable) -> Option<usize> {
        self.raw(tag).and_then(|v| enum_value(v, table, self.resolver))
    }
}

/// Declarations of `bag`, with `animated` transitions layered over the
/// bag's own `transition` map
#[must_use]
pub fn view_style_css(
    bag: &PropertyBag,
    animated: &BTreeMap<String, Animation>,
    resolver: &dyn ConstantResolver,
) -> CssBuilder {
    let read = Reader { bag, resolver };
    let mut builder = CssBuilder::new();

    match read.enumeration(tag::VISIBILITY, &enums::VISIBILITY) {
        Some(1) => builder.add("visibility", "hidden"),
        Some(2) => builder.add("display", "none"),
        _ => {}
    }

    for bounds in [tag::MARGIN, tag::PADDING] {
        if let Some(PropertyValue::Bounds(value)) = bag.get(bounds) {
            value.bounds(resolver).css(&mut builder, bounds);
        }
    }

    if let Some(PropertyValue::Border(border)) = read.raw(tag::BORDER) {
        border.css(&mut builder, resolver);
    }
    if let Some(PropertyValue::Radius(radius)) = read.raw(tag::RADIUS) {
        radius.css(&mut builder, resolver);
    }
    if let Some(PropertyValue::Outline(outline)) = read.raw(tag::OUTLINE) {
        outline.css(&mut builder, resolver);
    }

    for (view_tag, css) in [(tag::Z_INDEX, "z-index"), (tag::ORDER, "order")] {
        if let Some(value) = read.int(view_tag) {
            builder.add(css, value.to_string());
        }
    }

    if let Some(opacity) = read.raw(tag::OPACITY).and_then(|v| float_value(v, resolver)) {
        if (0.0..=1.0).contains(&opacity) {
            builder.add("opacity", format_float_precision(opacity, 3));
        }
    }

    for (view_tag, css) in [(tag::COLUMN_COUNT, "column-count"), (tag::TAB_SIZE, "tab-size")] {
        if let Some(value) = read.int(view_tag).filter(|n| *n > 0) {
            builder.add(css, value.to_string());
        }
    }

    for (view_tag, css) in SIZE_PROPERTIES {
        if let Some(size) = read.size(view_tag).filter(|s| !s.is_auto()) {
            builder.add(css, size.css_string(""));
        }
    }

    for (view_tag, css) in COLOR_PROPERTIES {
        if let Some(color) = read.raw(view_tag).and_then(|v| color_value(v, resolver)) {
            if color.0 != 0 {
                builder.add(css, color.css_string());
            }
        }
    }

    for (view_tag, table) in [
        (tag::BACKGROUND_CLIP, &enums::BACKGROUND_CLIP),
        (tag::BACKGROUND_ORIGIN, &enums::BACKGROUND_ORIGIN),
    ] {
        if let Some(index) = read.enumeration(view_tag, table) {
            builder.add(table.css_tag, table.css_value(index));
        }
    }

    let background = match read.raw(tag::BACKGROUND) {
        Some(PropertyValue::Background(layers)) => background_css(layers, resolver),
        _ => String::new(),
    };
    if !background.is_empty() {
        builder.add("background", background);
    } else if let Some(color) = read.raw(tag::BACKGROUND_COLOR).and_then(|v| color_value(v, resolver)) {
        if color.0 != 0 {
            builder.add("background-color", color.css_string());
        }
    }

    if let Some(font) = read.raw(tag::FONT_NAME).and_then(|v| text_value(v, resolver)) {
        builder.add("font-family", font);
    }

    let writing_mode = read.enumeration(tag::WRITING_MODE, &enums::WRITING_MODE).unwrap_or(0);
    for (view_tag, table) in ENUM_PROPERTIES {
        if *view_tag == tag::VERTICAL_TEXT_ORIENTATION && !WRITING_MODE_VERTICAL.contains(&writing_mode) {
            continue;
        }
        if let Some(index) = read.enumeration(view_tag, table) {
            if !table.css_tag.is_empty() {
                builder.add(table.css_tag, table.css_value(index));
            }
        }
    }

    if let Some(italic) = read.flag(tag::ITALIC) {
        builder.add("font-style", if italic { "italic" } else { "normal" });
    }
    if let Some(small_caps) = read.flag(tag::SMALL_CAPS) {
        builder.add("font-variant", if small_caps { "small-caps" } else { "normal" });
    }

    let decorations: Vec<(&str, Option<bool>)> = vec![
        ("line-through", read.flag(tag::STRIKETHROUGH)),
        ("overline", read.flag(tag::OVERLINE)),
        ("underline", read.flag(tag::UNDERLINE)),
    ];
    if decorations.iter().any(|(_, flag)| flag.is_some()) {
        let lines: Vec<&str> = decorations
            .iter()
            .filter(|(_, flag)| *flag == Some(true))
            .map(|(name, _)| *name)
            .collect();
        if lines.is_empty() {
            builder.add("text-decoration", "none");
        } else {
            builder.add_values("text-decoration", " ", &lines);
        }
    }

    if let Some(select) = read.flag(tag::USER_SELECT) {
        let value = if select { "auto" } else { "none" };
        builder.add("-webkit-user-select", value);
        builder.add("user-select", value);
    }

    if let Some(PropertyValue::Shadows(shadows)) = read.raw(tag::SHADOW) {
        builder.add("box-shadow", shadows_css(shadows, false, resolver));
    }
    if let Some(PropertyValue::Shadows(shadows)) = read.raw(tag::TEXT_SHADOW) {
        builder.add("text-shadow", shadows_css(shadows, true, resolver));
    }

    if let Some(PropertyValue::ColumnSeparator(separator)) = read.raw(tag::COLUMN_SEPARATOR) {
        separator.css(&mut builder, resolver);
    }

    if let Some(avoid) = read.flag(tag::AVOID_BREAK) {
        builder.add("break-inside", if avoid { "avoid" } else { "auto" });
    }

    flex_css(&read, &mut builder);
    grid_css(&read, &mut builder);

    let perspective_origin = origin_css(
        read.origin_size(tag::PERSPECTIVE_ORIGIN_X),
        read.origin_size(tag::PERSPECTIVE_ORIGIN_Y),
        SizeUnit::auto(),
    );
    builder.add("perspective-origin", perspective_origin);
    if let Some(visible) = read.flag(tag::BACKFACE_VISIBLE) {
        builder.add("backface-visibility", if visible { "visible" } else { "hidden" });
    }
    let transform_origin = origin_css(
        read.origin_size(tag::TRANSFORM_ORIGIN_X),
        read.origin_size(tag::TRANSFORM_ORIGIN_Y),
        read.origin_size(tag::TRANSFORM_ORIGIN_Z),
    );
    builder.add("transform-origin", transform_origin);
    if let Some(PropertyValue::Transform(transform)) = read.raw(tag::TRANSFORM) {
        builder.add("transform", transform.css_value(resolver));
    }

    if let Some(PropertyValue::Filter(filter)) = read.raw(tag::FILTER) {
        builder.add("filter", filter.css_value(resolver));
    }
    if let Some(PropertyValue::Filter(filter)) = read.raw(tag::BACKDROP_FILTER) {
        let css = filter.css_value(resolver);
        builder.add("-webkit-backdrop-filter", css.clone());
        builder.add("backdrop-filter", css);
    }

    let mut transitions = match read.raw(tag::TRANSITION) {
        Some(PropertyValue::Transitions(map)) => map.clone(),
        _ => BTreeMap::new(),
    };
    transitions.extend(animated.iter().map(|(t, a)| (t.clone(), a.clone())));
    builder.add("transition", transitions_css(&transitions, resolver));

    if let Some(PropertyValue::Animations(animations)) = read.raw(tag::ANIMATION) {
        builder.add("animation", animations_css(animations, resolver));
    }
    if let Some(paused) = read.flag(tag::ANIMATION_PAUSED) {
        builder.add("animation-play-state", if paused { "paused" } else { "running" });
    }
    if let Some(span) = read.flag(tag::COLUMN_SPAN_ALL) {
        builder.add("column-span", if span { "all" } else { "none" });
    }

    builder
}

fn flex_css(read: &Reader<'_>, builder: &mut CssBuilder) {
    let wrap = read.enumeration(tag::LIST_WRAP, &enums::LIST_WRAP).unwrap_or(0);
    let orientation_set = read.enumeration(tag::ORIENTATION, &enums::ORIENTATION);
    let orientation = orientation_set.unwrap_or(0);
    if orientation_set.is_some() || wrap > 0 {
        let mut flow = enums::ORIENTATION.css_value(orientation).to_string();
        match wrap {
            1 => flow.push_str(" wrap"),
            WRAP_REVERSE => flow.push_str(" wrap-reverse"),
            _ => {}
        }
        builder.add("flex-flow", flow);
    }

    let rows = orientation == ORIENTATION_START_TO_END || orientation == ORIENTATION_END_TO_START;
    let (h_tag, v_tag) = if rows {
        ("justify-content", "align-items")
    } else {
        ("align-items", "justify-content")
    };

    if let Some(align) = read.enumeration(tag::HORIZONTAL_ALIGN, &enums::HORIZONTAL_ALIGN) {
        let reversed = (!rows && wrap == WRAP_REVERSE) || orientation == ORIENTATION_END_TO_START;
        let value = match align {
            0 if reversed => "flex-end",
            0 => "flex-start",
            1 if reversed => "flex-start",
            1 => "flex-end",
            2 => "center",
            _ if rows => "space-between",
            _ => "stretch",
        };
        builder.add(h_tag, value);
    }

    if let Some(align) = read.enumeration(tag::VERTICAL_ALIGN, &enums::VERTICAL_ALIGN) {
        let reversed = (rows && wrap == WRAP_REVERSE) || orientation == ORIENTATION_BOTTOM_UP;
        let value = match align {
            0 if reversed => "flex-end",
            0 => "flex-start",
            1 if reversed => "flex-start",
            1 => "flex-end",
            2 => "center",
            _ if rows => "stretch",
            _ => "space-between",
        };
        builder.add(v_tag, value);
    }
}

fn grid_css(read: &Reader<'_>, builder: &mut CssBuilder) {
    for (view_tag, css) in [(tag::ROW, "grid-row"), (tag::COLUMN, "grid-column")] {
        if let Some(range) = read.raw(view_tag).and_then(|v| range_value(v, read.resolver)) {
            builder.add(css, range.grid_css());
        }
    }

    for (view_tag, css) in [
        (tag::CELL_WIDTH, "grid-template-columns"),
        (tag::CELL_HEIGHT, "grid-template-rows"),
    ] {
        let Some(value) = read.raw(view_tag) else {
            continue;
        };
        builder.add(css, grid_template(&sizes_value(value, read.resolver)));
    }
}

/// `grid-template-*` value of cell sizes
fn grid_template(sizes: &[SizeUnit]) -> String {
    if sizes.len() > 1 && sizes.iter().all(SizeUnit::is_auto) {
        return String::new();
    }
    match sizes {
        [] => String::new(),
        [single] => format!("repeat(auto-fill, {})", single.css_string("auto")),
        [first, rest @ ..] if rest.iter().all(|s| s == first) => {
            format!("repeat({}, {})", sizes.len(), first.css_string("auto"))
        }
        _ => sizes
            .iter()
            .map(|size| size.css_string("auto"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{NoConstants, Params};
    use crate::values::Color;

    fn css(bag: &PropertyBag) -> String {
        view_style_css(bag, &BTreeMap::new(), &NoConstants).finish()
    }

    #[test]
    fn test_border_collapse_then_longhands() {
        let mut bag = PropertyBag::new();
        bag.set(
            "border",
            Params::new()
                .with("style", "solid")
                .with("width", "1px")
                .with("color", "#000"),
        );
        assert_eq!(css(&bag), "border: 1px solid rgb(0,0,0);");

        bag.set("border-top-color", Color::RED);
        assert_eq!(
            css(&bag),
            "border-style: solid; border-width: 1px; \
             border-color: rgb(255,0,0) rgb(0,0,0) rgb(0,0,0) rgb(0,0,0);"
        );
    }

    #[test]
    fn test_visibility_states() {
        let mut bag = PropertyBag::new();
        bag.set("visibility", "invisible");
        assert_eq!(css(&bag), "visibility: hidden;");
        bag.set("visibility", "gone");
        assert_eq!(css(&bag), "display: none;");
        bag.set("visibility", "visible");
        assert_eq!(css(&bag), "");
    }

    #[test]
    fn test_stable_order() {
        let mut bag = PropertyBag::new();
        bag.set("text-color", "red");
        bag.set("width", "50%");
        bag.set("margin", "4px");
        bag.set("opacity", 0.5);
        assert_eq!(
            css(&bag),
            "margin: 4px; opacity: 0.5; width: 50%; color: rgb(255,0,0);"
        );
    }

    #[test]
    fn test_flex_alignment() {
        let mut bag = PropertyBag::new();
        bag.set("orientation", "horizontal");
        bag.set("horizontal-align", "right");
        bag.set("vertical-align", "stretch");
        let builder = view_style_css(&bag, &BTreeMap::new(), &NoConstants);
        assert_eq!(builder.get("flex-flow"), Some("row"));
        assert_eq!(builder.get("justify-content"), Some("flex-end"));
        assert_eq!(builder.get("align-items"), Some("stretch"));
    }

    #[test]
    fn test_grid_templates() {
        assert_eq!(grid_template(&[SizeUnit::px(20.0)]), "repeat(auto-fill, 20px)");
        assert_eq!(
            grid_template(&[SizeUnit::fr(1.0), SizeUnit::fr(1.0)]),
            "repeat(2, 1fr)"
        );
        assert_eq!(
            grid_template(&[SizeUnit::px(10.0), SizeUnit::fr(1.0)]),
            "10px 1fr"
        );
        assert_eq!(grid_template(&[SizeUnit::auto(), SizeUnit::auto()]), "");
    }

    #[test]
    fn test_animated_transition_overrides_entry() {
        let mut bag = PropertyBag::new();
        let mut transitions = BTreeMap::new();
        transitions.insert("width".to_string(), Animation::transition(1.0, ""));
        bag.set("transition", transitions);

        let mut animated = BTreeMap::new();
        animated.insert("width".to_string(), Animation::transition(0.5, "linear"));
        animated.insert("opacity".to_string(), Animation::transition(2.0, ""));
        let builder = view_style_css(&bag, &animated, &NoConstants);
        assert_eq!(builder.get("transition"), Some("opacity 2s, width 0.5s linear"));
    }
}
