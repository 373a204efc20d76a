//! Canonical property tags
//!
//! Every tag is lower-case kebab text. Aliases (`top-margin`, `style-left`,
//! ...) are folded onto these names by the owning bag's `normalize`.

#![allow(missing_docs)]

// ============================================================================
// Identity and state
// ============================================================================

pub const ID: &str = "id";
pub const STYLE: &str = "style";
pub const STYLE_DISABLED: &str = "style-disabled";
pub const DISABLED: &str = "disabled";
pub const FOCUSABLE: &str = "focusable";
pub const SEMANTICS: &str = "semantics";
pub const VISIBILITY: &str = "visibility";
pub const TOOLTIP: &str = "tooltip";
pub const TAB_INDEX: &str = "tab-index";
pub const CONTENT: &str = "content";

// ============================================================================
// Box model
// ============================================================================

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const MIN_WIDTH: &str = "min-width";
pub const MIN_HEIGHT: &str = "min-height";
pub const MAX_WIDTH: &str = "max-width";
pub const MAX_HEIGHT: &str = "max-height";
pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const TOP: &str = "top";
pub const BOTTOM: &str = "bottom";
pub const MARGIN: &str = "margin";
pub const MARGIN_TOP: &str = "margin-top";
pub const MARGIN_RIGHT: &str = "margin-right";
pub const MARGIN_BOTTOM: &str = "margin-bottom";
pub const MARGIN_LEFT: &str = "margin-left";
pub const PADDING: &str = "padding";
pub const PADDING_TOP: &str = "padding-top";
pub const PADDING_RIGHT: &str = "padding-right";
pub const PADDING_BOTTOM: &str = "padding-bottom";
pub const PADDING_LEFT: &str = "padding-left";
pub const Z_INDEX: &str = "z-index";
pub const ORDER: &str = "order";
pub const OPACITY: &str = "opacity";
pub const OVERFLOW: &str = "overflow";
pub const RESIZE: &str = "resize";
pub const FLOAT: &str = "float";
pub const CURSOR: &str = "cursor";
pub const MIX_BLEND_MODE: &str = "mix-blend-mode";
pub const USER_SELECT: &str = "user-select";

// ============================================================================
// Border family
// ============================================================================

pub const BORDER: &str = "border";
pub const BORDER_LEFT: &str = "border-left";
pub const BORDER_RIGHT: &str = "border-right";
pub const BORDER_TOP: &str = "border-top";
pub const BORDER_BOTTOM: &str = "border-bottom";
pub const BORDER_STYLE: &str = "border-style";
pub const BORDER_LEFT_STYLE: &str = "border-left-style";
pub const BORDER_RIGHT_STYLE: &str = "border-right-style";
pub const BORDER_TOP_STYLE: &str = "border-top-style";
pub const BORDER_BOTTOM_STYLE: &str = "border-bottom-style";
pub const BORDER_WIDTH: &str = "border-width";
pub const BORDER_LEFT_WIDTH: &str = "border-left-width";
pub const BORDER_RIGHT_WIDTH: &str = "border-right-width";
pub const BORDER_TOP_WIDTH: &str = "border-top-width";
pub const BORDER_BOTTOM_WIDTH: &str = "border-bottom-width";
pub const BORDER_COLOR: &str = "border-color";
pub const BORDER_LEFT_COLOR: &str = "border-left-color";
pub const BORDER_RIGHT_COLOR: &str = "border-right-color";
pub const BORDER_TOP_COLOR: &str = "border-top-color";
pub const BORDER_BOTTOM_COLOR: &str = "border-bottom-color";

pub const OUTLINE: &str = "outline";
pub const OUTLINE_STYLE: &str = "outline-style";
pub const OUTLINE_WIDTH: &str = "outline-width";
pub const OUTLINE_COLOR: &str = "outline-color";
pub const OUTLINE_OFFSET: &str = "outline-offset";

pub const RADIUS: &str = "radius";
pub const RADIUS_X: &str = "radius-x";
pub const RADIUS_Y: &str = "radius-y";
pub const RADIUS_TOP_LEFT: &str = "radius-top-left";
pub const RADIUS_TOP_LEFT_X: &str = "radius-top-left-x";
pub const RADIUS_TOP_LEFT_Y: &str = "radius-top-left-y";
pub const RADIUS_TOP_RIGHT: &str = "radius-top-right";
pub const RADIUS_TOP_RIGHT_X: &str = "radius-top-right-x";
pub const RADIUS_TOP_RIGHT_Y: &str = "radius-top-right-y";
pub const RADIUS_BOTTOM_LEFT: &str = "radius-bottom-left";
pub const RADIUS_BOTTOM_LEFT_X: &str = "radius-bottom-left-x";
pub const RADIUS_BOTTOM_LEFT_Y: &str = "radius-bottom-left-y";
pub const RADIUS_BOTTOM_RIGHT: &str = "radius-bottom-right";
pub const RADIUS_BOTTOM_RIGHT_X: &str = "radius-bottom-right-x";
pub const RADIUS_BOTTOM_RIGHT_Y: &str = "radius-bottom-right-y";

pub const COLUMN_SEPARATOR: &str = "column-separator";
pub const COLUMN_SEPARATOR_STYLE: &str = "column-separator-style";
pub const COLUMN_SEPARATOR_WIDTH: &str = "column-separator-width";
pub const COLUMN_SEPARATOR_COLOR: &str = "column-separator-color";

// ============================================================================
// Colors, background, effects
// ============================================================================

pub const TEXT_COLOR: &str = "text-color";
pub const BACKGROUND_COLOR: &str = "background-color";
pub const TEXT_LINE_COLOR: &str = "text-line-color";
pub const CARET_COLOR: &str = "caret-color";
pub const ACCENT_COLOR: &str = "accent-color";
pub const BACKGROUND: &str = "background";
pub const BACKGROUND_CLIP: &str = "background-clip";
pub const BACKGROUND_ORIGIN: &str = "background-origin";
pub const BACKGROUND_BLEND_MODE: &str = "background-blend-mode";
pub const SHADOW: &str = "shadow";
pub const TEXT_SHADOW: &str = "text-shadow";
pub const FILTER: &str = "filter";
pub const BACKDROP_FILTER: &str = "backdrop-filter";

// ============================================================================
// Text
// ============================================================================

pub const TEXT: &str = "text";
pub const FONT_NAME: &str = "font-name";
pub const TEXT_SIZE: &str = "text-size";
pub const TEXT_WEIGHT: &str = "text-weight";
pub const TEXT_ALIGN: &str = "text-align";
pub const TEXT_TRANSFORM: &str = "text-transform";
pub const TEXT_DIRECTION: &str = "text-direction";
pub const WRITING_MODE: &str = "writing-mode";
pub const VERTICAL_TEXT_ORIENTATION: &str = "vertical-text-orientation";
pub const TEXT_INDENT: &str = "text-indent";
pub const LETTER_SPACING: &str = "letter-spacing";
pub const WORD_SPACING: &str = "word-spacing";
pub const LINE_HEIGHT: &str = "line-height";
pub const WHITE_SPACE: &str = "white-space";
pub const WORD_BREAK: &str = "word-break";
pub const TEXT_OVERFLOW: &str = "text-overflow";
pub const ITALIC: &str = "italic";
pub const SMALL_CAPS: &str = "small-caps";
pub const STRIKETHROUGH: &str = "strikethrough";
pub const OVERLINE: &str = "overline";
pub const UNDERLINE: &str = "underline";
pub const TEXT_LINE_THICKNESS: &str = "text-line-thickness";
pub const TEXT_LINE_STYLE: &str = "text-line-style";
pub const TAB_SIZE: &str = "tab-size";

// ============================================================================
// Columns and grid placement
// ============================================================================

pub const COLUMN_COUNT: &str = "column-count";
pub const COLUMN_WIDTH: &str = "column-width";
pub const COLUMN_GAP: &str = "column-gap";
pub const COLUMN_SPAN_ALL: &str = "column-span-all";
pub const AVOID_BREAK: &str = "avoid-break";
pub const ROW: &str = "row";
pub const COLUMN: &str = "column";
pub const CELL_WIDTH: &str = "cell-width";
pub const CELL_HEIGHT: &str = "cell-height";
pub const GRID_ROW_GAP: &str = "grid-row-gap";
pub const GRID_COLUMN_GAP: &str = "grid-column-gap";
pub const CELL_VERTICAL_ALIGN: &str = "cell-vertical-align";
pub const CELL_HORIZONTAL_ALIGN: &str = "cell-horizontal-align";
pub const CELL_VERTICAL_SELF_ALIGN: &str = "cell-vertical-self-align";
pub const CELL_HORIZONTAL_SELF_ALIGN: &str = "cell-horizontal-self-align";

// ============================================================================
// List layout
// ============================================================================

pub const ORIENTATION: &str = "orientation";
pub const LIST_WRAP: &str = "list-wrap";
pub const VERTICAL_ALIGN: &str = "vertical-align";
pub const HORIZONTAL_ALIGN: &str = "horizontal-align";
pub const LIST_ROW_GAP: &str = "list-row-gap";
pub const LIST_COLUMN_GAP: &str = "list-column-gap";

// ============================================================================
// Transform
// ============================================================================

pub const TRANSFORM: &str = "transform";
pub const PERSPECTIVE: &str = "perspective";
pub const PERSPECTIVE_ORIGIN_X: &str = "perspective-origin-x";
pub const PERSPECTIVE_ORIGIN_Y: &str = "perspective-origin-y";
pub const BACKFACE_VISIBLE: &str = "backface-visibility";
pub const TRANSFORM_ORIGIN_X: &str = "transform-origin-x";
pub const TRANSFORM_ORIGIN_Y: &str = "transform-origin-y";
pub const TRANSFORM_ORIGIN_Z: &str = "transform-origin-z";
pub const TRANSLATE_X: &str = "translate-x";
pub const TRANSLATE_Y: &str = "translate-y";
pub const TRANSLATE_Z: &str = "translate-z";
pub const SCALE_X: &str = "scale-x";
pub const SCALE_Y: &str = "scale-y";
pub const SCALE_Z: &str = "scale-z";
pub const ROTATE: &str = "rotate";
pub const ROTATE_X: &str = "rotate-x";
pub const ROTATE_Y: &str = "rotate-y";
pub const ROTATE_Z: &str = "rotate-z";
pub const SKEW_X: &str = "skew-x";
pub const SKEW_Y: &str = "skew-y";

// ============================================================================
// Animation
// ============================================================================

pub const TRANSITION: &str = "transition";
pub const ANIMATION: &str = "animation";
pub const ANIMATION_PAUSED: &str = "animation-paused";

// ============================================================================
// Widget specific
// ============================================================================

pub const CHECKED: &str = "checked";
pub const CHECKBOX_VERTICAL_ALIGN: &str = "checkbox-vertical-align";
pub const CHECKBOX_HORIZONTAL_ALIGN: &str = "checkbox-horizontal-align";
pub const HINT: &str = "hint";
pub const READ_ONLY: &str = "read-only";
pub const EDIT_VIEW_TYPE: &str = "edit-view-type";
pub const MAX_LENGTH: &str = "max-length";
pub const SRC: &str = "src";
pub const ALT_TEXT: &str = "alt-text";
pub const FIT: &str = "fit";
pub const IMAGE_VERTICAL_ALIGN: &str = "image-vertical-align";
pub const IMAGE_HORIZONTAL_ALIGN: &str = "image-horizontal-align";
pub const CONTROLS: &str = "controls";
pub const LOOP: &str = "loop";
pub const MUTED: &str = "muted";
pub const PRELOAD: &str = "preload";
pub const POSTER: &str = "poster";
pub const CURRENT: &str = "current";
pub const TABS: &str = "tabs";
pub const TAB_CLOSE_BUTTON: &str = "tab-close-button";
pub const TAB_STYLE: &str = "tab-style";
pub const CURRENT_TAB_STYLE: &str = "current-tab-style";
pub const TITLE: &str = "title";
pub const ICON: &str = "icon";
pub const PUSH_DURATION: &str = "push-duration";
pub const PUSH_TIMING: &str = "push-timing";

// ============================================================================
// Pickers and tables
// ============================================================================

pub const ITEMS: &str = "items";
pub const DISABLED_ITEMS: &str = "disabled-items";
pub const DATA_LIST: &str = "data-list";
pub const NUMBER_PICKER_TYPE: &str = "number-picker-type";
pub const NUMBER_PICKER_MIN: &str = "number-picker-min";
pub const NUMBER_PICKER_MAX: &str = "number-picker-max";
pub const NUMBER_PICKER_STEP: &str = "number-picker-step";
pub const NUMBER_PICKER_VALUE: &str = "number-picker-value";
pub const NUMBER_PICKER_PRECISION: &str = "number-picker-precision";
pub const HEAD_HEIGHT: &str = "head-height";
pub const FOOT_HEIGHT: &str = "foot-height";
pub const SELECTION_MODE: &str = "selection-mode";

// ============================================================================
// Popup
// ============================================================================

pub const CLOSE_BUTTON: &str = "close-button";
pub const OUTSIDE_CLOSE: &str = "outside-close";
pub const TITLE_STYLE: &str = "title-style";
pub const ARROW: &str = "arrow";
pub const ARROW_ALIGN: &str = "arrow-align";
pub const ARROW_SIZE: &str = "arrow-size";
pub const ARROW_WIDTH: &str = "arrow-width";
pub const ARROW_OFFSET: &str = "arrow-offset";
pub const BUTTONS: &str = "buttons";
pub const BUTTONS_ALIGN: &str = "buttons-align";
pub const DISMISS_EVENT: &str = "dismiss-event";
