//! Popup manager
//!
//! Popups are layered overlays shown above the root view inside the
//! `ruiPopupLayer` element. The session keeps them in an ordered stack; the
//! whole stack is rendered into the layer every time it changes.
//!
//! # Design Philosophy
//!
//! - A popup owns nothing but its content view id and its [`PopupParams`];
//!   the frame around the content (title bar, close button, buttons row,
//!   arrow) is plain markup generated here, not views
//! - Inbound clicks come back as `popupClose{popup}`, `popupButton{popup,
//!   index}` or a `click-event` on the layer itself
//! - Dismiss listeners run after the layer has been updated, so a listener
//!   may show another popup

use std::fmt::{self, Write};
use std::sync::Arc;

use crate::data::DataObject;
use crate::events::{EventListener, ListenerList};
use crate::properties::enums::{ARROW, ARROW_ALIGN, BUTTONS_ALIGN, HORIZONTAL_ALIGN, VERTICAL_ALIGN};
use crate::properties::names;
use crate::properties::resolve::{bool_value, enum_value, size_value, text_value};
use crate::properties::{ConstantResolver, Params, PropertyValue};
use crate::session::Session;
use crate::values::SizeUnit;
use crate::view::{escape_html, ViewId, ViewKind};

/// Element whose pointer events are disabled while a popup is shown
pub const ROOT_ID: &str = "ruiRoot";

/// Element holding the rendered popup stack
pub const POPUP_LAYER_ID: &str = "ruiPopupLayer";

const BLUR_SCRIPT: &str = "if (document.activeElement != document.body) document.activeElement.blur();";

// ============================================================================
// Parameters
// ============================================================================

/// Session-unique popup number
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ruiPopup{}", self.0)
    }
}

/// Called when a popup button is clicked
pub type PopupCallback = Arc<dyn Fn(&mut Session, PopupId) + Send + Sync>;

/// Alignment inside a grid cell, in the index order of the align tables
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Top or left
    Start,
    /// Bottom or right
    End,
    /// Middle
    #[default]
    Center,
    /// Fill the cell
    Stretch,
}

impl Align {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Start,
            1 => Self::End,
            2 => Self::Center,
            _ => Self::Stretch,
        }
    }

    /// CSS keyword for `justify-*` / `align-*`
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Center => "center",
            Self::Stretch => "stretch",
        }
    }
}

/// Side of the popup the arrow sticks out of
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArrowSide {
    /// No arrow
    #[default]
    None,
    /// Above the popup, pointing up
    Top,
    /// Right of the popup, pointing right
    Right,
    /// Below the popup, pointing down
    Bottom,
    /// Left of the popup, pointing left
    Left,
}

impl ArrowSide {
    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Top,
            2 => Self::Right,
            3 => Self::Bottom,
            4 => Self::Left,
            _ => Self::None,
        }
    }
}

/// Directional arrow of a popup
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
    /// Side
    pub side: ArrowSide,
    /// Position along the side
    pub align: Align,
    /// Length from base to tip
    pub size: SizeUnit,
    /// Width of the base
    pub width: SizeUnit,
    /// Shift along the side, from the aligned edge
    pub offset: SizeUnit,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            side: ArrowSide::None,
            align: Align::Center,
            size: SizeUnit::px(16.0),
            width: SizeUnit::px(16.0),
            offset: SizeUnit::px(0.0),
        }
    }
}

/// Where the arrow and the popup body sit in the 3×3 frame grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrowLayout {
    /// `grid-template-rows`
    pub rows: String,
    /// `grid-template-columns`
    pub columns: String,
    /// 1-based row of the arrow cell
    pub row: usize,
    /// 1-based column of the arrow cell
    pub column: usize,
    /// Inline style of the arrow element
    pub style: String,
}

impl Arrow {
    /// Arrow on `side`, centered, with the default size
    #[must_use]
    pub fn new(side: ArrowSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }

    /// Grid geometry; `None` without an arrow
    ///
    /// The body always occupies the center cell (row 2, column 2). The arrow
    /// takes the middle cell of its side; the track on that side is sized to
    /// the arrow, the others collapse to zero.
    #[must_use]
    pub fn layout(&self) -> Option<ArrowLayout> {
        let size = self.size.css_string("16px");
        let width = self.width.css_string("16px");
        let offset = self.offset.css_string("0");
        let horizontal = matches!(self.side, ArrowSide::Top | ArrowSide::Bottom);

        let (rows, columns, row, column, clip) = match self.side {
            ArrowSide::None => return None,
            ArrowSide::Top => (
                format!("{size} auto 0"),
                "0 auto 0".to_string(),
                1,
                2,
                "polygon(50% 0, 100% 100%, 0 100%)",
            ),
            ArrowSide::Bottom => (
                format!("0 auto {size}"),
                "0 auto 0".to_string(),
                3,
                2,
                "polygon(0 0, 100% 0, 50% 100%)",
            ),
            ArrowSide::Left => (
                "0 auto 0".to_string(),
                format!("{size} auto 0"),
                2,
                1,
                "polygon(0 50%, 100% 0, 100% 100%)",
            ),
            ArrowSide::Right => (
                "0 auto 0".to_string(),
                format!("0 auto {size}"),
                2,
                3,
                "polygon(0 0, 100% 50%, 0 100%)",
            ),
        };

        let mut style = format!("grid-row-start: {row}; grid-column-start: {column}; clip-path: {clip}; ");
        let align = match self.align {
            Align::Stretch => Align::Center,
            align => align,
        };
        if horizontal {
            let _ = write!(style, "width: {width}; height: {size}; justify-self: {}; ", align.css());
            match align {
                Align::Start => {
                    let _ = write!(style, "margin-left: {offset};");
                }
                Align::End => {
                    let _ = write!(style, "margin-right: {offset};");
                }
                _ => {}
            }
        } else {
            let _ = write!(style, "width: {size}; height: {width}; align-self: {}; ", align.css());
            match align {
                Align::Start => {
                    let _ = write!(style, "margin-top: {offset};");
                }
                Align::End => {
                    let _ = write!(style, "margin-bottom: {offset};");
                }
                _ => {}
            }
        }
        Some(ArrowLayout {
            rows,
            columns,
            row,
            column,
            style: style.trim_end().to_string(),
        })
    }
}

/// One button of the buttons row
#[derive(Clone)]
pub struct PopupButton {
    /// Caption
    pub title: String,
    /// Click handler; `None` dismisses the popup
    pub on_click: Option<PopupCallback>,
}

impl PopupButton {
    /// Button that dismisses the popup
    #[must_use]
    pub fn dismiss(title: &str) -> Self {
        Self {
            title: title.to_string(),
            on_click: None,
        }
    }

    /// Button running `on_click`
    #[must_use]
    pub fn new(title: &str, on_click: impl Fn(&mut Session, PopupId) + Send + Sync + 'static) -> Self {
        Self {
            title: title.to_string(),
            on_click: Some(Arc::new(on_click)),
        }
    }
}

impl fmt::Debug for PopupButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupButton")
            .field("title", &self.title)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

/// How a popup looks and behaves
#[derive(Clone, Debug)]
pub struct PopupParams {
    /// Title bar text; no title bar when empty and without close button
    pub title: String,
    /// Style of the title bar
    pub title_style: String,
    /// Show a close button in the title bar
    pub close_button: bool,
    /// Dismiss on a click outside the popup
    pub outside_close: bool,
    /// Buttons row
    pub buttons: Vec<PopupButton>,
    /// Alignment of the buttons row
    pub buttons_align: Align,
    /// Vertical placement in the layer
    pub vertical_align: Align,
    /// Horizontal placement in the layer
    pub horizontal_align: Align,
    /// Arrow
    pub arrow: Arrow,
    /// Called after the popup left the layer, in order
    pub dismiss: Vec<EventListener<()>>,
}

impl Default for PopupParams {
    fn default() -> Self {
        Self {
            title: String::new(),
            title_style: "ruiPopupTitle".to_string(),
            close_button: false,
            outside_close: false,
            buttons: Vec::new(),
            buttons_align: Align::End,
            vertical_align: Align::Center,
            horizontal_align: Align::Center,
            arrow: Arrow::default(),
            dismiss: Vec::new(),
        }
    }
}

impl PopupParams {
    /// Builder: title bar text
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Builder: close button in the title bar
    #[must_use]
    pub fn with_close_button(mut self) -> Self {
        self.close_button = true;
        self
    }

    /// Builder: dismiss on outside clicks
    #[must_use]
    pub fn with_outside_close(mut self) -> Self {
        self.outside_close = true;
        self
    }

    /// Builder: append a button
    #[must_use]
    pub fn with_button(mut self, button: PopupButton) -> Self {
        self.buttons.push(button);
        self
    }

    /// Builder: arrow
    #[must_use]
    pub fn with_arrow(mut self, arrow: Arrow) -> Self {
        self.arrow = arrow;
        self
    }

    /// Builder: append a dismiss listener
    #[must_use]
    pub fn on_dismiss(mut self, listener: impl Fn(&mut Session, &ViewId) + Send + Sync + 'static) -> Self {
        self.dismiss.push(EventListener::view_only(listener));
        self
    }

    /// Read the tag form (`title`, `close-button`, `outside-close`,
    /// `arrow*`, `buttons`, `buttons-align`, `dismiss-event`, ...)
    ///
    /// Unknown tags and values that do not convert are logged and skipped.
    /// Buttons given as objects dismiss the popup when clicked.
    #[must_use]
    pub fn from_params(params: &Params, resolver: &dyn ConstantResolver) -> Self {
        let mut result = Self::default();
        for (tag, value) in params.iter() {
            let applied = match tag {
                names::TITLE => text_value(value, resolver).map(|t| result.title = t),
                names::TITLE_STYLE => text_value(value, resolver).map(|t| result.title_style = t),
                names::CLOSE_BUTTON => bool_value(value, resolver).map(|b| result.close_button = b),
                names::OUTSIDE_CLOSE => bool_value(value, resolver).map(|b| result.outside_close = b),
                names::VERTICAL_ALIGN => {
                    enum_value(value, &VERTICAL_ALIGN, resolver).map(|i| result.vertical_align = Align::from_index(i))
                }
                names::HORIZONTAL_ALIGN => enum_value(value, &HORIZONTAL_ALIGN, resolver)
                    .map(|i| result.horizontal_align = Align::from_index(i)),
                names::BUTTONS_ALIGN => {
                    enum_value(value, &BUTTONS_ALIGN, resolver).map(|i| result.buttons_align = Align::from_index(i))
                }
                names::ARROW => enum_value(value, &ARROW, resolver).map(|i| result.arrow.side = ArrowSide::from_index(i)),
                names::ARROW_ALIGN => {
                    enum_value(value, &ARROW_ALIGN, resolver).map(|i| result.arrow.align = Align::from_index(i))
                }
                names::ARROW_SIZE => size_value(value, resolver).map(|s| result.arrow.size = s),
                names::ARROW_WIDTH => size_value(value, resolver).map(|s| result.arrow.width = s),
                names::ARROW_OFFSET => size_value(value, resolver).map(|s| result.arrow.offset = s),
                names::BUTTONS => buttons_value(value, resolver).map(|b| result.buttons = b),
                names::DISMISS_EVENT => match value {
                    PropertyValue::Listeners(ListenerList::Plain(listeners)) => {
                        result.dismiss.clone_from(listeners);
                        Some(())
                    }
                    _ => None,
                },
                _ => None,
            };
            if applied.is_none() {
                tracing::warn!(tag = %tag, value = value.kind_name(), "popup parameter ignored");
            }
        }
        result
    }
}

fn buttons_value(value: &PropertyValue, resolver: &dyn ConstantResolver) -> Option<Vec<PopupButton>> {
    let title = |object: &DataObject| {
        object
            .property_value(names::TITLE)
            .and_then(|t| text_value(&PropertyValue::Text(t.to_string()), resolver))
    };
    match value {
        PropertyValue::Object(object) => title(object).map(|t| vec![PopupButton::dismiss(&t)]),
        PropertyValue::Objects(objects) => Some(
            objects
                .iter()
                .filter_map(title)
                .map(|t| PopupButton::dismiss(&t))
                .collect(),
        ),
        PropertyValue::Texts(titles) => Some(titles.iter().map(|t| PopupButton::dismiss(t)).collect()),
        _ => None,
    }
}

// ============================================================================
// Manager
// ============================================================================

struct Popup {
    id: PopupId,
    content: ViewId,
    params: PopupParams,
    /// Content was created by the manager and is destroyed with the popup
    owned: bool,
}

/// Ordered popup stack of a session, bottom first
#[derive(Default)]
pub struct PopupManager {
    popups: Vec<Popup>,
    next_id: u64,
}

impl PopupManager {
    fn position(&self, id: PopupId) -> Option<usize> {
        self.popups.iter().position(|popup| popup.id == id)
    }
}

impl Session {
    /// Show `content` as a popup on top of the stack
    ///
    /// The content view stays owned by the caller and is only detached when
    /// the popup is dismissed.
    pub fn show_popup(&mut self, content: &ViewId, params: PopupParams) -> PopupId {
        self.push_popup(content, params, false)
    }

    fn push_popup(&mut self, content: &ViewId, params: PopupParams, owned: bool) -> PopupId {
        self.popups.next_id += 1;
        let id = PopupId(self.popups.next_id);
        self.popups.popups.push(Popup {
            id,
            content: content.clone(),
            params,
            owned,
        });
        tracing::debug!(session = self.id(), popup = id.0, view = %content, "popup shown");

        self.batch(|session| {
            session.emit(|bridge| {
                bridge.write_script(BLUR_SCRIPT);
            });
            session.refresh_popups();
        });
        id
    }

    /// Show `content` with parameters in tag form
    pub fn show_popup_with(&mut self, content: &ViewId, params: &Params) -> PopupId {
        let params = PopupParams::from_params(params, &self.resolver());
        self.show_popup(content, params)
    }

    /// Remove a popup wherever it is in the stack and run its dismiss
    /// listeners; returns whether it was shown
    pub fn dismiss_popup(&mut self, id: PopupId) -> bool {
        let Some(index) = self.popups.position(id) else {
            tracing::debug!(session = self.id(), popup = id.0, "dismissing an unknown popup");
            return false;
        };
        let popup = self.popups.popups.remove(index);
        self.mark_detached(&popup.content);
        self.batch(Session::refresh_popups);
        tracing::debug!(session = self.id(), popup = id.0, "popup dismissed");

        for listener in &popup.params.dismiss {
            listener.call(self, &popup.content, &());
        }
        if popup.owned {
            self.destroy_view(&popup.content);
        }
        true
    }

    /// Number of popups shown
    #[must_use]
    pub fn popup_count(&self) -> usize {
        self.popups.popups.len()
    }

    /// Popup on top of the stack
    #[must_use]
    pub fn top_popup(&self) -> Option<PopupId> {
        self.popups.popups.last().map(|popup| popup.id)
    }

    /// Content view of a popup
    #[must_use]
    pub fn popup_content(&self, id: PopupId) -> Option<&ViewId> {
        self.popups.position(id).map(|index| &self.popups.popups[index].content)
    }

    /// Popup with a title, a text and a close button
    pub fn show_message(&mut self, title: &str, text: &str) -> PopupId {
        let title = self.get_string(title);
        let text = self.get_string(text);
        let content = self.create_view_with(
            ViewKind::TextView,
            Params::new().with(names::TEXT, text).with(names::TEXT_ALIGN, "center"),
        );
        self.push_popup(
            &content,
            PopupParams::default()
                .with_title(&title)
                .with_close_button()
                .with_outside_close(),
            true,
        )
    }

    /// Popup with a text and `No` / `Yes` buttons
    pub fn show_question(
        &mut self,
        title: &str,
        text: &str,
        on_yes: impl Fn(&mut Session) + Send + Sync + 'static,
        on_no: impl Fn(&mut Session) + Send + Sync + 'static,
    ) -> PopupId {
        let title = self.get_string(title);
        let text = self.get_string(text);
        let no = self.get_string("No");
        let yes = self.get_string("Yes");
        let content = self.create_view_with(
            ViewKind::TextView,
            Params::new().with(names::TEXT, text).with(names::TEXT_ALIGN, "center"),
        );
        self.push_popup(
            &content,
            PopupParams::default()
                .with_title(&title)
                .with_button(PopupButton::new(&no, move |session, popup| {
                    session.dismiss_popup(popup);
                    on_no(session);
                }))
                .with_button(PopupButton::new(&yes, move |session, popup| {
                    session.dismiss_popup(popup);
                    on_yes(session);
                })),
            true,
        )
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the whole stack into the layer, or hide the layer when empty
    pub(crate) fn refresh_popups(&mut self) {
        if self.ignore_updates() || self.bridge.is_none() {
            return;
        }
        if self.popups.popups.is_empty() {
            self.emit(|bridge| {
                bridge.update_css_property(ROOT_ID, "pointer-events", "auto");
                bridge.update_css_property(POPUP_LAYER_ID, "visibility", "hidden");
                bridge.update_inner_html(POPUP_LAYER_ID, "");
            });
            return;
        }

        let mut html = String::new();
        let count = self.popups.popups.len();
        for index in 0..count {
            self.write_popup_html(index, &mut html);
        }
        self.emit(|bridge| {
            bridge.update_inner_html(POPUP_LAYER_ID, &html);
            bridge.update_css_property(POPUP_LAYER_ID, "visibility", "visible");
            bridge.update_css_property(ROOT_ID, "pointer-events", "none");
        });
    }

    fn write_popup_html(&mut self, index: usize, out: &mut String) {
        let popup = &self.popups.popups[index];
        let id = popup.id;
        let content = popup.content.clone();
        let params = popup.params.clone();

        let _ = write!(
            out,
            "<div class=\"ruiPopupPlacement\" style=\"align-items: {}; justify-items: {};\">",
            params.vertical_align.css(),
            params.horizontal_align.css()
        );

        let arrow = params.arrow.layout();
        let (rows, columns) = arrow
            .as_ref()
            .map_or(("0 auto 0", "0 auto 0"), |layout| (layout.rows.as_str(), layout.columns.as_str()));
        let _ = write!(
            out,
            "<div id=\"{id}\" class=\"ruiPopupFrame\" style=\"grid-template-rows: {rows}; grid-template-columns: {columns};\">"
        );
        if let Some(layout) = &arrow {
            let _ = write!(out, "<div class=\"ruiPopupArrow\" style=\"{}\"></div>", layout.style);
        }

        out.push_str("<div class=\"ruiPopup\" style=\"grid-row-start: 2; grid-column-start: 2;\">");
        if !params.title.is_empty() || params.close_button {
            let _ = write!(out, "<div class=\"{}\">", escape_html(&params.title_style));
            let _ = write!(out, "<div class=\"ruiPopupTitleText\">{}</div>", escape_html(&params.title));
            if params.close_button {
                let _ = write!(
                    out,
                    "<div class=\"ruiPopupCloseButton\" onclick=\"popupCloseClick({})\">&#10005;</div>",
                    id.0
                );
            }
            out.push_str("</div>");
        }

        out.push_str("<div class=\"ruiPopupContent\">");
        self.write_view_html(&content, out);
        out.push_str("</div>");

        if !params.buttons.is_empty() {
            let _ = write!(
                out,
                "<div class=\"ruiPopupButtons\" style=\"justify-content: {};\">",
                params.buttons_align.css()
            );
            for (number, button) in params.buttons.iter().enumerate() {
                let _ = write!(
                    out,
                    "<button class=\"ruiButton\" onclick=\"popupButtonClick({}, {number})\">{}</button>",
                    id.0,
                    escape_html(&button.title)
                );
            }
            out.push_str("</div>");
        }
        out.push_str("</div></div></div>");
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Click on the layer outside every popup
    pub(crate) fn popup_layer_clicked(&mut self) {
        let top = self.popups.popups.last().map(|popup| (popup.id, popup.params.outside_close));
        if let Some((id, true)) = top {
            self.dismiss_popup(id);
        }
    }

    pub(crate) fn popup_close_clicked(&mut self, popup: u64) {
        if !self.dismiss_popup(PopupId(popup)) {
            tracing::warn!(session = self.id(), popup, "close click on an unknown popup");
        }
    }

    pub(crate) fn popup_button_clicked(&mut self, popup: u64, index: usize) {
        let id = PopupId(popup);
        let handler = self
            .popups
            .position(id)
            .and_then(|position| self.popups.popups[position].params.buttons.get(index))
            .map(|button| button.on_click.clone());
        match handler {
            Some(Some(on_click)) => on_click(self, id),
            Some(None) => {
                self.dismiss_popup(id);
            }
            None => tracing::warn!(session = self.id(), popup, index, "click on an unknown popup button"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::properties::NoConstants;
    use crate::session::test_support::{connected_session, drain};

    #[test]
    fn test_arrow_layout_cells() {
        assert_eq!(Arrow::default().layout(), None);

        let top = Arrow::new(ArrowSide::Top).layout().unwrap();
        assert_eq!((top.row, top.column), (1, 2));
        assert_eq!(top.rows, "16px auto 0");
        assert_eq!(top.columns, "0 auto 0");
        assert!(top.style.contains("justify-self: center;"), "{}", top.style);

        let left = Arrow {
            side: ArrowSide::Left,
            align: Align::Start,
            size: SizeUnit::px(8.0),
            width: SizeUnit::px(12.0),
            offset: SizeUnit::px(4.0),
        }
        .layout()
        .unwrap();
        assert_eq!((left.row, left.column), (2, 1));
        assert_eq!(left.columns, "8px auto 0");
        assert!(left.style.contains("width: 8px; height: 12px; align-self: start;"), "{}", left.style);
        assert!(left.style.ends_with("margin-top: 4px;"), "{}", left.style);
    }

    #[test]
    fn test_params_from_tags() {
        let params = Params::new()
            .with(names::TITLE, "Hello")
            .with(names::CLOSE_BUTTON, true)
            .with(names::OUTSIDE_CLOSE, "true")
            .with(names::ARROW, "bottom")
            .with(names::ARROW_ALIGN, "right")
            .with(names::BUTTONS, vec!["OK".to_string(), "Cancel".to_string()]);
        let parsed = PopupParams::from_params(&params, &NoConstants);
        assert_eq!(parsed.title, "Hello");
        assert!(parsed.close_button);
        assert!(parsed.outside_close);
        assert_eq!(parsed.arrow.side, ArrowSide::Bottom);
        assert_eq!(parsed.arrow.align, Align::End);
        assert_eq!(parsed.buttons.len(), 2);
        assert_eq!(parsed.buttons[1].title, "Cancel");
    }

    #[test]
    fn test_show_renders_layer_and_blocks_root() {
        let (mut session, mut rx) = connected_session();
        let content = session.create_view(ViewKind::TextView);
        session.set(&content, "text", "Inside");
        let id = session.show_popup(&content, PopupParams::default().with_title("Title").with_close_button());
        assert_eq!(session.popup_count(), 1);
        assert!(session.view(&content).unwrap().is_created());

        let out = drain(&mut rx);
        assert!(out.contains(BLUR_SCRIPT), "{out}");
        assert!(out.contains("updateInnerHTML('ruiPopupLayer', "), "{out}");
        assert!(out.contains(&format!("id=\"{id}\"")), "{out}");
        assert!(out.contains("onclick=\"popupCloseClick(1)\""), "{out}");
        assert!(out.contains(">Inside</div>"), "{out}");
        assert!(out.contains("updateCSSProperty('ruiPopupLayer', 'visibility', 'visible');"), "{out}");
        assert!(out.contains("updateCSSProperty('ruiRoot', 'pointer-events', 'none');"), "{out}");
    }

    #[test]
    fn test_dismiss_from_middle_rerenders() {
        let (mut session, mut rx) = connected_session();
        let a = session.create_view(ViewKind::View);
        let b = session.create_view(ViewKind::View);
        let first = session.show_popup(&a, PopupParams::default());
        let second = session.show_popup(&b, PopupParams::default());
        drain(&mut rx);

        assert!(session.dismiss_popup(first));
        assert_eq!(session.top_popup(), Some(second));
        assert!(!session.view(&a).unwrap().is_created());
        let out = drain(&mut rx);
        assert!(out.contains(&format!("id=\"{second}\"")), "{out}");
        assert!(!out.contains(&format!("id=\"{first}\"")), "{out}");
        assert!(!session.dismiss_popup(first));
    }

    #[test]
    fn test_outside_click_respects_flag() {
        let (mut session, mut rx) = connected_session();
        let content = session.create_view(ViewKind::View);
        session.show_popup(&content, PopupParams::default());
        session.popup_layer_clicked();
        assert_eq!(session.popup_count(), 1);

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let other = session.create_view(ViewKind::View);
        session.show_popup(
            &other,
            PopupParams::default().with_outside_close().on_dismiss(move |_, view| {
                assert_eq!(view.as_str(), "id000002");
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        drain(&mut rx);
        session.popup_layer_clicked();
        assert_eq!(session.popup_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_stack_hides_layer() {
        let (mut session, mut rx) = connected_session();
        let content = session.create_view(ViewKind::View);
        let id = session.show_popup(&content, PopupParams::default());
        drain(&mut rx);
        session.popup_close_clicked(id.0);
        assert_eq!(
            drain(&mut rx).trim_end(),
            "updateCSSProperty('ruiRoot', 'pointer-events', 'auto');\n\
             updateCSSProperty('ruiPopupLayer', 'visibility', 'hidden');\n\
             updateInnerHTML('ruiPopupLayer', '');"
        );
    }

    #[test]
    fn test_buttons() {
        let (mut session, _rx) = connected_session();
        let clicks = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&clicks);
        let content = session.create_view(ViewKind::View);
        let id = session.show_popup(
            &content,
            PopupParams::default()
                .with_button(PopupButton::new("Count", move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }))
                .with_button(PopupButton::dismiss("Close")),
        );
        session.popup_button_clicked(id.0, 0);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(session.popup_count(), 1);
        session.popup_button_clicked(id.0, 5);
        session.popup_button_clicked(id.0, 1);
        assert_eq!(session.popup_count(), 0);
    }

    #[test]
    fn test_question_runs_answer_and_closes() {
        let (mut session, _rx) = connected_session();
        let answers = Arc::new(AtomicUsize::new(0));
        let yes = Arc::clone(&answers);
        let id = session.show_question(
            "Delete",
            "Really?",
            move |_| {
                yes.fetch_add(10, Ordering::SeqCst);
            },
            |_| {},
        );
        session.popup_button_clicked(id.0, 1);
        assert_eq!(answers.load(Ordering::SeqCst), 10);
        assert_eq!(session.popup_count(), 0);
    }

    #[test]
    fn test_built_in_popups_release_their_content() {
        let (mut session, _rx) = connected_session();
        let root = session.create_view(ViewKind::View);
        session.set_root_view(&root);
        let views = session.view_count();

        for _ in 0..100 {
            let id = session.show_message("Note", "Saved");
            let content = session.popup_content(id).cloned().unwrap();
            assert_eq!(session.view_count(), views + 1);
            assert!(session.dismiss_popup(id));
            assert!(session.view(&content).is_none());
        }
        let id = session.show_question("Delete", "Really?", |_| {}, |_| {});
        session.popup_button_clicked(id.0, 0);
        assert_eq!(session.view_count(), views);
    }

    #[test]
    fn test_caller_content_survives_dismiss() {
        let (mut session, _rx) = connected_session();
        let content = session.create_view(ViewKind::TextView);
        let id = session.show_popup(&content, PopupParams::default());
        session.dismiss_popup(id);
        assert!(session.view(&content).is_some());
        session.show_popup(&content, PopupParams::default());
        assert_eq!(session.popup_count(), 1);
    }
}
