//! Incremental browser updates
//!
//! After a committed change on a created view, the view's CSS is recomputed
//! and compared with what was last sent; only the declarations that differ
//! are written. Tags that are not CSS (text, attributes, handlers) map to
//! their own DOM operations. Everything for one view goes out as a single
//! update block.

use crate::bridge::ScriptArg;
use crate::controls::accepts_data_list;
use crate::events::{js_handler, payload_kind, TABLE_CELL_CLICKED_EVENT, TABLE_ROW_CLICKED_EVENT};
use crate::media;
use crate::properties::names;
use crate::session::Session;

use super::html::text_html;
use super::{ViewId, ViewKind};

impl Session {
    /// Patch the browser for `changed` tags of a created view
    pub(crate) fn emit_changes(&mut self, id: &ViewId, changed: &[String]) {
        if self.ignore_updates() || self.bridge.is_none() {
            return;
        }
        let Some(kind) = self.view_kind(id) else {
            return;
        };

        let (refresh_self, refresh_parent) = self.in_update_script(id, |session| {
            session.emit_css_diff(id);
            let mut refresh_self = false;
            let mut refresh_parent = false;
            for tag in changed {
                match session.emit_tag_change(id, kind, tag) {
                    Refresh::None => {}
                    Refresh::Inner => refresh_self = true,
                    Refresh::Parent => refresh_parent = true,
                }
            }
            (refresh_self, refresh_parent)
        });

        if refresh_self {
            self.refresh_inner_html(id);
        }
        if refresh_parent {
            match self.views.get(id).and_then(|view| view.parent.clone()) {
                Some(parent) => self.refresh_inner_html(&parent),
                None if self.root.as_ref() == Some(id) => {
                    let html = self.view_html(id);
                    self.emit(|bridge| bridge.update_inner_html("ruiRootView", &html));
                }
                None => {}
            }
        }
    }

    /// Send the declarations that differ from the stored inline CSS
    pub(crate) fn emit_css_diff(&mut self, id: &ViewId) {
        let css = self.view_css(id);
        let Some(view) = self.views.get(id) else {
            return;
        };
        if view.css == css {
            return;
        }

        let mut updates: Vec<(String, String)> = css
            .iter()
            .filter(|(key, value)| view.css.get(key) != Some(*value))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        updates.extend(
            view.css
                .iter()
                .filter(|(key, _)| css.get(key).is_none())
                .map(|(key, _)| (key.to_string(), String::new())),
        );

        if let Some(view) = self.views.get_mut(id) {
            view.css = css;
        }
        self.emit(|bridge| {
            for (key, value) in &updates {
                bridge.update_css_property(id.as_str(), key, value);
            }
        });
    }

    fn emit_tag_change(&mut self, id: &ViewId, kind: ViewKind, tag: &str) -> Refresh {
        match tag {
            names::TEXT => match kind {
                ViewKind::TextView | ViewKind::Button => {
                    let html = text_html(&self.get_text(id));
                    self.emit(|bridge| bridge.update_inner_html(id.as_str(), &html));
                }
                ViewKind::Checkbox => return Refresh::Inner,
                ViewKind::EditView => {
                    let text = self.get_resolved(id, names::TEXT).unwrap_or_default();
                    self.emit(|bridge| {
                        bridge.call_func("setInputValue", &[ScriptArg::from(id.as_str()), ScriptArg::from(text)]);
                    });
                }
                _ => {}
            },
            names::CHECKED | names::CHECKBOX_VERTICAL_ALIGN | names::CHECKBOX_HORIZONTAL_ALIGN
                if kind == ViewKind::Checkbox =>
            {
                return Refresh::Inner;
            }
            names::DISABLED => {
                let disabled = self.get_disabled(id);
                self.emit_attribute(id, "data-disabled", disabled.then(|| "1".to_string()));
                self.emit_class(id);
                self.emit_tab_index(id);
                if kind == ViewKind::DropDownList {
                    self.emit_attribute(id, "disabled", disabled.then(String::new));
                }
            }
            names::STYLE | names::STYLE_DISABLED => self.emit_class(id),
            names::FOCUSABLE | names::TAB_INDEX => self.emit_tab_index(id),
            names::TOOLTIP => {
                let tooltip = self.get_resolved(id, names::TOOLTIP).map(|t| self.get_string(&t));
                self.emit_attribute(id, "data-tooltip", tooltip);
            }
            names::HINT if kind == ViewKind::EditView => {
                let hint = Some(self.get_hint(id)).filter(|hint| !hint.is_empty());
                self.emit_attribute(id, "placeholder", hint);
            }
            names::MAX_LENGTH if kind == ViewKind::EditView => {
                let max = self
                    .get(id, names::MAX_LENGTH)
                    .and_then(|v| match v {
                        crate::properties::PropertyValue::Int(n) if n > 0 => Some(n.to_string()),
                        _ => None,
                    });
                self.emit_attribute(id, "maxlength", max);
            }
            names::READ_ONLY if kind == ViewKind::EditView => {
                let read_only = self.get_flag(id, names::READ_ONLY);
                self.emit_attribute(id, "readonly", read_only.then(String::new));
            }
            // input and textarea are different elements
            names::EDIT_VIEW_TYPE if kind == ViewKind::EditView => return Refresh::Parent,
            names::SRC | names::ALT_TEXT | names::POSTER => {
                let value = self.get_resolved(id, tag);
                let attribute = if tag == names::ALT_TEXT { "alt" } else { tag };
                self.emit_attribute(id, attribute, value);
            }
            names::CONTROLS | names::LOOP | names::MUTED if kind.is_media() => {
                let on = self.get_flag(id, tag);
                self.emit_attribute(id, tag, on.then(String::new));
            }
            names::PRELOAD if kind.is_media() => return Refresh::Parent,
            names::TABS | names::TAB_CLOSE_BUTTON | names::TAB_STYLE | names::CURRENT_TAB_STYLE
                if kind == ViewKind::TabsLayout =>
            {
                return Refresh::Inner;
            }
            names::TITLE | names::ICON | names::TAB_CLOSE_BUTTON => {
                let parent_is_tabs = self
                    .views
                    .get(id)
                    .and_then(|view| view.parent.as_ref())
                    .and_then(|parent| self.view_kind(parent))
                    == Some(ViewKind::TabsLayout);
                if parent_is_tabs {
                    return Refresh::Parent;
                }
            }
            names::ITEMS | names::DISABLED_ITEMS if kind == ViewKind::DropDownList => return Refresh::Inner,
            names::CURRENT if kind == ViewKind::DropDownList => {
                let current = self.get_current(id);
                self.emit(|bridge| {
                    bridge.call_func("selectDropDownListItem", &[ScriptArg::from(id.as_str()), ScriptArg::from(current)]);
                });
            }
            names::DATA_LIST if accepts_data_list(kind) => self.emit_data_list(id),
            names::NUMBER_PICKER_VALUE if kind == ViewKind::NumberPicker => self.emit_number_picker_value(id),
            names::NUMBER_PICKER_TYPE
            | names::NUMBER_PICKER_MIN
            | names::NUMBER_PICKER_MAX
            | names::NUMBER_PICKER_STEP
            | names::NUMBER_PICKER_PRECISION
                if kind == ViewKind::NumberPicker =>
            {
                self.emit_number_picker_bounds(id);
            }
            names::CONTENT | names::HEAD_HEIGHT | names::FOOT_HEIGHT if kind == ViewKind::TableView => {
                return Refresh::Inner;
            }
            // data-selection sits on the table element
            names::SELECTION_MODE if kind == ViewKind::TableView => return Refresh::Parent,
            TABLE_CELL_CLICKED_EVENT | TABLE_ROW_CLICKED_EVENT if kind == ViewKind::TableView => {
                return Refresh::Inner;
            }
            names::ANIMATION => self.sync_keyframes(id),
            _ => self.emit_handler_change(id, kind, tag),
        }
        Refresh::None
    }

    /// Bind or unbind the DOM handler of an event tag
    fn emit_handler_change(&mut self, id: &ViewId, kind: ViewKind, tag: &str) {
        if payload_kind(tag).is_none() {
            return;
        }
        let present = self.has_listeners(id, tag);
        if let Some(handler) = js_handler(tag) {
            if kind == ViewKind::Checkbox && tag == crate::events::CLICK_EVENT {
                return;
            }
            let value = present.then(|| format!("{}(this, event)", handler.js_func));
            self.emit_attribute(id, handler.js_event, value);
        } else if let Some(binding) = media::binding(tag) {
            if kind.is_media() {
                let value = present.then(|| binding.handler());
                self.emit_attribute(id, binding.dom_event, value);
            }
        }
    }

    fn emit_attribute(&mut self, id: &ViewId, name: &str, value: Option<String>) {
        self.emit(|bridge| match value {
            Some(value) => bridge.update_property(id.as_str(), name, ScriptArg::from(value)),
            None => bridge.remove_property(id.as_str(), name),
        });
    }

    fn emit_class(&mut self, id: &ViewId) {
        let class = self.view_class(id);
        self.emit_attribute(id, "class", Some(class));
    }

    fn emit_tab_index(&mut self, id: &ViewId) {
        let index = self.get_tab_index(id).map(|index| index.to_string());
        self.emit_attribute(id, "tabindex", index);
    }
}

/// Follow-up re-render a tag change needs
enum Refresh {
    None,
    Inner,
    Parent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{connected_session, drain};

    #[test]
    fn test_changed_declarations_only() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set(&id, "width", "10px");
        session.set(&id, "height", "20px");
        session.set_root_view(&id);
        drain(&mut rx);

        session.set(&id, "width", "30px");
        let out = drain(&mut rx);
        assert!(out.contains("element.style['width'] = '30px';"), "{out}");
        assert!(!out.contains("height"), "{out}");
        assert!(out.starts_with("{\nlet element = document.getElementById('id000001');"), "{out}");

        session.remove(&id, "height");
        let out = drain(&mut rx);
        assert!(out.contains("element.style['height'] = '';"), "{out}");
    }

    #[test]
    fn test_border_leaf_switches_to_longhands() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set(&id, "border", "_{ style = solid, width = 1px, color = #000 }");
        session.set_root_view(&id);
        assert!(drain(&mut rx).contains("border: 1px solid rgb(0,0,0);"));

        session.set(&id, "border-top-color", "#F00");
        let out = drain(&mut rx);
        assert!(out.contains("element.style['border'] = '';"), "{out}");
        assert!(out.contains("element.style['border-color'] = 'rgb(255,0,0) rgb(0,0,0) rgb(0,0,0) rgb(0,0,0)';"), "{out}");
    }

    #[test]
    fn test_text_and_attributes() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::Button);
        session.set_root_view(&id);
        drain(&mut rx);

        session.set(&id, "text", "<b>");
        assert!(drain(&mut rx).contains("updateInnerHTML('id000001', '&lt;b&gt;');"));

        session.set(&id, "disabled", true);
        let out = drain(&mut rx);
        assert!(out.contains("element.setAttribute('data-disabled', '1');"), "{out}");
        assert!(out.contains("element.setAttribute('class', 'ruiButton ruiView');"), "{out}");
        assert!(out.contains("element.removeAttribute('tabindex');"), "{out}");
    }

    #[test]
    fn test_listener_binds_handler() {
        use crate::events::{EventListener, MouseEvent, CLICK_EVENT};
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set_root_view(&id);
        drain(&mut rx);

        session.set(&id, CLICK_EVENT, EventListener::<MouseEvent>::no_args(|| {}));
        assert!(drain(&mut rx).contains("element.setAttribute('onclick', 'clickEvent(this, event)');"));
        session.remove(&id, CLICK_EVENT);
        assert!(drain(&mut rx).contains("element.removeAttribute('onclick');"));
    }
}
