//! HTML emission
//!
//! Rendering a view writes its element and, recursively, its subviews. It is
//! also the moment a view becomes "created": from then on property changes
//! are patched in place by the diff emitter against the CSS stored here.

use std::fmt::Write;

use crate::controls::accepts_data_list;
use crate::events::{CHECKBOX_EVENT, CLICK_EVENT, FOCUS_HANDLERS, JS_HANDLERS, TRANSITION_CANCEL_EVENT, TRANSITION_END_EVENT};
use crate::media;
use crate::properties::enums;
use crate::properties::names;
use crate::properties::resolve::enum_value;
use crate::session::Session;
use crate::style::{view_style_css, CssBuilder};

use super::{ViewId, ViewKind};

/// Index of `multiline` in the `edit-view-type` table
const EDIT_MULTILINE: usize = 6;

/// `&`, `<`, `>`, `"` and `'` as entities
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Text content with line breaks kept
pub(crate) fn text_html(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

pub(crate) fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"{}\"", escape_html(value));
}

/// `type` attribute of an `<input>` for an `edit-view-type` index
fn input_type(edit_type: usize) -> &'static str {
    match edit_type {
        1 => "password",
        2 | 3 => "email",
        4 => "url",
        5 => "tel",
        _ => "text",
    }
}

impl Session {
    // ========================================================================
    // Element parts
    // ========================================================================

    /// Inline declarations of a view: its bag projection plus kind extras
    pub(crate) fn view_css(&self, id: &ViewId) -> CssBuilder {
        let Some(view) = self.views.get(id) else {
            return CssBuilder::new();
        };
        let resolver = self.resolver();
        let mut css = view_style_css(&view.bag, &view.animated, &resolver);
        if view.kind == ViewKind::ImageView {
            if let Some(fit) = view.bag.get_raw(names::FIT).and_then(|v| enum_value(v, &enums::FIT, &resolver)) {
                css.add("object-fit", enums::FIT.css_value(fit));
            }
            let vertical = view
                .bag
                .get_raw(names::IMAGE_VERTICAL_ALIGN)
                .and_then(|v| enum_value(v, &enums::IMAGE_VERTICAL_ALIGN, &resolver));
            let horizontal = view
                .bag
                .get_raw(names::IMAGE_HORIZONTAL_ALIGN)
                .and_then(|v| enum_value(v, &enums::IMAGE_HORIZONTAL_ALIGN, &resolver));
            if vertical.is_some() || horizontal.is_some() {
                css.add(
                    "object-position",
                    format!(
                        "{} {}",
                        enums::IMAGE_HORIZONTAL_ALIGN.css_value(horizontal.unwrap_or(2)),
                        enums::IMAGE_VERTICAL_ALIGN.css_value(vertical.unwrap_or(2)),
                    ),
                );
            }
        }
        if view.kind == ViewKind::TabsLayout {
            self.tabs_css(id, &mut css);
        }
        css
    }

    /// `class` attribute of a view
    pub(crate) fn view_class(&self, id: &ViewId) -> String {
        let Some(kind) = self.view_kind(id) else {
            return String::new();
        };
        let mut class = String::new();
        if !kind.system_class().is_empty() {
            class.push_str(kind.system_class());
            class.push(' ');
        }
        class.push_str("ruiView");

        let style = if self.get_disabled(id) {
            self.get_resolved(id, names::STYLE_DISABLED)
                .or_else(|| self.get_resolved(id, names::STYLE))
        } else {
            self.get_resolved(id, names::STYLE)
        };
        if let Some(style) = style {
            class.push(' ');
            class.push_str(&style);
        }
        class
    }

    /// Whether a DOM handler must be bound for `tag`
    fn needs_handler(&self, id: &ViewId, kind: ViewKind, tag: &str) -> bool {
        if self.has_listeners(id, tag) {
            return true;
        }
        match tag {
            CLICK_EVENT => kind == ViewKind::Checkbox,
            TRANSITION_END_EVENT | TRANSITION_CANCEL_EVENT => {
                self.views.get(id).is_some_and(|view| !view.animated.is_empty())
            }
            _ => false,
        }
    }

    fn write_attributes(&self, id: &ViewId, kind: ViewKind, css: &CssBuilder, out: &mut String) {
        write_attr(out, "id", id.as_str());
        write_attr(out, "class", &self.view_class(id));
        if !css.is_empty() {
            write_attr(out, "style", &css.finish());
        }
        if self.get_disabled(id) {
            write_attr(out, "data-disabled", "1");
        }
        if let Some(index) = self.get_tab_index(id) {
            write_attr(out, "tabindex", &index.to_string());
        }
        if let Some(tooltip) = self.get_resolved(id, names::TOOLTIP) {
            write_attr(out, "data-tooltip", &self.get_string(&tooltip));
        }

        out.push_str(" onscroll=\"scrollEvent(this, event)\"");
        if self.get_focusable(id) {
            for handler in FOCUS_HANDLERS {
                let _ = write!(out, " {}=\"{}(this, event)\"", handler.js_event, handler.js_func);
            }
        }
        for handler in JS_HANDLERS {
            if self.needs_handler(id, kind, handler.tag) {
                let _ = write!(out, " {}=\"{}(this, event)\"", handler.js_event, handler.js_func);
            }
        }

        match kind {
            ViewKind::EditView => self.write_edit_attributes(id, out),
            ViewKind::ImageView => {
                if let Some(src) = self.get_resolved(id, names::SRC) {
                    write_attr(out, "src", &src);
                }
                let alt = self.get_resolved(id, names::ALT_TEXT).unwrap_or_default();
                write_attr(out, "alt", &self.get_string(&alt));
            }
            ViewKind::AudioPlayer | ViewKind::VideoPlayer => {
                self.write_media_attributes(id, kind, out);
            }
            ViewKind::TabsLayout => self.write_tabs_attributes(id, out),
            ViewKind::DropDownList => self.write_drop_down_attributes(id, out),
            ViewKind::NumberPicker => self.write_number_picker_attributes(id, out),
            ViewKind::TableView => self.write_table_attributes(id, out),
            _ => {}
        }
    }

    fn write_edit_attributes(&self, id: &ViewId, out: &mut String) {
        let edit_type = self.get_edit_view_type(id);
        if edit_type != EDIT_MULTILINE {
            write_attr(out, "type", input_type(edit_type));
            if edit_type == 3 {
                out.push_str(" multiple");
            }
            write_attr(out, "value", &self.get_resolved(id, names::TEXT).unwrap_or_default());
            self.write_data_list_attribute(id, out);
        }
        let hint = self.get_hint(id);
        if !hint.is_empty() {
            write_attr(out, "placeholder", &hint);
        }
        if let Some(max) = self.style_value(id, names::MAX_LENGTH).and_then(|v| match v {
            crate::properties::PropertyValue::Int(n) if n > 0 => Some(n),
            _ => None,
        }) {
            write_attr(out, "maxlength", &max.to_string());
        }
        if self.get_flag(id, names::READ_ONLY) {
            out.push_str(" readonly");
        }
        out.push_str(" oninput=\"editViewInputEvent(this)\"");
    }

    fn write_media_attributes(&self, id: &ViewId, kind: ViewKind, out: &mut String) {
        if let Some(src) = self.get_resolved(id, names::SRC) {
            write_attr(out, "src", &src);
        }
        if kind == ViewKind::VideoPlayer {
            if let Some(poster) = self.get_resolved(id, names::POSTER) {
                write_attr(out, "poster", &poster);
            }
        }
        for flag in [names::CONTROLS, names::LOOP, names::MUTED] {
            if self.get_flag(id, flag) {
                let _ = write!(out, " {flag}");
            }
        }
        if let Some(preload) = self
            .style_value(id, names::PRELOAD)
            .and_then(|v| enum_value(&v, &enums::PRELOAD, &self.resolver()))
        {
            write_attr(out, "preload", enums::PRELOAD.name(preload).unwrap_or("auto"));
        }
        for binding in media::EVENT_BINDINGS {
            if self.has_listeners(id, binding.tag) {
                out.push(' ');
                out.push_str(&binding.attribute());
            }
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// HTML of a view and its subtree; marks the subtree created
    pub(crate) fn view_html(&mut self, id: &ViewId) -> String {
        let mut out = String::new();
        self.write_view_html(id, &mut out);
        out
    }

    pub(crate) fn write_view_html(&mut self, id: &ViewId, out: &mut String) {
        if let Some(inner) = self.views.get(id).and_then(|view| view.custom_inner().cloned()) {
            if let Some(view) = self.views.get_mut(id) {
                view.created = true;
            }
            self.write_view_html(&inner, out);
            return;
        }
        let Some(kind) = self.view_kind(id) else {
            tracing::warn!(view = %id, "rendering an unknown view");
            return;
        };

        let css = self.view_css(id);
        let multiline = kind == ViewKind::EditView && self.get_edit_view_type(id) == EDIT_MULTILINE;
        let tag = if multiline { "textarea" } else { kind.html_tag() };

        out.push('<');
        out.push_str(tag);
        self.write_attributes(id, kind, &css, out);
        out.push('>');

        if let Some(view) = self.views.get_mut(id) {
            view.created = true;
            view.css = css;
        }
        self.sync_keyframes(id);

        if kind.is_void_element() && !multiline {
            if accepts_data_list(kind) {
                self.write_data_list(id, out);
            }
            return;
        }
        self.write_inner_html(id, kind, out);
        let _ = write!(out, "</{tag}>");
    }

    /// HTML of the subviews of a view
    pub(crate) fn inner_html(&mut self, id: &ViewId) -> String {
        let mut out = String::new();
        if let Some(kind) = self.view_kind(id) {
            self.write_inner_html(id, kind, &mut out);
        }
        out
    }

    fn write_inner_html(&mut self, id: &ViewId, kind: ViewKind, out: &mut String) {
        match kind {
            ViewKind::TextView | ViewKind::Button => out.push_str(&text_html(&self.get_text(id))),
            ViewKind::Checkbox => self.write_checkbox(id, out),
            ViewKind::EditView => out.push_str(&escape_html(
                &self.get_resolved(id, names::TEXT).unwrap_or_default(),
            )),
            ViewKind::StackLayout => self.write_stack_pages(id, out),
            ViewKind::TabsLayout => self.write_tabs(id, out),
            ViewKind::DropDownList => self.write_drop_down_items(id, out),
            ViewKind::TableView => self.write_table_rows(id, out),
            kind if kind.is_container() => {
                let children = self.views.get(id).map(|view| view.children.clone()).unwrap_or_default();
                for child in &children {
                    self.write_view_html(child, out);
                }
            }
            _ => {}
        }
    }

    fn write_checkbox(&self, id: &ViewId, out: &mut String) {
        let vertical = self.get_checkbox_vertical_align(id);
        let horizontal = self.get_checkbox_horizontal_align(id);
        let mark = if self.get_checked(id) { "&#x2713;" } else { "" };
        let order = if horizontal == super::CheckboxAlign::End { " order: 1;" } else { "" };
        let _ = write!(
            out,
            "<div id=\"{id}checkbox\" class=\"ruiCheckboxBox\" style=\"align-self: {}; justify-self: {};{order}\">{mark}</div>",
            vertical.css_value(),
            horizontal.css_value(),
        );
        let _ = write!(out, "<div class=\"ruiCheckboxContent\">{}</div>", text_html(&self.get_text(id)));
    }

    /// Toggle a checkbox after a click and report the new state
    pub(crate) fn toggle_checkbox(&mut self, id: &ViewId) {
        let checked = !self.get_checked(id);
        if self.set(id, names::CHECKED, checked) {
            self.fire(id, CHECKBOX_EVENT, &checked);
        }
    }
}
