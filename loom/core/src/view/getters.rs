//! Typed getters with style fallback
//!
//! A getter reads the view's own bag first, then the styles the view uses:
//! the disabled variant while the view is disabled, the `style` class, and
//! finally the default style of the view kind.

use crate::properties::enums::{self, EnumTable};
use crate::properties::names;
use crate::properties::resolve::{bool_value, enum_value, int_value, text_value};
use crate::properties::{Properties, PropertyValue};
use crate::session::Session;

use super::{ViewId, ViewKind};

/// `visibility` of a view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Shown
    #[default]
    Visible,
    /// Hidden, still taking space
    Invisible,
    /// Hidden and removed from layout
    Gone,
}

/// Placement of the check mark along one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckboxAlign {
    /// Top (vertical) or left (horizontal)
    #[default]
    Start,
    /// Bottom or right
    End,
    /// Centered
    Center,
}

impl CheckboxAlign {
    fn from_index(index: usize) -> Self {
        match index {
            1 => Self::End,
            2 => Self::Center,
            _ => Self::Start,
        }
    }

    /// CSS alignment keyword
    #[must_use]
    pub fn css_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Center => "center",
        }
    }
}

impl Session {
    /// Class of the default style of a kind
    pub(crate) fn default_style(kind: ViewKind) -> &'static str {
        match kind.system_class() {
            "" => "ruiView",
            class => class,
        }
    }

    /// Value of `tag` from the view, then its styles
    #[must_use]
    pub fn style_value(&self, id: &ViewId, tag: &str) -> Option<PropertyValue> {
        let id = self.forward(id);
        let view = self.views.get(&id)?;
        if let Some(value) = view.bag.get(tag) {
            return Some(value);
        }

        let theme = self.theme();
        let resolver = self.resolver();
        let style = view
            .bag
            .get_raw(names::STYLE)
            .and_then(|v| text_value(v, &resolver))
            .unwrap_or_else(|| Self::default_style(view.kind).to_string());

        if self.get_disabled(&id) {
            let disabled = view
                .bag
                .get_raw(names::STYLE_DISABLED)
                .and_then(|v| text_value(v, &resolver))
                .and_then(|name| theme.style(&name))
                .or_else(|| theme.disabled_style(&style))
                .and_then(|bag| bag.get(tag));
            if disabled.is_some() {
                return disabled;
            }
        }
        theme.style(&style).and_then(|bag| bag.get(tag))
    }

    fn style_text(&self, id: &ViewId, tag: &str) -> Option<String> {
        self.style_value(id, tag).and_then(|v| text_value(&v, &self.resolver()))
    }

    fn style_bool(&self, id: &ViewId, tag: &str) -> Option<bool> {
        self.style_value(id, tag).and_then(|v| bool_value(&v, &self.resolver()))
    }

    fn style_enum(&self, id: &ViewId, tag: &str, table: &EnumTable) -> Option<usize> {
        self.style_value(id, tag)
            .and_then(|v| enum_value(&v, table, &self.resolver()))
    }

    /// Displayed text, localized through the string tables
    #[must_use]
    pub fn get_text(&self, id: &ViewId) -> String {
        match self.style_text(id, names::TEXT) {
            Some(text) if !text.is_empty() => self.get_string(&text),
            _ => String::new(),
        }
    }

    /// `visibility`, [`Visibility::Visible`] when unset
    #[must_use]
    pub fn get_visibility(&self, id: &ViewId) -> Visibility {
        match self.style_enum(id, names::VISIBILITY, &enums::VISIBILITY) {
            Some(1) => Visibility::Invisible,
            Some(2) => Visibility::Gone,
            _ => Visibility::Visible,
        }
    }

    /// The view's own `disabled` bit; not inherited from ancestors
    #[must_use]
    pub fn get_disabled(&self, id: &ViewId) -> bool {
        let id = self.forward(id);
        self.views
            .get(&id)
            .and_then(|view| view.bag.get_raw(names::DISABLED))
            .and_then(|v| bool_value(v, &self.resolver()))
            .unwrap_or(false)
    }

    /// Current page of a stack or tabs layout
    #[must_use]
    pub fn get_current(&self, id: &ViewId) -> usize {
        let id = self.forward(id);
        let Some(view) = self.views.get(&id) else {
            return 0;
        };
        if let Some(stack) = view.stack() {
            return stack.peek;
        }
        view.bag
            .get_raw(names::CURRENT)
            .and_then(|v| int_value(v, &self.resolver()))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    /// `checked` of a checkbox
    #[must_use]
    pub fn get_checked(&self, id: &ViewId) -> bool {
        self.style_bool(id, names::CHECKED).unwrap_or(false)
    }

    /// Vertical placement of the check mark, top when unset
    #[must_use]
    pub fn get_checkbox_vertical_align(&self, id: &ViewId) -> CheckboxAlign {
        self.style_enum(id, names::CHECKBOX_VERTICAL_ALIGN, &enums::CHECKBOX_VERTICAL_ALIGN)
            .map_or(CheckboxAlign::Start, CheckboxAlign::from_index)
    }

    /// Horizontal placement of the check mark, left when unset
    #[must_use]
    pub fn get_checkbox_horizontal_align(&self, id: &ViewId) -> CheckboxAlign {
        self.style_enum(id, names::CHECKBOX_HORIZONTAL_ALIGN, &enums::CHECKBOX_HORIZONTAL_ALIGN)
            .map_or(CheckboxAlign::Start, CheckboxAlign::from_index)
    }

    /// Placeholder of an edit view
    #[must_use]
    pub fn get_hint(&self, id: &ViewId) -> String {
        self.style_text(id, names::HINT)
            .map(|hint| self.get_string(&hint))
            .unwrap_or_default()
    }

    /// Index into the `edit-view-type` table, `text` when unset
    #[must_use]
    pub fn get_edit_view_type(&self, id: &ViewId) -> usize {
        self.style_enum(id, names::EDIT_VIEW_TYPE, &enums::EDIT_VIEW_TYPE)
            .unwrap_or(0)
    }

    /// Whether the view takes keyboard focus
    #[must_use]
    pub fn get_focusable(&self, id: &ViewId) -> bool {
        let id = self.forward(id);
        let default = self.view_kind(&id).is_some_and(ViewKind::default_focusable);
        self.style_bool(&id, names::FOCUSABLE).unwrap_or(default)
    }

    /// `tabindex` attribute: none while disabled, the `tab-index` property,
    /// or `0` for focusable views
    #[must_use]
    pub fn get_tab_index(&self, id: &ViewId) -> Option<i64> {
        if self.get_disabled(id) {
            return None;
        }
        let explicit = self
            .style_value(id, names::TAB_INDEX)
            .and_then(|v| int_value(&v, &self.resolver()));
        match explicit {
            Some(index) => Some(index),
            None if self.get_focusable(id) => Some(0),
            None => None,
        }
    }

    /// Resolved text of an attribute-like tag (`src`, `poster`, `tooltip`)
    pub(crate) fn get_resolved(&self, id: &ViewId, tag: &str) -> Option<String> {
        self.style_text(id, tag).filter(|text| !text.is_empty())
    }

    /// Resolved flag of a tag
    pub(crate) fn get_flag(&self, id: &ViewId, tag: &str) -> bool {
        self.style_bool(id, tag).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::properties::PropertyBag;
    use crate::resources::Resources;
    use crate::theme::Theme;

    fn session() -> Session {
        Session::new(1, Arc::new(Resources::new()))
    }

    #[test]
    fn test_checkbox_align_defaults() {
        let mut session = session();
        let id = session.create_view(ViewKind::Checkbox);
        assert_eq!(session.get_checkbox_vertical_align(&id), CheckboxAlign::Start);
        assert_eq!(session.get_checkbox_horizontal_align(&id), CheckboxAlign::Start);
        session.set(&id, "checkbox-vertical-align", "center");
        session.set(&id, "checkbox-horizontal-align", "right");
        assert_eq!(session.get_checkbox_vertical_align(&id), CheckboxAlign::Center);
        assert_eq!(session.get_checkbox_horizontal_align(&id), CheckboxAlign::End);
    }

    #[test]
    fn test_style_fallback() {
        let mut theme = Theme::new("test");
        let mut style = PropertyBag::new();
        style.set("visibility", "gone");
        style.set("text", "from style");
        theme.set_style("hidden", style);
        let mut session = Session::new(1, Arc::new(Resources {
            theme,
            ..Resources::new()
        }));

        let id = session.create_view(ViewKind::TextView);
        assert_eq!(session.get_visibility(&id), Visibility::Visible);
        session.set(&id, "style", "hidden");
        assert_eq!(session.get_visibility(&id), Visibility::Gone);
        assert_eq!(session.get_text(&id), "from style");
        session.set(&id, "visibility", "invisible");
        assert_eq!(session.get_visibility(&id), Visibility::Invisible);
    }

    #[test]
    fn test_disabled_is_not_inherited() {
        let mut session = session();
        let parent = session.create_view(ViewKind::ListLayout);
        let child = session.create_view(ViewKind::Button);
        session.append(&parent, &child);
        session.set(&parent, "disabled", true);
        assert!(session.get_disabled(&parent));
        assert!(!session.get_disabled(&child));
    }

    #[test]
    fn test_tab_index() {
        let mut session = session();
        let button = session.create_view(ViewKind::Button);
        let text = session.create_view(ViewKind::TextView);
        assert_eq!(session.get_tab_index(&button), Some(0));
        assert_eq!(session.get_tab_index(&text), None);
        session.set(&text, "tab-index", 3);
        assert_eq!(session.get_tab_index(&text), Some(3));
        session.set(&button, "disabled", true);
        assert_eq!(session.get_tab_index(&button), None);
    }

    #[test]
    fn test_text_is_localized() {
        let mut resources = Resources::new();
        resources.add_text("strings:de { greeting = Hallo }").unwrap();
        let mut session = Session::new(1, Arc::new(resources));
        session.client.language = "de".to_string();
        let id = session.create_view(ViewKind::TextView);
        session.set(&id, "text", "greeting");
        assert_eq!(session.get_text(&id), "Hallo");
    }
}
