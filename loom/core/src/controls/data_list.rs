//! `data-list`: suggestions of text inputs and number pickers
//!
//! The options live in a `<datalist id="<id>-datalist">` written right after
//! the input element, so a change only replaces the options once the list
//! element exists.

use std::fmt::Write;

use crate::bridge::ScriptArg;
use crate::properties::names;
use crate::properties::resolve::texts_value;
use crate::session::Session;
use crate::view::{escape_html, ViewId, ViewKind};

fn data_list_id(id: &ViewId) -> String {
    format!("{id}-datalist")
}

/// Whether the element of `kind` takes a `list` attribute
pub(crate) fn accepts_data_list(kind: ViewKind) -> bool {
    matches!(kind, ViewKind::EditView | ViewKind::NumberPicker)
}

impl Session {
    /// Suggested values of an input
    #[must_use]
    pub fn get_data_list(&self, id: &ViewId) -> Vec<String> {
        self.style_value(id, names::DATA_LIST)
            .map(|value| texts_value(&value, &self.resolver()))
            .unwrap_or_default()
    }

    fn data_list_options(&self, id: &ViewId) -> String {
        let mut out = String::new();
        for item in self.get_data_list(id) {
            let _ = write!(out, "<option value=\"{}\"></option>", escape_html(&item));
        }
        out
    }

    pub(crate) fn write_data_list_attribute(&self, id: &ViewId, out: &mut String) {
        if !self.get_data_list(id).is_empty() {
            let _ = write!(out, " list=\"{}\"", data_list_id(id));
        }
    }

    /// The `<datalist>` element following an input, if it has suggestions
    pub(crate) fn write_data_list(&mut self, id: &ViewId, out: &mut String) {
        let rendered = !self.get_data_list(id).is_empty();
        if rendered {
            let _ = write!(out, "<datalist id=\"{}\">{}</datalist>", data_list_id(id), self.data_list_options(id));
        }
        if let Some(view) = self.views.get_mut(id) {
            view.data_list = rendered;
        }
    }

    /// Patch the suggestions of a created input
    pub(crate) fn emit_data_list(&mut self, id: &ViewId) {
        let list_id = data_list_id(id);
        let options = self.data_list_options(id);
        let rendered = self.views.get(id).is_some_and(|view| view.data_list);
        if rendered {
            let empty = options.is_empty();
            self.emit(|bridge| {
                bridge.update_inner_html(&list_id, &options);
                if empty {
                    bridge.remove_property(id.as_str(), "list");
                } else {
                    bridge.update_property(id.as_str(), "list", ScriptArg::from(list_id.as_str()));
                }
            });
            return;
        }
        if options.is_empty() {
            return;
        }

        let parent = match self.views.get(id).and_then(|view| view.parent.clone()) {
            Some(parent) => parent.to_string(),
            None => "ruiRootView".to_string(),
        };
        let html = format!("<datalist id=\"{list_id}\">{options}</datalist>");
        self.emit(|bridge| {
            bridge.append_to_inner_html(&parent, &html);
            bridge.update_property(id.as_str(), "list", ScriptArg::from(list_id.as_str()));
        });
        if let Some(view) = self.views.get_mut(id) {
            view.data_list = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::session::test_support::{connected_session, drain};

    #[test]
    fn test_list_follows_the_input() {
        let (mut session, mut rx) = connected_session();
        let edit = session.create_view(ViewKind::EditView);
        session.set(&edit, names::DATA_LIST, "Berlin, \"Bonn\"");
        session.set_root_view(&edit);
        let out = drain(&mut rx);
        assert!(out.contains(" list=\"id000001-datalist\""), "{out}");
        assert!(
            out.contains(
                "oninput=\"editViewInputEvent(this)\"><datalist id=\"id000001-datalist\"><option value=\"Berlin\"></option><option value=\"&quot;Bonn&quot;\"></option></datalist>"
            ),
            "{out}"
        );
    }

    #[test]
    fn test_change_replaces_options_only() {
        let (mut session, mut rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        session.set(&picker, names::DATA_LIST, "1, 2");
        session.set_root_view(&picker);
        drain(&mut rx);

        session.set(&picker, names::DATA_LIST, "5");
        let out = drain(&mut rx);
        assert!(
            out.contains("updateInnerHTML('id000001-datalist', '<option value=\"5\"></option>');"),
            "{out}"
        );
        assert!(!out.contains("appendToInnerHTML"), "{out}");
    }

    #[test]
    fn test_first_list_is_appended_to_parent() {
        let (mut session, mut rx) = connected_session();
        let list = session.create_view(ViewKind::ListLayout);
        let edit = session.create_view(ViewKind::EditView);
        session.append(&list, &edit);
        session.set_root_view(&list);
        let out = drain(&mut rx);
        assert!(!out.contains("datalist"), "{out}");

        session.set(&edit, names::DATA_LIST, "a");
        let out = drain(&mut rx);
        assert!(
            out.contains("appendToInnerHTML('id000001', '<datalist id=\"id000002-datalist\"><option value=\"a\"></option></datalist>');"),
            "{out}"
        );
        assert!(out.contains("element.setAttribute('list', 'id000002-datalist');"), "{out}");
        assert_eq!(session.get_data_list(&edit), vec!["a".to_string()]);
    }
}
