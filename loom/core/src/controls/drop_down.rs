//! DropDownList: a single-row `<select>`

use std::fmt::Write;

use crate::error::{LoomError, LoomResult};
use crate::events::DROP_DOWN_EVENT;
use crate::properties::names;
use crate::properties::resolve::{int_value, texts_value};
use crate::properties::PropertyValue;
use crate::session::Session;
use crate::view::{escape_html, ViewId};

impl Session {
    /// Items of a drop-down list, untranslated
    #[must_use]
    pub fn get_drop_down_items(&self, id: &ViewId) -> Vec<String> {
        self.style_value(id, names::ITEMS)
            .map(|value| texts_value(&value, &self.resolver()))
            .unwrap_or_default()
    }

    /// Indices of the items that cannot be picked
    #[must_use]
    pub fn get_drop_down_disabled_items(&self, id: &ViewId) -> Vec<usize> {
        let Some(value) = self.style_value(id, names::DISABLED_ITEMS) else {
            return Vec::new();
        };
        texts_value(&value, &self.resolver())
            .iter()
            .filter_map(|text| match text.trim().parse::<usize>() {
                Ok(index) => Some(index),
                Err(_) => {
                    LoomError::invalid("item index", text.as_str()).log();
                    None
                }
            })
            .collect()
    }

    pub(crate) fn write_drop_down_attributes(&self, id: &ViewId, out: &mut String) {
        out.push_str(" size=\"1\" onchange=\"dropDownListEvent(this, event)\"");
        if self.get_disabled(id) {
            out.push_str(" disabled");
        }
    }

    /// `<option>` elements; a disabled item is never shown as selected
    pub(crate) fn write_drop_down_items(&self, id: &ViewId, out: &mut String) {
        let current = self.get_current(id);
        let disabled = self.get_drop_down_disabled_items(id);
        for (n, item) in self.get_drop_down_items(id).iter().enumerate() {
            let open = if disabled.contains(&n) {
                "<option disabled>"
            } else if n == current {
                "<option selected>"
            } else {
                "<option>"
            };
            let _ = write!(out, "{open}{}</option>", escape_html(&self.get_string(item)));
        }
    }

    fn store_drop_down_current(&mut self, id: &ViewId, current: usize) {
        let value = i64::try_from(current).ok().map(PropertyValue::Int);
        if let Some(view) = self.views.get_mut(id) {
            if let Err(e) = view.bag.apply(names::CURRENT, value) {
                e.log();
            }
        }
    }

    /// Select an item from code; fires `drop-down-event` when it moves
    ///
    /// A negative value or `None` selects the first item. Before `items` is
    /// set any index is accepted.
    pub(crate) fn set_drop_down_current(&mut self, id: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let old = self.get_current(id);
        let count = self.get_drop_down_items(id).len();
        let new = match &value {
            None => 0,
            Some(v) => {
                let n = int_value(v, &self.resolver()).ok_or_else(|| LoomError::incompatible(names::CURRENT, v))?;
                match usize::try_from(n) {
                    Err(_) => 0,
                    Ok(index) if count == 0 || index < count => index,
                    Ok(_) => {
                        return Err(LoomError::OutOfRange {
                            tag: names::CURRENT.to_string(),
                            index: n,
                            len: count,
                        })
                    }
                }
            }
        };
        if new == old {
            return Ok(());
        }
        self.store_drop_down_current(id, new);
        self.property_changed(id, &[names::CURRENT.to_string()]);
        self.fire(id, DROP_DOWN_EVENT, &new);
        Ok(())
    }

    /// The user picked item `index`; the browser already shows it
    pub(crate) fn drop_down_item_selected(&mut self, id: &ViewId, index: usize) {
        if index >= self.get_drop_down_items(id).len() {
            tracing::warn!(view = %id, index, "selection of an item that does not exist");
            return;
        }
        if index == self.get_current(id) {
            return;
        }
        self.without_updates(|session| {
            session.store_drop_down_current(id, index);
            session.property_changed(id, &[names::CURRENT.to_string()]);
        });
        self.fire(id, DROP_DOWN_EVENT, &index);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::DataObject;
    use crate::events::EventListener;
    use crate::session::test_support::{connected_session, drain};
    use crate::view::ViewKind;

    fn picks(session: &mut Session, list: &ViewId) -> Arc<Mutex<Vec<usize>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set(
            list,
            DROP_DOWN_EVENT,
            EventListener::<usize>::event_only(move |index| sink.lock().push(*index)),
        );
        seen
    }

    #[test]
    fn test_renders_select_with_options() {
        let (mut session, mut rx) = connected_session();
        let list = session.create_view(ViewKind::DropDownList);
        session.set(&list, names::ITEMS, "Red, Green, <Blue>");
        session.set(&list, names::DISABLED_ITEMS, "1");
        session.set(&list, names::CURRENT, 2);
        session.set_root_view(&list);
        let out = drain(&mut rx);
        assert!(out.contains("<select id=\"id000001\" class=\"ruiDropDownList ruiView\""), "{out}");
        assert!(out.contains(" size=\"1\" onchange=\"dropDownListEvent(this, event)\""), "{out}");
        assert!(
            out.contains("<option>Red</option><option disabled>Green</option><option selected>&lt;Blue&gt;</option></select>"),
            "{out}"
        );
    }

    #[test]
    fn test_current_from_code() {
        let (mut session, mut rx) = connected_session();
        let list = session.create_view(ViewKind::DropDownList);
        session.set(&list, names::ITEMS, PropertyValue::Texts(vec!["a".into(), "b".into(), "c".into()]));
        let seen = picks(&mut session, &list);
        session.set_root_view(&list);
        drain(&mut rx);

        assert!(session.set(&list, names::CURRENT, 1));
        assert_eq!(session.get_current(&list), 1);
        assert!(drain(&mut rx).contains("selectDropDownListItem('id000001', 1);"));

        assert!(!session.set(&list, names::CURRENT, 3));
        assert_eq!(session.get_current(&list), 1);
        assert!(session.set(&list, names::CURRENT, 1));
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_item_selected_message() {
        let (mut session, mut rx) = connected_session();
        let list = session.create_view(ViewKind::DropDownList);
        session.set(&list, names::ITEMS, "a, b, c");
        let seen = picks(&mut session, &list);
        session.set_root_view(&list);
        drain(&mut rx);

        session.handle_message(&DataObject::parse("itemSelected{session=1, id=id000001, number=2}").unwrap());
        assert_eq!(session.get_current(&list), 2);
        assert_eq!(drain(&mut rx), "");
        session.handle_message(&DataObject::parse("itemSelected{session=1, id=id000001, number=9}").unwrap());
        assert_eq!(session.get_current(&list), 2);
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[test]
    fn test_items_change_rerenders_options() {
        let (mut session, mut rx) = connected_session();
        let list = session.create_view(ViewKind::DropDownList);
        session.set(&list, names::ITEMS, "a, b");
        session.set_root_view(&list);
        drain(&mut rx);

        session.set(&list, names::ITEMS, "x, y, z");
        let out = drain(&mut rx);
        assert!(
            out.contains("updateInnerHTML('id000001', '<option selected>x</option><option>y</option><option>z</option>');"),
            "{out}"
        );
    }
}
