//! Views from `.rui` objects
//!
//! ```text
//! ListLayout {
//!     orientation = vertical,
//!     content = [
//!         TextView { text = "Name" },
//!         Button { id = ok, text = OK },
//!     ],
//! }
//! ```

use crate::data::DataObject;
use crate::error::{report, LoomError, LoomResult};
use crate::properties::names;
use crate::properties::PropertyValue;
use crate::session::Session;

use super::{ViewId, ViewKind};

impl Session {
    /// Build a detached view tree from an object whose tag names the kind
    ///
    /// Outbound updates are suppressed while the tree is built; the tree is
    /// rendered in full when it is attached. Properties that fail to apply
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// [`LoomError::InvalidFormat`] when a tag is not a view kind (or names
    /// a custom view, which has no object form).
    pub fn create_view_from_object(&mut self, object: &DataObject) -> LoomResult<ViewId> {
        self.without_updates(|session| session.build_view(object))
    }

    /// [`Session::create_view_from_object`] from `.rui` text
    ///
    /// # Errors
    ///
    /// Parse errors and the errors of [`Session::create_view_from_object`].
    pub fn create_view_from_text(&mut self, text: &str) -> LoomResult<ViewId> {
        let object = DataObject::parse(text)?;
        self.create_view_from_object(&object)
    }

    fn build_view(&mut self, object: &DataObject) -> LoomResult<ViewId> {
        let kind = ViewKind::from_name(object.tag())
            .filter(|kind| *kind != ViewKind::Custom)
            .ok_or_else(|| LoomError::invalid("view", object.tag()))?;
        let id = self.create_view(kind);

        for node in object.nodes() {
            let value = PropertyValue::from_data(&node.value);
            if node.tag == names::CONTENT {
                if matches!(&value, PropertyValue::Texts(texts) if texts.is_empty()) {
                    continue;
                }
                if let Err(error) = self.set_value(&id, &node.tag, Some(value)) {
                    // a broken child aborts the subtree
                    self.destroy_view(&id);
                    return Err(error);
                }
            } else {
                report(self.set_value(&id, &node.tag, Some(value)));
            }
        }
        tracing::trace!(view = %id, kind = %kind, "view built from object");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::resources::Resources;
    use crate::session::test_support::{connected_session, drain};

    #[test]
    fn test_builds_nested_tree() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let root = session
            .create_view_from_text(
                "ListLayout { orientation = vertical, content = [ TextView { text = Name }, Button { id = ok, text = OK } ] }",
            )
            .unwrap();
        assert_eq!(session.view_kind(&root), Some(ViewKind::ListLayout));
        let children = session.view(&root).unwrap().children().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(session.get_text(&children[0]), "Name");
        assert_eq!(session.view_by_id(&root, "ok"), Some(children[1].clone()));
    }

    #[test]
    fn test_unknown_kind_and_bad_properties() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        assert!(session.create_view_from_text("Spinner { }").is_err());
        let id = session.create_view_from_text("TextView { text = Hi, no-such = 1 }").unwrap();
        assert_eq!(session.get_text(&id), "Hi");

        let before = session.view_count();
        assert!(session.create_view_from_text("ListLayout { content = [ Bogus {} ] }").is_err());
        assert_eq!(session.view_count(), before);
    }

    #[test]
    fn test_gate_is_held_and_restored() {
        let (mut session, mut rx) = connected_session();
        let root = session.create_view(ViewKind::ListLayout);
        session.set_root_view(&root);
        drain(&mut rx);

        let child = session.create_view_from_text("TextView { text = quiet }").unwrap();
        assert_eq!(drain(&mut rx), "");
        assert!(!session.ignore_updates());

        session.append(&root, &child);
        assert!(drain(&mut rx).contains(">quiet</div>"));
    }
}
