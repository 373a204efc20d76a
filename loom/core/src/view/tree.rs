//! Parent/child bookkeeping, id lookup and focus

use crate::bridge::ScriptArg;
use crate::error::{LoomError, LoomResult};
use crate::properties::names;
use crate::properties::{Properties, PropertyValue};
use crate::session::Session;

use super::{View, ViewId, ViewKind};

impl Session {
    // ========================================================================
    // Attachment
    // ========================================================================

    /// Append `child` to the container `parent`
    ///
    /// A child attached elsewhere is moved.
    pub fn append(&mut self, parent: &ViewId, child: &ViewId) -> bool {
        let parent = self.forward(parent);
        let count = self.views.get(&parent).map_or(0, |view| view.children.len());
        self.insert(&parent, child, count)
    }

    /// Insert `child` into `parent` at `index` (clamped to the child count)
    pub fn insert(&mut self, parent: &ViewId, child: &ViewId, index: usize) -> bool {
        match self.insert_view(parent, child, index) {
            Ok(()) => true,
            Err(e) => {
                e.log();
                false
            }
        }
    }

    fn insert_view(&mut self, parent: &ViewId, child: &ViewId, index: usize) -> LoomResult<()> {
        let parent = self.forward(parent);
        let parent_view = self.existing(&parent)?;
        if !parent_view.kind.is_container() {
            return Err(LoomError::unknown_tag(names::CONTENT, parent_view.kind.name()));
        }
        self.existing(child)?;
        if *child == parent || self.is_ancestor(child, &parent) {
            return Err(LoomError::incompatible(names::CONTENT, child));
        }
        if self.view(child).and_then(View::parent).is_some() {
            self.detach(child);
        }

        let (index, count, parent_kind) = {
            let view = self.views.get_mut(&parent).ok_or_else(|| not_found(&parent))?;
            let index = index.min(view.children.len());
            view.children.insert(index, child.clone());
            (index, view.children.len(), view.kind)
        };
        if let Some(view) = self.views.get_mut(child) {
            view.parent = Some(parent.clone());
        }
        match parent_kind {
            ViewKind::StackLayout => {
                if let Some(stack) = self.views.get_mut(&parent).and_then(View::stack_mut) {
                    stack.peek = index;
                }
            }
            ViewKind::TabsLayout => self.tabs_child_inserted(&parent, index),
            _ => {}
        }

        if self.is_on_screen(&parent) {
            if index + 1 == count && parent_kind != ViewKind::StackLayout && parent_kind != ViewKind::TabsLayout {
                let html = self.view_html(child);
                self.emit(|bridge| bridge.append_to_inner_html(parent.as_str(), &html));
            } else {
                self.refresh_inner_html(&parent);
            }
        }
        self.property_changed(&parent, &[names::CONTENT.to_string()]);
        Ok(())
    }

    /// Remove the child at `index` from `parent`, returning it
    pub fn remove_view(&mut self, parent: &ViewId, index: usize) -> Option<ViewId> {
        let parent = self.forward(parent);
        let child = {
            let view = self.views.get(&parent)?;
            match view.children.get(index) {
                Some(child) => child.clone(),
                None => {
                    LoomError::OutOfRange {
                        tag: names::CONTENT.to_string(),
                        index: i64::try_from(index).unwrap_or(i64::MAX),
                        len: view.children.len(),
                    }
                    .log();
                    return None;
                }
            }
        };
        self.detach(&child);
        Some(child)
    }

    /// Remove the child with html id or `id` property `child_id`
    pub fn remove_view_by_id(&mut self, parent: &ViewId, child_id: &str) -> Option<ViewId> {
        let parent = self.forward(parent);
        let index = self
            .views
            .get(&parent)?
            .children
            .iter()
            .position(|child| self.matches_id(child, child_id));
        match index {
            Some(index) => self.remove_view(&parent, index),
            None => {
                LoomError::NotFound {
                    path: format!("{parent}/{child_id}"),
                }
                .log();
                None
            }
        }
    }

    /// Unlink `child` from its parent and tell the browser to drop its node
    pub(crate) fn detach(&mut self, child: &ViewId) {
        let Some(parent) = self.views.get(child).and_then(|view| view.parent.clone()) else {
            return;
        };
        let mut index = None;
        let mut parent_kind = ViewKind::View;
        if let Some(view) = self.views.get_mut(&parent) {
            index = view.children.iter().position(|c| c == child);
            if let Some(index) = index {
                view.children.remove(index);
            }
            parent_kind = view.kind;
        }
        if let Some(view) = self.views.get_mut(child) {
            view.parent = None;
        }
        if parent_kind == ViewKind::StackLayout {
            let count = self.views.get(&parent).map_or(0, |view| view.children.len());
            if let Some(stack) = self.views.get_mut(&parent).and_then(View::stack_mut) {
                if let Some(index) = index {
                    if stack.peek >= index && stack.peek > 0 {
                        stack.peek -= 1;
                    }
                }
                stack.peek = stack.peek.min(count.saturating_sub(1));
            }
        } else if parent_kind == ViewKind::TabsLayout {
            if let Some(index) = index {
                self.tabs_child_removed(&parent, index);
            }
        }

        let on_screen = self.is_on_screen(&parent);
        self.mark_detached(child);
        if on_screen {
            match parent_kind {
                ViewKind::StackLayout | ViewKind::TabsLayout => self.refresh_inner_html(&parent),
                _ => self.emit(|bridge| {
                    bridge.call_func("removeView", &[ScriptArg::from(child.as_str())]);
                }),
            }
        }
        self.property_changed(&parent, &[names::CONTENT.to_string()]);
    }

    /// Reset `created` on a subtree and release what it held in the page
    pub(crate) fn mark_detached(&mut self, id: &ViewId) {
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            let Some(view) = self.views.get_mut(&current) else {
                continue;
            };
            view.created = false;
            view.has_focus = false;
            view.data_list = false;
            stack.extend(view.children.iter().cloned());
            if let Some(inner) = view.custom_inner() {
                stack.push(inner.clone());
            }
            if self.focused.as_ref() == Some(&current) {
                self.focused = None;
            }
            self.release_keyframes(&current);
        }
    }

    /// Drop a detached subtree from the session
    pub fn destroy_view(&mut self, id: &ViewId) {
        self.detach(id);
        if self.root.as_ref() == Some(id) {
            self.root = None;
        }
        self.mark_detached(id);
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(view) = self.views.remove(&current) {
                stack.extend(view.children);
                if let super::KindState::Custom(inner) = view.state {
                    stack.push(inner);
                }
            }
        }
    }

    /// Replace the children of a container
    pub(crate) fn set_content(&mut self, parent: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let children = match value {
            None => Vec::new(),
            Some(PropertyValue::Views(views)) => views,
            Some(PropertyValue::Object(object)) => vec![self.create_view_from_object(&object)?],
            Some(PropertyValue::Objects(objects)) => objects
                .iter()
                .map(|object| self.create_view_from_object(object))
                .collect::<LoomResult<_>>()?,
            Some(PropertyValue::Text(text)) => {
                let id = self.create_view(ViewKind::TextView);
                self.set_value(&id, names::TEXT, Some(PropertyValue::Text(text)))?;
                vec![id]
            }
            Some(other) => return Err(LoomError::incompatible(names::CONTENT, &other)),
        };
        for child in &children {
            self.existing(child)?;
        }

        let old: Vec<ViewId> = self.existing(parent)?.children.clone();
        self.without_updates(|session| {
            for child in &old {
                session.detach(child);
            }
            for child in &children {
                session.append(parent, child);
            }
        });
        if self.is_on_screen(parent) {
            self.refresh_inner_html(parent);
        }
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// View reached from `root` by a `/`-joined path of ids
    ///
    /// Each segment matches a child's `id` property or html id, searched
    /// depth first. Logs [`LoomError::NotFound`] on a miss.
    #[must_use]
    pub fn view_by_id(&self, root: &ViewId, path: &str) -> Option<ViewId> {
        let mut current = root.clone();
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            match self.find_descendant(&current, segment) {
                Some(found) => current = found,
                None => {
                    LoomError::NotFound {
                        path: path.to_string(),
                    }
                    .log();
                    return None;
                }
            }
        }
        Some(current)
    }

    /// [`Session::view_by_id`] from the root view
    #[must_use]
    pub fn find_view(&self, path: &str) -> Option<ViewId> {
        let root = self.root.clone()?;
        self.view_by_id(&root, path)
    }

    fn find_descendant(&self, from: &ViewId, id: &str) -> Option<ViewId> {
        if self.matches_id(from, id) {
            return Some(from.clone());
        }
        let view = self.views.get(&self.forward(from))?;
        view.children.iter().find_map(|child| self.find_descendant(child, id))
    }

    fn matches_id(&self, view: &ViewId, id: &str) -> bool {
        if view.as_str() == id {
            return true;
        }
        let target = self.forward(view);
        self.views
            .get(&target)
            .and_then(|v| v.bag.get(names::ID))
            .is_some_and(|value| value.as_text() == Some(id))
    }

    fn is_ancestor(&self, ancestor: &ViewId, of: &ViewId) -> bool {
        let mut current = self.views.get(of).and_then(|view| view.parent.clone());
        while let Some(id) = current {
            if &id == ancestor {
                return true;
            }
            current = self.views.get(&id).and_then(|view| view.parent.clone());
        }
        false
    }

    /// Whether the view's element is in the page
    pub(crate) fn is_on_screen(&self, id: &ViewId) -> bool {
        self.views.get(id).is_some_and(View::is_created)
    }

    /// Re-send the inner HTML of a view
    pub(crate) fn refresh_inner_html(&mut self, id: &ViewId) {
        if self.ignore_updates() || self.bridge.is_none() {
            return;
        }
        let html = self.inner_html(id);
        self.emit(|bridge| bridge.update_inner_html(id.as_str(), &html));
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Move the browser focus to `id`
    pub fn focus_view(&mut self, id: &ViewId) {
        let id = self.forward(id);
        self.command("focus", |bridge| {
            bridge.call_func("focus", &[ScriptArg::from(id.as_str())]);
        });
    }

    /// Take the browser focus away from `id`
    pub fn blur_view(&mut self, id: &ViewId) {
        let id = self.forward(id);
        self.command("blur", |bridge| {
            bridge.call_func("blur", &[ScriptArg::from(id.as_str())]);
        });
    }

    /// View holding the focus, as last reported by the browser
    #[must_use]
    pub fn focused_view(&self) -> Option<&ViewId> {
        self.focused.as_ref()
    }

    /// Record a focus change echoed by the browser
    pub(crate) fn set_focus_state(&mut self, id: &ViewId, focused: bool) {
        if focused {
            if let Some(previous) = self.focused.take() {
                if let Some(view) = self.views.get_mut(&previous) {
                    view.has_focus = false;
                }
            }
            self.focused = Some(id.clone());
        } else if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        if let Some(view) = self.views.get_mut(id) {
            view.has_focus = focused;
        }
    }
}

fn not_found(id: &ViewId) -> LoomError {
    LoomError::NotFound { path: id.to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::resources::Resources;
    use crate::session::test_support::{connected_session, drain};

    fn session() -> Session {
        Session::new(1, Arc::new(Resources::new()))
    }

    #[test]
    fn test_append_insert_remove() {
        let mut session = session();
        let list = session.create_view(ViewKind::ListLayout);
        let a = session.create_view(ViewKind::TextView);
        let b = session.create_view(ViewKind::TextView);
        let c = session.create_view(ViewKind::TextView);
        assert!(session.append(&list, &a));
        assert!(session.append(&list, &c));
        assert!(session.insert(&list, &b, 1));
        assert_eq!(session.view(&list).unwrap().children(), &[a.clone(), b.clone(), c.clone()]);
        assert_eq!(session.view(&b).unwrap().parent(), Some(&list));

        assert_eq!(session.remove_view(&list, 0), Some(a.clone()));
        assert_eq!(session.view(&a).unwrap().parent(), None);
        assert_eq!(session.remove_view(&list, 5), None);
        assert_eq!(session.view(&list).unwrap().children(), &[b, c]);
    }

    #[test]
    fn test_single_parent_and_no_cycles() {
        let mut session = session();
        let first = session.create_view(ViewKind::ListLayout);
        let second = session.create_view(ViewKind::ListLayout);
        let child = session.create_view(ViewKind::View);
        session.append(&first, &child);
        session.append(&second, &child);
        assert!(session.view(&first).unwrap().children().is_empty());
        assert_eq!(session.view(&child).unwrap().parent(), Some(&second));

        session.append(&first, &second);
        assert!(!session.append(&second, &first));
        assert!(!session.append(&child, &first));
    }

    #[test]
    fn test_view_by_id_paths() {
        let mut session = session();
        let root = session.create_view(ViewKind::ListLayout);
        let panel = session.create_view(ViewKind::GridLayout);
        let button = session.create_view(ViewKind::Button);
        session.set(&panel, "id", "panel");
        session.set(&button, "id", "ok");
        session.append(&root, &panel);
        session.append(&panel, &button);
        session.set_root_view(&root);

        assert_eq!(session.view_by_id(&root, "panel/ok"), Some(button.clone()));
        assert_eq!(session.view_by_id(&root, "ok"), Some(button.clone()));
        assert_eq!(session.find_view(button.as_str()), Some(button));
        assert_eq!(session.view_by_id(&root, "panel/missing"), None);
    }

    #[test]
    fn test_removal_emits_remove_view() {
        let (mut session, mut rx) = connected_session();
        let root = session.create_view(ViewKind::ListLayout);
        let child = session.create_view(ViewKind::TextView);
        session.append(&root, &child);
        session.set_root_view(&root);
        drain(&mut rx);

        session.remove_view(&root, 0);
        let out = drain(&mut rx);
        assert!(out.contains("removeView('id000002');"), "{out}");
        assert!(!session.view(&child).unwrap().is_created());
    }

    #[test]
    fn test_append_to_created_container_appends_html() {
        let (mut session, mut rx) = connected_session();
        let root = session.create_view(ViewKind::ListLayout);
        session.set_root_view(&root);
        drain(&mut rx);

        let child = session.create_view(ViewKind::TextView);
        session.set(&child, "text", "new");
        session.append(&root, &child);
        let out = drain(&mut rx);
        assert!(out.contains("appendToInnerHTML('id000001'"), "{out}");
        assert!(out.contains(">new</div>"), "{out}");
        assert!(session.view(&child).unwrap().is_created());
    }

    #[test]
    fn test_content_replaces_children() {
        let mut session = session();
        let list = session.create_view(ViewKind::ListLayout);
        let a = session.create_view(ViewKind::View);
        let b = session.create_view(ViewKind::View);
        session.append(&list, &a);
        assert!(session.set(&list, "content", vec![b.clone()]));
        assert_eq!(session.view(&list).unwrap().children(), &[b]);
        assert_eq!(session.view(&a).unwrap().parent(), None);
        assert!(!session.set(&a, "content", vec![list]));
    }

    #[test]
    fn test_focus_state_is_exclusive() {
        let mut session = session();
        let a = session.create_view(ViewKind::EditView);
        let b = session.create_view(ViewKind::EditView);
        session.set_focus_state(&a, true);
        session.set_focus_state(&b, true);
        assert!(!session.view(&a).unwrap().has_focus());
        assert!(session.view(&b).unwrap().has_focus());
        assert_eq!(session.focused_view(), Some(&b));
    }
}
