//! Animated sets and keyframe bookkeeping
//!
//! `set_animated` installs a single-shot transition for one tag on top of
//! the view's persistent `transition` map, sends the transition declaration,
//! then the value. The browser animates and reports `transition-end-event`
//! (or `transition-cancel-event`) with the CSS property; the single-shot
//! entry is dropped, the persistent declaration restored and the finish
//! listener called.
//!
//! `@keyframes` rules are shared: each rule is sent once and reference
//! counted by the views whose `animation` property uses it.

use crate::animation::{transition_property, Animation};
use crate::bridge::ScriptArg;
use crate::events::{TRANSITION_CANCEL_EVENT, TRANSITION_END_EVENT};
use crate::properties::names;
use crate::properties::{normalize_view_tag, PropertyValue};
use crate::view::ViewId;

use super::{KeyframesEntry, Session};

const TRANSITION_HANDLERS: [(&str, &str, &str); 2] = [
    (TRANSITION_END_EVENT, "ontransitionend", "transitionEndEvent(this, event)"),
    (TRANSITION_CANCEL_EVENT, "ontransitioncancel", "transitionCancelEvent(this, event)"),
];

impl Session {
    // ========================================================================
    // Animated set
    // ========================================================================

    /// Set `tag` with a transition described by `animation`
    ///
    /// An animation that cannot run (zero duration, invalid timing function,
    /// view not on screen) degrades to a plain set followed at once by the
    /// finish listener.
    pub fn set_animated(
        &mut self,
        id: &ViewId,
        tag: &str,
        value: impl Into<PropertyValue>,
        animation: Animation,
    ) -> bool {
        let id = self.forward(id);
        let tag = normalize_view_tag(tag);
        let value = value.into();
        let animating = animation.is_animating(&self.resolver());
        let on_screen = self.is_on_screen(&id) && self.bridge.is_some() && !self.ignore_updates();

        if !animating || !on_screen {
            if !animating {
                tracing::debug!(view = %id, tag = %tag, "transition cannot run, setting at once");
            }
            let applied = self.set(&id, &tag, value);
            if let Some(listener) = animation.finish_listener().cloned() {
                listener.call(self, &id, &tag);
            }
            return applied;
        }

        let finish = animation.finish_listener().cloned();
        let first = self.views.get(&id).is_some_and(|view| view.animated.is_empty());
        if let Some(view) = self.views.get_mut(&id) {
            view.animated.insert(tag.clone(), animation);
        }
        let before = self.get(&id, &tag);
        let result = self.in_update_script(&id, |session| {
            if first {
                session.bind_transition_handlers(&id);
            }
            session.emit_css_diff(&id);
            session.set_value(&id, &tag, Some(value))
        });

        match result {
            Ok(()) if self.get(&id, &tag) != before => true,
            Ok(()) => {
                // nothing to animate: the browser will not report an end
                self.drop_animated(&id, &tag);
                if let Some(listener) = finish {
                    listener.call(self, &id, &tag);
                }
                true
            }
            Err(error) => {
                error.log();
                self.drop_animated(&id, &tag);
                false
            }
        }
    }

    /// Whether a single-shot transition is running for `tag`
    #[must_use]
    pub fn is_animating(&self, id: &ViewId, tag: &str) -> bool {
        let id = self.forward(id);
        self.views
            .get(&id)
            .is_some_and(|view| view.animated.contains_key(&normalize_view_tag(tag)))
    }

    /// Transition end or cancel reported for the CSS `property` of `id`
    ///
    /// Returns whether a single-shot transition was waiting for it.
    pub(crate) fn finish_transition(&mut self, id: &ViewId, property: &str, cancelled: bool) -> bool {
        let tag = self.views.get(id).and_then(|view| {
            view.animated
                .keys()
                .find(|tag| transition_property(tag) == property)
                .cloned()
        });
        let Some(tag) = tag else {
            return false;
        };
        let animation = self.drop_animated(id, &tag);
        tracing::debug!(view = %id, tag = %tag, cancelled, "transition finished");
        if let Some(listener) = animation.and_then(|a| a.finish_listener().cloned()) {
            listener.call(self, id, &tag);
        }
        true
    }

    fn drop_animated(&mut self, id: &ViewId, tag: &str) -> Option<Animation> {
        let animation = self.views.get_mut(id).and_then(|view| view.animated.remove(tag));
        self.in_update_script(id, |session| {
            session.emit_css_diff(id);
            if session.views.get(id).is_some_and(|view| view.animated.is_empty()) {
                session.unbind_transition_handlers(id);
            }
        });
        animation
    }

    fn bind_transition_handlers(&mut self, id: &ViewId) {
        for (tag, attribute, handler) in TRANSITION_HANDLERS {
            if !self.has_listeners(id, tag) {
                self.emit(|bridge| bridge.update_property(id.as_str(), attribute, ScriptArg::from(handler)));
            }
        }
    }

    fn unbind_transition_handlers(&mut self, id: &ViewId) {
        for (tag, attribute, _) in TRANSITION_HANDLERS {
            if !self.has_listeners(id, tag) {
                self.emit(|bridge| bridge.remove_property(id.as_str(), attribute));
            }
        }
    }

    // ========================================================================
    // Keyframes
    // ========================================================================

    /// Bring the keyframe references of a view in line with its `animation`
    pub(crate) fn sync_keyframes(&mut self, id: &ViewId) {
        let resources = std::sync::Arc::clone(self.resources());
        let resolver = resources.theme.resolver(self.client.dark, self.client.touch);
        let wanted: Vec<_> = match self.views.get(id).and_then(|view| view.bag.get_raw(names::ANIMATION)) {
            Some(PropertyValue::Animations(list)) => list.iter().filter_map(|a| a.keyframes_rule(&resolver)).collect(),
            _ => Vec::new(),
        };
        let held = self.views.get(id).map(|view| view.keyframes.clone()).unwrap_or_default();

        let mut added = Vec::new();
        for keyframes in &wanted {
            if held.contains(&keyframes.name) {
                continue;
            }
            let entry = self.keyframes.entry(keyframes.name.clone()).or_insert_with(|| {
                added.push(keyframes.rule.clone());
                KeyframesEntry {
                    rule: keyframes.rule.clone(),
                    refs: 0,
                }
            });
            entry.refs += 1;
        }
        let names: Vec<String> = wanted.into_iter().map(|k| k.name).collect();
        let released = held.iter().filter(|name| !names.contains(name)).fold(false, |flush, name| {
            self.unref_keyframes(name) || flush
        });
        if let Some(view) = self.views.get_mut(id) {
            view.keyframes = names;
        }

        for rule in added {
            self.emit(|bridge| bridge.append_animation_css(&rule));
        }
        if released {
            self.flush_keyframes();
        }
    }

    /// Drop every keyframe reference of a view
    pub(crate) fn release_keyframes(&mut self, id: &ViewId) {
        let held = match self.views.get_mut(id) {
            Some(view) => std::mem::take(&mut view.keyframes),
            None => return,
        };
        let released = held.iter().fold(false, |flush, name| self.unref_keyframes(name) || flush);
        if released {
            self.flush_keyframes();
        }
    }

    /// Returns whether the rule was dropped
    fn unref_keyframes(&mut self, name: &str) -> bool {
        let Some(entry) = self.keyframes.get_mut(name) else {
            return false;
        };
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 {
            self.keyframes.remove(name);
            tracing::trace!(keyframes = %name, "keyframes released");
            return true;
        }
        false
    }

    fn flush_keyframes(&mut self) {
        let css = self.animation_css();
        self.emit(|bridge| bridge.set_animation_css(&css));
    }

    /// All live `@keyframes` rules
    pub(crate) fn animation_css(&self) -> String {
        self.keyframes
            .values()
            .map(|entry| entry.rule.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of distinct `@keyframes` rules in use
    #[must_use]
    pub fn keyframes_count(&self) -> usize {
        self.keyframes.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::super::test_support::{connected_session, drain};
    use super::*;
    use crate::animation::AnimatedProperty;
    use crate::view::ViewKind;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&count), count)
    }

    #[test]
    fn test_set_animated_installs_single_shot_transition() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set(&id, "width", "10px");
        session.set_root_view(&id);
        drain(&mut rx);

        let (calls, seen) = counter();
        let animation = Animation::transition(0.5, "ease-in").on_finish(move |_, _, tag| {
            assert_eq!(tag, "width");
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(session.set_animated(&id, "width", "100px", animation));
        assert!(session.is_animating(&id, "width"));
        let out = drain(&mut rx);
        assert!(out.contains("element.setAttribute('ontransitionend', 'transitionEndEvent(this, event)');"), "{out}");
        assert!(out.contains("element.style['transition'] = 'width 0.5s ease-in';"), "{out}");
        assert!(out.contains("element.style['width'] = '100px';"), "{out}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(session.finish_transition(&id, "width", false));
        assert!(!session.is_animating(&id, "width"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let out = drain(&mut rx);
        assert!(out.contains("element.style['transition'] = '';"), "{out}");
        assert!(!session.finish_transition(&id, "width", false));
    }

    #[test]
    fn test_persistent_transition_is_restored() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        let mut persistent = std::collections::BTreeMap::new();
        persistent.insert("opacity".to_string(), Animation::transition(2.0, "linear"));
        session.set(&id, "transition", persistent);
        session.set_root_view(&id);
        drain(&mut rx);

        session.set_animated(&id, "text-color", "#F00", Animation::transition(1.0, "ease"));
        let out = drain(&mut rx);
        assert!(out.contains("color 1s ease"), "{out}");
        session.finish_transition(&id, "color", true);
        let out = drain(&mut rx);
        assert!(out.contains("element.style['transition'] = 'opacity 2s linear';"), "{out}");
    }

    #[test]
    fn test_invalid_timing_sets_at_once() {
        let (mut session, _rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set_root_view(&id);
        let (calls, seen) = counter();
        let animation = Animation::transition(1.0, "bounce").on_finish(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert!(session.set_animated(&id, "height", "5px", animation));
        assert!(!session.is_animating(&id, "height"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(session.get(&id, "height").is_some());
    }

    #[test]
    fn test_keyframes_are_reference_counted() {
        let (mut session, mut rx) = connected_session();
        let root = session.create_view(ViewKind::ListLayout);
        let a = session.create_view(ViewKind::View);
        let b = session.create_view(ViewKind::View);
        let fade = Animation::keyframes(vec![AnimatedProperty::new("opacity", 0.0, 1.0).unwrap()], 1.0);
        session.set(&a, "animation", vec![fade.clone()]);
        session.set(&b, "animation", vec![fade]);
        session.append(&root, &a);
        session.append(&root, &b);
        session.set_root_view(&root);
        assert_eq!(session.keyframes_count(), 1);
        let out = drain(&mut rx);
        assert_eq!(out.matches("@keyframes").count(), 1, "{out}");

        session.remove_view(&root, 0);
        assert_eq!(session.keyframes_count(), 1);
        session.remove_view(&root, 0);
        assert_eq!(session.keyframes_count(), 0);
        assert!(drain(&mut rx).contains("styles.textContent = '';"));
    }
}
