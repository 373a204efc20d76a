//! StackLayout: animated page stack

use std::fmt::Write;

use crate::error::{LoomError, LoomResult};
use crate::properties::names;
use crate::properties::resolve::{float_value, int_value, text_value};
use crate::properties::PropertyValue;
use crate::session::Session;
use crate::values::format_float;
use crate::view::{PopFinished, PushFinished, StackMove, View, ViewId, ViewKind};

/// Transition end property of a push
const PUSH_TAG: &str = "ruiPush";
/// Transition end property of a pop
const POP_TAG: &str = "ruiPop";
const DEFAULT_DURATION: f64 = 1.0;

/// Direction a page slides in (push) or out (pop)
///
/// Start and end follow the text direction: `EndToStart` enters from the
/// right in a left-to-right page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StackAnimation {
    /// `EndToStart` for both push and pop
    #[default]
    Default,
    /// From the start edge
    StartToEnd,
    /// From the end edge
    EndToStart,
    /// From above
    TopDown,
    /// From below
    BottomUp,
}

impl StackAnimation {
    /// `translate(..)` of the off-screen position for a `width × height` stack
    fn offset(self, width: f64, height: f64) -> String {
        let (dx, dy) = match self {
            Self::StartToEnd => (-width, 0.0),
            Self::Default | Self::EndToStart => (width, 0.0),
            Self::TopDown => (0.0, -height),
            Self::BottomUp => (0.0, height),
        };
        format!("translate({}px, {}px)", format_float(dx), format_float(dy))
    }
}

fn page_id(stack: &ViewId, index: usize) -> String {
    format!("{stack}page{index}")
}

impl Session {
    // ========================================================================
    // Rendering
    // ========================================================================

    /// Every child wrapped in its page; only the peek page is visible
    pub(crate) fn write_stack_pages(&mut self, id: &ViewId, out: &mut String) {
        let Some(view) = self.views.get(id) else {
            return;
        };
        let children = view.children.clone();
        let peek = view.stack().map_or(0, |stack| stack.peek).min(children.len().saturating_sub(1));
        for (index, child) in children.iter().enumerate() {
            let style = if index == peek { "z-index: auto;" } else { "visibility: hidden;" };
            let _ = write!(
                out,
                "<div id=\"{}\" class=\"ruiStackPageLayout\" style=\"{style}\">",
                page_id(id, index)
            );
            self.write_view_html(child, out);
            out.push_str("</div>");
        }
    }

    fn stack_transition(&self, id: &ViewId) -> String {
        let resolver = self.resolver();
        let duration = self
            .style_value(id, names::PUSH_DURATION)
            .and_then(|v| float_value(&v, &resolver))
            .filter(|d| *d >= 0.0)
            .unwrap_or(DEFAULT_DURATION);
        let timing = self
            .style_value(id, names::PUSH_TIMING)
            .and_then(|v| text_value(&v, &resolver))
            .unwrap_or_else(|| "ease".to_string());
        format!("transform {}s {timing}", format_float(duration))
    }

    // ========================================================================
    // Current page
    // ========================================================================

    /// Visible child of a stack
    #[must_use]
    pub fn stack_peek(&self, id: &ViewId) -> Option<ViewId> {
        let id = self.forward(id);
        let view = self.views.get(&id)?;
        view.children.get(view.stack()?.peek).cloned()
    }

    pub(crate) fn set_stack_current(&mut self, id: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let index = match value {
            None => 0,
            Some(value) => {
                let n = int_value(&value, &self.resolver())
                    .ok_or_else(|| LoomError::incompatible(names::CURRENT, &value))?;
                let len = self.views.get(id).map_or(0, |view| view.children.len());
                match usize::try_from(n) {
                    Ok(index) if index < len => index,
                    _ => {
                        return Err(LoomError::OutOfRange {
                            tag: names::CURRENT.to_string(),
                            index: n,
                            len,
                        })
                    }
                }
            }
        };
        self.show_stack_page(id, index);
        Ok(())
    }

    fn show_stack_page(&mut self, id: &ViewId, index: usize) {
        let Some(stack) = self.views.get_mut(id).and_then(View::stack_mut) else {
            return;
        };
        let old = stack.peek;
        if old == index {
            return;
        }
        stack.peek = index;

        if self.is_on_screen(id) {
            let (old_page, new_page) = (page_id(id, old), page_id(id, index));
            self.emit(|bridge| {
                bridge.update_css_property(&old_page, "visibility", "hidden");
                bridge.update_css_property(&new_page, "visibility", "visible");
                bridge.update_css_property(&new_page, "z-index", "auto");
            });
        }
        self.property_changed(id, &[names::CURRENT.to_string()]);
    }

    /// Make `child` the visible page
    pub fn move_to_front(&mut self, stack: &ViewId, child: &ViewId) -> bool {
        let stack = self.forward(stack);
        let index = self
            .views
            .get(&stack)
            .and_then(|view| view.children.iter().position(|c| c == child || self.forward(c) == *child));
        match index {
            Some(index) => {
                self.show_stack_page(&stack, index);
                true
            }
            None => {
                LoomError::NotFound {
                    path: format!("{stack}/{child}"),
                }
                .log();
                false
            }
        }
    }

    /// Remove the top page without animation
    pub fn remove_peek(&mut self, stack: &ViewId) -> Option<ViewId> {
        let stack = self.forward(stack);
        let count = self.views.get(&stack)?.children.len();
        if count == 0 {
            return None;
        }
        self.remove_view(&stack, count - 1)
    }

    // ========================================================================
    // Push and pop
    // ========================================================================

    fn is_stack(&self, id: &ViewId) -> LoomResult<()> {
        match self.existing(id)?.kind {
            ViewKind::StackLayout => Ok(()),
            kind => Err(LoomError::unknown_tag("push", kind.name())),
        }
    }

    /// Complete a move still waiting for its transition end
    fn finish_pending_move(&mut self, id: &ViewId) {
        let pending = self.views.get_mut(id).and_then(View::stack_mut).and_then(|s| s.pending.take());
        match pending {
            Some(StackMove::Push { on_finish, .. }) => self.push_finished(id, on_finish),
            Some(StackMove::Pop { view, on_finish }) => self.pop_finished(id, &view, on_finish),
            None => {}
        }
    }

    /// Slide `child` in as the new top page
    ///
    /// `on_finish` runs when the browser reports the end of the transition,
    /// or at once when the stack is not on screen.
    pub fn push(
        &mut self,
        stack: &ViewId,
        child: &ViewId,
        animation: StackAnimation,
        on_finish: Option<PushFinished>,
    ) -> bool {
        let stack = self.forward(stack);
        if let Err(e) = self.is_stack(&stack).and_then(|()| self.existing(child).map(|_| ())) {
            e.log();
            return false;
        }
        self.finish_pending_move(&stack);

        if !self.is_on_screen(&stack) || self.bridge.is_none() || self.ignore_updates() {
            if !self.append(&stack, child) {
                return false;
            }
            if let Some(on_finish) = on_finish {
                on_finish(self);
            }
            return true;
        }

        if self.view(child).and_then(View::parent).is_some() {
            self.detach(child);
        }
        if let Some(view) = self.views.get_mut(&stack) {
            view.children.push(child.clone());
        }
        if let Some(view) = self.views.get_mut(child) {
            view.parent = Some(stack.clone());
        }

        let frame = self.views.get(&stack).map(View::frame).unwrap_or_default();
        let mut html = String::new();
        let _ = write!(
            html,
            "<div id=\"{stack}push\" class=\"ruiStackPageLayout\" \
             ontransitionend=\"stackTransitionEndEvent('{stack}', '{PUSH_TAG}', event)\" \
             ontransitioncancel=\"stackTransitionEndEvent('{stack}', '{PUSH_TAG}', event)\" \
             style=\"z-index: 1; transform: {}; transition: {};\">",
            animation.offset(frame.width, frame.height),
            self.stack_transition(&stack)
        );
        self.write_view_html(child, &mut html);
        html.push_str("</div>");

        if let Some(state) = self.views.get_mut(&stack).and_then(View::stack_mut) {
            state.pending = Some(StackMove::Push {
                view: child.clone(),
                on_finish,
            });
        }
        let push_id = format!("{stack}push");
        self.batch(|session| {
            session.emit(|bridge| {
                bridge.append_to_inner_html(stack.as_str(), &html);
                bridge.update_css_property(&push_id, "transform", "translate(0px, 0px)");
            });
        });
        self.property_changed(&stack, &[names::CONTENT.to_string()]);
        true
    }

    /// Slide the top page out
    ///
    /// `on_finish` receives the popped view once the transition ends. Returns
    /// `false` on an empty stack.
    pub fn pop(&mut self, stack: &ViewId, animation: StackAnimation, on_finish: Option<PopFinished>) -> bool {
        let stack = self.forward(stack);
        if let Err(e) = self.is_stack(&stack) {
            e.log();
            return false;
        }
        self.finish_pending_move(&stack);

        let Some(view) = self.views.get(&stack) else {
            return false;
        };
        let peek = view.stack().map_or(0, |s| s.peek);
        let Some(popped) = view.children.get(peek).cloned() else {
            tracing::error!(view = %stack, "pop of an empty stack");
            return false;
        };
        let frame = view.frame();

        if !self.is_on_screen(&stack) || self.bridge.is_none() || self.ignore_updates() {
            self.remove_view(&stack, peek);
            if let Some(on_finish) = on_finish {
                on_finish(self, &popped);
            }
            return true;
        }

        let old_page = page_id(&stack, peek);
        let transition = self.stack_transition(&stack);
        if let Some(view) = self.views.get_mut(&stack) {
            view.children.remove(peek);
        }
        if let Some(view) = self.views.get_mut(&popped) {
            view.parent = None;
        }
        let new_peek = {
            let count = self.views.get(&stack).map_or(0, |view| view.children.len());
            let state = self.views.get_mut(&stack).and_then(View::stack_mut);
            state.map(|state| {
                state.peek = peek.saturating_sub(1).min(count.saturating_sub(1));
                state.pending = Some(StackMove::Pop {
                    view: popped.clone(),
                    on_finish,
                });
                (state.peek, count)
            })
        };

        let mut html = String::new();
        let _ = write!(
            html,
            "<div id=\"{stack}pop\" class=\"ruiStackPageLayout\" \
             ontransitionend=\"stackTransitionEndEvent('{stack}', '{POP_TAG}', event)\" \
             ontransitioncancel=\"stackTransitionEndEvent('{stack}', '{POP_TAG}', event)\" \
             style=\"z-index: 1; transition: {transition};\">"
        );
        self.write_view_html(&popped, &mut html);
        html.push_str("</div>");

        let pop_id = format!("{stack}pop");
        let offset = animation.offset(frame.width, frame.height);
        self.batch(|session| {
            session.emit(|bridge| {
                bridge.call_func("removeView", &[old_page.as_str().into()]);
                if let Some((index, count)) = new_peek {
                    if count > 0 {
                        bridge.update_css_property(&page_id(&stack, index), "visibility", "visible");
                    }
                }
                bridge.append_to_inner_html(stack.as_str(), &html);
                bridge.update_css_property(&pop_id, "transform", &offset);
            });
        });
        self.property_changed(&stack, &[names::CONTENT.to_string(), names::CURRENT.to_string()]);
        true
    }

    fn push_finished(&mut self, id: &ViewId, on_finish: Option<PushFinished>) {
        let count = self.views.get(id).map_or(0, |view| view.children.len());
        if let Some(state) = self.views.get_mut(id).and_then(View::stack_mut) {
            state.peek = count.saturating_sub(1);
        }
        self.refresh_inner_html(id);
        self.property_changed(id, &[names::CURRENT.to_string()]);
        if let Some(on_finish) = on_finish {
            on_finish(self);
        }
    }

    fn pop_finished(&mut self, id: &ViewId, popped: &ViewId, on_finish: Option<PopFinished>) {
        self.refresh_inner_html(id);
        self.mark_detached(popped);
        if let Some(on_finish) = on_finish {
            on_finish(self, popped);
        }
    }

    /// Complete the move `property` names; `false` when it is not a stack move
    pub(crate) fn stack_transition_end(&mut self, id: &ViewId, property: &str) -> bool {
        let expected = match self.views.get(id).and_then(View::stack).and_then(|s| s.pending.as_ref()) {
            Some(StackMove::Push { .. }) => PUSH_TAG,
            Some(StackMove::Pop { .. }) => POP_TAG,
            None => return property == PUSH_TAG || property == POP_TAG,
        };
        if property != expected {
            return property == PUSH_TAG || property == POP_TAG;
        }
        self.batch(|session| session.finish_pending_move(id));
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::DataObject;
    use crate::session::test_support::{connected_session, drain};

    fn stack_with_page(session: &mut Session) -> (ViewId, ViewId) {
        let stack = session.create_view(ViewKind::StackLayout);
        let first = session.create_view(ViewKind::TextView);
        session.append(&stack, &first);
        session.set_root_view(&stack);
        (stack, first)
    }

    fn transition_end(session: &mut Session, stack: &ViewId, property: &str) {
        session.handle_message(
            &DataObject::parse(&format!("transition-end-event{{id={stack}, property={property}}}")).unwrap(),
        );
    }

    #[test]
    fn test_pages_render_peek_only() {
        let (mut session, mut rx) = connected_session();
        let (stack, _) = stack_with_page(&mut session);
        let second = session.create_view(ViewKind::TextView);
        session.append(&stack, &second);
        assert_eq!(session.get_current(&stack), 1);
        let out = drain(&mut rx);
        assert!(out.contains("<div id=\"id000001page0\" class=\"ruiStackPageLayout\" style=\"visibility: hidden;\">"), "{out}");
        assert!(out.contains("<div id=\"id000001page1\" class=\"ruiStackPageLayout\" style=\"z-index: auto;\">"), "{out}");
    }

    #[test]
    fn test_current_switches_visibility() {
        let (mut session, mut rx) = connected_session();
        let (stack, first) = stack_with_page(&mut session);
        let second = session.create_view(ViewKind::TextView);
        session.append(&stack, &second);
        drain(&mut rx);

        assert!(session.set(&stack, names::CURRENT, 0));
        assert_eq!(session.stack_peek(&stack), Some(first.clone()));
        let out = drain(&mut rx);
        assert!(out.contains("id000001page1"), "{out}");
        assert!(out.contains("updateCSSProperty('id000001page1', 'visibility', 'hidden');"), "{out}");
        assert!(out.contains("updateCSSProperty('id000001page0', 'visibility', 'visible');"), "{out}");

        assert!(!session.set(&stack, names::CURRENT, 5));
        assert!(session.move_to_front(&stack, &second));
        assert_eq!(session.get_current(&stack), 1);
    }

    #[test]
    fn test_push_completes_on_transition_end() {
        let (mut session, mut rx) = connected_session();
        let (stack, first) = stack_with_page(&mut session);
        let pushed = session.create_view(ViewKind::TextView);
        drain(&mut rx);

        let finished = Arc::new(Mutex::new(0));
        let count = Arc::clone(&finished);
        assert!(session.push(
            &stack,
            &pushed,
            StackAnimation::Default,
            Some(Box::new(move |_: &mut Session| *count.lock() += 1)),
        ));
        let out = drain(&mut rx);
        assert!(out.contains("appendToInnerHTML('id000001'"), "{out}");
        assert!(out.contains("stackTransitionEndEvent(\\'id000001\\', \\'ruiPush\\', event)"), "{out}");
        assert_eq!(session.stack_peek(&stack), Some(first));
        assert_eq!(*finished.lock(), 0);

        transition_end(&mut session, &stack, "ruiPush");
        assert_eq!(session.stack_peek(&stack), Some(pushed));
        assert_eq!(*finished.lock(), 1);
        let out = drain(&mut rx);
        assert!(out.contains("id=\"id000001page0\" class=\"ruiStackPageLayout\" style=\"visibility: hidden;\""), "{out}");
        assert!(out.contains("id=\"id000001page1\" class=\"ruiStackPageLayout\" style=\"z-index: auto;\""), "{out}");
    }

    #[test]
    fn test_pop_returns_view_and_restores_pages() {
        let (mut session, mut rx) = connected_session();
        let (stack, first) = stack_with_page(&mut session);
        drain(&mut rx);
        let before = session.inner_html(&stack);

        let pushed = session.create_view(ViewKind::TextView);
        session.push(&stack, &pushed, StackAnimation::TopDown, None);
        transition_end(&mut session, &stack, "ruiPush");
        drain(&mut rx);

        let popped = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&popped);
        assert!(session.pop(
            &stack,
            StackAnimation::Default,
            Some(Box::new(move |_: &mut Session, view: &ViewId| *sink.lock() = Some(view.clone()))),
        ));
        let out = drain(&mut rx);
        assert!(out.contains("removeView('id000001page1');"), "{out}");
        assert!(out.contains("ruiPop"), "{out}");
        assert_eq!(session.stack_peek(&stack), Some(first));
        assert!(popped.lock().is_none());

        transition_end(&mut session, &stack, "ruiPop");
        assert_eq!(popped.lock().clone(), Some(pushed.clone()));
        assert!(!session.is_on_screen(&pushed));
        assert_eq!(session.view(&pushed).and_then(View::parent), None);
        assert_eq!(session.inner_html(&stack), before);
    }

    #[test]
    fn test_off_screen_moves_finish_at_once() {
        let (mut session, _rx) = connected_session();
        let stack = session.create_view(ViewKind::StackLayout);
        let page = session.create_view(ViewKind::TextView);
        let done = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&done);
        session.push(&stack, &page, StackAnimation::Default, Some(Box::new(|_: &mut Session| {})));
        assert_eq!(session.stack_peek(&stack), Some(page.clone()));
        session.pop(
            &stack,
            StackAnimation::Default,
            Some(Box::new(move |_: &mut Session, v: &ViewId| sink.lock().push(v.clone()))),
        );
        assert_eq!(*done.lock(), vec![page]);
        assert!(!session.pop(&stack, StackAnimation::Default, None));
    }

    #[test]
    fn test_unrelated_transition_end_reaches_listeners() {
        let (mut session, _rx) = connected_session();
        let (stack, _) = stack_with_page(&mut session);
        assert!(!session.stack_transition_end(&stack, "opacity"));
        assert!(session.stack_transition_end(&stack, "ruiPush"));
    }
}
