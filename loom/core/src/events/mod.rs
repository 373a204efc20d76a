//! Event taxonomy
//!
//! Every event tag has one canonical listener signature,
//! `Fn(&mut Session, &ViewId, &E)`, where `E` is the payload type of the
//! event. Degraded shapes (payload only, view only, no arguments) are lifted
//! to the canonical one by the [`EventListener`] constructors when the
//! listener is created; nothing is adapted at dispatch time.
//!
//! # Design Philosophy
//!
//! The browser only reports what happened; the session decodes the payload
//! once and hands the same value to every listener in registration order.

mod payload;

use std::fmt;
use std::sync::Arc;

use crate::session::Session;
use crate::values::Frame;
use crate::view::ViewId;

pub use payload::{
    hot_key_name, CellIndex, KeyEvent, Modifiers, MouseEvent, PointerEvent, Touch, TouchEvent,
};

// ============================================================================
// Event tags
// ============================================================================

/// Mouse click
pub const CLICK_EVENT: &str = "click-event";
/// Mouse double click
pub const DOUBLE_CLICK_EVENT: &str = "double-click-event";
/// Context menu request
pub const CONTEXT_MENU_EVENT: &str = "context-menu-event";
/// Mouse button pressed
pub const MOUSE_DOWN: &str = "mouse-down";
/// Mouse button released
pub const MOUSE_UP: &str = "mouse-up";
/// Mouse moved
pub const MOUSE_MOVE: &str = "mouse-move";
/// Mouse left the view
pub const MOUSE_OUT: &str = "mouse-out";
/// Mouse entered the view
pub const MOUSE_OVER: &str = "mouse-over";
/// Pointer pressed
pub const POINTER_DOWN: &str = "pointer-down";
/// Pointer released
pub const POINTER_UP: &str = "pointer-up";
/// Pointer moved
pub const POINTER_MOVE: &str = "pointer-move";
/// Pointer interaction cancelled
pub const POINTER_CANCEL: &str = "pointer-cancel";
/// Pointer left the view
pub const POINTER_OUT: &str = "pointer-out";
/// Pointer entered the view
pub const POINTER_OVER: &str = "pointer-over";
/// Touch started
pub const TOUCH_START: &str = "touch-start";
/// Touch ended
pub const TOUCH_END: &str = "touch-end";
/// Touch moved
pub const TOUCH_MOVE: &str = "touch-move";
/// Touch cancelled
pub const TOUCH_CANCEL: &str = "touch-cancel";
/// Key pressed
pub const KEY_DOWN_EVENT: &str = "key-down-event";
/// Key released
pub const KEY_UP_EVENT: &str = "key-up-event";
/// View gained focus
pub const FOCUS_EVENT: &str = "focus-event";
/// View lost focus
pub const LOST_FOCUS_EVENT: &str = "lost-focus-event";
/// View scrolled
pub const SCROLL_EVENT: &str = "scroll-event";
/// View resized
pub const RESIZE_EVENT: &str = "resize-event";
/// CSS transition created
pub const TRANSITION_RUN_EVENT: &str = "transition-run-event";
/// CSS transition started
pub const TRANSITION_START_EVENT: &str = "transition-start-event";
/// CSS transition finished
pub const TRANSITION_END_EVENT: &str = "transition-end-event";
/// CSS transition cancelled
pub const TRANSITION_CANCEL_EVENT: &str = "transition-cancel-event";
/// Keyframe animation started
pub const ANIMATION_START_EVENT: &str = "animation-start-event";
/// Keyframe animation finished
pub const ANIMATION_END_EVENT: &str = "animation-end-event";
/// Keyframe animation iteration finished
pub const ANIMATION_ITERATION_EVENT: &str = "animation-iteration-event";
/// Keyframe animation cancelled
pub const ANIMATION_CANCEL_EVENT: &str = "animation-cancel-event";
/// Checkbox toggled
pub const CHECKBOX_EVENT: &str = "checkbox-event";
/// Current tab changed
pub const CURRENT_TAB_CHANGED: &str = "current-tab-changed";
/// Tab close button clicked
pub const TAB_CLOSE_EVENT: &str = "tab-close-event";
/// Drop-down list item picked
pub const DROP_DOWN_EVENT: &str = "drop-down-event";
/// Number picker value changed, `(new, old)`
pub const NUMBER_CHANGED_EVENT: &str = "number-changed";
/// Table cell clicked
pub const TABLE_CELL_CLICKED_EVENT: &str = "table-cell-clicked";
/// Table cell selection moved
pub const TABLE_CELL_SELECTED_EVENT: &str = "table-cell-selected";
/// Table row clicked
pub const TABLE_ROW_CLICKED_EVENT: &str = "table-row-clicked";
/// Table row selection moved
pub const TABLE_ROW_SELECTED_EVENT: &str = "table-row-selected";

/// Media player events with no payload
pub const MEDIA_PLAIN_EVENTS: &[&str] = &[
    "abort-event",
    "can-play-event",
    "can-play-through-event",
    "complete-event",
    "emptied-event",
    "ended-event",
    "loaded-data-event",
    "loaded-metadata-event",
    "load-start-event",
    "pause-event",
    "play-event",
    "playing-event",
    "progress-event",
    "seeked-event",
    "seeking-event",
    "stalled-event",
    "suspend-event",
    "waiting-event",
];

/// Media player events carrying a number
pub const MEDIA_NUMBER_EVENTS: &[&str] = &[
    "duration-changed-event",
    "rate-changed-event",
    "time-update-event",
    "volume-changed-event",
];

/// Media player error
pub const PLAYER_ERROR_EVENT: &str = "player-error-event";

/// Payload kind of every view event tag
pub static EVENT_TAGS: &[(&str, PayloadKind)] = &[
    (CLICK_EVENT, PayloadKind::Mouse),
    (DOUBLE_CLICK_EVENT, PayloadKind::Mouse),
    (CONTEXT_MENU_EVENT, PayloadKind::Mouse),
    (MOUSE_DOWN, PayloadKind::Mouse),
    (MOUSE_UP, PayloadKind::Mouse),
    (MOUSE_MOVE, PayloadKind::Mouse),
    (MOUSE_OUT, PayloadKind::Mouse),
    (MOUSE_OVER, PayloadKind::Mouse),
    (POINTER_DOWN, PayloadKind::Pointer),
    (POINTER_UP, PayloadKind::Pointer),
    (POINTER_MOVE, PayloadKind::Pointer),
    (POINTER_CANCEL, PayloadKind::Pointer),
    (POINTER_OUT, PayloadKind::Pointer),
    (POINTER_OVER, PayloadKind::Pointer),
    (TOUCH_START, PayloadKind::Touch),
    (TOUCH_END, PayloadKind::Touch),
    (TOUCH_MOVE, PayloadKind::Touch),
    (TOUCH_CANCEL, PayloadKind::Touch),
    (KEY_DOWN_EVENT, PayloadKind::Key),
    (KEY_UP_EVENT, PayloadKind::Key),
    (FOCUS_EVENT, PayloadKind::Plain),
    (LOST_FOCUS_EVENT, PayloadKind::Plain),
    (SCROLL_EVENT, PayloadKind::Frame),
    (RESIZE_EVENT, PayloadKind::Frame),
    (TRANSITION_RUN_EVENT, PayloadKind::Text),
    (TRANSITION_START_EVENT, PayloadKind::Text),
    (TRANSITION_END_EVENT, PayloadKind::Text),
    (TRANSITION_CANCEL_EVENT, PayloadKind::Text),
    (ANIMATION_START_EVENT, PayloadKind::Text),
    (ANIMATION_END_EVENT, PayloadKind::Text),
    (ANIMATION_ITERATION_EVENT, PayloadKind::Text),
    (ANIMATION_CANCEL_EVENT, PayloadKind::Text),
    (CHECKBOX_EVENT, PayloadKind::Bool),
    (CURRENT_TAB_CHANGED, PayloadKind::IndexChange),
    (TAB_CLOSE_EVENT, PayloadKind::Index),
    (DROP_DOWN_EVENT, PayloadKind::Index),
    (NUMBER_CHANGED_EVENT, PayloadKind::NumberChange),
    (TABLE_CELL_CLICKED_EVENT, PayloadKind::Cell),
    (TABLE_CELL_SELECTED_EVENT, PayloadKind::Cell),
    (TABLE_ROW_CLICKED_EVENT, PayloadKind::Index),
    (TABLE_ROW_SELECTED_EVENT, PayloadKind::Index),
    ("abort-event", PayloadKind::Plain),
    ("can-play-event", PayloadKind::Plain),
    ("can-play-through-event", PayloadKind::Plain),
    ("complete-event", PayloadKind::Plain),
    ("emptied-event", PayloadKind::Plain),
    ("ended-event", PayloadKind::Plain),
    ("loaded-data-event", PayloadKind::Plain),
    ("loaded-metadata-event", PayloadKind::Plain),
    ("load-start-event", PayloadKind::Plain),
    ("pause-event", PayloadKind::Plain),
    ("play-event", PayloadKind::Plain),
    ("playing-event", PayloadKind::Plain),
    ("progress-event", PayloadKind::Plain),
    ("seeked-event", PayloadKind::Plain),
    ("seeking-event", PayloadKind::Plain),
    ("stalled-event", PayloadKind::Plain),
    ("suspend-event", PayloadKind::Plain),
    ("waiting-event", PayloadKind::Plain),
    ("duration-changed-event", PayloadKind::Number),
    ("rate-changed-event", PayloadKind::Number),
    ("time-update-event", PayloadKind::Number),
    ("volume-changed-event", PayloadKind::Number),
    (PLAYER_ERROR_EVENT, PayloadKind::Text),
];

/// DOM wiring of an event: `<js_event>="<js_func>(this, event)"`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsHandler {
    /// Event tag
    pub tag: &'static str,
    /// DOM attribute (`onclick`)
    pub js_event: &'static str,
    /// Client helper (`clickEvent`)
    pub js_func: &'static str,
}

/// Events that are bound as DOM attributes when a listener is present
pub static JS_HANDLERS: &[JsHandler] = &[
    js(KEY_DOWN_EVENT, "onkeydown", "keyDownEvent"),
    js(KEY_UP_EVENT, "onkeyup", "keyUpEvent"),
    js(CLICK_EVENT, "onclick", "clickEvent"),
    js(DOUBLE_CLICK_EVENT, "ondblclick", "doubleClickEvent"),
    js(MOUSE_DOWN, "onmousedown", "mouseDownEvent"),
    js(MOUSE_UP, "onmouseup", "mouseUpEvent"),
    js(MOUSE_MOVE, "onmousemove", "mouseMoveEvent"),
    js(MOUSE_OUT, "onmouseout", "mouseOutEvent"),
    js(MOUSE_OVER, "onmouseover", "mouseOverEvent"),
    js(CONTEXT_MENU_EVENT, "oncontextmenu", "contextMenuEvent"),
    js(POINTER_DOWN, "onpointerdown", "pointerDownEvent"),
    js(POINTER_UP, "onpointerup", "pointerUpEvent"),
    js(POINTER_MOVE, "onpointermove", "pointerMoveEvent"),
    js(POINTER_OUT, "onpointerout", "pointerOutEvent"),
    js(POINTER_OVER, "onpointerover", "pointerOverEvent"),
    js(POINTER_CANCEL, "onpointercancel", "pointerCancelEvent"),
    js(TOUCH_START, "ontouchstart", "touchStartEvent"),
    js(TOUCH_END, "ontouchend", "touchEndEvent"),
    js(TOUCH_MOVE, "ontouchmove", "touchMoveEvent"),
    js(TOUCH_CANCEL, "ontouchcancel", "touchCancelEvent"),
    js(TRANSITION_RUN_EVENT, "ontransitionrun", "transitionRunEvent"),
    js(TRANSITION_START_EVENT, "ontransitionstart", "transitionStartEvent"),
    js(TRANSITION_END_EVENT, "ontransitionend", "transitionEndEvent"),
    js(TRANSITION_CANCEL_EVENT, "ontransitioncancel", "transitionCancelEvent"),
    js(ANIMATION_START_EVENT, "onanimationstart", "animationStartEvent"),
    js(ANIMATION_END_EVENT, "onanimationend", "animationEndEvent"),
    js(ANIMATION_ITERATION_EVENT, "onanimationiteration", "animationIterationEvent"),
    js(ANIMATION_CANCEL_EVENT, "onanimationcancel", "animationCancelEvent"),
];

/// Focus wiring, emitted for every focusable view
pub static FOCUS_HANDLERS: &[JsHandler] = &[
    js(FOCUS_EVENT, "onfocus", "focusEvent"),
    js(LOST_FOCUS_EVENT, "onblur", "blurEvent"),
];

const fn js(tag: &'static str, js_event: &'static str, js_func: &'static str) -> JsHandler {
    JsHandler {
        tag,
        js_event,
        js_func,
    }
}

/// DOM wiring of `tag`, if it is bound as an attribute
#[must_use]
pub fn js_handler(tag: &str) -> Option<&'static JsHandler> {
    JS_HANDLERS.iter().find(|handler| handler.tag == tag)
}

/// Payload kind of an event tag
#[must_use]
pub fn payload_kind(tag: &str) -> Option<PayloadKind> {
    EVENT_TAGS
        .iter()
        .find(|(event, _)| *event == tag)
        .map(|(_, kind)| *kind)
}

// ============================================================================
// Listeners
// ============================================================================

/// Payload type of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// No payload
    Plain,
    /// [`MouseEvent`]
    Mouse,
    /// [`PointerEvent`]
    Pointer,
    /// [`TouchEvent`]
    Touch,
    /// [`KeyEvent`]
    Key,
    /// Text (property or animation name, error message)
    Text,
    /// Geometry
    Frame,
    /// Flag
    Bool,
    /// Number
    Number,
    /// Index
    Index,
    /// `(new, old)` index pair
    IndexChange,
    /// `(new, old)` number pair
    NumberChange,
    /// [`CellIndex`]
    Cell,
}

type Callback<E> = dyn Fn(&mut Session, &ViewId, &E) + Send + Sync;

/// A listener in canonical form
pub struct EventListener<E>(Arc<Callback<E>>);

impl<E> EventListener<E> {
    /// Full signature: session, origin view, payload
    pub fn new(listener: impl Fn(&mut Session, &ViewId, &E) + Send + Sync + 'static) -> Self {
        Self(Arc::new(listener))
    }

    /// Payload only
    pub fn event_only(listener: impl Fn(&E) + Send + Sync + 'static) -> Self {
        Self::new(move |_, _, event| listener(event))
    }

    /// Session and origin view only
    pub fn view_only(listener: impl Fn(&mut Session, &ViewId) + Send + Sync + 'static) -> Self {
        Self::new(move |session, view, _| listener(session, view))
    }

    /// No arguments
    pub fn no_args(listener: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(move |_, _, _| listener())
    }

    /// Invoke the listener
    pub fn call(&self, session: &mut Session, view: &ViewId, event: &E) {
        (self.0)(session, view, event);
    }
}

impl<E> Clone for EventListener<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> PartialEq for EventListener<E> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> fmt::Debug for EventListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({:p})", Arc::as_ptr(&self.0))
    }
}

/// Ordered listeners of one event, typed by payload
#[derive(Clone, Debug, PartialEq)]
pub enum ListenerList {
    /// No payload
    Plain(Vec<EventListener<()>>),
    /// Mouse events
    Mouse(Vec<EventListener<MouseEvent>>),
    /// Pointer events
    Pointer(Vec<EventListener<PointerEvent>>),
    /// Touch events
    Touch(Vec<EventListener<TouchEvent>>),
    /// Key events
    Key(Vec<EventListener<KeyEvent>>),
    /// Text payload
    Text(Vec<EventListener<String>>),
    /// Geometry payload
    Frame(Vec<EventListener<Frame>>),
    /// Flag payload
    Bool(Vec<EventListener<bool>>),
    /// Number payload
    Number(Vec<EventListener<f64>>),
    /// Index payload
    Index(Vec<EventListener<usize>>),
    /// `(new, old)` payload
    IndexChange(Vec<EventListener<(usize, usize)>>),
    /// `(new, old)` number payload
    NumberChange(Vec<EventListener<(f64, f64)>>),
    /// Table cell payload
    Cell(Vec<EventListener<CellIndex>>),
}

impl ListenerList {
    /// Payload kind of the stored listeners
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Plain(_) => PayloadKind::Plain,
            Self::Mouse(_) => PayloadKind::Mouse,
            Self::Pointer(_) => PayloadKind::Pointer,
            Self::Touch(_) => PayloadKind::Touch,
            Self::Key(_) => PayloadKind::Key,
            Self::Text(_) => PayloadKind::Text,
            Self::Frame(_) => PayloadKind::Frame,
            Self::Bool(_) => PayloadKind::Bool,
            Self::Number(_) => PayloadKind::Number,
            Self::Index(_) => PayloadKind::Index,
            Self::IndexChange(_) => PayloadKind::IndexChange,
            Self::NumberChange(_) => PayloadKind::NumberChange,
            Self::Cell(_) => PayloadKind::Cell,
        }
    }

    /// Number of listeners
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Plain(l) => l.len(),
            Self::Mouse(l) => l.len(),
            Self::Pointer(l) => l.len(),
            Self::Touch(l) => l.len(),
            Self::Key(l) => l.len(),
            Self::Text(l) => l.len(),
            Self::Frame(l) => l.len(),
            Self::Bool(l) => l.len(),
            Self::Number(l) => l.len(),
            Self::Index(l) => l.len(),
            Self::IndexChange(l) => l.len(),
            Self::NumberChange(l) => l.len(),
            Self::Cell(l) => l.len(),
        }
    }

    /// Whether there are no listeners
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed listeners, if the payload type matches
    #[must_use]
    pub fn listeners<E: EventPayload>(&self) -> Option<&[EventListener<E>]> {
        E::unwrap(self).map(Vec::as_slice)
    }
}

/// Payload types that can be stored in a [`ListenerList`]
pub trait EventPayload: Sized + 'static {
    /// Kind tag of the payload
    const KIND: PayloadKind;

    /// Wrap typed listeners
    fn wrap(listeners: Vec<EventListener<Self>>) -> ListenerList;

    /// Borrow typed listeners
    fn unwrap(list: &ListenerList) -> Option<&Vec<EventListener<Self>>>;
}

macro_rules! payload_impl {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl EventPayload for $ty {
                const KIND: PayloadKind = PayloadKind::$variant;

                fn wrap(listeners: Vec<EventListener<Self>>) -> ListenerList {
                    ListenerList::$variant(listeners)
                }

                fn unwrap(list: &ListenerList) -> Option<&Vec<EventListener<Self>>> {
                    match list {
                        ListenerList::$variant(listeners) => Some(listeners),
                        _ => None,
                    }
                }
            }
        )+
    };
}

payload_impl!(
    () => Plain,
    MouseEvent => Mouse,
    PointerEvent => Pointer,
    TouchEvent => Touch,
    KeyEvent => Key,
    String => Text,
    Frame => Frame,
    bool => Bool,
    f64 => Number,
    usize => Index,
    (usize, usize) => IndexChange,
    (f64, f64) => NumberChange,
    CellIndex => Cell,
);

impl<E: EventPayload> From<EventListener<E>> for ListenerList {
    fn from(listener: EventListener<E>) -> Self {
        E::wrap(vec![listener])
    }
}

impl<E: EventPayload> From<Vec<EventListener<E>>> for ListenerList {
    fn from(listeners: Vec<EventListener<E>>) -> Self {
        E::wrap(listeners)
    }
}

impl<E: EventPayload> From<EventListener<E>> for crate::properties::PropertyValue {
    fn from(listener: EventListener<E>) -> Self {
        Self::Listeners(listener.into())
    }
}

impl<E: EventPayload> From<Vec<EventListener<E>>> for crate::properties::PropertyValue {
    fn from(listeners: Vec<EventListener<E>>) -> Self {
        Self::Listeners(listeners.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_every_bound_event_has_a_payload_kind() {
        for handler in JS_HANDLERS.iter().chain(FOCUS_HANDLERS) {
            assert!(payload_kind(handler.tag).is_some(), "{}", handler.tag);
        }
    }

    #[test]
    fn test_list_kind_follows_payload() {
        let list: ListenerList = EventListener::<MouseEvent>::no_args(|| {}).into();
        assert_eq!(list.kind(), PayloadKind::Mouse);
        assert!(list.listeners::<MouseEvent>().is_some());
        assert!(list.listeners::<KeyEvent>().is_none());
    }

    #[test]
    fn test_clone_compares_equal() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let listener = EventListener::<()>::no_args(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(listener.clone(), listener);
        assert_ne!(listener, EventListener::<()>::no_args(|| {}));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
