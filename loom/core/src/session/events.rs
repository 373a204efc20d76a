//! Inbound message dispatch
//!
//! The browser reports everything as a `.rui` object whose tag names the
//! command. System commands are handled by the session itself; everything
//! else carries the html id of the view it came from and is decoded once
//! into the event payload its listeners expect.

use crate::bridge::deliver_answer;
use crate::data::DataObject;
use crate::events::{
    payload_kind, CellIndex, KeyEvent, MouseEvent, PayloadKind, PointerEvent, TouchEvent, CLICK_EVENT, FOCUS_EVENT,
    KEY_DOWN_EVENT, KEY_UP_EVENT, LOST_FOCUS_EVENT, PLAYER_ERROR_EVENT, RESIZE_EVENT, SCROLL_EVENT,
    TRANSITION_CANCEL_EVENT, TRANSITION_END_EVENT,
};
use crate::popup::POPUP_LAYER_ID;
use crate::properties::names;
use crate::values::{Frame, Scroll};
use crate::view::{ViewId, ViewKind};

use super::Session;

impl Session {
    /// Handle one inbound message
    ///
    /// Everything the handlers emit goes out as a single frame.
    pub fn handle_message(&mut self, message: &DataObject) {
        let command = message.tag().to_string();
        self.batch(|session| session.dispatch(&command, message));
    }

    fn dispatch(&mut self, command: &str, data: &DataObject) {
        match command {
            "answer" => match self.bridge.as_ref() {
                Some(bridge) => deliver_answer(bridge.pending(), data.clone()),
                None => tracing::warn!(session = self.id(), "answer without a bridge"),
            },
            "imageLoaded" => self.image_loaded(data),
            "imageError" | "imageLoadError" => self.image_load_error(data),
            "timer" => match data.parse_property::<u64>("timerID") {
                Some(timer) => {
                    self.run_timer(timer);
                }
                None => tracing::error!(session = self.id(), "timer without a valid timerID"),
            },
            "root-size" => self.handle_root_size(data),
            "resize" => self.handle_resize(data),
            "sessionInfo" => {
                self.client.update(data);
                if let Some(storage) = data.property_object("storage") {
                    self.load_storage(storage);
                }
            }
            "storageError" => {
                let error = data.property_value("error").unwrap_or_default();
                tracing::error!(session = self.id(), error = %error, "client storage error");
            }
            "popupClose" => match data.parse_property::<u64>("popup") {
                Some(popup) => self.popup_close_clicked(popup),
                None => tracing::error!(session = self.id(), "popupClose without a popup"),
            },
            "popupButton" => match (data.parse_property::<u64>("popup"), data.parse_property::<usize>("index")) {
                (Some(popup), Some(index)) => self.popup_button_clicked(popup, index),
                _ => tracing::error!(session = self.id(), "popupButton without popup or index"),
            },
            _ => self.dispatch_view_event(command, data),
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn handle_root_size(&mut self, data: &DataObject) {
        for (tag, slot) in [("width", &mut self.client.width), ("height", &mut self.client.height)] {
            match data.float_property(tag) {
                Some(value) if value > 0.0 => *slot = value,
                Some(_) => {}
                None => tracing::error!(tag = %tag, "root-size without a valid value"),
            }
        }
    }

    /// `resize{views=[_{id, x, y, width, height, scroll-x, ...}, ...]}`
    fn handle_resize(&mut self, data: &DataObject) {
        let Some(items) = data.property_array("views") else {
            tracing::error!(session = self.id(), "resize without a views array");
            return;
        };
        for item in items {
            let Some(object) = item.as_object() else {
                tracing::error!("resize element is not an object");
                continue;
            };
            let Some(html_id) = object.property_value("id") else {
                tracing::error!("resize element without id");
                continue;
            };
            let number = |tag: &str| object.float_property(tag).unwrap_or(0.0);
            // indexed subviews (`id000004-2`) are laid out by their owner
            let id = ViewId::from(html_id.split('-').next().unwrap_or(html_id));
            let frame = Frame {
                left: number("x"),
                top: number("y"),
                width: number("width"),
                height: number("height"),
            };
            let Some(view) = self.views.get_mut(&id) else {
                tracing::debug!(view = %id, "resize of an unknown view");
                continue;
            };
            if html_id.contains('-') {
                continue;
            }
            view.scroll = Scroll {
                x: number("scroll-x"),
                y: number("scroll-y"),
                width: number("scroll-width"),
                height: number("scroll-height"),
            };
            if view.frame != frame {
                view.frame = frame;
                let is_canvas = view.kind == ViewKind::CanvasView;
                self.fire(&id, RESIZE_EVENT, &frame);
                if is_canvas {
                    self.redraw_canvas(&id);
                }
            }
        }
    }

    // ========================================================================
    // View events
    // ========================================================================

    fn dispatch_view_event(&mut self, command: &str, data: &DataObject) {
        let Some(html_id) = data.property_value("id") else {
            tracing::error!(session = self.id(), command = %command, "event without id");
            return;
        };

        if html_id == POPUP_LAYER_ID && command == CLICK_EVENT {
            self.popup_layer_clicked();
        } else if html_id != "body" {
            let id = ViewId::from(html_id);
            if self.views.contains_key(&id) {
                self.view_event(&id, command, data);
            } else {
                tracing::debug!(view = %id, command = %command, "event for an unknown view");
            }
        }

        if command == KEY_DOWN_EVENT {
            self.run_hot_key(&KeyEvent::decode(data));
        }
    }

    fn view_event(&mut self, id: &ViewId, command: &str, data: &DataObject) {
        let kind = self.view_kind(id);
        match command {
            "textChanged" if kind == Some(ViewKind::EditView) => {
                let text = data.property_value("text").unwrap_or_default().to_string();
                // the input already shows the text
                self.without_updates(|session| session.set(id, names::TEXT, text));
            }
            "textChanged" if kind == Some(ViewKind::NumberPicker) => {
                let text = data.property_value("text").unwrap_or_default().to_string();
                self.number_picker_text_changed(id, &text);
            }
            "itemSelected" if kind == Some(ViewKind::DropDownList) => {
                match data.parse_property::<usize>("number") {
                    Some(index) => self.drop_down_item_selected(id, index),
                    None => tracing::error!(view = %id, "item selection without a number"),
                }
            }
            "cellClick" if kind == Some(ViewKind::TableView) => match CellIndex::decode(data) {
                Some(cell) => self.table_cell_clicked(id, cell),
                None => tracing::error!(view = %id, "cell click without row and column"),
            },
            "rowClick" if kind == Some(ViewKind::TableView) => match data.parse_property::<usize>("row") {
                Some(row) => self.table_row_clicked(id, row),
                None => tracing::error!(view = %id, "row click without a row"),
            },
            "tabClick" | "tabCloseClick" if kind == Some(ViewKind::TabsLayout) => {
                let Some(index) = data.parse_property::<usize>("number") else {
                    tracing::error!(view = %id, command = %command, "tab event without a number");
                    return;
                };
                if command == "tabClick" {
                    self.tab_clicked(id, index);
                } else {
                    self.tab_close_clicked(id, index);
                }
            }
            CLICK_EVENT if kind == Some(ViewKind::Checkbox) => {
                if !self.get_disabled(id) {
                    self.toggle_checkbox(id);
                }
                self.fire(id, CLICK_EVENT, &MouseEvent::decode(data));
            }
            KEY_DOWN_EVENT | KEY_UP_EVENT => {
                if !self.get_disabled(id) {
                    self.fire(id, command, &KeyEvent::decode(data));
                }
            }
            FOCUS_EVENT | LOST_FOCUS_EVENT => {
                self.set_focus_state(id, command == FOCUS_EVENT);
                self.fire(id, command, &());
            }
            TRANSITION_END_EVENT | TRANSITION_CANCEL_EVENT => {
                let property = data.property_value("property").unwrap_or_default().to_string();
                if kind == Some(ViewKind::StackLayout) && self.stack_transition_end(id, &property) {
                    return;
                }
                self.finish_transition(id, &property, command == TRANSITION_CANCEL_EVENT);
                self.fire(id, command, &property);
            }
            SCROLL_EVENT => {
                let frame = Frame {
                    left: data.float_property("x").unwrap_or(0.0),
                    top: data.float_property("y").unwrap_or(0.0),
                    width: data.float_property("width").unwrap_or(0.0),
                    height: data.float_property("height").unwrap_or(0.0),
                };
                if let Some(view) = self.views.get_mut(id) {
                    view.scroll = Scroll {
                        x: frame.left,
                        y: frame.top,
                        width: frame.width,
                        height: frame.height,
                    };
                }
                self.fire(id, SCROLL_EVENT, &frame);
            }
            PLAYER_ERROR_EVENT => {
                let message = data.property_value("message").unwrap_or_default().to_string();
                tracing::debug!(view = %id, code = ?data.property_value("code"), "player error");
                self.fire(id, command, &message);
            }
            _ => self.fire_decoded(id, command, data),
        }
    }

    /// Decode by the payload kind of `command` and fire
    fn fire_decoded(&mut self, id: &ViewId, command: &str, data: &DataObject) {
        match payload_kind(command) {
            Some(PayloadKind::Plain) => {
                self.fire(id, command, &());
            }
            Some(PayloadKind::Mouse) => {
                self.fire(id, command, &MouseEvent::decode(data));
            }
            Some(PayloadKind::Pointer) => {
                self.fire(id, command, &PointerEvent::decode(data));
            }
            Some(PayloadKind::Touch) => {
                self.fire(id, command, &TouchEvent::decode(data));
            }
            Some(PayloadKind::Key) => {
                self.fire(id, command, &KeyEvent::decode(data));
            }
            Some(PayloadKind::Text) => {
                let text = data
                    .property_value("property")
                    .or_else(|| data.property_value("name"))
                    .unwrap_or_default()
                    .to_string();
                self.fire(id, command, &text);
            }
            Some(PayloadKind::Number) => {
                self.fire(id, command, &data.float_property("value").unwrap_or(0.0));
            }
            Some(kind) => {
                tracing::warn!(view = %id, command = %command, kind = ?kind, "event kind is not sent by the browser");
            }
            None => tracing::warn!(view = %id, command = %command, "unknown command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::super::test_support::{connected_session, drain};
    use super::*;
    use crate::bridge::is_error_answer;
    use crate::events::{EventListener, Modifiers};

    fn message(text: &str) -> DataObject {
        DataObject::parse(text).unwrap()
    }

    #[test]
    fn test_click_reaches_listener_once() {
        let (mut session, _rx) = connected_session();
        let button = session.create_view(ViewKind::Button);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set(
            &button,
            CLICK_EVENT,
            EventListener::<MouseEvent>::event_only(move |event| sink.lock().push(event.button)),
        );
        session.handle_message(&message("click-event{session=1, id=id000001, timeStamp=10, button=0, buttons=0, x=4, y=5}"));
        assert_eq!(*seen.lock(), vec![0]);
    }

    #[test]
    fn test_every_listener_form_runs_once_per_event() {
        let (mut session, _rx) = connected_session();
        let button = session.create_view(ViewKind::Button);
        let log = Arc::new(Mutex::new(Vec::new()));
        let full = Arc::clone(&log);
        let event_only = Arc::clone(&log);
        let view_only = Arc::clone(&log);
        let no_args = Arc::clone(&log);
        session.set(
            &button,
            CLICK_EVENT,
            vec![
                EventListener::<MouseEvent>::new(move |session, view, event| {
                    assert!(session.view(view).is_some());
                    full.lock().push(format!("new {view} {}", event.x));
                }),
                EventListener::<MouseEvent>::event_only(move |event| {
                    event_only.lock().push(format!("event_only {}", event.x));
                }),
                EventListener::<MouseEvent>::view_only(move |_, view| {
                    view_only.lock().push(format!("view_only {view}"));
                }),
                EventListener::<MouseEvent>::no_args(move || no_args.lock().push("no_args".to_string())),
            ],
        );

        session.handle_message(&message("click-event{id=id000001, button=0, x=7, y=2}"));
        assert_eq!(
            *log.lock(),
            vec![
                "new id000001 7".to_string(),
                "event_only 7".to_string(),
                "view_only id000001".to_string(),
                "no_args".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_view_and_missing_id_are_ignored() {
        let (mut session, mut rx) = connected_session();
        session.handle_message(&message("click-event{id=id999999}"));
        session.handle_message(&message("click-event{x=1}"));
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn test_focus_echo_updates_state() {
        let (mut session, _rx) = connected_session();
        let a = session.create_view(ViewKind::EditView);
        let b = session.create_view(ViewKind::EditView);
        session.handle_message(&message("focus-event{id=id000001}"));
        assert_eq!(session.focused_view(), Some(&a));
        session.handle_message(&message("focus-event{id=id000002}"));
        assert_eq!(session.focused_view(), Some(&b));
        assert!(!session.view(&a).unwrap().has_focus());
        session.handle_message(&message("lost-focus-event{id=id000002}"));
        assert_eq!(session.focused_view(), None);
    }

    #[test]
    fn test_checkbox_click_toggles() {
        let (mut session, _rx) = connected_session();
        let checkbox = session.create_view(ViewKind::Checkbox);
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        session.set(
            &checkbox,
            crate::events::CHECKBOX_EVENT,
            EventListener::<bool>::event_only(move |checked| sink.lock().push(*checked)),
        );
        session.handle_message(&message("click-event{id=id000001}"));
        session.handle_message(&message("click-event{id=id000001}"));
        assert_eq!(*states.lock(), vec![true, false]);

        session.set(&checkbox, "disabled", true);
        session.handle_message(&message("click-event{id=id000001}"));
        assert!(!session.get_checked(&checkbox));
    }

    #[test]
    fn test_text_changed_is_not_echoed() {
        let (mut session, mut rx) = connected_session();
        let edit = session.create_view(ViewKind::EditView);
        session.set_root_view(&edit);
        drain(&mut rx);
        session.handle_message(&message("textChanged{id=id000001, text=\"typed here\"}"));
        assert_eq!(session.get_text(&edit), "typed here");
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn test_resize_batch_updates_frames() {
        let (mut session, _rx) = connected_session();
        let view = session.create_view(ViewKind::View);
        let resized = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&resized);
        session.set(
            &view,
            RESIZE_EVENT,
            EventListener::<Frame>::no_args(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let batch = "resize{views=[_{id=id000001, x=1, y=2, width=30, height=40, scroll-x=0, scroll-y=5, scroll-width=30, scroll-height=90}, _{id=id000777, x=0}]}";
        session.handle_message(&message(batch));
        session.handle_message(&message(batch));
        let frame = session.view(&view).unwrap().frame();
        assert_eq!((frame.left, frame.top, frame.width, frame.height), (1.0, 2.0, 30.0, 40.0));
        assert_eq!(session.view(&view).unwrap().scroll().height, 90.0);
        assert_eq!(resized.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_root_size_and_session_info() {
        let (mut session, _rx) = connected_session();
        session.handle_message(&message("root-size{width=1024, height=0}"));
        assert_eq!(session.client().width, 1024.0);
        assert_eq!(session.client().height, 0.0);
        session.handle_message(&message("sessionInfo{dark=1, storage=_{k=v}}"));
        assert!(session.dark_theme());
        assert_eq!(session.client_item("k"), Some("v"));
    }

    #[test]
    fn test_key_down_runs_hot_key_after_view() {
        let (mut session, _rx) = connected_session();
        let hits = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&hits);
        session.set_hot_key("Escape", Modifiers::default(), move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        session.handle_message(&message("key-down-event{id=body, key=Escape, code=Escape}"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_media_number_event() {
        let (mut session, _rx) = connected_session();
        let player = session.create_view(ViewKind::AudioPlayer);
        let times = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&times);
        session.set(
            &player,
            "time-update-event",
            EventListener::<f64>::event_only(move |time| sink.lock().push(*time)),
        );
        session.handle_message(&message("time-update-event{id=id000001, value=12.5}"));
        assert_eq!(*times.lock(), vec![12.5]);
    }

    #[tokio::test]
    async fn test_answer_completes_getter() {
        let (mut session, mut rx) = connected_session();
        let getter = session.bridge().unwrap().call_getter("getValue", &[]);
        assert!(drain(&mut rx).starts_with("getValue(0"));
        session.handle_message(&message("answer{answerID=0, value=42}"));
        let answer = getter.await;
        assert!(!is_error_answer(&answer));
        assert_eq!(answer.property_value("value"), Some("42"));
    }
}
