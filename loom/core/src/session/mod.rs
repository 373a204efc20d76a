//! Session
//!
//! Per-tab state: the view graph, the bridge to the tab, client information,
//! popups, images, timers, hot keys and the client storage mirror.
//!
//! # Design Philosophy
//!
//! A session is confined to one task. Every handler runs with `&mut Session`
//! and every mutation goes through [`Session::set_value`], which applies the
//! value to the view's bag, lets the diff emitter patch the browser when the
//! view is on screen, and then runs the tag's change listener. Work that has
//! to wait (getter answers, timers) comes back into the task as a queued
//! callback instead of borrowing the session across an await.

mod animated;
mod events;
mod lifecycle;
mod services;

pub use lifecycle::{
    spawn_session, SessionContent, SessionEvent, SessionHandle, SessionRegistry,
};
pub use services::{HotKeyCallback, TimerCallback};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::bridge::{ready_error, Bridge, Getter, ScriptArg};
use crate::data::DataObject;
use crate::error::{report, LoomError, LoomResult};
use crate::events::{EventPayload, ListenerList};
use crate::media::ImageManager;
use crate::popup::PopupManager;
use crate::properties::names;
use crate::properties::{normalize_view_tag, ChangeListener, Params, PropertyValue};
use crate::resources::Resources;
use crate::theme::{Theme, ThemeResolver};
use crate::view::{KindState, View, ViewId, ViewKind};

// ============================================================================
// Client information
// ============================================================================

/// What the browser reported about itself
#[derive(Clone, Debug, PartialEq)]
pub struct ClientInfo {
    /// Touch screen
    pub touch: bool,
    /// `navigator.userAgent`
    pub user_agent: String,
    /// Text direction, `ltr` or `rtl`
    pub direction: String,
    /// Preferred language
    pub language: String,
    /// Accepted languages in preference order
    pub languages: Vec<String>,
    /// Dark color scheme
    pub dark: bool,
    /// `window.devicePixelRatio`
    pub pixel_ratio: f64,
    /// Root view width in pixels
    pub width: f64,
    /// Root view height in pixels
    pub height: f64,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            touch: false,
            user_agent: String::new(),
            direction: "ltr".to_string(),
            language: String::new(),
            languages: Vec::new(),
            dark: false,
            pixel_ratio: 1.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl ClientInfo {
    /// Overwrite the fields present in a `startSession` / `sessionInfo` object
    pub fn update(&mut self, data: &DataObject) {
        if let Some(touch) = data.bool_property("touch") {
            self.touch = touch;
        }
        if let Some(agent) = data.property_value("user-agent") {
            self.user_agent = agent.to_string();
        }
        if let Some(direction) = data.property_value("direction") {
            self.direction = direction.to_ascii_lowercase();
        }
        if let Some(language) = data.property_value("language") {
            self.language = language.to_string();
        }
        if let Some(languages) = data.property_value("languages") {
            self.languages = languages
                .split(',')
                .map(str::trim)
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(dark) = data.bool_property("dark") {
            self.dark = dark;
        }
        if let Some(ratio) = data.float_property("pixel-ratio").filter(|r| *r > 0.0) {
            self.pixel_ratio = ratio;
        }
        if let Some(width) = data.float_property("width") {
            self.width = width;
        }
        if let Some(height) = data.float_property("height") {
            self.height = height;
        }
    }

    /// Languages for string lookup, the preferred one first
    #[must_use]
    pub fn lookup_languages(&self) -> Vec<String> {
        let mut result = Vec::with_capacity(self.languages.len() + 1);
        if !self.language.is_empty() {
            result.push(self.language.clone());
        }
        for lang in &self.languages {
            if !result.contains(lang) {
                result.push(lang.clone());
            }
        }
        result
    }
}

// ============================================================================
// Session
// ============================================================================

/// A `@keyframes` rule shared by the views that reference it
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct KeyframesEntry {
    pub(crate) rule: String,
    pub(crate) refs: usize,
}

/// State of one connected tab
pub struct Session {
    id: u64,
    resources: Arc<Resources>,
    pub(crate) views: HashMap<ViewId, View>,
    pub(crate) root: Option<ViewId>,
    next_view: u64,
    pub(crate) bridge: Option<Bridge>,
    ignore_updates: bool,
    pub(crate) client: ClientInfo,
    pub(crate) popups: PopupManager,
    pub(crate) images: ImageManager,
    pub(crate) keyframes: BTreeMap<String, KeyframesEntry>,
    pub(crate) timers: HashMap<u64, TimerCallback>,
    pub(crate) next_timer: u64,
    pub(crate) hot_keys: HashMap<String, HotKeyCallback>,
    pub(crate) storage: HashMap<String, String>,
    pub(crate) focused: Option<ViewId>,
    pub(crate) events_tx: Option<mpsc::Sender<SessionEvent>>,
    pub(crate) pause_time: Option<Instant>,
    pub(crate) title: String,
}

impl Session {
    /// Session `id` using `resources`, without a bridge
    #[must_use]
    pub fn new(id: u64, resources: Arc<Resources>) -> Self {
        Self {
            id,
            resources,
            views: HashMap::new(),
            root: None,
            next_view: 0,
            bridge: None,
            ignore_updates: false,
            client: ClientInfo::default(),
            popups: PopupManager::default(),
            images: ImageManager::default(),
            keyframes: BTreeMap::new(),
            timers: HashMap::new(),
            next_timer: 0,
            hot_keys: HashMap::new(),
            storage: HashMap::new(),
            focused: None,
            events_tx: None,
            pause_time: None,
            title: String::new(),
        }
    }

    /// Session id, unique in the process
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Shared resources
    #[must_use]
    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    /// Active theme
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.resources.theme
    }

    /// Replace the session's theme and re-render
    pub fn set_theme(&mut self, theme: Theme) {
        Arc::make_mut(&mut self.resources).theme = theme;
        self.reload();
    }

    /// Client information
    #[must_use]
    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    /// Whether the tab uses the dark color scheme
    #[must_use]
    pub fn dark_theme(&self) -> bool {
        self.client.dark
    }

    /// Switch the color scheme and re-render
    pub fn set_dark_theme(&mut self, dark: bool) {
        if self.client.dark != dark {
            self.client.dark = dark;
            self.reload();
        }
    }

    /// Whether the tab runs on a touch screen
    #[must_use]
    pub fn touch_screen(&self) -> bool {
        self.client.touch
    }

    /// Constant resolver for the current theme flags
    #[must_use]
    pub fn resolver(&self) -> ThemeResolver<'_> {
        self.resources.theme.resolver(self.client.dark, self.client.touch)
    }

    /// Localized text of `tag`, the tag itself when no table has it
    #[must_use]
    pub fn get_string(&self, tag: &str) -> String {
        let (text, found) = self
            .resources
            .strings
            .lookup(tag, &self.client.lookup_languages());
        if !found && !self.resources.strings.is_empty() {
            tracing::debug!(session = self.id, tag = %tag, "string resource missing");
        }
        text
    }

    // ========================================================================
    // Bridge
    // ========================================================================

    /// Bind the session to a tab
    pub fn attach_bridge(&mut self, bridge: Bridge) {
        tracing::debug!(session = self.id, peer = %bridge.peer(), "bridge attached");
        self.bridge = Some(bridge);
    }

    /// Drop the bridge; later updates only change memory
    pub fn detach_bridge(&mut self) -> Option<Bridge> {
        self.bridge.take()
    }

    /// Bridge to the tab, if connected
    pub fn bridge(&mut self) -> Option<&mut Bridge> {
        self.bridge.as_mut()
    }

    /// Whether a live bridge is attached
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.bridge.as_ref().is_some_and(Bridge::is_connected)
    }

    /// Whether outbound updates are suppressed
    #[must_use]
    pub fn ignore_updates(&self) -> bool {
        self.ignore_updates
    }

    /// Suppress (or allow) outbound updates
    pub fn set_ignore_updates(&mut self, ignore: bool) {
        self.ignore_updates = ignore;
    }

    /// Run `f` with outbound updates suppressed, restoring the previous gate
    pub fn without_updates<T>(&mut self, f: impl FnOnce(&mut Session) -> T) -> T {
        let previous = self.ignore_updates;
        self.ignore_updates = true;
        let result = f(self);
        self.ignore_updates = previous;
        result
    }

    /// Run `f` collecting every statement it emits into one frame
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Session) -> T) -> T {
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.begin_batch();
        }
        let result = f(self);
        if let Some(bridge) = self.bridge.as_mut() {
            bridge.end_batch();
        }
        result
    }

    /// Run `f` with the update block of `id` open
    ///
    /// Patches emitted for `id` inside `f` share one `element` lookup in the
    /// browser. Nested calls reuse the outer block.
    pub(crate) fn in_update_script<T>(&mut self, id: &ViewId, f: impl FnOnce(&mut Session) -> T) -> T {
        let opened = !self.ignore_updates
            && self
                .bridge
                .as_mut()
                .is_some_and(|bridge| bridge.start_update_script(id.as_str()));
        let result = f(self);
        if opened {
            if let Some(bridge) = self.bridge.as_mut() {
                bridge.finish_update_script(id.as_str());
            }
        }
        result
    }

    /// Incremental update: dropped while the gate is held or no tab is bound
    pub(crate) fn emit(&mut self, f: impl FnOnce(&mut Bridge)) {
        if self.ignore_updates {
            return;
        }
        match self.bridge.as_mut() {
            Some(bridge) => f(bridge),
            None => tracing::trace!(session = self.id, "no bridge, update kept in memory"),
        }
    }

    /// Explicit command: reported when no tab is bound
    pub(crate) fn command(&mut self, operation: &str, f: impl FnOnce(&mut Bridge)) -> bool {
        match self.bridge.as_mut() {
            Some(bridge) => {
                f(bridge);
                true
            }
            None => {
                LoomError::BridgeDisconnected {
                    operation: operation.to_string(),
                }
                .log();
                false
            }
        }
    }

    /// Await `future` off the session task and run `then` with its output
    /// back on the session task
    ///
    /// Needs a running session task; without one the future is dropped and
    /// the call is logged.
    pub fn spawn_getter<T, F>(&self, future: F, then: impl FnOnce(&mut Session, T) + Send + 'static)
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let Some(tx) = self.events_tx.clone() else {
            tracing::warn!(session = self.id, "no session task, getter result dropped");
            return;
        };
        tokio::spawn(async move {
            let value = future.await;
            let callback = SessionEvent::Callback(Box::new(move |session: &mut Session| then(session, value)));
            if tx.send(callback).await.is_err() {
                tracing::debug!("session ended before the getter completed");
            }
        });
    }

    /// Getter-RPC through the bridge; an error answer when no tab is bound
    pub fn call_getter(&mut self, func: &str, args: &[ScriptArg]) -> Getter {
        match self.bridge.as_mut() {
            Some(bridge) => bridge.call_getter(func, args),
            None => ready_error(LoomError::BridgeDisconnected {
                operation: func.to_string(),
            }),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    fn next_view_id(&mut self) -> ViewId {
        self.next_view += 1;
        ViewId::from_counter(self.next_view)
    }

    /// New detached view
    pub fn create_view(&mut self, kind: ViewKind) -> ViewId {
        let id = self.next_view_id();
        self.views.insert(id.clone(), View::new(id.clone(), kind));
        id
    }

    /// New detached view with initial properties
    ///
    /// Properties that fail to apply are logged and skipped.
    pub fn create_view_with(&mut self, kind: ViewKind, params: Params) -> ViewId {
        let id = self.create_view(kind);
        for (tag, value) in params {
            report(self.set_value(&id, &tag, Some(value)));
        }
        id
    }

    /// New custom view forwarding to `inner`
    ///
    /// `inner` becomes owned by the wrapper: it is attached wherever the
    /// wrapper is attached, and property access on the wrapper reaches it.
    pub fn create_custom(&mut self, inner: &ViewId) -> ViewId {
        let id = self.create_view(ViewKind::Custom);
        if let Some(view) = self.views.get_mut(&id) {
            view.state = KindState::Custom(inner.clone());
        }
        id
    }

    /// View by html id
    #[must_use]
    pub fn view(&self, id: &ViewId) -> Option<&View> {
        self.views.get(id)
    }

    pub(crate) fn view_mut(&mut self, id: &ViewId) -> Option<&mut View> {
        self.views.get_mut(id)
    }

    pub(crate) fn existing(&self, id: &ViewId) -> LoomResult<&View> {
        self.views.get(id).ok_or_else(|| LoomError::NotFound {
            path: id.to_string(),
        })
    }

    /// Kind of a view
    #[must_use]
    pub fn view_kind(&self, id: &ViewId) -> Option<ViewKind> {
        self.views.get(id).map(View::kind)
    }

    /// Number of views known to the session
    #[must_use]
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Root view
    #[must_use]
    pub fn root_view(&self) -> Option<&ViewId> {
        self.root.as_ref()
    }

    /// Make `id` the root view
    ///
    /// The previous root is detached; when a tab is bound the root element is
    /// re-rendered.
    pub fn set_root_view(&mut self, id: &ViewId) {
        if let Some(old) = self.root.take() {
            self.mark_detached(&old);
        }
        self.root = Some(id.clone());
        if self.bridge.is_some() && !self.ignore_updates {
            let html = self.view_html(id);
            self.emit(|bridge| bridge.update_inner_html("ruiRootView", &html));
        }
    }

    /// The view custom wrappers at `id` forward to (`id` itself otherwise)
    pub(crate) fn forward(&self, id: &ViewId) -> ViewId {
        let mut current = id.clone();
        for _ in 0..crate::theme::MAX_REFERENCE_DEPTH {
            match self.views.get(&current).and_then(View::custom_inner) {
                Some(inner) => current = inner.clone(),
                None => break,
            }
        }
        current
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Set a property; errors are logged and give `false`
    pub fn set(&mut self, id: &ViewId, tag: &str, value: impl Into<PropertyValue>) -> bool {
        report(self.set_value(id, tag, Some(value.into()))).is_some()
    }

    /// Remove a property; same as setting no value
    pub fn remove(&mut self, id: &ViewId, tag: &str) {
        report(self.set_value(id, tag, None));
    }

    /// Set (`Some`) or remove (`None`) a property
    ///
    /// # Errors
    ///
    /// [`LoomError::NotFound`] for an unknown view, or the bag's rejection of
    /// the value. On error nothing changes.
    pub fn set_value(&mut self, id: &ViewId, tag: &str, value: Option<PropertyValue>) -> LoomResult<()> {
        let id = self.forward(id);
        let kind = self.existing(&id)?.kind;
        let tag = normalize_view_tag(tag);

        match tag.as_str() {
            names::CONTENT if kind.is_container() => return self.set_content(&id, value),
            names::CONTENT if kind == ViewKind::TableView => return self.set_table_value(&id, value),
            names::CONTENT => return Err(LoomError::unknown_tag(&tag, kind.name())),
            names::CURRENT if kind == ViewKind::StackLayout => return self.set_stack_current(&id, value),
            names::CURRENT if kind == ViewKind::TabsLayout => return self.set_tabs_current(&id, value),
            names::CURRENT if kind == ViewKind::DropDownList => return self.set_drop_down_current(&id, value),
            names::NUMBER_PICKER_VALUE if kind == ViewKind::NumberPicker => {
                return self.set_number_picker_value(&id, value);
            }
            _ => {}
        }

        let view = self
            .views
            .get_mut(&id)
            .ok_or_else(|| LoomError::NotFound { path: id.to_string() })?;
        let changed = view.bag.apply(&tag, value)?;
        self.property_changed(&id, &changed);
        Ok(())
    }

    /// Diff emission and change listeners for `changed` tags of `id`
    pub(crate) fn property_changed(&mut self, id: &ViewId, changed: &[String]) {
        if changed.is_empty() {
            return;
        }
        let created = self.views.get(id).is_some_and(View::is_created);
        if created && !self.ignore_updates {
            self.emit_changes(id, changed);
        }
        for tag in changed {
            let listener = self.views.get(id).and_then(|view| view.bag.change_listener(tag));
            if let Some(listener) = listener {
                listener(self, id, tag);
            }
        }
    }

    /// Stored value of a property (no style fallback)
    #[must_use]
    pub fn get(&self, id: &ViewId, tag: &str) -> Option<PropertyValue> {
        use crate::properties::Properties;
        let id = self.forward(id);
        self.views.get(&id).and_then(|view| view.bag.get(tag))
    }

    /// Register (or with `None` drop) the change listener of `tag`
    pub fn set_change_listener(&mut self, id: &ViewId, tag: &str, listener: Option<ChangeListener>) {
        let id = self.forward(id);
        match self.views.get_mut(&id) {
            Some(view) => view.bag.set_change_listener(tag, listener),
            None => LoomError::NotFound { path: id.to_string() }.log(),
        }
    }

    /// Run the listeners of `tag` on `id` with `payload`, in registration order
    ///
    /// Returns the number of listeners called.
    pub(crate) fn fire<E: EventPayload>(&mut self, id: &ViewId, tag: &str, payload: &E) -> usize {
        let listeners: Vec<_> = match self.views.get(id).and_then(|view| view.bag.listeners(tag)) {
            Some(list) => match list.listeners::<E>() {
                Some(listeners) => listeners.to_vec(),
                None => {
                    tracing::error!(view = %id, tag = %tag, kind = ?list.kind(), "listener payload mismatch");
                    return 0;
                }
            },
            None => return 0,
        };
        for listener in &listeners {
            listener.call(self, id, payload);
        }
        listeners.len()
    }

    /// Whether `id` has listeners for `tag`
    #[must_use]
    pub fn has_listeners(&self, id: &ViewId, tag: &str) -> bool {
        self.views
            .get(id)
            .and_then(|view| view.bag.listeners(tag))
            .is_some_and(|list: &ListenerList| !list.is_empty())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("views", &self.views.len())
            .field("root", &self.root)
            .field("connected", &self.bridge.is_some())
            .field("ignore_updates", &self.ignore_updates)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::Session;
    use crate::bridge::{Bridge, PendingAnswers};
    use crate::config::BridgeConfig;
    use crate::resources::Resources;

    /// Session with a bridge whose frames land in the returned receiver
    pub(crate) fn connected_session() -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Session::new(1, Arc::new(Resources::new()));
        session.attach_bridge(Bridge::new(tx, PendingAnswers::default(), BridgeConfig::default(), "test"));
        (session, rx)
    }

    /// Everything sent so far, joined by newlines
    pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::test_support::{connected_session, drain};
    use super::*;
    use crate::events::{EventListener, MouseEvent, CLICK_EVENT};

    #[test]
    fn test_view_ids_are_sequential() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        assert_eq!(session.create_view(ViewKind::Button).as_str(), "id000001");
        assert_eq!(session.create_view(ViewKind::View).as_str(), "id000002");
        assert_eq!(session.view_count(), 2);
    }

    #[test]
    fn test_set_remove_and_errors() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let id = session.create_view(ViewKind::TextView);
        assert!(session.set(&id, "text", "Hello"));
        assert_eq!(session.get(&id, "text"), Some(PropertyValue::Text("Hello".into())));
        assert!(!session.set(&id, "no-such-tag", "x"));
        assert!(!session.set(&id, "width", true));
        assert_eq!(session.get(&id, "width"), None);
        session.remove(&id, "text");
        assert_eq!(session.get(&id, "text"), None);
        assert!(!session.set(&ViewId::from("id999999"), "text", "x"));
    }

    #[test]
    fn test_change_listener_runs_after_commit() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let id = session.create_view(ViewKind::View);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        session.set_change_listener(
            &id,
            "width",
            Some(Arc::new(move |session: &mut Session, view: &ViewId, tag: &str| {
                assert_eq!(tag, "width");
                assert!(session.get(view, "width").is_some());
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        assert!(session.set(&id, "width", "10px"));
        assert!(session.set(&id, "width", "10px"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_uncreated_views_emit_nothing() {
        let (mut session, mut rx) = connected_session();
        let id = session.create_view(ViewKind::View);
        session.set(&id, "width", "10px");
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn test_custom_view_forwards() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let inner = session.create_view(ViewKind::TextView);
        let custom = session.create_custom(&inner);
        assert!(session.set(&custom, "text", "inside"));
        assert_eq!(session.get(&inner, "text"), Some(PropertyValue::Text("inside".into())));
        assert_eq!(session.get(&custom, "text"), Some(PropertyValue::Text("inside".into())));
    }

    #[test]
    fn test_fire_runs_listeners_in_order() {
        let mut session = Session::new(1, Arc::new(Resources::new()));
        let id = session.create_view(ViewKind::Button);
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);
        session.set(
            &id,
            CLICK_EVENT,
            vec![
                EventListener::<MouseEvent>::no_args(move || first.lock().push(1)),
                EventListener::<MouseEvent>::no_args(move || second.lock().push(2)),
            ],
        );
        assert_eq!(session.fire(&id, CLICK_EVENT, &MouseEvent::default()), 2);
        assert_eq!(*order.lock(), vec![1, 2]);
        assert_eq!(session.fire(&id, CLICK_EVENT, &true), 0);
    }

    #[test]
    fn test_client_info_update() {
        let mut info = ClientInfo::default();
        info.update(
            &DataObject::parse("startSession{touch=1, dark=true, language=de, languages=\"de, en\", pixel-ratio=2}")
                .unwrap(),
        );
        assert!(info.touch);
        assert!(info.dark);
        assert_eq!(info.lookup_languages(), vec!["de".to_string(), "en".to_string()]);
        assert!((info.pixel_ratio - 2.0).abs() < f64::EPSILON);
    }
}
