//! Session services: timers, hot keys, client storage, window commands

use std::sync::Arc;

use crate::bridge::{quote, ScriptArg};
use crate::data::DataObject;
use crate::events::{hot_key_name, KeyEvent, Modifiers};
use crate::values::Color;

use super::Session;

/// Callback of a browser-side interval timer
pub type TimerCallback = Arc<dyn Fn(&mut Session) + Send + Sync>;

/// Callback of a hot key
pub type HotKeyCallback = Arc<dyn Fn(&mut Session) + Send + Sync>;

impl Session {
    // ========================================================================
    // Timers
    // ========================================================================

    /// Run `callback` every `interval_ms` milliseconds; returns the timer id
    ///
    /// The interval runs in the browser, so nothing fires while no tab is
    /// bound.
    pub fn start_timer(&mut self, interval_ms: u64, callback: impl Fn(&mut Session) + Send + Sync + 'static) -> u64 {
        self.next_timer += 1;
        let id = self.next_timer;
        self.timers.insert(id, Arc::new(callback));
        self.command("startTimer", |bridge| {
            bridge.call_func("startTimer", &[ScriptArg::from(interval_ms), ScriptArg::from(id.to_string())]);
        });
        id
    }

    /// Stop a timer started with [`Session::start_timer`]
    pub fn stop_timer(&mut self, id: u64) {
        if self.timers.remove(&id).is_none() {
            tracing::debug!(session = self.id(), timer = id, "stopping an unknown timer");
            return;
        }
        self.command("stopTimer", |bridge| {
            bridge.call_func("stopTimer", &[ScriptArg::from(id.to_string())]);
        });
    }

    /// Number of running timers
    #[must_use]
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub(crate) fn run_timer(&mut self, id: u64) -> bool {
        match self.timers.get(&id).cloned() {
            Some(callback) => {
                callback(self);
                true
            }
            None => {
                tracing::warn!(session = self.id(), timer = id, "tick of an unknown timer");
                false
            }
        }
    }

    // ========================================================================
    // Hot keys
    // ========================================================================

    /// Run `callback` when `code` is pressed with exactly `modifiers`
    pub fn set_hot_key(
        &mut self,
        code: &str,
        modifiers: Modifiers,
        callback: impl Fn(&mut Session) + Send + Sync + 'static,
    ) {
        self.hot_keys.insert(hot_key_name(code, modifiers), Arc::new(callback));
    }

    /// Forget a hot key
    pub fn remove_hot_key(&mut self, code: &str, modifiers: Modifiers) {
        self.hot_keys.remove(&hot_key_name(code, modifiers));
    }

    /// Run the hot key matching `event`, if any
    pub(crate) fn run_hot_key(&mut self, event: &KeyEvent) -> bool {
        match self.hot_keys.get(&event.hot_key()).cloned() {
            Some(callback) => {
                callback(self);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Client storage
    // ========================================================================

    /// Value of a `localStorage` item as last reported or set
    #[must_use]
    pub fn client_item(&self, key: &str) -> Option<&str> {
        self.storage.get(key).map(String::as_str)
    }

    /// Set a `localStorage` item
    pub fn set_client_item(&mut self, key: &str, value: &str) {
        self.storage.insert(key.to_string(), value.to_string());
        self.command("localStorageSet", |bridge| {
            bridge.call_func("localStorageSet", &[ScriptArg::from(key), ScriptArg::from(value)]);
        });
    }

    /// Remove a `localStorage` item
    pub fn remove_client_item(&mut self, key: &str) {
        self.storage.remove(key);
        self.command("localStorageRemove", |bridge| {
            bridge.call_func("localStorageRemove", &[ScriptArg::from(key)]);
        });
    }

    /// Clear `localStorage`
    pub fn remove_all_client_items(&mut self) {
        self.storage.clear();
        self.command("localStorageClear", |bridge| {
            bridge.call_func("localStorageClear", &[]);
        });
    }

    /// Replace the mirror with the `storage{...}` object the tab reported
    pub(crate) fn load_storage(&mut self, storage: &DataObject) {
        self.storage = storage
            .nodes()
            .filter_map(|node| node.value.as_text().map(|value| (node.tag.clone(), value.to_string())))
            .collect();
    }

    // ========================================================================
    // Window
    // ========================================================================

    /// Document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the document title
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.command("setTitle", |bridge| {
            bridge.call_func("setTitle", &[ScriptArg::from(title)]);
        });
    }

    /// Set the browser chrome color (`theme-color`)
    pub fn set_title_color(&mut self, color: Color) {
        self.command("setTitleColor", |bridge| {
            bridge.call_func("setTitleColor", &[ScriptArg::from(color.css_string())]);
        });
    }

    /// Open `url` in a new tab
    pub fn open_url(&mut self, url: &str) {
        self.command("openURL", |bridge| {
            bridge.call_func("openURL", &[ScriptArg::from(url)]);
        });
    }

    /// Theme style sheet of the session
    ///
    /// The structural rules ship once with the bootstrap document
    /// (`ruiBase`), so only the theme part travels over the socket.
    #[must_use]
    pub fn styles_css(&self) -> String {
        self.theme().css_text(self.client.dark, self.client.touch)
    }

    /// Re-send the style sheet and the whole root view
    pub fn reload(&mut self) {
        if self.bridge.is_none() {
            return;
        }
        let css = self.styles_css();
        let root_html = match self.root.clone() {
            Some(root) => self.view_html(&root),
            None => String::new(),
        };
        let animations = self.animation_css();
        self.batch(|session| {
            session.command("reload", |bridge| {
                bridge.write_script(&format!("document.querySelector('style').textContent = {};", quote(&css)));
                bridge.update_inner_html("ruiRootView", &root_html);
                bridge.write_script("scanElementsSize();");
                bridge.set_animation_css(&animations);
            });
            session.refresh_popups();
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::test_support::{connected_session, drain};
    use super::*;
    use crate::view::ViewKind;

    #[test]
    fn test_timer_lifecycle() {
        let (mut session, mut rx) = connected_session();
        let ticks = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&ticks);
        let id = session.start_timer(250, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(drain(&mut rx), "startTimer(250, '1');");
        assert!(session.run_timer(id));
        assert!(session.run_timer(id));
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        session.stop_timer(id);
        assert_eq!(drain(&mut rx), "stopTimer('1');");
        assert!(!session.run_timer(id));
    }

    #[test]
    fn test_hot_keys_match_modifiers() {
        let (mut session, _rx) = connected_session();
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        session.set_hot_key("KeyS", Modifiers { ctrl: true, ..Modifiers::default() }, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = KeyEvent {
            code: "KeyS".to_string(),
            ..KeyEvent::default()
        };
        assert!(!session.run_hot_key(&event));
        event.modifiers.ctrl = true;
        assert!(session.run_hot_key(&event));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_storage_mirror() {
        let (mut session, mut rx) = connected_session();
        session.load_storage(&DataObject::parse("storage { theme = dark, lang = de }").unwrap());
        assert_eq!(session.client_item("theme"), Some("dark"));
        session.set_client_item("theme", "light");
        assert_eq!(drain(&mut rx), "localStorageSet('theme', 'light');");
        session.remove_all_client_items();
        assert_eq!(session.client_item("lang"), None);
        assert_eq!(drain(&mut rx), "localStorageClear();");
    }

    #[test]
    fn test_commands_without_bridge_are_dropped() {
        let mut session = Session::new(3, Arc::new(crate::resources::Resources::new()));
        session.set_title("Offline");
        assert_eq!(session.title(), "Offline");
        session.open_url("https://example.com");
    }

    #[test]
    fn test_reload_resends_root() {
        let (mut session, mut rx) = connected_session();
        let root = session.create_view(ViewKind::TextView);
        session.set(&root, "text", "again");
        session.set_root_view(&root);
        drain(&mut rx);

        session.reload();
        let out = drain(&mut rx);
        assert!(out.contains("document.querySelector('style').textContent = "), "{out}");
        assert!(out.contains("updateInnerHTML('ruiRootView', '<div id=\"id000001\""), "{out}");
        assert!(out.contains(">again</div>"), "{out}");
    }
}
