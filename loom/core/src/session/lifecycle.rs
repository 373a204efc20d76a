//! Session Lifecycle
//!
//! Each session runs on its own task and drains a bounded queue of
//! [`SessionEvent`]s: inbound messages from whichever connection is bound,
//! bridge swaps on reconnect, disconnects, auto-close timers and callbacks
//! of work that completed off the task (getter answers).
//!
//! ```text
//!   connection reader ──answer──▶ PendingAnswers (getters resolve here)
//!          │
//!          └──message──▶ SessionHandle ──mpsc──▶ session task ──▶ Bridge ──▶ writer
//! ```
//!
//! The [`SessionContent`] sees `on_start`, `on_resume`, `on_pause`,
//! `on_finish`, `on_disconnect` and `on_reconnect`, in the order the tab
//! goes through them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use crate::bridge::{fail_pending, quote, Bridge};
use crate::data::DataObject;
use crate::view::ViewId;

use super::Session;

// ============================================================================
// Content
// ============================================================================

/// Application code of one session
///
/// Every hook runs on the session task with exclusive access to the session.
pub trait SessionContent: Send + 'static {
    /// Build the root view; called once before the first script is sent
    fn create_root_view(&mut self, session: &mut Session) -> Option<ViewId>;

    /// The session started (followed by `on_resume`)
    fn on_start(&mut self, _session: &mut Session) {}

    /// The tab became visible
    fn on_resume(&mut self, _session: &mut Session) {}

    /// The tab was hidden
    fn on_pause(&mut self, _session: &mut Session) {}

    /// The session is ending
    fn on_finish(&mut self, _session: &mut Session) {}

    /// The connection dropped; the session waits for a reconnect
    fn on_disconnect(&mut self, _session: &mut Session) {}

    /// A new connection took over the session
    fn on_reconnect(&mut self, _session: &mut Session) {}
}

/// Work queued for a session task
pub enum SessionEvent {
    /// Inbound message of the bound tab
    Message(DataObject),
    /// A new connection took over
    Reconnect(Bridge),
    /// The connection with this number went away
    Disconnect(u64),
    /// Auto-close timer of the pause with this generation
    AutoClose(u64),
    /// Run on the session task
    Callback(Box<dyn FnOnce(&mut Session) + Send>),
    /// End the session from the server side
    Close,
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "Message({})", message.tag()),
            Self::Reconnect(bridge) => write!(f, "Reconnect({})", bridge.peer()),
            Self::Disconnect(connection) => write!(f, "Disconnect({connection})"),
            Self::AutoClose(generation) => write!(f, "AutoClose({generation})"),
            Self::Callback(_) => f.write_str("Callback"),
            Self::Close => f.write_str("Close"),
        }
    }
}

// ============================================================================
// Handle and registry
// ============================================================================

/// Sending side of a session task
#[derive(Clone, Debug)]
pub struct SessionHandle {
    id: u64,
    tx: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Session id
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue an event; `false` once the session ended
    pub async fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Queue an event without waiting for room
    #[must_use]
    pub fn try_send(&self, event: SessionEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }

    /// Whether the session task has ended
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Run `f` on the session task and return its result
    ///
    /// `None` when the session ended before `f` ran.
    pub async fn run<T, F>(&self, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Session) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let callback = SessionEvent::Callback(Box::new(move |session: &mut Session| {
            // the caller may have stopped waiting
            let _ = tx.send(f(session));
        }));
        if !self.send(callback).await {
            return None;
        }
        rx.await.ok()
    }
}

/// Live sessions by id, for `reconnect{session=N}`
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<u64, SessionHandle>>>,
    next_id: Arc<std::sync::atomic::AtomicU64>,
}

impl SessionRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a session id
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1
    }

    /// Add a session
    pub fn register(&self, handle: SessionHandle) {
        let id = handle.id;
        self.inner.write().insert(id, handle);
        tracing::debug!(session = id, total = self.len(), "session registered");
    }

    /// Drop a session
    pub fn unregister(&self, id: u64) -> Option<SessionHandle> {
        let removed = self.inner.write().remove(&id);
        if removed.is_some() {
            tracing::debug!(session = id, total = self.len(), "session unregistered");
        }
        removed
    }

    /// Handle of a live session
    #[must_use]
    pub fn get(&self, id: u64) -> Option<SessionHandle> {
        self.inner.read().get(&id).filter(|handle| !handle.is_closed()).cloned()
    }

    /// Number of live sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no session is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Ids of the live sessions
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.inner.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry").field("sessions", &self.len()).finish()
    }
}

// ============================================================================
// Session task
// ============================================================================

/// Start the task of a prepared session (bridge attached, client info set)
///
/// The task builds the root view, sends the initial script and runs until
/// the tab closes the session, [`Session::close`] is called or the
/// auto-close window of a pause elapses.
#[must_use]
pub fn spawn_session(
    mut session: Session,
    content: Box<dyn SessionContent>,
    auto_close: Option<Duration>,
    capacity: usize,
    registry: SessionRegistry,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let id = session.id();
    session.events_tx = Some(tx.clone());
    let handle = SessionHandle { id, tx };
    registry.register(handle.clone());

    let task = SessionTask {
        session,
        content,
        auto_close,
        registry,
        pause_generation: 0,
    };
    tokio::spawn(task.run(rx).instrument(tracing::info_span!("session", id)));
    handle
}

struct SessionTask {
    session: Session,
    content: Box<dyn SessionContent>,
    auto_close: Option<Duration>,
    registry: SessionRegistry,
    pause_generation: u64,
}

impl SessionTask {
    async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) {
        self.start();
        while let Some(event) = rx.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.registry.unregister(self.session.id());
        tracing::info!("session ended");
    }

    fn start(&mut self) {
        let root = self.session.without_updates(|session| self.content.create_root_view(session));
        if let Some(root) = root {
            self.session.without_updates(|session| session.set_root_view(&root));
        }
        self.session.send_initial_script();
        self.content.on_start(&mut self.session);
        self.content.on_resume(&mut self.session);
        tracing::info!(peer = ?self.session.bridge.as_ref().map(Bridge::peer), "session started");
    }

    /// Returns `false` once the session is over
    fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Message(message) => match message.tag() {
                "session-pause" => self.pause(),
                "session-resume" => self.resume(),
                "session-close" => {
                    self.finish(false);
                    return false;
                }
                _ => self.session.handle_message(&message),
            },
            SessionEvent::Reconnect(bridge) => {
                if let Some(old) = self.session.detach_bridge() {
                    fail_pending(old.pending());
                }
                self.session.attach_bridge(bridge);
                self.session.pause_time = None;
                self.session.send_initial_script();
                self.content.on_reconnect(&mut self.session);
            }
            SessionEvent::Disconnect(connection) => {
                let current = self.session.bridge.as_ref().map(Bridge::connection);
                if current != Some(connection) {
                    tracing::debug!(connection, ?current, "disconnect of a replaced connection");
                    return true;
                }
                if let Some(old) = self.session.detach_bridge() {
                    fail_pending(old.pending());
                }
                self.content.on_disconnect(&mut self.session);
                self.schedule_auto_close();
            }
            SessionEvent::AutoClose(generation) => {
                if generation == self.pause_generation && self.session.pause_time.is_some() {
                    tracing::info!(
                        idle_secs = self.session.pause_time.map_or(0, |t| t.elapsed().as_secs()),
                        "auto-close window elapsed"
                    );
                    self.finish(true);
                    return false;
                }
            }
            SessionEvent::Callback(callback) => {
                self.session.batch(|session| callback(session));
            }
            SessionEvent::Close => {
                self.finish(true);
                return false;
            }
        }
        true
    }

    fn pause(&mut self) {
        self.content.on_pause(&mut self.session);
        self.schedule_auto_close();
    }

    fn resume(&mut self) {
        self.session.pause_time = None;
        self.pause_generation += 1;
        self.content.on_resume(&mut self.session);
    }

    fn schedule_auto_close(&mut self) {
        self.session.pause_time = Some(Instant::now());
        self.pause_generation += 1;
        let (Some(window), Some(tx)) = (self.auto_close, self.session.events_tx.clone()) else {
            return;
        };
        let generation = self.pause_generation;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // the session may be gone already
            let _ = tx.send(SessionEvent::AutoClose(generation)).await;
        });
    }

    /// `on_pause` then `on_finish`; `close_socket` asks the tab to hang up
    fn finish(&mut self, close_socket: bool) {
        self.content.on_pause(&mut self.session);
        self.content.on_finish(&mut self.session);
        if close_socket {
            if let Some(bridge) = self.session.bridge.as_mut() {
                bridge.call_func("closeSocket", &[]);
            }
        }
        if let Some(bridge) = self.session.detach_bridge() {
            fail_pending(bridge.pending());
        }
        self.session.events_tx = None;
    }
}

// ============================================================================
// Session side
// ============================================================================

impl Session {
    /// Send everything a freshly bound tab needs: session id, style sheet,
    /// root view, keyframes and open popups
    pub(crate) fn send_initial_script(&mut self) {
        let css = self.styles_css();
        let html = match self.root.clone() {
            Some(root) => self.without_updates(|session| session.view_html(&root)),
            None => String::new(),
        };
        let animations = self.animation_css();
        let id = self.id();
        self.batch(|session| {
            session.command("startSession", |bridge| {
                bridge.write_script(&format!("sessionID = '{id}';"));
                bridge.write_script(&format!("document.querySelector('style').textContent = {};", quote(&css)));
                bridge.write_script(&format!(
                    "document.getElementById('ruiRootView').innerHTML = {};\nscanElementsSize();",
                    quote(&html)
                ));
                bridge.set_animation_css(&animations);
            });
            // A fresh document starts with the popup layer hidden
            if session.popup_count() > 0 {
                session.refresh_popups();
            }
        });
    }

    /// End the session from application code
    ///
    /// The session task runs `on_pause` and `on_finish` after the current
    /// handler returns and asks the tab to close its socket.
    pub fn close(&mut self) {
        let queued = self
            .events_tx
            .as_ref()
            .is_some_and(|tx| tx.try_send(SessionEvent::Close).is_ok());
        if !queued {
            tracing::warn!(session = self.id(), "close requested without a running session task");
        }
    }

    /// When the tab was hidden, if it is
    #[must_use]
    pub fn pause_time(&self) -> Option<Instant> {
        self.pause_time
    }
}
