//! Application
//!
//! [`App`] turns browser connections into sessions. One call of
//! [`App::serve_connection`] owns one connection for its whole life:
//!
//! ```text
//!   FrameSource ──▶ reader ──startSession──▶ new Session ──▶ spawn_session
//!                     │    ──reconnect────▶ SessionHandle ◀── Reconnect(bridge)
//!                     │
//!                     ├──answer──▶ PendingAnswers
//!                     └──other───▶ SessionEvent::Message
//!
//!   Bridge ──mpsc──▶ writer ──▶ FrameSink
//! ```
//!
//! The first valid message decides the binding. Everything before it is
//! logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::bridge::{deliver_answer, Bridge, PendingAnswers};
use crate::config::{AppParams, BridgeConfig};
use crate::data::DataObject;
use crate::resources::Resources;
use crate::session::{spawn_session, Session, SessionContent, SessionEvent, SessionHandle, SessionRegistry};
use crate::transport::frame::check_outbound;
use crate::transport::{decode_inbound, BrowserTransport, FrameSource, TransportError};

/// Builds the content of every new session
pub type ContentFactory = Arc<dyn Fn() -> Box<dyn SessionContent> + Send + Sync>;

/// Sessions of one application
#[derive(Clone)]
pub struct App {
    params: AppParams,
    bridge_config: BridgeConfig,
    resources: Arc<Resources>,
    content: ContentFactory,
    registry: SessionRegistry,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("params", &self.params)
            .field("bridge_config", &self.bridge_config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Application creating session content with `content`
    pub fn new<F, C>(params: AppParams, resources: Resources, content: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: SessionContent,
    {
        if !params.theme.is_empty() && params.theme != resources.theme.name() {
            tracing::warn!(
                requested = %params.theme,
                loaded = %resources.theme.name(),
                "configured theme is not the loaded one"
            );
        }
        Self {
            params,
            bridge_config: BridgeConfig::default(),
            resources: Arc::new(resources),
            content: Arc::new(move || Box::new(content()) as Box<dyn SessionContent>),
            registry: SessionRegistry::new(),
        }
    }

    /// Replace the bridge settings used for new connections
    #[must_use]
    pub fn with_bridge_config(mut self, config: BridgeConfig) -> Self {
        self.bridge_config = config;
        self
    }

    /// Application parameters
    #[must_use]
    pub fn params(&self) -> &AppParams {
        &self.params
    }

    /// Live sessions
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Serve one browser connection until it closes
    ///
    /// Returns the id of the session the connection was bound to, or `None`
    /// when the peer went away before the handshake.
    pub async fn serve_connection<T: BrowserTransport>(&self, transport: T) -> Option<u64> {
        let peer = transport.peer();
        let span = tracing::info_span!("connection", %peer);
        self.serve(transport, peer).instrument(span).await
    }

    async fn serve<T: BrowserTransport>(&self, transport: T, peer: String) -> Option<u64> {
        let (mut sink, mut source) = transport.split();
        let (outbound, mut scripts) = mpsc::unbounded_channel::<String>();
        let log_frames = self.bridge_config.protocol_in_debug_log;

        tokio::spawn(
            async move {
                while let Some(script) = scripts.recv().await {
                    if let Err(error) = check_outbound(&script) {
                        tracing::warn!(error = %error, "dropping outbound script");
                        continue;
                    }
                    if log_frames {
                        tracing::trace!(script = %script, "send");
                    }
                    if let Err(error) = sink.send(script).await {
                        tracing::debug!(error = %error, "writer stopped");
                        break;
                    }
                }
                // the peer may already be gone
                let _ = sink.close().await;
            }
            .in_current_span(),
        );

        let pending = PendingAnswers::default();
        let bridge = Bridge::new(outbound, Arc::clone(&pending), self.bridge_config.clone(), peer);
        let connection = bridge.connection();

        let (handle, first) = self.handshake(source.as_mut(), bridge).await?;
        tracing::info!(session = handle.id(), connection, "connection bound");

        if let Some(first) = first {
            handle.send(SessionEvent::Message(first)).await;
        }
        self.read_loop(source.as_mut(), &handle, &pending, log_frames).await;

        if !handle.is_closed() {
            handle.send(SessionEvent::Disconnect(connection)).await;
        }
        tracing::info!(session = handle.id(), "connection closed");
        Some(handle.id())
    }

    /// Wait for `startSession` or `reconnect`
    async fn handshake(
        &self,
        source: &mut dyn FrameSource,
        bridge: Bridge,
    ) -> Option<(SessionHandle, Option<DataObject>)> {
        loop {
            let message = match source.recv().await {
                Ok(text) => match decode_inbound(&text) {
                    Ok(message) => message,
                    Err(error) => {
                        tracing::warn!(error = %error, "invalid handshake frame");
                        continue;
                    }
                },
                Err(TransportError::ConnectionClosed) => {
                    tracing::debug!("closed before the handshake");
                    return None;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "handshake failed");
                    return None;
                }
            };

            match message.tag() {
                "startSession" => return Some((self.start_session(&message, bridge), None)),
                "reconnect" => {
                    let live = message
                        .parse_property::<u64>("session")
                        .and_then(|id| self.registry.get(id));
                    let Some(handle) = live else {
                        tracing::info!(
                            session = ?message.property_value("session"),
                            "reconnect to an unknown session, starting a new one"
                        );
                        return Some((self.start_session(&message, bridge), None));
                    };
                    if handle.send(SessionEvent::Reconnect(bridge)).await {
                        return Some((handle, None));
                    }
                    // closed between lookup and send; the bridge went with the event
                    tracing::warn!(session = handle.id(), "session ended during reconnect");
                    return None;
                }
                other => tracing::warn!(command = %other, "message before the handshake"),
            }
        }
    }

    fn start_session(&self, info: &DataObject, bridge: Bridge) -> SessionHandle {
        let id = self.registry.next_id();
        let mut session = Session::new(id, Arc::clone(&self.resources));
        session.client.update(info);
        if let Some(storage) = info.property_object("storage") {
            session.load_storage(storage);
        }
        session.attach_bridge(bridge);
        tracing::info!(session = id, language = %session.client().language, "starting session");
        spawn_session(
            session,
            (self.content)(),
            self.params.auto_close(),
            self.bridge_config.channel_capacity,
            self.registry.clone(),
        )
    }

    async fn read_loop(
        &self,
        source: &mut dyn FrameSource,
        handle: &SessionHandle,
        pending: &PendingAnswers,
        log_frames: bool,
    ) {
        loop {
            let text = match source.recv().await {
                Ok(text) => text,
                Err(TransportError::ConnectionClosed) => return,
                Err(error) => {
                    tracing::warn!(error = %error, "read failed");
                    return;
                }
            };
            if log_frames {
                tracing::trace!(message = %text, "recv");
            }
            let message = match decode_inbound(&text) {
                Ok(message) => message,
                Err(error) => {
                    tracing::warn!(error = %error, "dropping inbound frame");
                    continue;
                }
            };
            if message.tag() == "answer" {
                deliver_answer(pending, message);
                continue;
            }
            let closing = message.tag() == "session-close";
            if !handle.send(SessionEvent::Message(message)).await {
                tracing::debug!("session ended, stop reading");
                return;
            }
            if closing {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::bridge::ScriptArg;
    use crate::transport::{BrowserEnd, InProcessTransport};
    use crate::view::{ViewId, ViewKind};

    const WAIT: Duration = Duration::from_secs(2);

    struct Hello;

    impl SessionContent for Hello {
        fn create_root_view(&mut self, session: &mut Session) -> Option<ViewId> {
            let root = session.create_view(ViewKind::TextView);
            session.set(&root, "text", "hello");
            Some(root)
        }
    }

    fn app() -> App {
        App::new(AppParams::default(), Resources::new(), || Hello)
    }

    fn connect(app: &App) -> (BrowserEnd, tokio::task::JoinHandle<Option<u64>>) {
        let (transport, browser) = InProcessTransport::new_pair();
        let app = app.clone();
        let task = tokio::spawn(async move { app.serve_connection(transport).await });
        (browser, task)
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..100 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_start_session_sends_initial_script() {
        let app = app();
        let (mut browser, _task) = connect(&app);
        browser.send("startSession{language=en, dark=1}").await.unwrap();

        let frame = browser.recv_timeout(WAIT).await.unwrap();
        assert!(frame.contains("sessionID = '1';"), "{frame}");
        assert!(frame.contains(">hello</div>"), "{frame}");
        assert_eq!(app.registry().ids(), vec![1]);

        let handle = app.registry().get(1).unwrap();
        let (language, dark) = handle
            .run(|session| (session.client().language.clone(), session.dark_theme()))
            .await
            .unwrap();
        assert_eq!(language, "en");
        assert!(dark);

        // One frame, theme only: the structural rules come with the document
        assert!(!frame.contains("html, body {"), "{frame}");
        assert_eq!(browser.recv_timeout(Duration::from_millis(50)).await, None);
    }

    #[tokio::test]
    async fn test_messages_before_handshake_are_dropped() {
        let app = app();
        let (mut browser, _task) = connect(&app);
        browser.send("click-event{id=id000001}").await.unwrap();
        browser.send("not an object {").await.unwrap();
        browser.send("startSession{}").await.unwrap();
        let frame = browser.recv_timeout(WAIT).await.unwrap();
        assert!(frame.contains("sessionID = '1';"), "{frame}");
    }

    #[tokio::test]
    async fn test_answer_resolves_getter() {
        let app = app();
        let (mut browser, _task) = connect(&app);
        browser.send("startSession{}").await.unwrap();
        browser.recv_timeout(WAIT).await.unwrap();

        let handle = app.registry().get(1).unwrap();
        let getter = handle
            .run(|session| session.call_getter("getPropertyValue", &[ScriptArg::from("id000001")]))
            .await
            .unwrap();
        let call = browser.recv_timeout(WAIT).await.unwrap();
        assert!(call.starts_with("getPropertyValue(0, 'id000001'"), "{call}");

        browser.send("answer{answerID=0, value=42}").await.unwrap();
        let answer = tokio::time::timeout(WAIT, getter).await.unwrap();
        assert_eq!(answer.property_value("value"), Some("42"));
    }

    #[tokio::test]
    async fn test_reconnect_rebinds_session() {
        let app = app();
        let (mut first, first_task) = connect(&app);
        first.send("startSession{}").await.unwrap();
        first.recv_timeout(WAIT).await.unwrap();
        first.close();
        assert_eq!(first_task.await.unwrap(), Some(1));

        let handle = app.registry().get(1).unwrap();
        let mut connected = true;
        for _ in 0..100 {
            connected = handle.run(|session| session.is_connected()).await.unwrap();
            if !connected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!connected);

        let (mut second, _task) = connect(&app);
        second.send("reconnect{session=1}").await.unwrap();
        let frame = second.recv_timeout(WAIT).await.unwrap();
        assert!(frame.contains("sessionID = '1';"), "{frame}");
        assert_eq!(app.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_to_unknown_session_starts_new_one() {
        let app = app();
        let (mut browser, _task) = connect(&app);
        browser.send("reconnect{session=77}").await.unwrap();
        let frame = browser.recv_timeout(WAIT).await.unwrap();
        assert!(frame.contains("sessionID = '1';"), "{frame}");
    }

    #[tokio::test]
    async fn test_session_close_ends_session() {
        let app = app();
        let (mut browser, task) = connect(&app);
        browser.send("startSession{}").await.unwrap();
        browser.recv_timeout(WAIT).await.unwrap();
        browser.send("session-close{session=1}").await.unwrap();

        assert_eq!(tokio::time::timeout(WAIT, task).await.unwrap().unwrap(), Some(1));
        let registry = app.registry().clone();
        wait_until(|| registry.is_empty()).await;
        assert!(app.registry().is_empty());
    }

    #[tokio::test]
    async fn test_close_before_handshake() {
        let app = app();
        let (mut browser, task) = connect(&app);
        browser.close();
        assert_eq!(tokio::time::timeout(WAIT, task).await.unwrap().unwrap(), None);
        assert!(app.registry().is_empty());
    }
}
