//! In-Process Transport
//!
//! Channel-based connection between a session and an in-memory "browser".
//! Used by the integration tests and when the framework is embedded in a
//! process that renders the document itself.
//!
//! # Usage
//!
//! ```ignore
//! let (transport, mut browser) = InProcessTransport::new_pair();
//! tokio::spawn(app.serve_connection(transport));
//!
//! browser.send("startSession{}").await?;
//! let script = browser.recv().await;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::traits::{BrowserTransport, FrameSink, FrameSource, TransportError};

const DEFAULT_CAPACITY: usize = 100;

/// Server side of an in-process connection
pub struct InProcessTransport {
    sink: InProcessSink,
    source: InProcessSource,
}

struct InProcessSink {
    script_tx: mpsc::Sender<String>,
    connected: Arc<AtomicBool>,
}

struct InProcessSource {
    message_rx: mpsc::Receiver<String>,
}

/// Browser side of an in-process connection
///
/// Sends inbound `.rui` messages and receives the scripts the session emits.
pub struct BrowserEnd {
    message_tx: Option<mpsc::Sender<String>>,
    script_rx: mpsc::Receiver<String>,
    connected: Arc<AtomicBool>,
}

impl InProcessTransport {
    /// Create a connected transport / browser pair
    #[must_use]
    pub fn new_pair() -> (Self, BrowserEnd) {
        Self::new_pair_with_capacity(DEFAULT_CAPACITY)
    }

    /// Create with custom channel capacity
    #[must_use]
    pub fn new_pair_with_capacity(capacity: usize) -> (Self, BrowserEnd) {
        let (message_tx, message_rx) = mpsc::channel(capacity);
        let (script_tx, script_rx) = mpsc::channel(capacity);
        let connected = Arc::new(AtomicBool::new(true));

        let transport = Self {
            sink: InProcessSink {
                script_tx,
                connected: Arc::clone(&connected),
            },
            source: InProcessSource { message_rx },
        };
        let browser = BrowserEnd {
            message_tx: Some(message_tx),
            script_rx,
            connected,
        };
        (transport, browser)
    }
}

impl BrowserTransport for InProcessTransport {
    fn peer(&self) -> String {
        "in-process".to_string()
    }

    fn split(self) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        (Box::new(self.sink), Box::new(self.source))
    }
}

#[async_trait]
impl FrameSink for InProcessSink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::InvalidState(
                "Transport not connected".to_string(),
            ));
        }
        self.script_tx
            .send(frame)
            .await
            .map_err(|_| TransportError::SendFailed("Channel closed".to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl FrameSource for InProcessSource {
    async fn recv(&mut self) -> Result<String, TransportError> {
        self.message_rx
            .recv()
            .await
            .ok_or(TransportError::ConnectionClosed)
    }
}

impl BrowserEnd {
    /// Post an inbound message to the session
    pub async fn send(&self, message: impl Into<String>) -> Result<(), TransportError> {
        let tx = self.message_tx.as_ref().ok_or(TransportError::ConnectionClosed)?;
        tx.send(message.into())
            .await
            .map_err(|_| TransportError::SendFailed("Channel closed".to_string()))
    }

    /// Next script emitted by the session (`None` once the server side is gone)
    pub async fn recv(&mut self) -> Option<String> {
        self.script_rx.recv().await
    }

    /// Next script, or `None` if nothing arrives within `wait`
    pub async fn recv_timeout(&mut self, wait: Duration) -> Option<String> {
        tokio::time::timeout(wait, self.script_rx.recv()).await.ok().flatten()
    }

    /// Already queued script, if any
    pub fn try_recv(&mut self) -> Option<String> {
        self.script_rx.try_recv().ok()
    }

    /// Drain every queued script
    pub fn drain(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Whether the server side still accepts frames
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Simulate the tab going away: the session's reader sees the connection close
    pub fn close(&mut self) {
        self.message_tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_process_roundtrip() {
        let (transport, mut browser) = InProcessTransport::new_pair();
        let (mut sink, mut source) = transport.split();

        browser.send("click-event{id=id000001}").await.unwrap();
        assert_eq!(source.recv().await.unwrap(), "click-event{id=id000001}");

        sink.send("scanElementsSize();".to_string()).await.unwrap();
        assert_eq!(browser.recv().await.as_deref(), Some("scanElementsSize();"));
    }

    #[tokio::test]
    async fn test_in_process_try_recv() {
        let (transport, mut browser) = InProcessTransport::new_pair();
        let (mut sink, _source) = transport.split();

        assert!(browser.try_recv().is_none());
        sink.send("a".to_string()).await.unwrap();
        sink.send("b".to_string()).await.unwrap();
        assert_eq!(browser.drain(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_in_process_close() {
        let (transport, browser) = InProcessTransport::new_pair();
        let (mut sink, _source) = transport.split();

        assert!(browser.is_connected());
        sink.close().await.unwrap();
        assert!(!browser.is_connected());

        let result = sink.send("x".to_string()).await;
        assert!(matches!(result, Err(TransportError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_browser_close_ends_source() {
        let (transport, mut browser) = InProcessTransport::new_pair();
        let (_sink, mut source) = transport.split();

        browser.close();
        assert_eq!(source.recv().await, Err(TransportError::ConnectionClosed));
        assert_eq!(
            browser.send("x").await,
            Err(TransportError::ConnectionClosed)
        );
    }
}
