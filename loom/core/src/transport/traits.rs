//! Transport traits
//!
//! A browser connection is a duplex stream of UTF-8 text frames. The session
//! machinery never touches sockets directly: it splits a [`BrowserTransport`]
//! into a [`FrameSink`] owned by the writer task and a [`FrameSource`] owned
//! by the reader task.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The frame could not be written
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The peer went away
    #[error("connection closed")]
    ConnectionClosed,

    /// Operation not valid in the current connection state
    #[error("invalid transport state: {0}")]
    InvalidState(String),

    /// The peer violated the framing protocol
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Write half of a browser connection
#[async_trait]
pub trait FrameSink: Send {
    /// Write one text frame
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection from the server side
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of a browser connection
#[async_trait]
pub trait FrameSource: Send {
    /// Next text frame; [`TransportError::ConnectionClosed`] once the peer is gone
    async fn recv(&mut self) -> Result<String, TransportError>;
}

/// A duplex text connection to one browser tab
pub trait BrowserTransport: Send + 'static {
    /// Human readable peer description for logs
    fn peer(&self) -> String;

    /// Split into independently owned halves
    fn split(self) -> (Box<dyn FrameSink>, Box<dyn FrameSource>);
}
