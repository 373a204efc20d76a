//! WebSocket Transport
//!
//! Browser tabs connect over a WebSocket and exchange text frames with their
//! session. The stream is split with `futures::StreamExt::split` so the writer
//! task and the reader task each own one half.
//!
//! # Security Considerations
//!
//! - **Origin Validation**: the upgrade is refused unless the `Origin` header
//!   passes the configured [`OriginPolicy`]
//! - **Message Size Limits**: frames over [`MAX_FRAME_SIZE`] are rejected by
//!   the frame layer
//! - **Text only**: binary frames are logged and dropped
//!
//! # Example
//!
//! ```ignore
//! let listener = TcpListener::bind("127.0.0.1:8000").await?;
//! let policy = OriginPolicy::from_config(&params.allowed_origins);
//! let (stream, addr) = listener.accept().await?;
//! let transport = WebSocketTransport::accept(stream, addr.to_string(), &policy).await?;
//! tokio::spawn(app.serve_connection(transport));
//! ```

mod security;

pub use security::{OriginPolicy, OriginValidationResult};

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use super::frame::MAX_FRAME_SIZE;
use super::traits::{BrowserTransport, FrameSink, FrameSource, TransportError};

/// A browser connection over an upgraded WebSocket stream
pub struct WebSocketTransport<S> {
    stream: WebSocketStream<S>,
    peer: String,
}

impl<S> WebSocketTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wrap an already upgraded stream
    pub fn new(stream: WebSocketStream<S>, peer: impl Into<String>) -> Self {
        Self {
            stream,
            peer: peer.into(),
        }
    }

    /// Perform the server handshake, enforcing `policy` on the `Origin` header
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Protocol`] when the handshake fails or the
    /// origin is refused.
    pub async fn accept(
        stream: S,
        peer: impl Into<String>,
        policy: &OriginPolicy,
    ) -> Result<Self, TransportError> {
        let peer = peer.into();
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let origin = request
                .headers()
                .get("origin")
                .and_then(|value| value.to_str().ok());
            match policy.validate(origin) {
                OriginValidationResult::Allowed => Ok(response),
                OriginValidationResult::Denied { reason } => {
                    tracing::warn!(peer = %peer, reason = %reason, "Refusing WebSocket upgrade");
                    let mut refusal = ErrorResponse::new(Some(reason));
                    *refusal.status_mut() = StatusCode::FORBIDDEN;
                    Err(refusal)
                }
            }
        };
        let stream = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        Ok(Self::new(stream, peer))
    }
}

impl<S> BrowserTransport for WebSocketTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    fn peer(&self) -> String {
        self.peer.clone()
    }

    fn split(self) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        let (sink, stream) = self.stream.split();
        (
            Box::new(WebSocketSink { sink }),
            Box::new(WebSocketSource {
                stream,
                peer: self.peer,
            }),
        )
    }
}

struct WebSocketSink<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
}

struct WebSocketSource<S> {
    stream: SplitStream<WebSocketStream<S>>,
    peer: String,
}

#[async_trait]
impl<S> FrameSink for WebSocketSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl<S> FrameSource for WebSocketSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            let message = match self.stream.next().await {
                None => return Err(TransportError::ConnectionClosed),
                Some(Err(e)) => {
                    tracing::debug!(peer = %self.peer, error = %e, "WebSocket read failed");
                    return Err(TransportError::ConnectionClosed);
                }
                Some(Ok(message)) => message,
            };
            match message {
                Message::Text(text) if text.len() > MAX_FRAME_SIZE => {
                    return Err(TransportError::Protocol(format!(
                        "Frame too large: {} bytes (max: {})",
                        text.len(),
                        MAX_FRAME_SIZE
                    )));
                }
                Message::Text(text) => return Ok(text),
                Message::Close(_) => return Err(TransportError::ConnectionClosed),
                Message::Binary(data) => {
                    tracing::warn!(peer = %self.peer, len = data.len(), "Dropping binary frame");
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;
    use tokio_tungstenite::tungstenite::protocol::Role;

    async fn pair() -> (
        WebSocketTransport<tokio::io::DuplexStream>,
        WebSocketStream<tokio::io::DuplexStream>,
    ) {
        let (server, client) = duplex(64 * 1024);
        let server = WebSocketStream::from_raw_socket(server, Role::Server, None).await;
        let client = WebSocketStream::from_raw_socket(client, Role::Client, None).await;
        (WebSocketTransport::new(server, "test"), client)
    }

    #[tokio::test]
    async fn test_text_frames_roundtrip() {
        let (transport, mut client) = pair().await;
        assert_eq!(transport.peer(), "test");
        let (mut sink, mut source) = transport.split();

        client
            .send(Message::Text("click-event{id=id000001}".to_string()))
            .await
            .unwrap();
        assert_eq!(source.recv().await.unwrap(), "click-event{id=id000001}");

        sink.send("scanElementsSize();".to_string()).await.unwrap();
        let reply = client.next().await.unwrap().unwrap();
        assert_eq!(reply, Message::Text("scanElementsSize();".to_string()));
    }

    #[tokio::test]
    async fn test_binary_frames_are_skipped() {
        let (transport, mut client) = pair().await;
        let (_sink, mut source) = transport.split();

        client.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        client.send(Message::Text("timer{timerID=1}".to_string())).await.unwrap();
        assert_eq!(source.recv().await.unwrap(), "timer{timerID=1}");
    }

    #[tokio::test]
    async fn test_close_ends_source() {
        let (transport, mut client) = pair().await;
        let (_sink, mut source) = transport.split();

        client.close(None).await.unwrap();
        assert_eq!(source.recv().await, Err(TransportError::ConnectionClosed));
    }
}
