//! Transport Layer for Session-Browser IPC
//!
//! Provides abstraction over the duplex text channel to a browser tab:
//! - `InProcess`: channel pair with an in-memory browser end (tests, embedding)
//! - `WebSocket`: remote tabs over `tokio-tungstenite` (feature `websocket`)
//!
//! # Design Philosophy
//!
//! The transport layer separates the communication mechanism from the
//! session logic. A transport is split once per connection; the writer task
//! owns the [`FrameSink`], the reader task owns the [`FrameSource`], and
//! neither ever sees the session's view graph.

pub mod frame;
pub mod in_process;
pub mod traits;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-exports for convenience
pub use frame::{decode_inbound, ScriptBatch, MAX_FRAME_SIZE};
pub use in_process::{BrowserEnd, InProcessTransport};
pub use traits::{BrowserTransport, FrameSink, FrameSource, TransportError};

#[cfg(feature = "websocket")]
pub use websocket::{OriginPolicy, OriginValidationResult, WebSocketTransport};
