//! Daemon Server Implementation
//!
//! The accept loop of the Loom daemon:
//! - Accepts TCP connections and upgrades them to WebSockets
//! - Enforces the origin policy during the upgrade
//! - Hands every upgraded connection to [`App::serve_connection`]
//! - Tracks active connections and aborts them on shutdown
//!
//! ```text
//!                     DaemonServer
//!                          │
//!          ┌───────────────┼───────────────┐
//!          │               │               │
//!        tab A           tab B           tab C
//!       (conn-1)        (conn-2)        (conn-3)
//!          │               │               │
//!      session 1       session 2     session 1 (reconnect)
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use loom_core::transport::{OriginPolicy, WebSocketTransport};
use loom_core::App;

/// Unique ID of an accepted connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Fresh random ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state tracking
struct ConnectionState {
    /// When the connection was accepted
    connected_at: Instant,
    /// Remote address
    peer: SocketAddr,
    /// Handle to abort the connection task
    abort_handle: tokio::task::AbortHandle,
}

/// Limits of the daemon server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { max_connections: 256 }
    }
}

/// The main daemon server
pub struct DaemonServer {
    listener: TcpListener,
    app: App,
    policy: Arc<OriginPolicy>,
    server_config: ServerConfig,
    connection_states: Arc<DashMap<ConnectionId, ConnectionState>>,
}

impl DaemonServer {
    /// Bind the listen address of `app`
    ///
    /// # Errors
    ///
    /// Fails when the address is invalid or already in use.
    pub async fn bind(app: App, policy: OriginPolicy) -> Result<Self> {
        let addr = app.params().listen_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        Ok(Self {
            listener,
            app,
            policy: Arc::new(policy),
            server_config: ServerConfig::default(),
            connection_states: Arc::new(DashMap::new()),
        })
    }

    /// Replace the connection limits
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.server_config = config;
        self
    }

    /// Address actually bound (resolves port 0)
    ///
    /// # Errors
    ///
    /// Fails when the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context("Listener has no local address")
    }

    /// Accept connections until `shutdown` completes
    ///
    /// # Errors
    ///
    /// Only setup failures are returned; per-connection errors are logged.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!(addr = %self.local_addr()?, "Accepting browser connections");
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                        continue;
                    }
                },
            };

            if self.connection_states.len() >= self.server_config.max_connections {
                warn!(peer = %peer, "Connection limit reached, rejecting new connection");
                drop(stream);
                continue;
            }
            self.spawn_connection(stream, peer);
        }

        self.shutdown();
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let conn_id = ConnectionId::new();
        let app = self.app.clone();
        let policy = Arc::clone(&self.policy);
        let states = Arc::clone(&self.connection_states);

        info!(
            conn_id = %conn_id,
            peer = %peer,
            active_connections = self.connection_states.len() + 1,
            "New connection accepted"
        );

        let task = tokio::spawn(
            async move {
                match WebSocketTransport::accept(stream, peer.to_string(), &policy).await {
                    Ok(transport) => {
                        let session = app.serve_connection(transport).await;
                        debug!(session = ?session, "Connection served");
                    }
                    Err(e) => warn!(error = %e, "WebSocket upgrade failed"),
                }
                states.remove(&conn_id);
                info!(active_connections = states.len(), "Connection handler finished");
            }
            .instrument(tracing::info_span!("connection", %conn_id)),
        );

        self.connection_states.insert(
            conn_id,
            ConnectionState {
                connected_at: Instant::now(),
                peer,
                abort_handle: task.abort_handle(),
            },
        );
    }

    fn shutdown(&self) {
        info!("Initiating graceful shutdown");
        let conn_ids: Vec<ConnectionId> = self.connection_states.iter().map(|r| *r.key()).collect();
        for conn_id in conn_ids {
            if let Some((_, state)) = self.connection_states.remove(&conn_id) {
                info!(conn_id = %conn_id, "Aborting connection");
                state.abort_handle.abort();
            }
        }
        info!(sessions = self.app.registry().len(), "Shutdown complete");
    }

    /// Get number of active connections
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connection_states.len()
    }

    /// Get connection statistics
    #[must_use]
    pub fn connection_stats(&self) -> HashMap<ConnectionId, ConnectionStats> {
        self.connection_states
            .iter()
            .map(|r| {
                let state = r.value();
                (
                    *r.key(),
                    ConnectionStats {
                        peer: state.peer,
                        uptime_secs: state.connected_at.elapsed().as_secs(),
                    },
                )
            })
            .collect()
    }
}

/// Statistics for a single connection
#[derive(Debug, Clone)]
pub struct ConnectionStats {
    /// Remote address
    pub peer: SocketAddr,
    /// Connection uptime in seconds
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use futures::{SinkExt, StreamExt};
    use loom_core::{AppParams, Resources};
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::demo::Demo;

    #[test]
    fn test_connection_id_display() {
        let formatted = format!("{}", ConnectionId::new());
        assert!(formatted.starts_with("conn-"));
        // conn- (5 chars) + UUID (36 chars)
        assert_eq!(formatted.len(), 41);
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_server_config_default() {
        assert_eq!(ServerConfig::default().max_connections, 256);
    }

    #[tokio::test]
    async fn test_websocket_session_roundtrip() {
        let params = AppParams {
            listen_addr: "127.0.0.1:0".to_string(),
            ..AppParams::default()
        };
        let app = App::new(params, Resources::new(), Demo::default);
        let server = DaemonServer::bind(app.clone(), OriginPolicy::allow_all()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let running = tokio::spawn(server.run(async {
            let _ = stop_rx.await;
        }));

        let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await.unwrap();
        socket.send(Message::Text("startSession{language=en}".to_string())).await.unwrap();
        let frame = loop {
            match socket.next().await.unwrap().unwrap() {
                Message::Text(text) => break text,
                _ => continue,
            }
        };
        assert!(frame.contains("sessionID = '1';"), "{frame}");
        assert!(frame.contains("ruiTabBar"), "{frame}");
        assert_eq!(app.registry().len(), 1);

        stop_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
    }
}
