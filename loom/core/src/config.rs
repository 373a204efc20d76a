//! Application and Bridge Configuration
//!
//! Two plain configuration structs:
//!
//! - [`AppParams`]: page title, icon, auto-close window, listen address, origins
//! - [`BridgeConfig`]: getter-RPC timeout and protocol logging
//!
//! Both implement `Default`, can be loaded from a TOML file and overridden by
//! environment variables. The `SessionContent` factory is supplied in code.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LoomError, LoomResult};

/// Application-level parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppParams {
    /// Page title of the bootstrap document
    pub title: String,

    /// Icon path (empty = no icon link)
    pub icon: String,

    /// Close a paused session's socket after this many seconds (0 = never)
    pub socket_auto_close: u64,

    /// Name of the theme to apply to new sessions (empty = default theme)
    pub theme: String,

    /// WebSocket listen address
    pub listen_addr: String,

    /// Origins accepted during the WebSocket handshake (empty = any)
    pub allowed_origins: Vec<String>,
}

impl Default for AppParams {
    fn default() -> Self {
        Self {
            title: "Loom".to_string(),
            icon: String::new(),
            socket_auto_close: 0,
            theme: String::new(),
            listen_addr: "127.0.0.1:8000".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl AppParams {
    /// Default configuration file location (`$XDG_CONFIG_HOME/loom/loom.toml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("loom").join("loom.toml"))
    }

    /// Load parameters from a TOML file
    pub fn load(path: &Path) -> LoomResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|_| LoomError::ResourceMissing {
            name: path.display().to_string(),
        })?;
        toml::from_str(&text).map_err(|e| LoomError::invalid("toml", e.to_string()))
    }

    /// Load from the default file (if present), then apply environment overrides
    #[must_use]
    pub fn load_default() -> Self {
        let base = Self::default_path()
            .filter(|path| path.exists())
            .and_then(|path| match Self::load(&path) {
                Ok(params) => Some(params),
                Err(e) => {
                    tracing::warn!(error = %e, path = ?path, "Ignoring unreadable config file");
                    None
                }
            })
            .unwrap_or_default();
        base.with_env_overrides()
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LOOM_TITLE`: page title
    /// - `LOOM_ICON`: icon path
    /// - `LOOM_AUTO_CLOSE`: auto-close window in seconds
    /// - `LOOM_THEME`: theme name
    /// - `LOOM_ADDR`: listen address
    /// - `LOOM_ORIGINS`: comma-separated allowed origins
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `LOOM_*` environment variables on top of `self`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(title) = std::env::var("LOOM_TITLE") {
            self.title = title;
        }
        if let Ok(icon) = std::env::var("LOOM_ICON") {
            self.icon = icon;
        }
        if let Some(secs) = std::env::var("LOOM_AUTO_CLOSE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            self.socket_auto_close = secs;
        }
        if let Ok(theme) = std::env::var("LOOM_THEME") {
            self.theme = theme;
        }
        if let Ok(addr) = std::env::var("LOOM_ADDR") {
            self.listen_addr = addr;
        }
        if let Ok(origins) = std::env::var("LOOM_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// Auto-close window, `None` when disabled
    #[must_use]
    pub fn auto_close(&self) -> Option<Duration> {
        (self.socket_auto_close > 0).then(|| Duration::from_secs(self.socket_auto_close))
    }
}

/// Session bridge configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long a getter-RPC waits for the browser's answer
    pub getter_timeout_ms: u64,

    /// Capacity of the per-session inbound command queue
    pub channel_capacity: usize,

    /// Log every inbound/outbound frame at `trace` level
    pub protocol_in_debug_log: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            getter_timeout_ms: 10_000,
            channel_capacity: 256,
            protocol_in_debug_log: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LOOM_GETTER_TIMEOUT_MS`: getter-RPC timeout in ms
    /// - `LOOM_CHANNEL_CAPACITY`: per-session command queue capacity
    /// - `LOOM_PROTOCOL_LOG`: "1" or "true" to trace every frame
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = std::env::var("LOOM_GETTER_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            config.getter_timeout_ms = ms;
        }
        if let Some(capacity) = std::env::var("LOOM_CHANNEL_CAPACITY")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|c| *c > 0)
        {
            config.channel_capacity = capacity;
        }
        if let Ok(flag) = std::env::var("LOOM_PROTOCOL_LOG") {
            config.protocol_in_debug_log = matches!(flag.trim(), "1" | "true" | "yes");
        }
        config
    }

    /// Getter-RPC timeout as a `Duration`
    #[must_use]
    pub fn getter_timeout(&self) -> Duration {
        Duration::from_millis(self.getter_timeout_ms)
    }
}
