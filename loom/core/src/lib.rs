//! Loom Core - Server-Driven UI for Browser Tabs
//!
//! The whole UI of a tab lives on the server as a graph of views with typed
//! properties. The browser is a thin renderer: it receives HTML fragments and
//! JavaScript statements over one duplex text channel and reports DOM events
//! back as `.rui` objects.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── Browser tab ────────────────────────────┐
//! │  bootstrap document (loom.js, loom.css)                             │
//! │       ▲ scripts                                  │ .rui messages    │
//! └───────┼──────────────────────────────────────────┼──────────────────┘
//!         │                                          ▼
//! ┌───────┴──────────── BrowserTransport (WebSocket / in-process) ──────┐
//! │   writer task ◀── Bridge              reader task ──▶ SessionHandle │
//! └───────────────────────┬──────────────────────────────────┬──────────┘
//!                         │                                  ▼
//! ┌───────────────────────┴───────────── Session task ─────────────────┐
//! │  views ─ properties ─ styles ─ theme ─ popups ─ images ─ timers    │
//! │  SessionContent (application code)                                 │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`App`]: turns connections into sessions
//! - [`Session`]: view graph and bridge of one tab
//! - [`SessionContent`]: application hooks of a session
//! - [`ViewId`] / [`ViewKind`]: handles to the views of a session
//! - [`PropertyValue`]: dynamically typed property values
//! - [`DataObject`]: the `.rui` text format of messages and resources
//!
//! # Quick Start
//!
//! ```ignore
//! use loom_core::{App, AppParams, Resources, Session, SessionContent, ViewId, ViewKind};
//! use loom_core::transport::InProcessTransport;
//!
//! struct Hello;
//!
//! impl SessionContent for Hello {
//!     fn create_root_view(&mut self, session: &mut Session) -> Option<ViewId> {
//!         let root = session.create_view(ViewKind::TextView);
//!         session.set(&root, "text", "Hello, world");
//!         Some(root)
//!     }
//! }
//!
//! let app = App::new(AppParams::default(), Resources::new(), || Hello);
//! let (transport, mut browser) = InProcessTransport::new_pair();
//! tokio::spawn(async move { app.serve_connection(transport).await });
//! browser.send("startSession{}").await?;
//! ```
//!
//! # Module Overview
//!
//! - [`data`]: `.rui` parser and writer
//! - [`values`]: colors, sizes, angles, frames
//! - [`properties`]: property bags, schema, coercion and constant resolution
//! - [`style`]: composite style properties and CSS generation
//! - [`theme`]: constants, colors, named styles and string tables
//! - [`view`]: view kinds, tree operations and HTML rendering
//! - [`layouts`]: stack and tabs page layouts
//! - [`controls`]: drop-down lists, number pickers, data lists and tables
//! - [`animation`]: transitions and keyframe animations
//! - [`popup`]: modal popups on the popup layer
//! - [`canvas`]: server-side drawing scripts for canvas views
//! - [`media`]: image loading and audio/video players
//! - [`events`]: event payloads and listeners
//! - [`bridge`]: outbound scripts and getter RPC
//! - [`session`]: session state, message dispatch and lifecycle
//! - [`transport`]: duplex text channels to the browser
//! - [`app`]: handshake and connection serving
//! - [`bootstrap`]: the document a tab loads first

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod app;
pub mod bootstrap;
pub mod bridge;
pub mod canvas;
pub mod config;
pub mod controls;
pub mod data;
pub mod error;
pub mod events;
pub mod layouts;
pub mod media;
pub mod popup;
pub mod properties;
pub mod resources;
pub mod session;
pub mod style;
pub mod theme;
pub mod transport;
pub mod values;
pub mod view;

// Application exports
pub use app::{App, ContentFactory};
pub use bootstrap::bootstrap_html;
pub use config::{AppParams, BridgeConfig};
pub use error::{LoomError, LoomResult};
pub use resources::Resources;

// Session exports
pub use bridge::{Bridge, Getter, ScriptArg};
pub use session::{ClientInfo, Session, SessionContent, SessionEvent, SessionHandle, SessionRegistry};

// View exports
pub use canvas::{Canvas, Path, TextMetrics};
pub use controls::{NumberPickerType, SelectionMode, TableAdapter, TextTableAdapter};
pub use layouts::{StackAnimation, TabsPosition};
pub use popup::{PopupButton, PopupId, PopupParams};
pub use view::{ViewId, ViewKind};

// Value exports
pub use data::{DataObject, DataValue};
pub use properties::{Params, PropertyValue};
pub use theme::Theme;
pub use values::{AngleUnit, Color, Frame, SizeUnit};
