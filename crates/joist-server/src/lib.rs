//! Development server with live reload for joist builds.
//!
//! Serves the output directory, watches the source trees, and drives
//! the clean-build-reload cycle through a WebSocket channel.

pub mod orchestrator;
pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
