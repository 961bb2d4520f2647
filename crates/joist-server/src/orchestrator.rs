//! Sequential rebuild loop driving the clean-build-reload cycle.

use std::future::Future;

use tokio::sync::mpsc;

use crate::watcher::WatchEvent;
use crate::websocket::{ReloadHub, ReloadMessage};

/// Run rebuilds for incoming watch events until the channel closes.
///
/// The loop is strictly sequential: an event received while idle
/// starts one rebuild, and events arriving mid-build queue in the
/// channel and are drained into a single follow-up rebuild. Two builds
/// can therefore never overlap, which keeps the clean step from racing
/// an in-flight stage's writes.
///
/// A failed rebuild is logged and the loop keeps running; the dev
/// server stays up serving the last good output.
pub async fn run<F, Fut, T, E>(mut rx: mpsc::Receiver<WatchEvent>, hub: ReloadHub, mut rebuild: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    while let Some(event) = rx.recv().await {
        tracing::info!("Change detected: {}", event.path().display());

        // Coalesce events that arrived in the same burst.
        while rx.try_recv().is_ok() {}

        match rebuild().await {
            Ok(_) => hub.send(ReloadMessage::Reload),
            Err(e) => tracing::error!("Rebuild failed: {}", e),
        }
    }
}
