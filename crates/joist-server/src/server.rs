//! Development server implementation.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::orchestrator;
use crate::watcher::FileWatcher;
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage};

/// Path of the WebSocket reload endpoint.
const RELOAD_WS_PATH: &str = "/__reload";

/// Path of the reload client script.
const RELOAD_SCRIPT_PATH: &str = "/__reload.js";

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Directory served to clients (the build output root)
    pub root: PathBuf,

    /// Source directories watched for changes
    pub watch_paths: Vec<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            watch_paths: vec![PathBuf::from("src")],
            port: 3000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {0}: {1}")]
    Bind(String, String),

    #[error("File watch error: {0}")]
    Watch(String),
}

/// Shared server state.
struct ServerState {
    root: PathBuf,
    hub: ReloadHub,
}

/// Development server.
///
/// Serves the output root with the reload script injected into HTML
/// responses, and runs the watch orchestrator against the supplied
/// rebuild future. The server runs until the process is terminated.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the server and the rebuild loop.
    ///
    /// `rebuild` is invoked once per change burst; each invocation must
    /// run its own clean step before writing, and a reload is sent to
    /// clients only when it succeeds.
    pub async fn start<F, Fut, T, E>(self, rebuild: F) -> Result<(), ServerError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let hub = ReloadHub::new();

        let (watcher, rx) = FileWatcher::new(&self.config.watch_paths)
            .map_err(|e| ServerError::Watch(e.to_string()))?;

        // Rebuild loop; the watcher must outlive it.
        let orchestrator_hub = hub.clone();
        tokio::spawn(async move {
            orchestrator::run(rx, orchestrator_hub, rebuild).await;
            drop(watcher);
        });

        let state = Arc::new(ServerState {
            root: self.config.root.clone(),
            hub,
        });

        let app = Router::new()
            .route(RELOAD_WS_PATH, get(ws_handler))
            .route(RELOAD_SCRIPT_PATH, get(script_handler))
            .fallback(get(static_handler))
            .with_state(state);

        tracing::info!("Dev server running at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind(addr.clone(), e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Bind(addr, e.to_string()))?;

        Ok(())
    }
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one connected client.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    let msg = serde_json::to_string(&ReloadMessage::Connected).unwrap();
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    while let Ok(reload_msg) = rx.recv().await {
        let json = serde_json::to_string(&reload_msg).unwrap();
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the reload client script.
async fn script_handler() -> impl IntoResponse {
    let script = reload_client_script(RELOAD_WS_PATH);
    ([(header::CONTENT_TYPE, "application/javascript")], script)
}

/// Serve a file from the output root, injecting the reload script into
/// HTML responses.
async fn static_handler(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    if path.split('/').any(|segment| segment == "..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let mut target = state.root.join(path);
    if path.is_empty() || target.is_dir() {
        target = target.join("index.html");
    }

    let bytes = match tokio::fs::read(&target).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::NOT_FOUND.into_response(),
    };

    let ext = target.extension().and_then(|e| e.to_str()).unwrap_or("");

    if ext == "html" {
        let html = String::from_utf8_lossy(&bytes).into_owned();
        Html(inject_reload_script(&html)).into_response()
    } else {
        ([(header::CONTENT_TYPE, content_type(ext))], bytes).into_response()
    }
}

/// Append the reload script tag, before `</body>` when present.
fn inject_reload_script(html: &str) -> String {
    let tag = format!("<script src=\"{}\"></script>", RELOAD_SCRIPT_PATH);

    match html.rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(&tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

fn content_type(ext: &str) -> &'static str {
    match ext {
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}
