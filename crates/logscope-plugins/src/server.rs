//! Loopback HTTP server for plugin bundles.
//!
//! Module imports need a URL, so registered plugin directories are exposed
//! at `/plugin/{index}/{path}` on a fixed loopback port. Path confinement is
//! the only defense: a cheap string-level check for traversal segments, then
//! a canonicalization check that also catches symlink and encoding tricks.
//! Both layers are kept deliberately redundant.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Well-known port shared with the loader's entry URLs.
pub const PLUGIN_SERVER_PORT: u16 = 56329;

#[derive(Clone, Default)]
struct ServerState {
    directories: Arc<RwLock<Vec<PathBuf>>>,
}

struct Running {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
    addr: SocketAddr,
}

/// Singleton file server with a start/stop lifecycle.
#[derive(Default)]
pub struct PluginServer {
    state: ServerState,
    running: Mutex<Option<Running>>,
}

impl PluginServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full index-aligned directory list.
    pub async fn set_plugin_directories(&self, directories: Vec<PathBuf>) {
        info!(count = directories.len(), "Plugin directories set");
        *self.state.directories.write().await = directories;
    }

    pub async fn plugin_directories(&self) -> Vec<PathBuf> {
        self.state.directories.read().await.clone()
    }

    /// Start listening on the fixed loopback port. Calling while already
    /// running logs a warning and is a no-op.
    pub async fn start(&self) -> anyhow::Result<()> {
        self.start_on((Ipv4Addr::LOCALHOST, PLUGIN_SERVER_PORT).into())
            .await
    }

    /// Start on an explicit loopback address (tests bind an ephemeral port).
    pub async fn start_on(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            warn!("Plugin server already running");
            return Ok(());
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();

        let app = router(self.state.clone());
        let token = shutdown.clone();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = result {
                error!(%e, "Plugin server error");
            }
        });

        info!(port = addr.port(), "Plugin server started");
        *running = Some(Running {
            shutdown,
            task,
            addr,
        });
        Ok(())
    }

    /// The bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.addr)
    }

    /// Close the listener. Safe to call when not running.
    pub async fn stop(&self) {
        if let Some(running) = self.running.lock().await.take() {
            running.shutdown.cancel();
            let _ = running.task.await;
            info!("Plugin server stopped");
        }
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/plugin/{index}/{*path}", get(plugin_file))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    let count = state.directories.read().await.len();
    Json(json!({ "status": "ok", "pluginCount": count }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn plugin_file(
    State(state): State<ServerState>,
    Path((index, file_path)): Path<(String, String)>,
) -> Response {
    // A non-numeric index never matched the plugin route shape
    let Ok(index) = index.parse::<usize>() else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let directories = state.directories.read().await;
    let Some(directory) = directories.get(index) else {
        return (StatusCode::NOT_FOUND, "Plugin not found").into_response();
    };

    // Defense #1, string level: traversal segments and non-canonical
    // separators are rejected before touching the filesystem
    if file_path.contains("..") || file_path.contains('\\') {
        warn!(index, path = %file_path, "Rejected plugin file path");
        return (StatusCode::BAD_REQUEST, "Invalid file path").into_response();
    }

    // Defense #2, resolution level: the canonical path must stay under the
    // canonical registered directory, catching symlink and encoding tricks
    let full_path = directory.join(&file_path);
    let resolved_directory = match tokio::fs::canonicalize(directory).await {
        Ok(p) => p,
        Err(e) => {
            error!(index, %e, "Error resolving plugin directory");
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };
    let resolved_path = match tokio::fs::canonicalize(&full_path).await {
        Ok(p) => p,
        Err(_) => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
    };
    if !resolved_path.starts_with(&resolved_directory) {
        warn!(index, path = %file_path, "Rejected plugin file path after resolution");
        return (StatusCode::BAD_REQUEST, "Invalid file path").into_response();
    }

    match tokio::fs::read(&resolved_path).await {
        Ok(contents) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type_for(&file_path)),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            ],
            contents,
        )
            .into_response(),
        Err(e) => {
            error!(index, path = %file_path, %e, "Error reading plugin file");
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

/// Content type by file extension. Module scripts get explicit types that
/// the general MIME table misclassifies; everything else falls back to
/// `mime_guess` with a binary default.
fn content_type_for(path: &str) -> String {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "js" | "mjs" => "application/javascript".to_string(),
        "ts" => "application/typescript".to_string(),
        _ => mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.js"), "application/javascript");
        assert_eq!(content_type_for("mod.mjs"), "application/javascript");
        assert_eq!(content_type_for("index.ts"), "application/typescript");
        assert_eq!(content_type_for("plugin.json"), "application/json");
        assert_eq!(content_type_for("page.html"), "text/html");
        assert_eq!(content_type_for("style.css"), "text/css");
        assert_eq!(content_type_for("icon.png"), "image/png");
        assert_eq!(content_type_for("font.woff2"), "font/woff2");
        assert_eq!(content_type_for("blob.xyz"), "application/octet-stream");
    }
}
