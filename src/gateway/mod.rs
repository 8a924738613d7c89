//! HTTP gateway: routes chat, usage, and persistence endpoints.
//!
//! Serves:
//! - `GET  /`                      — static chat page (ServeDir fallback)
//! - `POST /get_response`          — proxy one message to the model
//! - `GET  /get_total_tokens_used` — cumulative usage and cost
//! - `POST /save_chat`             — persist a transcript
//! - `GET  /get_saved_chats`       — list persisted transcripts
//! - `POST /load_chat`             — fetch one transcript

mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::context::HistoryBudget;
use crate::models::CompletionBackend;
use crate::store::ChatStore;
use crate::usage::UsageTracker;

// ---------------------------------------------------------------------------
// Shared state injected into axum handlers
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub usage: Arc<UsageTracker>,
    pub store: ChatStore,
    pub budget: HistoryBudget,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, store: ChatStore) -> Self {
        Self {
            backend,
            usage: Arc::new(UsageTracker::new()),
            store,
            budget: HistoryBudget::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gateway handle
// ---------------------------------------------------------------------------

/// Handle returned by [`start_gateway`]: the server task plus the
/// address it actually bound (useful with port 0 in tests).
pub struct Gateway {
    pub handle: JoinHandle<()>,
    pub addr: SocketAddr,
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Build the router for the given state and static directory.
pub fn router(state: AppState, static_dir: PathBuf) -> Router {
    Router::new()
        .route("/get_response", post(handlers::chat::get_response))
        .route(
            "/get_total_tokens_used",
            get(handlers::usage::get_total_tokens_used),
        )
        .route("/save_chat", post(handlers::chats::save_chat))
        .route("/get_saved_chats", get(handlers::chats::get_saved_chats))
        .route("/load_chat", post(handlers::chats::load_chat))
        .with_state(state)
        .fallback_service(ServeDir::new(static_dir))
}

/// Start the gateway HTTP server on `addr`.
///
/// Returns a [`Gateway`] holding the server task handle and bound
/// address.
pub async fn start_gateway(
    addr: SocketAddr,
    state: AppState,
    static_dir: PathBuf,
) -> std::io::Result<Gateway> {
    let app = router(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("gateway server error: {e}");
        }
    });

    info!(%bound_addr, "gateway started");

    Ok(Gateway {
        handle,
        addr: bound_addr,
    })
}
