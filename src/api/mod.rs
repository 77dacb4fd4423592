//! HTTP API.
//!
//! A thin adapter from routes to store and engine calls. The owner identity is
//! resolved once per request by the [`auth::AuthUser`] extractor and passed
//! explicitly into every operation.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod notes;
pub mod repetition;
pub mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post, put};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{Error, Result};
use crate::store::{NoteStore, ScheduleProvider, Store, TaskStore, UserStore};

/// Shared state for axum handlers. Each collaborator is its own capability
/// so handlers only see what they use.
#[derive(Clone)]
pub struct AppState {
    pub schedule: Arc<dyn ScheduleProvider>,
    pub tasks: Arc<dyn TaskStore>,
    pub notes: Arc<dyn NoteStore>,
    pub users: Arc<dyn UserStore>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Back every capability with one store.
    pub fn new<S: Store + 'static>(store: Arc<S>) -> Self {
        Self {
            schedule: store.clone(),
            tasks: store.clone(),
            notes: store.clone(),
            users: store.clone(),
            store,
        }
    }
}

/// Plain `{"message": ...}` success body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Build the full router with middleware applied.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/repetitiontypes", get(repetition::list))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/tasks/{id}",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route("/tasks/{id}/complete", put(tasks::complete))
        .route("/tasks/{id}/notes", get(notes::list).post(notes::create))
        .route("/notes/{id}", delete(notes::delete));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .layer(axum::middleware::from_fn_with_state(
            request_timeout,
            middleware::timeout,
        ))
        .layer(axum::middleware::from_fn(middleware::cors))
        .layer(axum::middleware::from_fn(middleware::observe))
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> error::ApiResult<axum::Json<Message>> {
    state.store.health_check().await?;
    Ok(axum::Json(Message::new("ok")))
}

/// A running API server.
pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind `bind_addr` (port `0` picks a free port) and serve in a background
    /// task.
    pub async fn start(
        state: AppState,
        bind_addr: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;
        let app = router(state, request_timeout);

        info!("API listening on http://{addr}/api/v1");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("API server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server task to finish.
    pub async fn wait(mut self) -> Result<()> {
        (&mut self.handle)
            .await
            .map_err(|e| Error::Other(format!("API server task failed: {e}")))
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
