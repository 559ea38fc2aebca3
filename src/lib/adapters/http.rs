use std::future::Future;
use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tokio::net;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::core::{NewTodo, Todo, TodoCreated, TodoError, TodoService};
use crate::storage::TodoStore;

pub struct AppState<S: TodoStore> {
    pub todo_service: TodoService<S>,
    pub started_at: Instant,
}

impl<S: TodoStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            todo_service: self.todo_service.clone(),
            started_at: self.started_at,
        }
    }
}

pub async fn get_todos<S: TodoStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Todo>>, TodoError> {
    Ok(Json(state.todo_service.list().await?))
}

/// The body is read as raw bytes so that a missing or wrong `Content-Type`
/// does not turn a valid JSON payload into a 415.
pub async fn post_todos<S: TodoStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<TodoCreated>, TodoError> {
    let request = NewTodo::from_json(&body)?;
    let id = state.todo_service.add(request).await?;
    Ok(Json(TodoCreated::ok(id)))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn health_route<S: TodoStore>(State(state): State<AppState<S>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": timestamp(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
    }))
}

async fn readiness_route<S: TodoStore>(State(state): State<AppState<S>>) -> Response {
    match state.todo_service.ready().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": "connected",
                "timestamp": timestamp(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not ready",
                    "database": "disconnected",
                    "error": e.to_string(),
                    "timestamp": timestamp(),
                })),
            )
                .into_response()
        }
    }
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

fn api_routes<S: TodoStore>() -> Router<AppState<S>> {
    Router::new().route("/todos", get(get_todos::<S>).post(post_todos::<S>))
}

/// Builds the full application router around an initialized service.
pub fn router<S: TodoStore>(todo_service: TodoService<S>) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        });

    let state = AppState {
        todo_service,
        started_at: Instant::now(),
    };

    Router::new()
        .route("/healthz", get(health_route::<S>))
        .route("/readyz", get(readiness_route::<S>))
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new<S: TodoStore>(
        todo_service: TodoService<S>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let router = router(todo_service);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to listen on port {}", config.port))?;
        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener.local_addr().context("listener has no local address")
    }

    /// Serves until `shutdown` resolves, then lets in-flight requests finish.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %self.local_addr()?, "HTTP server listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("received error from running server")?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
