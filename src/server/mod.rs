//! HTTP front-end: `POST /ask` and `GET /ping`.

use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::engine::{Engine, Reply};

const NO_QUERY: &str = "No query provided";
const INTERNAL_ERROR: &str = "Internal server error";

/// Shared across handlers. The engine is stateless, so no locking.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<dyn Engine>,
}

#[derive(Serialize)]
struct AskResponse {
    response: Reply,
}

/// Build the application router around an engine.
pub fn build_router(engine: Arc<dyn Engine>) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/ping", get(ping))
        .with_state(AppState { engine })
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: &ServerConfig, engine: Arc<dyn Engine>) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn ask(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(query) = extract_query(&body) else {
        info!("rejected request without a query");
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": NO_QUERY }))).into_response();
    };

    info!(query = %query, "received query");
    let response = state.engine.answer(&query).await;
    Json(AskResponse { response }).into_response()
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The `query` string of a JSON object body. Anything else counts as missing.
fn extract_query(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("query")?.as_str().map(str::to_string)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!(panic = detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR })),
    )
        .into_response()
}
