use std::path::PathBuf;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::{RelayConfig, ANTHROPIC_VERSION};
use crate::error::{ClaudeChatError, Result};

#[derive(Clone)]
pub struct AppState {
    pub credential: String,
    pub upstream_url: String,
    pub static_root: Option<PathBuf>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            credential: config.credential.clone(),
            upstream_url: config.upstream_url.clone(),
            static_root: config.static_root().map(|root| root.to_path_buf()),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    message: String,
}

#[derive(Serialize)]
struct RelayErrorBody {
    error: String,
    message: String,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("anthropic-version"),
        ]);

    let mut router = Router::new()
        .route("/", get(liveness))
        .route("/api/health", get(health))
        .route("/api/claude", post(relay_claude))
        .route("/api/{*rest}", any(api_not_found));

    // Explicit routes win over the bundle fallback, so `/` stays plain text
    // even when the static site is enabled.
    if let Some(root) = &state.static_root {
        let spa = ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")));
        router = router.fallback_service(spa);
    }

    router.layer(cors).with_state(state)
}

async fn liveness() -> &'static str {
    "claude-chat relay is running"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "relay is running".to_string(),
    })
}

/// Forwards the request body untouched to the upstream messages endpoint,
/// attaching the server-held credential, and relays the upstream status and
/// body verbatim. The body is never parsed or validated here.
async fn relay_claude(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "relaying chat completion request");

    let sent = state
        .http
        .post(&state.upstream_url)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", state.credential.as_str())
        .header("anthropic-version", ANTHROPIC_VERSION)
        .body(body)
        .send()
        .await;

    let upstream = match sent {
        Ok(upstream) => upstream,
        Err(err) => return local_failure(err.to_string()),
    };

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match upstream.bytes().await {
        Ok(payload) => {
            if status.is_success() {
                tracing::debug!(%status, "upstream reply relayed");
            } else {
                tracing::warn!(%status, "relaying upstream error verbatim");
            }
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                payload,
            )
                .into_response()
        }
        Err(err) => local_failure(err.to_string()),
    }
}

fn local_failure(message: String) -> Response {
    tracing::error!(error = %message, "upstream request failed without a response");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RelayErrorBody {
            error: "internal relay error".to_string(),
            message,
        }),
    )
        .into_response()
}

/// The static fallback must never swallow the API namespace.
async fn api_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(RelayErrorBody {
            error: "not found".to_string(),
            message: "no such API endpoint".to_string(),
        }),
    )
        .into_response()
}

pub async fn run(host: &str, port: u16, config: RelayConfig) -> Result<()> {
    let state = AppState::from_config(&config);
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ClaudeChatError::Runtime(e.to_string()))?;
    tracing::info!(%addr, mode = %config.mode, "relay listening");
    if let Some(root) = config.static_root() {
        tracing::info!(dir = %root.display(), "serving client bundle");
    }

    axum::serve(listener, app)
        .await
        .map_err(|e| ClaudeChatError::Runtime(e.to_string()))?;

    Ok(())
}
