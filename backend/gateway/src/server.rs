//! HTTP endpoint.
//!
//! One POST route for signed interactions plus `GET /api/health`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use hookforge_security::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::context::AppContext;
use crate::dispatch::{Dispatcher, InboundRequest};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub dispatcher: Arc<Dispatcher>,
    pub context: Arc<AppContext>,
    pub started: Instant,
}

impl GatewayState {
    pub fn new(dispatcher: Dispatcher, context: AppContext) -> Self {
        Self { dispatcher: Arc::new(dispatcher), context: Arc::new(context), started: Instant::now() }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub commands: usize,
    pub components: usize,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        commands: state.context.commands.len(),
        components: state.context.components.len(),
        uptime_seconds: state.started.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

/// Handler for the interactions route. The body is taken as raw bytes so the
/// signature is checked against exactly what was sent.
pub async fn post_interaction(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let request = InboundRequest {
        signature: header(SIGNATURE_HEADER),
        timestamp: header(TIMESTAMP_HEADER),
        body: &body,
    };

    let outcome = state.dispatcher.dispatch(&state.context, request).await;
    match outcome.response {
        Some(response) => (outcome.status, Json(response)).into_response(),
        None => (StatusCode::UNAUTHORIZED, "invalid request signature").into_response(),
    }
}

pub fn router(route: &str, state: GatewayState) -> Router {
    Router::new()
        .route(route, post(post_interaction))
        .route("/api/health", get(get_health))
        .with_state(state)
}

/// Starts the HTTP server and serves until the process is stopped.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, route: &str, state: GatewayState) -> Result<()> {
    let app = router(route, state);

    info!("[Gateway] listening on {} (interactions at {})", addr, route);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
