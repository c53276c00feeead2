//! Server - HTTP front end for the fulfillment webhook
//!
//! Routes:
//! - `POST /fulfillment` receives Dialogflow webhook requests
//! - `GET /health` for load balancer checks
//!
//! When a webhook token is configured, requests must carry it as
//! `Authorization: Bearer <token>` (set as a custom header in the
//! Dialogflow fulfillment settings).

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::fulfillment::TriviaAgent;
use crate::webhook::WebhookRequest;

#[derive(Clone)]
struct AppState {
    agent: Arc<TriviaAgent>,
    webhook_token: Option<Arc<str>>,
}

/// Build the webhook router
pub fn router(agent: TriviaAgent, webhook_token: Option<String>) -> Router {
    let state = AppState {
        agent: Arc::new(agent),
        webhook_token: webhook_token.filter(|t| !t.is_empty()).map(Arc::from),
    };

    Router::new()
        .route("/health", get(health))
        .route("/fulfillment", post(fulfillment))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(listen_addr: &str, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    info!("Webhook listening on http://{}", listen_addr);

    axum::serve(listener, app)
        .await
        .context("server terminated with error")
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn fulfillment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Checked before the body is parsed
    if !authorized(&headers, state.webhook_token.as_deref()) {
        warn!("Rejected webhook call with missing or invalid token");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    debug!(?headers, "Dialogflow request headers");
    debug!(body = %String::from_utf8_lossy(&body), "Dialogflow request body");

    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Invalid webhook request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("Invalid request: {}", e) })),
            )
                .into_response();
        }
    };

    let response = state.agent.handle_webhook(request).await;
    Json(response).into_response()
}

fn authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected)
}
