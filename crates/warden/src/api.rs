//! HTTP surface: OneBot event webhook, health and metrics.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};
use warden_moderation::{EventDispatcher, PeerRegistry, WardenMetrics};
use warden_onebot::parse_event;

/// Header OneBot implementations use to name the posting account.
pub const SELF_ID_HEADER: &str = "x-self-id";

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    dispatcher: Arc<EventDispatcher>,
    registry: Arc<PeerRegistry>,
    metrics: WardenMetrics,
    secret: Option<String>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        registry: Arc<PeerRegistry>,
        metrics: WardenMetrics,
        secret: Option<String>,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            metrics,
            secret,
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("Token "))
            })
            .is_some_and(|presented| presented == secret)
    }
}

/// Creates the webhook router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/onebot", post(receive_event))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Accept one OneBot event post.
async fn receive_event(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(mut payload): Json<Value>,
) -> impl IntoResponse {
    if !state.authorized(&headers) {
        warn!("Rejected event post with bad credentials");
        return StatusCode::UNAUTHORIZED;
    }

    // Some implementations only name the account in the header.
    let header_id = headers
        .get(SELF_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok());
    if let (Some(id), Some(object)) = (header_id, payload.as_object_mut()) {
        object.entry("self_id").or_insert_with(|| json!(id));
    }

    let event = parse_event(&payload);
    debug!(peer = ?event.self_id(), "Event post received");
    state.dispatcher.dispatch(event).await;
    StatusCode::NO_CONTENT
}

/// Health check endpoint.
async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    let peers: Vec<String> = state
        .registry
        .connected()
        .into_iter()
        .map(|peer| peer.to_string())
        .collect();
    (StatusCode::OK, Json(json!({"status": "ok", "peers": peers})))
}

/// Get current metrics snapshot.
async fn get_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}
