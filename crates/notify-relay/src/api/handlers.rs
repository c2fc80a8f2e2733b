//! HTTP handlers for the publish bridge and diagnostics.

use axum::{Json, body::Bytes, extract::State, response::Html};
use notify_relay_protocol::{Notification, PublishAck};
use serde::Serialize;
use tracing::info;

use crate::hub::HubStats;

use super::error::ApiResult;
use super::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Publish a notification to every connected consumer.
///
/// POST /notify
///
/// The body is decoded as JSON whatever its `Content-Type`. The hub only
/// queues the event; the producer learns nothing about how many consumers
/// received it.
pub async fn notify(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<PublishAck>> {
    let Json(notification) = Json::<Notification>::from_bytes(&body)?;
    notification.validate()?;

    info!(
        kind = %notification.kind,
        message = %notification.message,
        "Notification received"
    );
    state.hub.broadcast(notification).await?;

    Ok(Json(PublishAck::success()))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub hub: HubStats,
    pub uptime_secs: u64,
}

/// Hub counters, answered by the hub loop.
///
/// GET /stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let hub = state.hub.stats().await?;
    Ok(Json(StatsResponse {
        hub,
        uptime_secs: state.started_at.elapsed().as_secs(),
    }))
}

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Browser test page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
