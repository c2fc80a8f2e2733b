//! Test utilities and common setup.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use notify_relay::api::{self, AppState};
use notify_relay::config::{ConnectionSettings, RelayConfig};
use notify_relay::hub::{Hub, HubStats};
use notify_relay::server;
use tokio::net::TcpListener;

/// Router plus the state behind it, with default limits.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::from_config(&RelayConfig::default());
    (api::create_router(state.clone()), state)
}

/// Serve a relay on an ephemeral port until the test runtime stops.
pub async fn spawn_relay(settings: ConnectionSettings) -> (SocketAddr, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(Hub::spawn(64), settings, Vec::new());

    let serve_state = state.clone();
    tokio::spawn(async move {
        server::serve(listener, serve_state, std::future::pending())
            .await
            .unwrap();
    });

    (addr, state)
}

/// Poll hub stats until `predicate` holds, failing after a few seconds.
pub async fn wait_for_stats(state: &AppState, predicate: impl Fn(&HubStats) -> bool) -> HubStats {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let stats = state.hub.stats().await.unwrap();
        if predicate(&stats) {
            return stats;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "hub never reached expected state, last: {stats:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
