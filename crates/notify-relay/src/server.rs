//! Serve the relay on a bound listener.

use std::future::Future;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;

use crate::api::{self, AppState};

/// Run the HTTP server until `shutdown` resolves.
///
/// Upgraded WebSocket connections run on their own tasks and end when the
/// runtime stops or their pumps exit.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("reading listener address")?;
    info!("Listening on http://{}", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);
    info!("Publish endpoint: http://{}/notify", addr);

    let app = api::create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("running server")?;

    info!("Server stopped");
    Ok(())
}
