//! WebSocket acceptor for consumers.

use axum::{
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    response::Response,
};
use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::api::AppState;
use crate::config::ConnectionSettings;
use crate::hub::{ConsumerId, Hub};

use super::pump::{self, PumpExit};

/// WebSocket upgrade handler.
///
/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let settings = state.connection;
    let hub = state.hub.clone();

    ws.max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_message_size)
        .on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_connection(socket, hub, settings))
}

/// Admit the consumer, then run its reader and writer until both stop.
async fn handle_connection(socket: WebSocket, hub: Hub, settings: ConnectionSettings) {
    let id = ConsumerId::new();
    let (sink, stream) = socket.split();
    let (sender, queue) = mpsc::channel(settings.send_buffer);

    if let Err(e) = hub.admit(id, sender).await {
        error!("Failed to admit consumer {}: {}", id, e);
        return;
    }

    let (done_tx, done_rx) = oneshot::channel();
    let writer = tokio::spawn(pump::write_pump(
        sink,
        queue,
        hub.clone(),
        id,
        settings,
        done_tx,
    ));
    let reader = tokio::spawn(pump::read_pump(
        stream,
        hub,
        id,
        settings.read_timeout,
        done_rx,
    ));

    let (writer_exit, reader_exit) = tokio::join!(writer, reader);
    match (writer_exit, reader_exit) {
        (Ok(w), Ok(r)) => {
            debug!("Consumer {} pumps stopped (writer: {:?}, reader: {:?})", id, w, r);
            if r == PumpExit::ReadDeadline {
                info!("Consumer {} dropped after keepalive timeout", id);
            }
        }
        (w, r) => {
            if let Err(e) = w {
                error!("Writer task for consumer {} failed: {}", id, e);
            }
            if let Err(e) = r {
                error!("Reader task for consumer {} failed: {}", id, e);
            }
        }
    }
    info!("WebSocket connection closed for consumer {}", id);
}
