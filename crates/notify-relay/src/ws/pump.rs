//! Reader and writer loops for one consumer connection.
//!
//! The writer owns the sink and is the only task that ever writes to the
//! socket or closes it. The reader only reads; when it gives up it asks the
//! hub to remove the consumer, which closes the queue and makes the writer
//! send a Close frame and exit.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::ConnectionSettings;
use crate::hub::{ConsumerId, Frame, Hub};

/// Why a pump loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpExit {
    /// Peer sent Close or the stream ended.
    PeerClosed,
    /// No pong arrived before the read deadline.
    ReadDeadline,
    /// The transport reported an error (including oversized messages).
    TransportError,
    /// The hub closed the outbound queue.
    QueueClosed,
    /// A write failed or exceeded the write deadline.
    WriteFailed,
    /// The other loop of the same connection finished first.
    WriterDone,
}

/// Read frames until the peer goes away, the deadline passes or the writer
/// finishes. Every exit path submits Remove for this consumer.
pub(crate) async fn read_pump(
    mut stream: SplitStream<WebSocket>,
    hub: Hub,
    id: ConsumerId,
    read_timeout: Duration,
    mut writer_done: oneshot::Receiver<()>,
) -> PumpExit {
    let mut deadline = Instant::now() + read_timeout;

    let exit = loop {
        let next = tokio::select! {
            next = time::timeout_at(deadline, stream.next()) => next,
            _ = &mut writer_done => break PumpExit::WriterDone,
        };

        match next {
            Err(_) => {
                warn!("Consumer {} missed its keepalive deadline", id);
                break PumpExit::ReadDeadline;
            }
            Ok(None) => break PumpExit::PeerClosed,
            Ok(Some(Err(e))) => {
                warn!("WebSocket read error for consumer {}: {}", id, e);
                break PumpExit::TransportError;
            }
            Ok(Some(Ok(message))) => match message {
                Message::Pong(_) => {
                    deadline = Instant::now() + read_timeout;
                }
                Message::Close(frame) => {
                    debug!("Consumer {} sent close: {:?}", id, frame);
                    break PumpExit::PeerClosed;
                }
                Message::Ping(_) => {
                    // The transport answers pings itself.
                    debug!("Received ping from consumer {}", id);
                }
                Message::Text(text) => {
                    debug!("Ignoring {} byte text message from consumer {}", text.as_str().len(), id);
                }
                Message::Binary(data) => {
                    debug!("Ignoring {} byte binary message from consumer {}", data.len(), id);
                }
            },
        }
    };

    if let Err(e) = hub.remove(id).await {
        debug!("Could not remove consumer {}: {}", id, e);
    }
    exit
}

/// Drain the outbound queue onto the socket, interleaved with pings.
///
/// `done` is dropped when this returns so the reader stops waiting.
pub(crate) async fn write_pump(
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: mpsc::Receiver<Frame>,
    hub: Hub,
    id: ConsumerId,
    settings: ConnectionSettings,
    done: oneshot::Sender<()>,
) -> PumpExit {
    let mut ping = time::interval_at(
        Instant::now() + settings.ping_interval,
        settings.ping_interval,
    );
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let exit = loop {
        tokio::select! {
            frame = queue.recv() => {
                let Some(frame) = frame else {
                    send_close(&mut sink, settings.write_timeout, id).await;
                    break PumpExit::QueueClosed;
                };
                if let Err(e) = write_batch(&mut sink, &mut queue, frame, settings.write_timeout).await {
                    warn!("Write to consumer {} failed: {}", id, e);
                    break PumpExit::WriteFailed;
                }
            }
            _ = ping.tick() => {
                let keepalive = time::timeout(settings.write_timeout, sink.send(Message::Ping(Bytes::new())));
                match keepalive.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!("Ping to consumer {} failed: {}", id, e);
                        break PumpExit::WriteFailed;
                    }
                    Err(_) => {
                        warn!("Ping to consumer {} timed out", id);
                        break PumpExit::WriteFailed;
                    }
                }
            }
        }
    };

    if exit == PumpExit::WriteFailed {
        if let Err(e) = hub.remove(id).await {
            debug!("Could not remove consumer {}: {}", id, e);
        }
        let _ = time::timeout(settings.write_timeout, sink.close()).await;
    }
    drop(done);
    exit
}

#[derive(Debug, thiserror::Error)]
enum WriteError {
    #[error("write deadline of {0:?} exceeded")]
    Deadline(Duration),
    #[error(transparent)]
    Transport(#[from] axum::Error),
}

/// Write `first` plus whatever is already queued, then flush once.
async fn write_batch(
    sink: &mut SplitSink<WebSocket, Message>,
    queue: &mut mpsc::Receiver<Frame>,
    first: Frame,
    write_timeout: Duration,
) -> Result<(), WriteError> {
    let batch = async {
        sink.feed(Message::Text(first)).await?;
        for _ in 0..queue.len() {
            match queue.try_recv() {
                Ok(frame) => sink.feed(Message::Text(frame)).await?,
                Err(_) => break,
            }
        }
        sink.flush().await
    };

    time::timeout(write_timeout, batch)
        .await
        .map_err(|_| WriteError::Deadline(write_timeout))??;
    Ok(())
}

async fn send_close(sink: &mut SplitSink<WebSocket, Message>, write_timeout: Duration, id: ConsumerId) {
    info!("Closing connection for removed consumer {}", id);
    match time::timeout(write_timeout, sink.send(Message::Close(None))).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Close frame to consumer {} failed: {}", id, e),
        Err(_) => debug!("Close frame to consumer {} timed out", id),
    }
}
