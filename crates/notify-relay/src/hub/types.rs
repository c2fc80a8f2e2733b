//! Messages and snapshots exchanged with the hub.

use std::fmt;

use axum::extract::ws::Utf8Bytes;
use chrono::{DateTime, Utc};
use notify_relay_protocol::Notification;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// A serialized event, shared by every consumer it is delivered to.
pub type Frame = Utf8Bytes;

/// Outbound queue of one consumer, as held by the hub.
pub type FrameSender = mpsc::Sender<Frame>;

/// Opaque identity of one admitted consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(Uuid);

impl ConsumerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConsumerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Counters owned by the hub loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Consumers currently admitted.
    pub connections: usize,
    pub total_admitted: u64,
    pub total_removed: u64,
    pub broadcasts: u64,
    /// Frames placed on consumer queues, summed over all broadcasts.
    pub frames_enqueued: u64,
    /// Consumers dropped because their queue was full.
    pub slow_consumers_dropped: u64,
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub timestamp: DateTime<Utc>,
    pub delivered: usize,
    pub pruned: usize,
}

pub(crate) enum HubCommand {
    Admit {
        id: ConsumerId,
        sender: FrameSender,
    },
    Remove {
        id: ConsumerId,
    },
    Broadcast {
        notification: Notification,
        reply: Option<oneshot::Sender<BroadcastReport>>,
    },
    Query {
        reply: oneshot::Sender<HubStats>,
    },
}

impl fmt::Debug for HubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admit { id, .. } => f.debug_struct("Admit").field("id", id).finish(),
            Self::Remove { id } => f.debug_struct("Remove").field("id", id).finish(),
            Self::Broadcast { notification, .. } => f
                .debug_struct("Broadcast")
                .field("type", &notification.kind)
                .finish(),
            Self::Query { .. } => f.write_str("Query"),
        }
    }
}
