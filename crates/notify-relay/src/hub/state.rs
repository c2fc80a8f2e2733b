//! The hub's control loop and the state only it may touch.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info, warn};
use notify_relay_protocol::Notification;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::types::{BroadcastReport, ConsumerId, Frame, FrameSender, HubCommand, HubStats};

/// Membership and counters. Owned by exactly one task.
#[derive(Default)]
pub(crate) struct HubState {
    consumers: HashMap<ConsumerId, FrameSender>,
    stats: HubStats,
}

impl HubState {
    /// Process commands in arrival order until every hub handle is dropped.
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<HubCommand>) {
        info!("Notification hub started");
        while let Some(command) = commands.recv().await {
            self.apply(command);
        }
        info!(
            "Notification hub stopped ({} consumers still admitted)",
            self.consumers.len()
        );
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Admit { id, sender } => self.admit(id, sender),
            HubCommand::Remove { id } => self.remove(id),
            HubCommand::Broadcast {
                notification,
                reply,
            } => {
                let report = self.broadcast(notification);
                if let Some(reply) = reply {
                    let _ = reply.send(report);
                }
            }
            HubCommand::Query { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn admit(&mut self, id: ConsumerId, sender: FrameSender) {
        if self.consumers.insert(id, sender).is_some() {
            warn!("Consumer {} admitted twice, replacing its queue", id);
        }
        self.stats.total_admitted += 1;
        info!(
            "Consumer {} connected (total: {})",
            id,
            self.consumers.len()
        );
    }

    fn remove(&mut self, id: ConsumerId) {
        // Dropping the sender closes the queue and ends the writer loop.
        if self.consumers.remove(&id).is_some() {
            self.stats.total_removed += 1;
            info!(
                "Consumer {} disconnected (total: {})",
                id,
                self.consumers.len()
            );
        } else {
            debug!("Consumer {} already removed", id);
        }
    }

    fn broadcast(&mut self, notification: Notification) -> BroadcastReport {
        let timestamp = Utc::now();
        let event = notification.stamp(timestamp);
        self.stats.broadcasts += 1;

        let frame = match serde_json::to_string(&event) {
            Ok(json) => Frame::from(json),
            Err(e) => {
                warn!("Failed to serialize event [{}]: {}", event.kind, e);
                return BroadcastReport {
                    timestamp,
                    delivered: 0,
                    pruned: 0,
                };
            }
        };

        let mut delivered = 0;
        let mut slow = 0;
        let mut gone = 0;
        self.consumers
            .retain(|id, sender| match sender.try_send(frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!("Consumer {} is not keeping up, disconnecting", id);
                    slow += 1;
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Consumer {} queue already closed", id);
                    gone += 1;
                    false
                }
            });

        let pruned = slow + gone;
        self.stats.frames_enqueued += delivered as u64;
        self.stats.slow_consumers_dropped += slow as u64;
        self.stats.total_removed += pruned as u64;

        debug!(
            "Broadcast [{}] {} to {} consumers ({} pruned)",
            event.kind, event.message, delivered, pruned
        );

        BroadcastReport {
            timestamp,
            delivered,
            pruned,
        }
    }

    fn snapshot(&self) -> HubStats {
        HubStats {
            connections: self.consumers.len(),
            ..self.stats.clone()
        }
    }
}
