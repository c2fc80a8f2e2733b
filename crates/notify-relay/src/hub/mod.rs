//! Notification hub.
//!
//! The hub is an actor: one task owns the set of admitted consumers and the
//! counters, and every other component talks to it through a [`Hub`] handle.
//! Admit, Remove, Broadcast and Query are processed strictly one at a time,
//! so membership reads never race with membership writes.
//!
//! A broadcast stamps the notification, serializes it once and tries to
//! enqueue the identical frame on every consumer queue without waiting. A
//! consumer whose queue is full is disconnected on the spot.

mod state;
mod types;

use notify_relay_protocol::Notification;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use state::HubState;
pub use types::{BroadcastReport, ConsumerId, Frame, FrameSender, HubStats};
use types::HubCommand;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("notification hub is not running")]
    Closed,
}

impl<T> From<mpsc::error::SendError<T>> for HubError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

impl From<oneshot::error::RecvError> for HubError {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::Closed
    }
}

/// Cloneable handle to the hub task.
///
/// The task runs until the last handle is dropped.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<HubCommand>,
}

impl Hub {
    /// Spawn the hub loop on the current runtime.
    pub fn spawn(command_buffer: usize) -> Self {
        let (commands, rx) = mpsc::channel(command_buffer.max(1));
        tokio::spawn(HubState::default().run(rx));
        Self { commands }
    }

    /// Add a consumer. Broadcasts processed after this reach its queue.
    pub async fn admit(&self, id: ConsumerId, sender: FrameSender) -> Result<(), HubError> {
        self.commands.send(HubCommand::Admit { id, sender }).await?;
        Ok(())
    }

    /// Remove a consumer and close its queue. Removing twice is harmless.
    pub async fn remove(&self, id: ConsumerId) -> Result<(), HubError> {
        self.commands.send(HubCommand::Remove { id }).await?;
        Ok(())
    }

    /// Queue a notification for fan-out without waiting for it.
    pub async fn broadcast(&self, notification: Notification) -> Result<(), HubError> {
        self.commands
            .send(HubCommand::Broadcast {
                notification,
                reply: None,
            })
            .await?;
        Ok(())
    }

    /// Broadcast and wait for the hub to report what happened.
    pub async fn broadcast_and_report(
        &self,
        notification: Notification,
    ) -> Result<BroadcastReport, HubError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(HubCommand::Broadcast {
                notification,
                reply: Some(reply),
            })
            .await?;
        Ok(rx.await?)
    }

    /// Snapshot of membership and counters, answered by the hub loop itself.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(HubCommand::Query { reply }).await?;
        Ok(rx.await?)
    }
}
