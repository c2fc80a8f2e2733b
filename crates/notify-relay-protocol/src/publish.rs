//! Publish endpoint acknowledgement.

use serde::{Deserialize, Serialize};

/// Body returned by `POST /notify` once a notification has been accepted.
///
/// Acceptance means the event was handed to the hub for best-effort fan-out.
/// It says nothing about how many consumers received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishAck {
    pub status: String,
    pub message: String,
}

impl PublishAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Notification sent to all clients".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
