//! Notification and event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event_types;

/// `origen` value stamped on admin alerts raised by the API backend.
pub const ALERT_ORIGIN: &str = "golang_api";

/// Arbitrary key/value payload attached to a notification.
pub type EventData = Map<String, Value>;

/// Reasons a notification is refused before reaching the hub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("type is required")]
    MissingType,

    #[error("message is required")]
    MissingMessage,
}

/// A notification as submitted by a producer, before it is broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Category tag, e.g. `booking_created`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Human readable summary.
    #[serde(default)]
    pub message: String,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl Notification {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = Some(data);
        self
    }

    /// A catalogue service changed. `kind` is usually one of the service
    /// tags in [`crate::event_types`].
    pub fn service_event(
        kind: impl Into<String>,
        service_id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        let kind = kind.into();
        let name = name.into();
        let message = format!("{kind}: {name}");

        let mut data = EventData::new();
        data.insert("servicio_id".to_string(), Value::from(service_id.into()));
        data.insert("nombre".to_string(), Value::from(name));
        data.insert("precio".to_string(), Value::from(price));
        Self::new(kind, message).with_data(data)
    }

    /// A service contract changed state.
    pub fn contract_event(
        kind: impl Into<String>,
        contract_id: impl Into<String>,
        service_id: impl Into<String>,
        status: impl Into<String>,
        amount: f64,
    ) -> Self {
        let kind = kind.into();
        let contract_id = contract_id.into();
        let status = status.into();
        let message = format!("{kind}: contract {contract_id} is {status}");

        let mut data = EventData::new();
        data.insert("contratacion_id".to_string(), Value::from(contract_id));
        data.insert("servicio_id".to_string(), Value::from(service_id.into()));
        data.insert("estado".to_string(), Value::from(status));
        data.insert("monto".to_string(), Value::from(amount));
        Self::new(kind, message).with_data(data)
    }

    /// An alert for the admin panel. The alert text doubles as the event
    /// message.
    pub fn admin_alert(
        title: impl Into<String>,
        message: impl Into<String>,
        alert_kind: impl Into<String>,
    ) -> Self {
        let message = message.into();

        let mut data = EventData::new();
        data.insert("titulo".to_string(), Value::from(title.into()));
        data.insert("mensaje".to_string(), Value::from(message.clone()));
        data.insert("tipo".to_string(), Value::from(alert_kind.into()));
        data.insert("origen".to_string(), Value::from(ALERT_ORIGIN));
        Self::new(event_types::ADMIN_ALERT, message).with_data(data)
    }

    /// Both `type` and `message` must be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.kind.is_empty() {
            return Err(ValidationError::MissingType);
        }
        if self.message.is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        Ok(())
    }

    /// Turn the notification into a broadcastable event.
    pub fn stamp(self, at: DateTime<Utc>) -> Event {
        Event {
            kind: self.kind,
            message: self.message,
            data: self.data.unwrap_or_default(),
            timestamp: at,
        }
    }
}

/// A notification stamped by the hub. This is the frame consumers receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    /// Always present on the wire; `{}` when the producer sent none.
    #[serde(default)]
    pub data: EventData,

    /// Broadcast time, RFC 3339 in UTC.
    pub timestamp: DateTime<Utc>,
}
