//! Wire types for the notification relay.
//!
//! Producers submit a [`Notification`] to the publish endpoint. The relay
//! stamps it with the broadcast time, turning it into an [`Event`], and
//! delivers the serialized event to every connected consumer.

pub mod event_types;
pub mod events;
pub mod publish;

pub use events::{Event, Notification, ValidationError};
pub use publish::PublishAck;
