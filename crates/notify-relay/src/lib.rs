//! Real-time notification relay.
//!
//! Producers `POST /notify`; every consumer connected to `GET /ws` receives
//! the stamped event. See [`hub`] for the fan-out rules and [`ws`] for the
//! per-connection pumps.

pub mod api;
pub mod client;
pub mod config;
pub mod hub;
pub mod server;
pub mod ws;

pub use notify_relay_protocol as protocol;
