//! Consumer-facing WebSocket endpoint.
//!
//! Every accepted connection is admitted to the hub and served by two tasks:
//! a reader that watches for pongs and failures, and a writer that drains
//! the consumer's queue and sends keepalive pings.

mod handler;
mod pump;

pub use handler::ws_handler;
