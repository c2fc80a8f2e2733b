//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ConnectionSettings, RelayConfig};
use crate::hub::Hub;

/// Shared application state.
///
/// The hub handle is the only path to membership; the publish bridge and
/// the acceptor both go through it.
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub connection: ConnectionSettings,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Arc<Vec<String>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(hub: Hub, connection: ConnectionSettings, cors_origins: Vec<String>) -> Self {
        Self {
            hub,
            connection,
            cors_origins: Arc::new(cors_origins),
            started_at: Instant::now(),
        }
    }

    /// Spawn a hub sized from `config` and wrap it in fresh state.
    pub fn from_config(config: &RelayConfig) -> Self {
        let hub = Hub::spawn(config.hub.command_buffer);
        Self::new(
            hub,
            ConnectionSettings::from(&config.connection),
            config.server.cors_origins.clone(),
        )
    }
}
