//! HTTP API: the publish bridge, diagnostics and the router that also
//! mounts the WebSocket endpoint.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
