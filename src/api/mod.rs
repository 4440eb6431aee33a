//! HTTP API for the attendance relay

pub mod handlers;
pub mod routes;
pub mod ws_handlers;

pub use handlers::{ApiState, ServerState};
pub use routes::create_router;
