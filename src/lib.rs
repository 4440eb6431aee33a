//! Attendance Relay
//!
//! The real-time core of the attendance service:
//! - Broadcast hub fanning committed mutations out to WebSocket observers
//! - Change notifier the CRUD layer calls after each successful commit
//! - Photo reference normalizer shared by API responses and events
//! - Disk-backed media store for uploaded check-in photos

pub mod api;
pub mod media;
pub mod realtime;

use anyhow::Result;
use std::net::SocketAddr;

use api::ServerState;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Root directory for uploaded photos.
    pub upload_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Priority: env var > default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        })
    }
}

/// Start the server and block until shutdown.
///
/// On ctrl-c the listener stops accepting, in-flight requests drain, and
/// the hub closes every notification channel before this returns.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = ServerState::new(config);
    let hub = state.hub.clone();

    let router = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hub.close_all().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    /// Combined defaults / override / bad-value test. Runs as a single test
    /// to avoid parallel env var race conditions.
    #[test]
    fn test_env_lifecycle() {
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("UPLOAD_DIR");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.upload_dir, "uploads");

        std::env::set_var("SERVER_PORT", "9001");
        std::env::set_var("UPLOAD_DIR", "/tmp/photos");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 9001);
        assert_eq!(config.upload_dir, "/tmp/photos");

        std::env::set_var("SERVER_PORT", "not-a-port");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 8000);

        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("UPLOAD_DIR");
    }
}
