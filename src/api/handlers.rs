//! HTTP request handlers and shared server state

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::media::{DiskMediaStore, MediaStore};
use crate::realtime::{BroadcastHub, ChangeNotifier};
use crate::Config;

/// Shared server state
pub struct ServerState {
    /// Registry of live notification channels. One per process.
    pub hub: Arc<BroadcastHub>,
    /// Trigger-point API the CRUD layer calls after each commit.
    pub notifier: ChangeNotifier,
    /// Photo storage collaborator.
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<Config>,
}

/// Shared server state handle
pub type ApiState = Arc<ServerState>;

impl ServerState {
    /// Wire up the process-wide hub, notifier and media store.
    pub fn new(config: Config) -> ApiState {
        let hub = Arc::new(BroadcastHub::new());
        let notifier = ChangeNotifier::new(hub.clone());
        let media: Arc<dyn MediaStore> = Arc::new(DiskMediaStore::new(&config.upload_dir));

        Arc::new(Self {
            hub,
            notifier,
            media,
            config: Arc::new(config),
        })
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Currently connected notification channels.
    pub active_channels: usize,
}

/// Health check handler
pub async fn health(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_channels: state.hub.active_count().await,
        }),
    )
}
