//! Real-time change propagation
//!
//! This module provides:
//! - `ChangeEvent` — typed events describing one committed mutation
//! - `BroadcastHub` — the registry of live WebSocket channels and fan-out
//! - `ChangeNotifier` — the adapter the CRUD layer calls after each commit

mod event;
mod hub;
mod notifier;

pub use event::{
    ChangeData, ChangeEvent, ChangeKind, DeletedRecord, SettingsRecord, Subject,
    TransactionRecord, UserRecord,
};
pub use hub::{BroadcastHub, ChannelId, HubStats, CHANNEL_QUEUE};
pub use notifier::ChangeNotifier;
