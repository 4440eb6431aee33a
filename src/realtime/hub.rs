//! Broadcast hub: the registry of live observer channels
//!
//! Each WebSocket connection registers a bounded outbound queue with the
//! hub; `broadcast` serializes an event once and fans it out to every
//! registered channel. Delivery is at-most-once and best-effort: a channel
//! that fails is pruned and the remaining deliveries are unaffected.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use super::event::ChangeEvent;

/// Capacity of each channel's outbound queue. Bounded so one slow consumer
/// back-pressures only its own delivery, not the whole fan-out.
pub const CHANNEL_QUEUE: usize = 32;

/// Opaque identity of one registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Observability counters, snapshot via [`BroadcastHub::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStats {
    /// Events actually serialized and fanned out (empty-hub broadcasts are
    /// skipped before serialization and do not count).
    pub events_broadcast: u64,
    /// Channels removed after a failed delivery.
    pub channels_pruned: u64,
}

/// Registry of live channels plus the fan-out operation.
///
/// One hub per process: constructed at startup, injected into every handler
/// that registers channels or triggers notifications, and torn down with
/// [`BroadcastHub::close_all`] at shutdown.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    channels: Mutex<HashMap<ChannelId, mpsc::Sender<String>>>,
    events_broadcast: AtomicU64,
    channels_pruned: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-accepted channel's outbound queue.
    pub async fn register(&self, sender: mpsc::Sender<String>) -> ChannelId {
        let id = ChannelId::new();
        self.channels.lock().await.insert(id, sender);
        debug!(channel = %id, "channel registered");
        id
    }

    /// Remove a channel if present. Idempotent: deregistering twice, or a
    /// channel that was never registered, is a no-op.
    pub async fn deregister(&self, id: ChannelId) -> bool {
        let removed = self.channels.lock().await.remove(&id).is_some();
        if removed {
            debug!(channel = %id, "channel deregistered");
        }
        removed
    }

    /// Number of currently registered channels. Observability only.
    pub async fn active_count(&self) -> usize {
        self.channels.lock().await.len()
    }

    /// Fan an event out to every registered channel.
    ///
    /// The live set is snapshotted first and the lock released, so
    /// registration and deregistration during the fan-out never interleave
    /// with the iteration and channel I/O never runs under the lock. The
    /// event is serialized once; with no channels registered this returns
    /// before any serialization work. Failed channels are pruned; this
    /// method never fails.
    pub async fn broadcast(&self, event: &ChangeEvent) {
        let snapshot: Vec<(ChannelId, mpsc::Sender<String>)> = {
            let channels = self.channels.lock().await;
            if channels.is_empty() {
                return;
            }
            channels.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                warn!(kind = ?event.kind, table = ?event.table, "dropping unserializable change event: {}", e);
                return;
            }
        };
        self.events_broadcast.fetch_add(1, Ordering::Relaxed);

        // Deliver to all channels concurrently; one suspended or dead
        // channel must not block or fail the others. All attempts settle
        // before this returns.
        let attempts = snapshot.into_iter().map(|(id, tx)| {
            let message = message.clone();
            async move { (id, tx.send(message).await) }
        });
        for (id, result) in futures::future::join_all(attempts).await {
            if result.is_err() && self.deregister(id).await {
                self.channels_pruned.fetch_add(1, Ordering::Relaxed);
                debug!(channel = %id, "pruned channel after failed delivery");
            }
        }
    }

    /// Deregister every channel, closing the peers' receive streams.
    pub async fn close_all(&self) {
        let mut channels = self.channels.lock().await;
        let count = channels.len();
        channels.clear();
        if count > 0 {
            debug!(channels = count, "hub shut down, all channels closed");
        }
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            events_broadcast: self.events_broadcast.load(Ordering::Relaxed),
            channels_pruned: self.channels_pruned.load(Ordering::Relaxed),
        }
    }
}
