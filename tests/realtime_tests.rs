//! End-to-end tests of the change-propagation core
//!
//! Drives the hub and notifier exactly the way the CRUD and connection
//! layers do: observers are bounded outbound queues registered with the
//! hub, mutations arrive through the notifier trigger points.

use std::sync::Arc;

use attendance_relay::api::ServerState;
use attendance_relay::realtime::{
    BroadcastHub, ChangeNotifier, Subject, TransactionRecord, CHANNEL_QUEUE,
};
use attendance_relay::Config;
use serde_json::Value;
use tokio::sync::mpsc;

fn stamp(id: i64, photo: Option<&str>) -> TransactionRecord {
    TransactionRecord {
        id,
        user_id: 1,
        timestamp: "2026-02-01T09:00:00Z".parse().unwrap(),
        photo: photo.map(Into::into),
        device_id: None,
        stamp_type: 0,
    }
}

#[tokio::test]
async fn test_fanout_survives_one_dead_channel() {
    let hub = Arc::new(BroadcastHub::new());
    let notifier = ChangeNotifier::new(hub.clone());

    let mut receivers = Vec::new();
    for _ in 0..5 {
        let (tx, rx) = mpsc::channel(CHANNEL_QUEUE);
        hub.register(tx).await;
        receivers.push(rx);
    }
    // Client 2 disconnects without deregistering.
    drop(receivers.remove(2));

    notifier.transaction_created(stamp(1, None)).await;

    for rx in &mut receivers {
        let message: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(message["event"], "INSERT");
        assert_eq!(message["data"]["id"], 1);
    }
    assert_eq!(hub.active_count().await, 4);
}

#[tokio::test]
async fn test_sequential_commits_arrive_in_order() {
    let hub = Arc::new(BroadcastHub::new());
    let notifier = ChangeNotifier::new(hub.clone());

    let (tx, mut rx) = mpsc::channel(CHANNEL_QUEUE);
    hub.register(tx).await;

    // One writer: create, update, delete in commit order.
    notifier.transaction_created(stamp(10, None)).await;
    notifier.transaction_updated(stamp(10, Some("uploads/a.jpg"))).await;
    notifier.record_deleted(Subject::Transactions, 10).await;

    let first: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let second: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let third: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();

    assert_eq!(first["event"], "INSERT");
    assert_eq!(second["event"], "UPDATE");
    assert_eq!(third["event"], "DELETE");
}

#[tokio::test]
async fn test_delete_payload_stays_minimal_with_photo_present() {
    let hub = Arc::new(BroadcastHub::new());
    let notifier = ChangeNotifier::new(hub.clone());

    let (tx, mut rx) = mpsc::channel(CHANNEL_QUEUE);
    hub.register(tx).await;

    // The stamp being deleted had a photo; only its id may leave the service.
    let record = stamp(7, Some("uploads/secret.jpg"));
    notifier.record_deleted(Subject::Transactions, record.id).await;

    let message: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let data = message["data"].as_object().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data["id"], 7);
}

#[tokio::test]
async fn test_no_observers_means_no_serialization() {
    let hub = Arc::new(BroadcastHub::new());
    let notifier = ChangeNotifier::new(hub.clone());

    notifier.transaction_created(stamp(1, None)).await;
    notifier.user_created(attendance_relay::realtime::UserRecord {
        user_id: 1,
        user_name: "alice".into(),
        device_id: None,
        is_admin: false,
    })
    .await;

    let stats = hub.stats();
    assert_eq!(stats.events_broadcast, 0);
    assert_eq!(stats.channels_pruned, 0);
}

#[tokio::test]
async fn test_late_observer_misses_earlier_events() {
    // Fire-and-forget: no replay for clients that connect late.
    let hub = Arc::new(BroadcastHub::new());
    let notifier = ChangeNotifier::new(hub.clone());

    let (tx_early, mut rx_early) = mpsc::channel(CHANNEL_QUEUE);
    hub.register(tx_early).await;
    notifier.transaction_created(stamp(1, None)).await;

    let (tx_late, mut rx_late) = mpsc::channel(CHANNEL_QUEUE);
    hub.register(tx_late).await;
    notifier.transaction_created(stamp(2, None)).await;

    let first: Value = serde_json::from_str(&rx_early.recv().await.unwrap()).unwrap();
    assert_eq!(first["data"]["id"], 1);
    let second: Value = serde_json::from_str(&rx_early.recv().await.unwrap()).unwrap();
    assert_eq!(second["data"]["id"], 2);

    let only: Value = serde_json::from_str(&rx_late.recv().await.unwrap()).unwrap();
    assert_eq!(only["data"]["id"], 2);
    assert!(rx_late.try_recv().is_err());
}

#[tokio::test]
async fn test_server_state_shares_one_hub() {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::new(Config {
        server_port: 0,
        upload_dir: dir.path().to_string_lossy().into_owned(),
    });

    let (tx, mut rx) = mpsc::channel(CHANNEL_QUEUE);
    state.hub.register(tx).await;

    // The notifier injected into handlers feeds the same hub channels
    // register with.
    state.notifier.transaction_created(stamp(3, Some("C:\\x\\uploads\\p.jpg"))).await;

    let message: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(message["table"], "transactions");
    assert_eq!(message["data"]["photo"], "uploads/p.jpg");
    assert_eq!(state.hub.active_count().await, 1);
}

#[tokio::test]
async fn test_media_store_reference_normalizes_to_itself() {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::new(Config {
        server_port: 0,
        upload_dir: dir.path().to_string_lossy().into_owned(),
    });

    let reference = state.media.upload(b"jpeg-bytes", "in.jpg").await.unwrap();
    // Freshly stored references are already canonical, so responses and
    // events agree with the stored value.
    assert_eq!(
        attendance_relay::media::normalize_photo(Some(&reference)),
        Some(reference.clone())
    );

    state.media.delete(&reference).await;
}
