//! Mutation-to-event adapter
//!
//! The CRUD layer calls a `ChangeNotifier` method exactly once per
//! successful commit, after any media-storage side effect has been
//! attempted. The adapter builds the `ChangeEvent` (normalizing photo
//! references on the way) and hands it to the hub. It is fire-and-forget
//! on the commit path: a delivery problem never surfaces to the caller,
//! and it holds no database resources.

use std::sync::Arc;

use super::event::{
    ChangeData, ChangeEvent, SettingsRecord, Subject, TransactionRecord, UserRecord,
};
use super::hub::BroadcastHub;
use crate::media::normalize_photo;

/// Builds change events from committed records and broadcasts them.
#[derive(Clone)]
pub struct ChangeNotifier {
    hub: Arc<BroadcastHub>,
}

impl ChangeNotifier {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }

    /// A new attendance stamp was committed.
    pub async fn transaction_created(&self, record: TransactionRecord) {
        let record = canonicalize(record);
        self.hub
            .broadcast(&ChangeEvent::created(
                Subject::Transactions,
                ChangeData::Transaction(record),
            ))
            .await;
    }

    /// An attendance stamp was updated.
    pub async fn transaction_updated(&self, record: TransactionRecord) {
        let record = canonicalize(record);
        self.hub
            .broadcast(&ChangeEvent::updated(
                Subject::Transactions,
                ChangeData::Transaction(record),
            ))
            .await;
    }

    /// A user account was created.
    pub async fn user_created(&self, record: UserRecord) {
        self.hub
            .broadcast(&ChangeEvent::created(Subject::Users, ChangeData::User(record)))
            .await;
    }

    /// A user account was updated.
    pub async fn user_updated(&self, record: UserRecord) {
        self.hub
            .broadcast(&ChangeEvent::updated(Subject::Users, ChangeData::User(record)))
            .await;
    }

    /// The service settings row was updated.
    pub async fn settings_updated(&self, record: SettingsRecord) {
        self.hub
            .broadcast(&ChangeEvent::updated(
                Subject::Settings,
                ChangeData::Settings(record),
            ))
            .await;
    }

    /// A record was deleted. The id must be captured before any storage
    /// delete side effect runs, so it is available here even when that side
    /// effect failed. The payload carries the id and nothing else.
    pub async fn record_deleted(&self, table: Subject, id: i64) {
        self.hub.broadcast(&ChangeEvent::deleted(table, id)).await;
    }

    /// Generic trigger point for subjects without a typed payload yet.
    /// A `photo` field, when present, is normalized like the typed paths.
    pub async fn record_created(
        &self,
        table: Subject,
        fields: serde_json::Map<String, serde_json::Value>,
    ) {
        let fields = canonicalize_fields(fields);
        self.hub
            .broadcast(&ChangeEvent::created(table, ChangeData::Other(fields)))
            .await;
    }

    /// Generic update trigger point, see [`ChangeNotifier::record_created`].
    pub async fn record_updated(
        &self,
        table: Subject,
        fields: serde_json::Map<String, serde_json::Value>,
    ) {
        let fields = canonicalize_fields(fields);
        self.hub
            .broadcast(&ChangeEvent::updated(table, ChangeData::Other(fields)))
            .await;
    }
}

/// Replace the raw stored photo reference with its canonical form.
fn canonicalize(mut record: TransactionRecord) -> TransactionRecord {
    record.photo = normalize_photo(record.photo.as_deref());
    record
}

fn canonicalize_fields(
    mut fields: serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    if let Some(raw) = fields.get("photo").and_then(|v| v.as_str()) {
        let normalized = normalize_photo(Some(raw));
        fields.insert(
            "photo".to_string(),
            normalized.map_or(serde_json::Value::Null, serde_json::Value::String),
        );
    }
    fields
}
