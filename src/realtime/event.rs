//! Change event types for WebSocket notifications
//!
//! One `ChangeEvent` is built per committed mutation and fanned out to
//! every connected observer. The wire shape is a compatibility contract
//! with existing clients and must not change:
//!
//! ```json
//! { "event": "INSERT" | "UPDATE" | "DELETE",
//!   "table": "<subject>",
//!   "data": { ... } }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The kind of committed mutation, serialized with the legacy wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// The table a mutation was committed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Transactions,
    Users,
    Settings,
}

/// Externally-visible fields of an attendance stamp.
///
/// `photo` carries the already-normalized reference, never the raw stored
/// value. Field names mirror the HTTP response schema.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    pub photo: Option<String>,
    pub device_id: Option<String>,
    /// 0 = check-in, 1 = check-out
    pub stamp_type: i32,
}

/// Externally-visible fields of a user account. Never includes credentials.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "deviceID")]
    pub device_id: Option<String>,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Service-wide attendance settings row.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsRecord {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i32,
    pub in_time: String,
    pub out_time: String,
    pub timezone: String,
}

/// Payload of a delete event: the identifier and nothing else, so clients
/// cannot infer deleted-record content.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedRecord {
    pub id: i64,
}

/// Typed event payload.
///
/// One closed shape per known subject keeps create/update payload fields in
/// lockstep with the record schema at compile time; `Other` is the escape
/// hatch for subjects added before their shape is promoted to a variant.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChangeData {
    Transaction(TransactionRecord),
    User(UserRecord),
    Settings(SettingsRecord),
    Deleted(DeletedRecord),
    Other(serde_json::Map<String, serde_json::Value>),
}

/// An immutable record of one committed mutation.
///
/// Constructed, broadcast, and discarded; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "event")]
    pub kind: ChangeKind,
    pub table: Subject,
    pub data: ChangeData,
}

impl ChangeEvent {
    pub fn created(table: Subject, data: ChangeData) -> Self {
        Self {
            kind: ChangeKind::Insert,
            table,
            data,
        }
    }

    pub fn updated(table: Subject, data: ChangeData) -> Self {
        Self {
            kind: ChangeKind::Update,
            table,
            data,
        }
    }

    /// A delete event. The payload is fixed to `{id}` by construction.
    pub fn deleted(table: Subject, id: i64) -> Self {
        Self {
            kind: ChangeKind::Delete,
            table,
            data: ChangeData::Deleted(DeletedRecord { id }),
        }
    }
}
