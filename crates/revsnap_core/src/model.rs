//! Entities stored by the snapshot registry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{RowKind, SnapshotStatus};

/// A hotel onboarded for forecast ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    /// Routing address forecast mail for this hotel arrives on.
    pub email: String,
    /// Room capacity used for occupancy and RevPAR.
    pub available_rooms: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for onboarding a hotel.
#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub email: String,
    pub available_rooms: i64,
}

/// Audit record written once a mail item has been fully handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMail {
    pub id: i64,
    pub message_id: String,
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub processed_at: DateTime<Utc>,
    pub content_hash: String,
}

/// An immutable snapshot of one forecast file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: i64,
    pub hotel_id: i64,
    /// Business time the figures were current at, not the ingestion time.
    pub taken_at: DateTime<Utc>,
    pub filename: String,
    pub storage_ref: String,
    pub content_hash: String,
    /// Hotel capacity frozen at registration time.
    pub available_rooms: i64,
    pub is_seed: bool,
    pub status: SnapshotStatus,
    pub error_message: Option<String>,
    pub row_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Phase-one registration payload for a snapshot.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub hotel_id: i64,
    pub taken_at: DateTime<Utc>,
    pub filename: String,
    pub storage_ref: String,
    pub content_hash: String,
    pub available_rooms: i64,
    pub is_seed: bool,
}

/// One per-day figure line inside a committed snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub id: i64,
    pub snapshot_id: i64,
    pub hotel_id: i64,
    pub stay_date: NaiveDate,
    pub kind: RowKind,
    /// Opaque positional values kept verbatim from the source line.
    pub raw_values: Vec<String>,
    pub room_nights: f64,
    pub room_revenue: f64,
    pub out_of_order: f64,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
    /// Zero-based position of the line within its source file.
    pub row_index: i64,
}

/// A parsed report line not yet attached to a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDraft {
    pub stay_date: NaiveDate,
    pub kind: RowKind,
    pub raw_values: Vec<String>,
    pub room_nights: f64,
    pub room_revenue: f64,
    pub out_of_order: f64,
    pub occupancy_pct: f64,
    pub adr: f64,
    pub revpar: f64,
    pub row_index: i64,
}
