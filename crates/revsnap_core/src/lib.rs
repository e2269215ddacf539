//! Shared domain types for the Revsnap ingestion pipeline.
//!
//! These types are the single source of truth. All interfaces (CLI, ingestion,
//! comparison) should use these types.

pub mod compare;
pub mod hash;
pub mod metrics;
pub mod model;
pub mod record;
pub mod status;
pub mod summary;

pub use compare::{
    CompareMode, ComparisonReport, DayComparison, Delta, Direction, MonthComparison, Pickup,
    SideFigures, SnapshotMeta,
};
pub use hash::sha256_hex;
pub use metrics::DerivedMetrics;
pub use model::{Hotel, NewHotel, NewSnapshot, ProcessedMail, RowDraft, Snapshot, SnapshotRow};
pub use status::{RowKind, SnapshotStatus};
pub use summary::CycleSummary;
